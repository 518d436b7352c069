//! User-facing copy derived from the view model.

use pixur_core::state::{LoadDetails, SaveDetails};
use pixur_core::view_model::{Changed, ViewModel};

/// `a`, `a and b`, `a, b and c` up to four names, then `N recipients`.
pub fn format_recipient_list(list: &[String]) -> String {
    match list {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] if list.len() <= 4 => format!("{} and {last}", init.join(", ")),
        _ => format!("{} recipients", list.len()),
    }
}

/// Sentence describing what the next save will change.
pub fn summary_text(changed: &Changed) -> String {
    if !changed.any {
        return "No changes.".to_string();
    }

    let mut summary = String::new();
    if changed.crop {
        summary.push_str("The crop has been updated. ");
    }
    if changed.comment {
        summary.push_str("The comment has been changed. ");
    }
    if changed.recipients {
        let added = !changed.new_recipients.is_empty();
        if added {
            summary.push_str("You added ");
            summary.push_str(&format_recipient_list(&changed.new_recipients));
        }
        if !changed.removed_recipients.is_empty() {
            summary.push_str(if added { " and" } else { "You have" });
            summary.push_str(" removed ");
            summary.push_str(&format_recipient_list(&changed.removed_recipients));
        }
        summary.push('.');
    }
    summary.trim_end().to_string()
}

/// Label of the details form's submit button.
pub fn submit_label(changed: &Changed, send_email: bool) -> String {
    if !changed.any {
        return "Close image".to_string();
    }
    if send_email && !changed.new_recipients.is_empty() {
        "Save and send e-mail".to_string()
    } else {
        "Save".to_string()
    }
}

/// Status line under the details form.
pub fn status_message(view: &ViewModel) -> String {
    if let LoadDetails::Failed(failure) = &view.load_details {
        return format!("Could not load the image details. {}", failure.hint);
    }
    match &view.save_details {
        SaveDetails::Initial => String::new(),
        SaveDetails::InProgress => "Saving…".to_string(),
        SaveDetails::Succeeded => "Saved.".to_string(),
        SaveDetails::Failed(failure) => format!("Something went wrong. {}", failure.hint),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn recipient_lists() {
        assert_eq!(format_recipient_list(&[]), "");
        assert_eq!(format_recipient_list(&strings(&["a"])), "a");
        assert_eq!(format_recipient_list(&strings(&["a", "b"])), "a and b");
        assert_eq!(
            format_recipient_list(&strings(&["a", "b", "c", "d"])),
            "a, b, c and d"
        );
        assert_eq!(
            format_recipient_list(&strings(&["a", "b", "c", "d", "e"])),
            "5 recipients"
        );
    }

    #[test]
    fn summary_of_no_changes() {
        let changed = Changed::default();
        assert_eq!(summary_text(&changed), "No changes.");
        assert_eq!(submit_label(&changed, true), "Close image");
    }

    #[test]
    fn summary_of_recipient_changes() {
        let changed = Changed {
            any: true,
            crop: true,
            comment: false,
            recipients: true,
            new_recipients: strings(&["c"]),
            removed_recipients: strings(&["a"]),
        };
        assert_eq!(
            summary_text(&changed),
            "The crop has been updated. You added c and removed a."
        );
        assert_eq!(submit_label(&changed, true), "Save and send e-mail");
        assert_eq!(submit_label(&changed, false), "Save");
    }

    #[test]
    fn summary_of_removal_only() {
        let changed = Changed {
            any: true,
            recipients: true,
            removed_recipients: strings(&["a", "b"]),
            ..Changed::default()
        };
        assert_eq!(summary_text(&changed), "You have removed a and b.");
        assert_eq!(submit_label(&changed, true), "Save");
    }
}
