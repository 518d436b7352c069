//! Derived, read-only projection of canonical state consumed by rendering.

use crate::crop::{Axis, CropState, Handle};
use crate::error::Failure;
use crate::state::{LoadDetails, Phase, SaveDetails, State, UploadPhase};

/// What a crop axis looks like on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropView {
    pub start: f64,
    pub end: f64,
    pub dragging: Option<Handle>,
}

impl From<&CropState> for CropView {
    fn from(crop: &CropState) -> Self {
        Self {
            start: crop.start,
            end: crop.end,
            dragging: crop.dragging,
        }
    }
}

/// What differs between the live form and the last saved values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Changed {
    pub any: bool,
    pub crop: bool,
    pub comment: bool,
    pub recipients: bool,
    /// Sorted recipients present live but not saved.
    pub new_recipients: Vec<String>,
    /// Sorted recipients saved but no longer present live.
    pub removed_recipients: Vec<String>,
}

impl Changed {
    pub fn of(state: &State) -> Self {
        let (new_recipients, removed_recipients) =
            diff_recipients(&state.saved_recipients, &state.recipients);
        let recipients = !new_recipients.is_empty() || !removed_recipients.is_empty();
        let crop = state.crop_horizontal.changed() || state.crop_vertical.changed();
        let comment = state.comment != state.saved_comment;

        Self {
            any: crop || comment || recipients,
            crop,
            comment,
            recipients,
            new_recipients,
            removed_recipients,
        }
    }
}

/// Sorted-merge diff of two recipient lists. Order of the inputs is
/// irrelevant. Returns `(added, removed)`, both sorted.
pub fn diff_recipients(saved: &[String], live: &[String]) -> (Vec<String>, Vec<String>) {
    let mut saved: Vec<&String> = saved.iter().collect();
    let mut live: Vec<&String> = live.iter().collect();
    saved.sort();
    saved.dedup();
    live.sort();
    live.dedup();

    let mut added = Vec::new();
    let mut removed = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < saved.len() && j < live.len() {
        match saved[i].cmp(live[j]) {
            std::cmp::Ordering::Equal => {
                i += 1;
                j += 1;
            }
            std::cmp::Ordering::Less => {
                removed.push(saved[i].clone());
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                added.push(live[j].clone());
                j += 1;
            }
        }
    }
    removed.extend(saved[i..].iter().map(|s| (*s).clone()));
    added.extend(live[j..].iter().map(|s| (*s).clone()));
    (added, removed)
}

/// The full view model. Every render compares two of these.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    pub phase: Phase,
    pub show_preview: bool,
    pub preview_url: String,
    pub upload: UploadPhase,
    pub item_url: Option<String>,
    pub load_details: LoadDetails,
    pub save_details: SaveDetails,
    /// Form accepts input: not saving and metadata loaded.
    pub form_enabled: bool,
    pub recipients: Vec<String>,
    pub comment: String,
    pub send_email: bool,
    pub email_title: String,
    pub email_message: String,
    pub crop_horizontal: CropView,
    pub crop_vertical: CropView,
    pub changed: Changed,
}

impl ViewModel {
    pub fn derive(state: &State) -> Self {
        Self {
            phase: state.phase,
            show_preview: state.phase >= Phase::Preview,
            preview_url: state.preview_url.clone(),
            upload: state.upload.clone(),
            item_url: state.item_url.clone(),
            load_details: state.load_details.clone(),
            save_details: state.save_details.clone(),
            form_enabled: !state.save_details.is_in_progress() && state.load_details.is_ready(),
            recipients: state.recipients.clone(),
            comment: state.comment.clone(),
            send_email: state.send_email,
            email_title: state.email_title.clone(),
            email_message: state.email_message.clone(),
            crop_horizontal: CropView::from(&state.crop_horizontal),
            crop_vertical: CropView::from(&state.crop_vertical),
            changed: Changed::of(state),
        }
    }

    pub fn upload_error(&self) -> Option<&Failure> {
        self.upload.error()
    }

    pub fn crop(&self, axis: Axis) -> &CropView {
        match axis {
            Axis::Horizontal => &self.crop_horizontal,
            Axis::Vertical => &self.crop_vertical,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crop::{CropSpan, CropState};
    use crate::state::{FormDefaults, StateDelta};
    use pretty_assertions::assert_eq;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn saved_state() -> State {
        State::initial(&FormDefaults::default()).merge(StateDelta {
            crop_horizontal: Some(CropState::loaded(CropSpan::new(0.1, 0.9))),
            crop_vertical: Some(CropState::loaded(CropSpan::new(0.0, 1.0))),
            ..StateDelta::default()
        })
    }

    #[test]
    fn recipient_diff_example() {
        let (added, removed) = diff_recipients(&strings(&["a", "b"]), &strings(&["b", "c"]));
        assert_eq!(added, strings(&["c"]));
        assert_eq!(removed, strings(&["a"]));
    }

    #[test]
    fn recipient_order_is_irrelevant() {
        let (added, removed) =
            diff_recipients(&strings(&["c", "a", "b"]), &strings(&["b", "c", "a"]));
        assert!(added.is_empty());
        assert!(removed.is_empty());
    }

    #[test]
    fn recipient_diff_handles_tails() {
        let (added, removed) = diff_recipients(&strings(&["m"]), &strings(&["a", "z"]));
        assert_eq!(added, strings(&["a", "z"]));
        assert_eq!(removed, strings(&["m"]));
    }

    #[test]
    fn nothing_changed_after_load() {
        let view = ViewModel::derive(&saved_state());
        assert_eq!(view.changed, Changed::default());
    }

    #[test]
    fn changed_flags() {
        let state = saved_state().merge(StateDelta {
            saved_recipients: Some(strings(&["a", "b"])),
            recipients: Some(strings(&["b", "c"])),
            comment: Some("hello".into()),
            ..StateDelta::default()
        });
        let changed = ViewModel::derive(&state).changed;
        assert_eq!(
            changed,
            Changed {
                any: true,
                crop: false,
                comment: true,
                recipients: true,
                new_recipients: strings(&["c"]),
                removed_recipients: strings(&["a"]),
            }
        );
    }

    #[test]
    fn crop_change_marks_any() {
        let state = saved_state().merge(StateDelta {
            crop_vertical: Some(CropState::with_span(
                CropSpan::new(0.2, 1.0),
                Some(CropSpan::new(0.0, 1.0)),
            )),
            ..StateDelta::default()
        });
        let changed = ViewModel::derive(&state).changed;
        assert!(changed.crop);
        assert!(changed.any);
        assert!(!changed.recipients);
    }

    #[test]
    fn form_enabled_requires_ready_and_not_saving() {
        let state = saved_state();
        assert!(ViewModel::derive(&state).form_enabled);

        let saving = state.merge(StateDelta {
            save_details: Some(SaveDetails::InProgress),
            ..StateDelta::default()
        });
        assert!(!ViewModel::derive(&saving).form_enabled);

        let loading = state.merge(StateDelta {
            load_details: Some(LoadDetails::Pending),
            ..StateDelta::default()
        });
        assert!(!ViewModel::derive(&loading).form_enabled);
    }

    #[test]
    fn show_preview_from_preview_phase() {
        let state = State::initial(&FormDefaults::default());
        assert!(!ViewModel::derive(&state).show_preview);
        for phase in [Phase::Preview, Phase::Details] {
            let next = state.merge(StateDelta {
                phase: Some(phase),
                ..StateDelta::default()
            });
            assert!(ViewModel::derive(&next).show_preview);
        }
    }

    #[test]
    fn derive_is_deterministic() {
        let state = saved_state();
        assert_eq!(ViewModel::derive(&state), ViewModel::derive(&state));
    }
}
