//! Canonical state of the ingest page.
//!
//! `State` is replaced wholesale on every change; it is never mutated in
//! place by consumers. Partial updates are expressed as a `StateDelta` and
//! merged shallowly: a present field fully replaces the prior value.

use crate::crop::{Axis, CropSpan, CropState};
use crate::error::Failure;
use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Top-level screen state of the upload flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Phase {
    /// No file chosen.
    #[default]
    Initial,
    /// File chosen, not yet uploaded.
    Preview,
    /// Upload started, or an existing item is being edited.
    Details,
}

/// Upload progress. A finished upload carries its outcome, so a failure hint
/// exists exactly when the upload failed.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum UploadPhase {
    #[default]
    Inactive,
    InProgress,
    Finished(UploadOutcome),
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    Success,
    Failure(Failure),
}

impl UploadPhase {
    /// `Some(true)` on success, `Some(false)` on failure, `None` otherwise.
    pub fn result(&self) -> Option<bool> {
        match self {
            Self::Finished(UploadOutcome::Success) => Some(true),
            Self::Finished(UploadOutcome::Failure(_)) => Some(false),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&Failure> {
        match self {
            Self::Finished(UploadOutcome::Failure(failure)) => Some(failure),
            _ => None,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::InProgress)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished(_))
    }
}

/// Fetch of an existing item's metadata.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadDetails {
    #[default]
    Ready,
    Pending,
    Failed(Failure),
}

impl LoadDetails {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Save of the metadata form.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SaveDetails {
    #[default]
    Initial,
    InProgress,
    Succeeded,
    Failed(Failure),
}

impl SaveDetails {
    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::InProgress)
    }
}

/// A user-selected file, opaque to the engine.
///
/// The browser adapter stores its native file object inside and takes it
/// back out with [`SelectedFile::downcast_ref`] when uploading.
#[derive(Clone)]
pub struct SelectedFile {
    name: String,
    size: u64,
    handle: Rc<dyn Any>,
}

impl SelectedFile {
    pub fn new<T: Any>(name: impl Into<String>, size: u64, handle: T) -> Self {
        Self {
            name: name.into(),
            size,
            handle: Rc::new(handle),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.handle.downcast_ref::<T>()
    }
}

impl PartialEq for SelectedFile {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.handle, &other.handle)
    }
}

impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// Form values taken from the page markup at load time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormDefaults {
    pub send_email: bool,
    pub email_title: String,
    pub email_message: String,
}

/// The canonical state record.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub phase: Phase,
    pub upload: UploadPhase,
    pub load_details: LoadDetails,
    pub save_details: SaveDetails,
    /// Server-assigned location of the item, once known.
    pub item_url: Option<String>,
    pub preview_url: String,
    /// Retained until the upload starts.
    pub file: Option<SelectedFile>,
    pub saved_recipients: Vec<String>,
    pub recipients: Vec<String>,
    pub saved_comment: String,
    pub comment: String,
    pub send_email: bool,
    pub email_title: String,
    pub email_message: String,
    pub crop_horizontal: CropState,
    pub crop_vertical: CropState,
}

impl State {
    pub fn initial(defaults: &FormDefaults) -> Self {
        Self {
            phase: Phase::Initial,
            upload: UploadPhase::Inactive,
            load_details: LoadDetails::Ready,
            save_details: SaveDetails::Initial,
            item_url: None,
            preview_url: String::new(),
            file: None,
            saved_recipients: Vec::new(),
            recipients: Vec::new(),
            saved_comment: String::new(),
            comment: String::new(),
            send_email: defaults.send_email,
            email_title: defaults.email_title.clone(),
            email_message: defaults.email_message.clone(),
            // Nothing to lose before a file is chosen.
            crop_horizontal: CropState::loaded(CropSpan::CENTER),
            crop_vertical: CropState::loaded(CropSpan::CENTER),
        }
    }

    pub fn crop(&self, axis: Axis) -> &CropState {
        match axis {
            Axis::Horizontal => &self.crop_horizontal,
            Axis::Vertical => &self.crop_vertical,
        }
    }

    /// Shallow merge: every field present in `delta` replaces the current
    /// value, everything else is carried over.
    pub fn merge(&self, delta: StateDelta) -> State {
        let mut next = self.clone();
        let StateDelta {
            phase,
            upload,
            load_details,
            save_details,
            item_url,
            preview_url,
            file,
            saved_recipients,
            recipients,
            saved_comment,
            comment,
            send_email,
            email_title,
            email_message,
            crop_horizontal,
            crop_vertical,
        } = delta;

        if let Some(v) = phase {
            next.phase = v;
        }
        if let Some(v) = upload {
            next.upload = v;
        }
        if let Some(v) = load_details {
            next.load_details = v;
        }
        if let Some(v) = save_details {
            next.save_details = v;
        }
        if let Some(v) = item_url {
            next.item_url = v;
        }
        if let Some(v) = preview_url {
            next.preview_url = v;
        }
        if let Some(v) = file {
            next.file = v;
        }
        if let Some(v) = saved_recipients {
            next.saved_recipients = v;
        }
        if let Some(v) = recipients {
            next.recipients = v;
        }
        if let Some(v) = saved_comment {
            next.saved_comment = v;
        }
        if let Some(v) = comment {
            next.comment = v;
        }
        if let Some(v) = send_email {
            next.send_email = v;
        }
        if let Some(v) = email_title {
            next.email_title = v;
        }
        if let Some(v) = email_message {
            next.email_message = v;
        }
        if let Some(v) = crop_horizontal {
            next.crop_horizontal = v;
        }
        if let Some(v) = crop_vertical {
            next.crop_vertical = v;
        }
        next
    }

    /// Copy with one axis's crop sub-state replaced.
    pub fn with_crop(&self, axis: Axis, crop: CropState) -> State {
        let mut next = self.clone();
        match axis {
            Axis::Horizontal => next.crop_horizontal = crop,
            Axis::Vertical => next.crop_vertical = crop,
        }
        next
    }
}

/// A partial state record. `None` means "leave unchanged"; for optional
/// fields, `Some(None)` clears the value.
#[derive(Debug, Clone, Default)]
pub struct StateDelta {
    pub phase: Option<Phase>,
    pub upload: Option<UploadPhase>,
    pub load_details: Option<LoadDetails>,
    pub save_details: Option<SaveDetails>,
    pub item_url: Option<Option<String>>,
    pub preview_url: Option<String>,
    pub file: Option<Option<SelectedFile>>,
    pub saved_recipients: Option<Vec<String>>,
    pub recipients: Option<Vec<String>>,
    pub saved_comment: Option<String>,
    pub comment: Option<String>,
    pub send_email: Option<bool>,
    pub email_title: Option<String>,
    pub email_message: Option<String>,
    pub crop_horizontal: Option<CropState>,
    pub crop_vertical: Option<CropState>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, RequestError};

    fn defaults() -> FormDefaults {
        FormDefaults {
            send_email: true,
            email_title: "New photo".into(),
            email_message: "Hi!".into(),
        }
    }

    #[test]
    fn initial_state_takes_form_defaults() {
        let state = State::initial(&defaults());
        assert_eq!(state.phase, Phase::Initial);
        assert!(state.send_email);
        assert_eq!(state.email_message, "Hi!");
        assert_eq!(state.crop_horizontal.span(), CropSpan::CENTER);
        assert!(!state.crop_horizontal.changed());
    }

    #[test]
    fn merge_replaces_only_present_fields() {
        let state = State::initial(&defaults());
        let next = state.merge(StateDelta {
            phase: Some(Phase::Preview),
            preview_url: Some("blob:1".into()),
            ..StateDelta::default()
        });
        assert_eq!(next.phase, Phase::Preview);
        assert_eq!(next.preview_url, "blob:1");
        assert_eq!(next.email_title, state.email_title);
        // The original is untouched.
        assert_eq!(state.phase, Phase::Initial);
    }

    #[test]
    fn merge_is_shallow() {
        let state = State::initial(&defaults()).merge(StateDelta {
            crop_vertical: Some(CropState::loaded(CropSpan::new(0.1, 0.9))),
            ..StateDelta::default()
        });
        let next = state.merge(StateDelta {
            crop_vertical: Some(CropState::with_span(CropSpan::new(0.2, 0.3), None)),
            ..StateDelta::default()
        });
        assert_eq!(next.crop_vertical.saved, None);
    }

    #[test]
    fn merge_can_clear_optional_fields() {
        let state = State::initial(&defaults()).merge(StateDelta {
            item_url: Some(Some("/img/1".into())),
            ..StateDelta::default()
        });
        let next = state.merge(StateDelta {
            item_url: Some(None),
            ..StateDelta::default()
        });
        assert_eq!(next.item_url, None);
    }

    #[test]
    fn upload_error_exists_only_on_failure() {
        let failure = Failure::from(RequestError::MissingLocation);
        let failed = UploadPhase::Finished(UploadOutcome::Failure(failure));
        assert_eq!(failed.result(), Some(false));
        assert_eq!(failed.error().map(|f| f.kind), Some(ErrorKind::Unexpected));

        let ok = UploadPhase::Finished(UploadOutcome::Success);
        assert_eq!(ok.result(), Some(true));
        assert!(ok.error().is_none());
        assert_eq!(UploadPhase::InProgress.result(), None);
    }

    #[test]
    fn phases_are_ordered() {
        assert!(Phase::Details > Phase::Preview);
        assert!(Phase::Preview > Phase::Initial);
    }

    #[test]
    fn selected_file_roundtrips_handle() {
        let file = SelectedFile::new("cat.jpg", 1024, 42_u32);
        assert_eq!(file.downcast_ref::<u32>(), Some(&42));
        assert!(file.downcast_ref::<String>().is_none());
        assert_eq!(file.clone(), file);
        assert_ne!(file, SelectedFile::new("cat.jpg", 1024, 42_u32));
    }
}
