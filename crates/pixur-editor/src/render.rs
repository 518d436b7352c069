//! Render diff engine.
//!
//! Compares two consecutive view models and emits the minimal list of
//! `DomPatch`es that brings the page from one to the other. A field that is
//! equal in both models produces no patch. The engine never reads canonical
//! state and never touches the DOM; a `DomSink` applies the patches.

use crate::summary::{format_recipient_list, status_message, submit_label, summary_text};
use pixur_core::crop::{Axis, Edge, Handle};
use pixur_core::view_model::{CropView, ViewModel};
use pixur_core::Phase;

/// Class marking the active drag handle.
pub const CLASS_HANDLE_ACTIVE: &str = "cropping--handle__active";
/// Class on a crop root while metadata is not loaded.
pub const CLASS_CROP_UNINITIALIZED: &str = "cropping__uninitialized";
/// Class revealing a collapsible email section.
pub const CLASS_SHOW: &str = "show";

/// Page elements the engine writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Node {
    PhaseInitial,
    PhasePreview,
    PhaseDetails,
    /// Preview container.
    Preview,
    /// Every preview `<img>`.
    PreviewImages,
    StatusUploading,
    StatusUploaded,
    UploadError,
    UploadErrorMessage,
    ItemLink,
    DetailsSubmission,
    /// All controls of the details form.
    DetailsForm,
    Comment,
    Recipients,
    Summary,
    Submit,
    SaveStatus,
    EmailContainer,
    EmailRecipients,
    EmailDetails,
    EmailTitle,
    EmailMessage,
    MessagePreview,
    CropRoot(Axis),
    /// Positioned guide line of a handle.
    CropGuide(Axis, Handle),
    /// Grabbable part of a handle.
    CropHandle(Axis, Handle),
}

/// One DOM write.
#[derive(Debug, Clone, PartialEq)]
pub enum DomPatch {
    SetVisible { node: Node, visible: bool },
    SetText { node: Node, text: String },
    SetSource { node: Node, url: String },
    /// Link target and text.
    SetLink { node: Node, href: String },
    /// Value of a form input.
    SetValue { node: Node, value: String },
    SetDisabled { node: Node, disabled: bool },
    SetClass { node: Node, class: &'static str, present: bool },
    /// Offset from an edge, in percent.
    SetOffset { node: Node, edge: Edge, percent: f64 },
    /// Selected options of a multi-select, adding missing options.
    SetSelection { node: Node, values: Vec<String> },
    ScrollIntoView { node: Node },
    /// Arm or disarm the leave-page confirmation.
    SetLeaveGuard { armed: bool },
}

/// Applies patches to a concrete page.
pub trait DomSink {
    fn apply(&mut self, patch: &DomPatch);
}

impl DomSink for Vec<DomPatch> {
    fn apply(&mut self, patch: &DomPatch) {
        self.push(patch.clone());
    }
}

/// Compute the patches that turn `prev` into `next`.
pub fn render(prev: &ViewModel, next: &ViewModel) -> Vec<DomPatch> {
    let mut out = Vec::new();
    render_phase(prev, next, &mut out);
    render_preview(prev, next, &mut out);
    render_upload(prev, next, &mut out);
    render_details_form(prev, next, &mut out);
    render_crop_controls(prev, next, &mut out);
    for axis in Axis::ALL {
        render_crop(axis, prev.crop(axis), next.crop(axis), &mut out);
    }
    render_email(prev, next, &mut out);
    if prev.changed.any != next.changed.any {
        out.push(DomPatch::SetLeaveGuard {
            armed: next.changed.any,
        });
    }
    out
}

fn render_phase(prev: &ViewModel, next: &ViewModel, out: &mut Vec<DomPatch>) {
    if prev.phase == next.phase {
        return;
    }
    for (node, phase) in [
        (Node::PhaseInitial, Phase::Initial),
        (Node::PhasePreview, Phase::Preview),
        (Node::PhaseDetails, Phase::Details),
    ] {
        out.push(DomPatch::SetVisible {
            node,
            visible: next.phase == phase,
        });
    }
}

fn render_preview(prev: &ViewModel, next: &ViewModel, out: &mut Vec<DomPatch>) {
    let url_changed = prev.preview_url != next.preview_url;
    if url_changed {
        out.push(DomPatch::SetSource {
            node: Node::PreviewImages,
            url: next.preview_url.clone(),
        });
    }
    if prev.show_preview != next.show_preview {
        out.push(DomPatch::SetVisible {
            node: Node::Preview,
            visible: next.show_preview,
        });
    }
    if next.show_preview && (!prev.show_preview || url_changed) {
        out.push(DomPatch::ScrollIntoView {
            node: Node::Preview,
        });
    }
}

fn render_upload(prev: &ViewModel, next: &ViewModel, out: &mut Vec<DomPatch>) {
    if prev.upload.is_in_progress() != next.upload.is_in_progress() {
        out.push(DomPatch::SetVisible {
            node: Node::StatusUploading,
            visible: next.upload.is_in_progress(),
        });
    }
    if prev.upload.is_finished() != next.upload.is_finished() {
        out.push(DomPatch::SetVisible {
            node: Node::StatusUploaded,
            visible: next.upload.is_finished(),
        });
    }

    let (prev_error, next_error) = (prev.upload_error(), next.upload_error());
    if prev_error != next_error {
        if let Some(failure) = next_error
            && prev_error.map(|f| &f.hint) != Some(&failure.hint)
        {
            out.push(DomPatch::SetText {
                node: Node::UploadErrorMessage,
                text: failure.hint.clone(),
            });
        }
        if prev_error.is_some() != next_error.is_some() {
            out.push(DomPatch::SetVisible {
                node: Node::UploadError,
                visible: next_error.is_some(),
            });
        }
    }

    let succeeded = |view: &ViewModel| view.upload.result() == Some(true);
    if succeeded(prev) != succeeded(next) {
        out.push(DomPatch::SetVisible {
            node: Node::DetailsSubmission,
            visible: succeeded(next),
        });
    }

    if prev.item_url != next.item_url {
        out.push(DomPatch::SetLink {
            node: Node::ItemLink,
            href: next.item_url.clone().unwrap_or_default(),
        });
    }
}

fn render_details_form(prev: &ViewModel, next: &ViewModel, out: &mut Vec<DomPatch>) {
    if prev.form_enabled != next.form_enabled {
        out.push(DomPatch::SetDisabled {
            node: Node::DetailsForm,
            disabled: !next.form_enabled,
        });
    }
    if prev.comment != next.comment {
        out.push(DomPatch::SetValue {
            node: Node::Comment,
            value: next.comment.clone(),
        });
    }
    if prev.recipients != next.recipients {
        out.push(DomPatch::SetSelection {
            node: Node::Recipients,
            values: next.recipients.clone(),
        });
    }

    let summary = summary_text(&next.changed);
    if summary != summary_text(&prev.changed) {
        out.push(DomPatch::SetText {
            node: Node::Summary,
            text: summary,
        });
    }
    let label = submit_label(&next.changed, next.send_email);
    if label != submit_label(&prev.changed, prev.send_email) {
        out.push(DomPatch::SetText {
            node: Node::Submit,
            text: label,
        });
    }
    let status = status_message(next);
    if status != status_message(prev) {
        out.push(DomPatch::SetText {
            node: Node::SaveStatus,
            text: status,
        });
    }
}

fn render_crop_controls(prev: &ViewModel, next: &ViewModel, out: &mut Vec<DomPatch>) {
    if prev.form_enabled != next.form_enabled {
        for axis in Axis::ALL {
            for handle in Handle::ALL {
                for node in [Node::CropGuide(axis, handle), Node::CropHandle(axis, handle)] {
                    out.push(DomPatch::SetDisabled {
                        node,
                        disabled: !next.form_enabled,
                    });
                }
            }
        }
    }

    let (was_ready, is_ready) = (prev.load_details.is_ready(), next.load_details.is_ready());
    if was_ready != is_ready {
        for axis in Axis::ALL {
            out.push(DomPatch::SetClass {
                node: Node::CropRoot(axis),
                class: CLASS_CROP_UNINITIALIZED,
                present: !is_ready,
            });
        }
    }
}

/// Guide positions: the start guide is offset `(1 - start)` from its far
/// anchor, the end guide `end` from its near anchor, and the middle guide
/// sits at the box center.
fn render_crop(axis: Axis, prev: &CropView, next: &CropView, out: &mut Vec<DomPatch>) {
    if prev.start != next.start {
        out.push(DomPatch::SetOffset {
            node: Node::CropGuide(axis, Handle::Start),
            edge: axis.anchor_edge(Handle::Start),
            percent: (1.0 - next.start) * 100.0,
        });
    }
    if prev.end != next.end {
        out.push(DomPatch::SetOffset {
            node: Node::CropGuide(axis, Handle::End),
            edge: axis.anchor_edge(Handle::End),
            percent: next.end * 100.0,
        });
    }
    if prev.start != next.start || prev.end != next.end {
        out.push(DomPatch::SetOffset {
            node: Node::CropGuide(axis, Handle::Middle),
            edge: axis.anchor_edge(Handle::Middle),
            percent: (next.start + next.end) / 2.0 * 100.0,
        });
    }

    for handle in Handle::ALL {
        let was_active = prev.dragging == Some(handle);
        let is_active = next.dragging == Some(handle);
        if was_active != is_active {
            out.push(DomPatch::SetClass {
                node: Node::CropHandle(axis, handle),
                class: CLASS_HANDLE_ACTIVE,
                present: is_active,
            });
        }
    }
}

fn render_email(prev: &ViewModel, next: &ViewModel, out: &mut Vec<DomPatch>) {
    let (prev_new, next_new) = (&prev.changed.new_recipients, &next.changed.new_recipients);
    if prev_new.is_empty() != next_new.is_empty() {
        out.push(DomPatch::SetClass {
            node: Node::EmailContainer,
            class: CLASS_SHOW,
            present: !next_new.is_empty(),
        });
    }
    if prev_new != next_new {
        out.push(DomPatch::SetText {
            node: Node::EmailRecipients,
            text: format_recipient_list(next_new),
        });
    }

    if prev.send_email != next.send_email {
        out.push(DomPatch::SetClass {
            node: Node::EmailDetails,
            class: CLASS_SHOW,
            present: next.send_email,
        });
        for node in [Node::EmailTitle, Node::EmailMessage] {
            out.push(DomPatch::SetDisabled {
                node,
                disabled: !next.send_email,
            });
        }
    }
    if prev.email_title != next.email_title {
        out.push(DomPatch::SetValue {
            node: Node::EmailTitle,
            value: next.email_title.clone(),
        });
    }
    if prev.email_message != next.email_message {
        out.push(DomPatch::SetText {
            node: Node::MessagePreview,
            text: next.email_message.clone(),
        });
    }
}
