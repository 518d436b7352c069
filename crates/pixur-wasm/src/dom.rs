//! Applies render patches to the live page.

use pixur_core::crop::{Axis, Handle};
use pixur_editor::render::{DomPatch, DomSink, Node};
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::{
    BeforeUnloadEvent, Document, Element, Event, EventTarget, HtmlElement, HtmlImageElement,
    HtmlInputElement, HtmlOptionElement, HtmlSelectElement, HtmlTextAreaElement,
};

// ─── Element lookup ──────────────────────────────────────────────────────

/// CSS selector of every element a node stands for.
pub fn selector(node: Node) -> &'static str {
    match node {
        Node::PhaseInitial => ".uploader-form--phase-initial",
        Node::PhasePreview => ".uploader-form--phase-preview",
        Node::PhaseDetails => ".uploader-form--phase-details",
        Node::Preview => ".uploader-form--preview",
        Node::PreviewImages => ".uploader-form--preview-image",
        Node::StatusUploading => ".uploader-form--status__uploading",
        Node::StatusUploaded => ".uploader-form--status__uploaded",
        Node::UploadError => ".uploader-form--upload-error",
        Node::UploadErrorMessage => ".uploader-form--error-message",
        Node::ItemLink => ".uploader-form--url, #link",
        Node::DetailsSubmission => ".uploader-form--details-submission",
        Node::DetailsForm => {
            ".uploader-form--details input, .uploader-form--details select, \
             .uploader-form--details textarea, .uploader-form--details button"
        }
        Node::Comment => "#uploader-form--comment",
        Node::Recipients => ".uploader-form--recipients",
        Node::Summary => ".uploader-form--summary",
        Node::Submit => ".uploader-form--details button[type=\"submit\"]",
        Node::SaveStatus => ".uploader-form--status",
        Node::EmailContainer => ".email-container",
        Node::EmailRecipients => ".email-container--recipients",
        Node::EmailDetails => ".email-details",
        Node::EmailTitle => "#email-details--title",
        Node::EmailMessage => "#email-details--message",
        Node::MessagePreview => "#message",
        Node::CropRoot(Axis::Horizontal) => ".cropping__horizontal",
        Node::CropRoot(Axis::Vertical) => ".cropping__vertical",
        Node::CropGuide(axis, handle) => match (axis, handle) {
            (Axis::Horizontal, Handle::Start) => ".cropping--guide__left",
            (Axis::Horizontal, Handle::Middle) => ".cropping--guide__hcenter",
            (Axis::Horizontal, Handle::End) => ".cropping--guide__right",
            (Axis::Vertical, Handle::Start) => ".cropping--guide__top",
            (Axis::Vertical, Handle::Middle) => ".cropping--guide__vcenter",
            (Axis::Vertical, Handle::End) => ".cropping--guide__bottom",
        },
        Node::CropHandle(axis, handle) => match (axis, handle) {
            (Axis::Horizontal, Handle::Start) => ".cropping--handle__left",
            (Axis::Horizontal, Handle::Middle) => ".cropping--handle__hcenter",
            (Axis::Horizontal, Handle::End) => ".cropping--handle__right",
            (Axis::Vertical, Handle::Start) => ".cropping--handle__top",
            (Axis::Vertical, Handle::Middle) => ".cropping--handle__vcenter",
            (Axis::Vertical, Handle::End) => ".cropping--handle__bottom",
        },
    }
}

/// First element matching `selector`, cast to `T`.
pub fn query<T: JsCast>(document: &Document, selector: &str) -> Result<T, JsValue> {
    document
        .query_selector(selector)?
        .ok_or_else(|| JsValue::from_str(&format!("missing element {selector}")))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("unexpected element type for {selector}")))
}

fn query_all(document: &Document, selector: &str) -> Result<Vec<Element>, JsValue> {
    let list = document.query_selector_all(selector)?;
    Ok((0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect())
}

/// Register `handler` for `event` on `target`. The returned closure must be
/// kept alive for as long as the listener is needed.
pub fn listen(
    target: &EventTarget,
    event: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<Closure<dyn FnMut(Event)>, JsValue> {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    Ok(closure)
}

// ─── DOM sink ────────────────────────────────────────────────────────────

pub struct WebDom {
    document: Document,
    leave_guard: Rc<Cell<bool>>,
    _before_unload: Closure<dyn FnMut(Event)>,
}

impl WebDom {
    /// Bind to `document` and install the leave-page confirmation, initially
    /// disarmed.
    pub fn new(document: Document) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let leave_guard = Rc::new(Cell::new(false));
        let armed = leave_guard.clone();
        let before_unload = listen(&window, "beforeunload", move |ev: Event| {
            if !armed.get() {
                return;
            }
            ev.prevent_default();
            if let Some(ev) = ev.dyn_ref::<BeforeUnloadEvent>() {
                ev.set_return_value("");
            }
        })?;

        Ok(Self {
            document,
            leave_guard,
            _before_unload: before_unload,
        })
    }

    fn write(&self, patch: &DomPatch) -> Result<(), JsValue> {
        let node = match patch {
            DomPatch::SetLeaveGuard { armed } => {
                self.leave_guard.set(*armed);
                return Ok(());
            }
            DomPatch::SetVisible { node, .. }
            | DomPatch::SetText { node, .. }
            | DomPatch::SetSource { node, .. }
            | DomPatch::SetLink { node, .. }
            | DomPatch::SetValue { node, .. }
            | DomPatch::SetDisabled { node, .. }
            | DomPatch::SetClass { node, .. }
            | DomPatch::SetOffset { node, .. }
            | DomPatch::SetSelection { node, .. }
            | DomPatch::ScrollIntoView { node } => *node,
        };

        let elements = query_all(&self.document, selector(node))?;
        if elements.is_empty() {
            log::warn!("no element for {node:?}");
        }
        for element in &elements {
            write_element(&self.document, element, patch)?;
        }
        Ok(())
    }
}

impl DomSink for WebDom {
    fn apply(&mut self, patch: &DomPatch) {
        if let Err(err) = self.write(patch) {
            log::error!("failed to apply {patch:?}: {err:?}");
        }
    }
}

fn write_element(document: &Document, element: &Element, patch: &DomPatch) -> Result<(), JsValue> {
    match patch {
        DomPatch::SetVisible { visible, .. } => {
            if let Some(el) = element.dyn_ref::<HtmlElement>() {
                el.style()
                    .set_property("display", if *visible { "block" } else { "none" })?;
            }
        }
        DomPatch::SetText { text, .. } => element.set_text_content(Some(text.as_str())),
        DomPatch::SetSource { url, .. } => match element.dyn_ref::<HtmlImageElement>() {
            Some(img) => img.set_src(url),
            None => element.set_attribute("src", url)?,
        },
        DomPatch::SetLink { href, .. } => {
            element.set_attribute("href", href)?;
            element.set_text_content(Some(href.as_str()));
        }
        DomPatch::SetValue { value, .. } => {
            if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
                input.set_value(value);
            } else if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
                area.set_value(value);
            } else {
                element.set_text_content(Some(value.as_str()));
            }
        }
        DomPatch::SetDisabled { disabled, .. } => {
            element.toggle_attribute_with_force("disabled", *disabled)?;
        }
        DomPatch::SetClass { class, present, .. } => {
            element.class_list().toggle_with_force(class, *present)?;
        }
        DomPatch::SetOffset { edge, percent, .. } => {
            if let Some(el) = element.dyn_ref::<HtmlElement>() {
                el.style()
                    .set_property(edge.css_property(), &format!("{percent}%"))?;
            }
        }
        DomPatch::SetSelection { values, .. } => {
            if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
                select_values(document, select, values)?;
            }
        }
        DomPatch::ScrollIntoView { .. } => element.scroll_into_view(),
        DomPatch::SetLeaveGuard { .. } => {}
    }
    Ok(())
}

/// Select exactly `values`, appending options the list does not have yet.
fn select_values(
    document: &Document,
    select: &HtmlSelectElement,
    values: &[String],
) -> Result<(), JsValue> {
    let options = select.options();
    let mut present = Vec::new();
    for i in 0..options.length() {
        let Some(option) = options
            .item(i)
            .and_then(|el| el.dyn_into::<HtmlOptionElement>().ok())
        else {
            continue;
        };
        let value = option.value();
        option.set_selected(values.contains(&value));
        present.push(value);
    }

    for value in values.iter().filter(|v| !present.contains(v)) {
        let option: HtmlOptionElement = document.create_element("option")?.dyn_into()?;
        option.set_value(value);
        option.set_text(value);
        option.set_selected(true);
        select.append_child(&option)?;
    }
    select.set_size(select.options().length());
    Ok(())
}
