//! WASM bridge for Pixur ingest: binds the editor engine to the upload page.
//!
//! Compiled via `wasm-pack build --target web` and started from the page
//! with `IngestApp.mount(configJson)`.

mod dom;
mod drag;
mod fetch;
mod logger;

use dom::{listen, query};
use drag::AxisDrag;
use fetch::WebBackend;
use futures::future::LocalBoxFuture;
use pixur_core::config::IngestConfig;
use pixur_core::crop::Axis;
use pixur_core::state::{FormDefaults, SelectedFile, State};
use pixur_editor::actions::Actions;
use pixur_editor::store::Store;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Event, HtmlElement, HtmlFormElement, HtmlInputElement, HtmlOptionElement,
    HtmlSelectElement, HtmlTextAreaElement,
};

const FILE_INPUT: &str = "#uploader-form input[type=\"file\"]";
const UPLOADER_FORM: &str = "#uploader-form";
const DETAILS_FORM: &str = ".uploader-form--details";
const ADD_RECIPIENT: &str = "#uploader-form--add-recipient";
const RECIPIENTS: &str = ".uploader-form--recipients";
const COMMENT: &str = "#uploader-form--comment";
const SEND_EMAIL: &str = "#send_email";
const EMAIL_TITLE: &str = "#email-details--title";
const EMAIL_MESSAGE: &str = "#email-details--message";

/// The ingest page controller.
///
/// Owns the action layer and every listener it installed; dropping it
/// detaches the page.
#[wasm_bindgen]
pub struct IngestApp {
    actions: Actions<WebBackend>,
    _drags: Vec<Rc<AxisDrag>>,
    _listeners: Vec<Closure<dyn FnMut(Event)>>,
}

#[wasm_bindgen]
impl IngestApp {
    /// Mount on the current document. `config_json` may be empty for the
    /// defaults.
    pub fn mount(config_json: &str) -> Result<IngestApp, JsValue> {
        console_error_panic_hook_setup();

        let config =
            IngestConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        logger::init(&config.log_level);

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let defaults = read_form_defaults(&document)?;
        let dom = dom::WebDom::new(document.clone())?;
        let store = Store::new(State::initial(&defaults), Box::new(dom)).shared();
        let actions = Actions::new(store, WebBackend, config);

        let drags = Axis::ALL
            .into_iter()
            .map(|axis| AxisDrag::bind(&document, actions.clone(), axis))
            .collect::<Result<Vec<_>, _>>()?;
        let listeners = bind_form(&document, &actions)?;

        let app = IngestApp {
            actions,
            _drags: drags,
            _listeners: listeners,
        };

        // The browser may have kept a file selected across a reload.
        let file_input: HtmlInputElement = query(&document, FILE_INPUT)?;
        spawn(app.actions.select_file(first_file(&file_input)));

        log::info!("ingest page mounted");
        Ok(app)
    }

    /// Open an already uploaded item for editing.
    pub fn select_existing_image(&self, item_url: &str, thumbnail: &str, full_resolution: &str) {
        spawn(
            self.actions
                .select_existing_image(item_url, thumbnail, full_resolution),
        );
    }

    pub fn reset(&self) {
        self.actions.reset();
    }
}

fn spawn(task: LocalBoxFuture<'static, ()>) {
    wasm_bindgen_futures::spawn_local(task);
}

// ─── Form wiring ─────────────────────────────────────────────────────────

fn first_file(input: &HtmlInputElement) -> Option<SelectedFile> {
    let file = input.files()?.get(0)?;
    Some(SelectedFile::new(file.name(), file.size() as u64, file))
}

/// Value of an `<input>` or `<textarea>`.
fn field_value(document: &Document, selector: &str) -> Result<String, JsValue> {
    let element: HtmlElement = query(document, selector)?;
    if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        Ok(input.value())
    } else if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
        Ok(area.value())
    } else {
        Ok(element.text_content().unwrap_or_default())
    }
}

fn read_form_defaults(document: &Document) -> Result<FormDefaults, JsValue> {
    let send_email: HtmlInputElement = query(document, SEND_EMAIL)?;
    Ok(FormDefaults {
        send_email: send_email.checked(),
        email_title: field_value(document, EMAIL_TITLE)?,
        email_message: field_value(document, EMAIL_MESSAGE)?,
    })
}

fn selected_recipients(select: &HtmlSelectElement) -> Vec<String> {
    let selected = select.selected_options();
    (0..selected.length())
        .filter_map(|i| selected.item(i))
        .filter_map(|el| el.dyn_into::<HtmlOptionElement>().ok())
        .map(|option| option.value())
        .collect()
}

fn bind_form(
    document: &Document,
    actions: &Actions<WebBackend>,
) -> Result<Vec<Closure<dyn FnMut(Event)>>, JsValue> {
    let mut listeners = Vec::new();

    let file_input: HtmlInputElement = query(document, FILE_INPUT)?;
    listeners.push(listen(&file_input, "change", {
        let actions = actions.clone();
        let input = file_input.clone();
        move |ev: Event| {
            ev.prevent_default();
            ev.stop_propagation();
            spawn(actions.select_file(first_file(&input)));
        }
    })?);

    let uploader: HtmlFormElement = query(document, UPLOADER_FORM)?;
    listeners.push(listen(&uploader, "reset", {
        let actions = actions.clone();
        move |_| actions.reset()
    })?);
    listeners.push(listen(&uploader, "submit", {
        let actions = actions.clone();
        move |ev: Event| {
            ev.prevent_default();
            ev.stop_propagation();
            spawn(actions.upload_selected());
        }
    })?);

    let details: HtmlElement = query(document, DETAILS_FORM)?;
    listeners.push(listen(&details, "submit", {
        let actions = actions.clone();
        move |ev: Event| {
            ev.prevent_default();
            ev.stop_propagation();
            spawn(actions.submit_or_close());
        }
    })?);

    let add_recipient: HtmlElement = query(document, ADD_RECIPIENT)?;
    listeners.push(listen(&add_recipient, "click", {
        let actions = actions.clone();
        move |ev: Event| {
            ev.prevent_default();
            let Some(window) = web_sys::window() else {
                return;
            };
            match window.prompt_with_message("E-mail address") {
                Ok(Some(address)) => actions.add_recipient(&address),
                Ok(None) => {}
                Err(err) => log::warn!("prompt failed: {err:?}"),
            }
        }
    })?);

    let recipients: HtmlSelectElement = query(document, RECIPIENTS)?;
    listeners.push(listen(&recipients, "change", {
        let actions = actions.clone();
        let select = recipients.clone();
        move |_| actions.set_recipients(selected_recipients(&select))
    })?);

    let comment: HtmlElement = query(document, COMMENT)?;
    listeners.push(listen(&comment, "input", {
        let actions = actions.clone();
        let document = document.clone();
        move |_| match field_value(&document, COMMENT) {
            Ok(value) => actions.set_comment(value),
            Err(err) => log::warn!("could not read comment: {err:?}"),
        }
    })?);

    let send_email: HtmlInputElement = query(document, SEND_EMAIL)?;
    listeners.push(listen(&send_email, "change", {
        let actions = actions.clone();
        let checkbox = send_email.clone();
        move |_| actions.set_send_email(checkbox.checked())
    })?);

    let title: HtmlElement = query(document, EMAIL_TITLE)?;
    listeners.push(listen(&title, "input", {
        let actions = actions.clone();
        let document = document.clone();
        move |_| match field_value(&document, EMAIL_TITLE) {
            Ok(value) => actions.set_email_title(value),
            Err(err) => log::warn!("could not read e-mail title: {err:?}"),
        }
    })?);

    let message: HtmlElement = query(document, EMAIL_MESSAGE)?;
    listeners.push(listen(&message, "input", {
        let actions = actions.clone();
        let document = document.clone();
        move |_| match field_value(&document, EMAIL_MESSAGE) {
            Ok(value) => actions.set_email_message(value),
            Err(err) => log::warn!("could not read e-mail message: {err:?}"),
        }
    })?);

    Ok(listeners)
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Pixur WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
