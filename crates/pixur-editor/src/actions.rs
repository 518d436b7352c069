//! Action/effect layer.
//!
//! Actions translate user intent and network outcomes into state deltas.
//! Long-running work is returned as a future for the caller to spawn; the
//! "in progress" transition is applied synchronously before the future is
//! returned. Every continuation re-checks that the state still refers to the
//! item it was started for and silently drops its result otherwise.
//!
//! No error leaves this layer: each failure ends as a state delta carrying
//! the matching user hint.

use crate::store::SharedStore;
use futures::future::{self, FutureExt, LocalBoxFuture};
use pixur_core::config::IngestConfig;
use pixur_core::crop::{self, Axis, CropAction, CropError, CropSpan, CropState};
use pixur_core::error::{Failure, RequestError};
use pixur_core::metadata::{EmailNotice, Metadata, MetadataUpdate, meta_url};
use pixur_core::state::{
    LoadDetails, Phase, SaveDetails, SelectedFile, State, StateDelta, UploadOutcome, UploadPhase,
};
use std::cell::Cell;
use std::rc::Rc;

/// A completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    /// `Location` header, if present.
    pub location: Option<String>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn ensure_success(self) -> Result<Self, RequestError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(RequestError::UnexpectedStatus {
                status: self.status,
                status_text: self.status_text,
            })
        }
    }

    /// The `Location` of a created resource.
    pub fn created_location(self) -> Result<String, RequestError> {
        self.location
            .filter(|location| !location.is_empty())
            .ok_or(RequestError::MissingLocation)
    }
}

/// Environment services the actions depend on.
///
/// Request futures resolve to `Err(RequestError::Connectivity(_))` when the
/// transport fails and to `Ok` for any completed exchange, whatever its
/// status; validating the response is the action's job.
pub trait Backend {
    /// URL under which the page can display `file`.
    fn object_url(&self, file: &SelectedFile) -> String;

    /// Natural `(width, height)` of the image at `url`, once loaded.
    fn image_size(&self, url: &str) -> LocalBoxFuture<'static, Option<(f64, f64)>>;

    fn post_file(
        &self,
        url: &str,
        file: &SelectedFile,
    ) -> LocalBoxFuture<'static, Result<HttpResponse, RequestError>>;

    fn post_json(
        &self,
        url: &str,
        body: String,
    ) -> LocalBoxFuture<'static, Result<HttpResponse, RequestError>>;

    fn get(&self, url: &str) -> LocalBoxFuture<'static, Result<HttpResponse, RequestError>>;

    /// Resolves on the next turn of the event loop.
    fn next_tick(&self) -> LocalBoxFuture<'static, ()>;
}

pub struct Actions<B> {
    store: SharedStore,
    backend: Rc<B>,
    config: Rc<IngestConfig>,
    /// Ticket of the most recently started upload.
    uploads: Rc<Cell<u64>>,
}

impl<B> Clone for Actions<B> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            backend: self.backend.clone(),
            config: self.config.clone(),
            uploads: self.uploads.clone(),
        }
    }
}

impl<B: Backend + 'static> Actions<B> {
    pub fn new(store: SharedStore, backend: B, config: IngestConfig) -> Self {
        Self {
            store,
            backend: Rc::new(backend),
            config: Rc::new(config),
            uploads: Rc::new(Cell::new(0)),
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn update(&self, delta: StateDelta) {
        self.store.borrow_mut().update_state(delta);
    }

    // ─── Form edits ──────────────────────────────────────────────────────

    pub fn reset(&self) {
        self.store.borrow_mut().reset();
    }

    pub fn dispatch_crop(&self, axis: Axis, action: CropAction) -> Result<(), CropError> {
        self.store.borrow_mut().dispatch(axis, action)
    }

    pub fn set_recipients(&self, recipients: Vec<String>) {
        self.update(StateDelta {
            recipients: Some(recipients),
            ..StateDelta::default()
        });
    }

    /// Append a new address to the live recipients. Blank or duplicate
    /// addresses are ignored.
    pub fn add_recipient(&self, address: &str) {
        let address = address.trim();
        if address.is_empty() {
            return;
        }
        let mut recipients = self.store.borrow().state().recipients.clone();
        if recipients.iter().any(|r| r == address) {
            return;
        }
        recipients.push(address.to_string());
        self.set_recipients(recipients);
    }

    pub fn set_comment(&self, comment: String) {
        self.update(StateDelta {
            comment: Some(comment),
            ..StateDelta::default()
        });
    }

    pub fn set_send_email(&self, send_email: bool) {
        self.update(StateDelta {
            send_email: Some(send_email),
            ..StateDelta::default()
        });
    }

    pub fn set_email_title(&self, title: String) {
        self.update(StateDelta {
            email_title: Some(title),
            ..StateDelta::default()
        });
    }

    pub fn set_email_message(&self, message: String) {
        self.update(StateDelta {
            email_message: Some(message),
            ..StateDelta::default()
        });
    }

    // ─── File selection & upload ─────────────────────────────────────────

    /// Start over with `file` (or with nothing). The returned future fits
    /// the crop box to the image once its size is known.
    pub fn select_file(&self, file: Option<SelectedFile>) -> LocalBoxFuture<'static, ()> {
        let preview_url = file
            .as_ref()
            .map(|f| self.backend.object_url(f))
            .unwrap_or_default();
        let phase = if file.is_some() {
            Phase::Preview
        } else {
            Phase::Initial
        };
        if let Some(f) = &file {
            log::info!("selected {} ({} bytes)", f.name(), f.size());
        }

        let has_file = file.is_some();
        let crop = if has_file {
            CropState::placeholder()
        } else {
            CropState::loaded(CropSpan::CENTER)
        };
        self.update(StateDelta {
            phase: Some(phase),
            upload: Some(UploadPhase::Inactive),
            load_details: Some(LoadDetails::Ready),
            save_details: Some(SaveDetails::Initial),
            item_url: Some(None),
            file: Some(file),
            preview_url: Some(preview_url.clone()),
            saved_recipients: Some(Vec::new()),
            recipients: Some(Vec::new()),
            saved_comment: Some(String::new()),
            comment: Some(String::new()),
            crop_horizontal: Some(crop.clone()),
            crop_vertical: Some(crop),
            ..StateDelta::default()
        });

        if !has_file {
            return future::ready(()).boxed_local();
        }

        let size = self.backend.image_size(&preview_url);
        let store = self.store.clone();
        let config = self.config.clone();
        async move {
            let Some((width, height)) = size.await else {
                log::warn!("could not determine image size of {preview_url}");
                return;
            };
            let mut store = store.borrow_mut();
            if store.state().preview_url != preview_url {
                log::debug!("discarding crop defaults for stale preview {preview_url}");
                return;
            }
            if let Some((horizontal, vertical)) = crop::fit_crop(
                width,
                height,
                config.safe_portrait_aspect,
                config.safe_landscape_aspect,
            ) {
                store.update_state(StateDelta {
                    crop_horizontal: Some(horizontal),
                    crop_vertical: Some(vertical),
                    ..StateDelta::default()
                });
            }
        }
        .boxed_local()
    }

    /// Upload the file retained in state, if any.
    pub fn upload_selected(&self) -> LocalBoxFuture<'static, ()> {
        let file = self.store.borrow().state().file.clone();
        match file {
            Some(file) => self.upload(file),
            None => {
                log::warn!("upload requested without a selected file");
                future::ready(()).boxed_local()
            }
        }
    }

    pub fn upload(&self, file: SelectedFile) -> LocalBoxFuture<'static, ()> {
        let ticket = self.uploads.get() + 1;
        self.uploads.set(ticket);
        let request = self.backend.post_file(&self.config.upload_endpoint, &file);

        self.update(StateDelta {
            phase: Some(Phase::Details),
            upload: Some(UploadPhase::InProgress),
            item_url: Some(None),
            file: Some(None),
            load_details: Some(LoadDetails::Ready),
            save_details: Some(SaveDetails::Initial),
            ..StateDelta::default()
        });

        let store = self.store.clone();
        let uploads = self.uploads.clone();
        async move {
            let result = request
                .await
                .and_then(HttpResponse::ensure_success)
                .and_then(HttpResponse::created_location);

            let mut store = store.borrow_mut();
            let current = store.state();
            if uploads.get() != ticket
                || current.item_url.is_some()
                || !current.upload.is_in_progress()
            {
                log::debug!("discarding stale result of upload #{ticket}");
                return;
            }

            let outcome = match result {
                Ok(location) => {
                    log::info!("uploaded to {location}");
                    store.update_state(StateDelta {
                        upload: Some(UploadPhase::Finished(UploadOutcome::Success)),
                        item_url: Some(Some(location)),
                        ..StateDelta::default()
                    });
                    return;
                }
                Err(err) => {
                    log::warn!("upload failed: {err}");
                    UploadOutcome::Failure(Failure::from(&err))
                }
            };
            store.update_state(StateDelta {
                upload: Some(UploadPhase::Finished(outcome)),
                ..StateDelta::default()
            });
        }
        .boxed_local()
    }

    // ─── Metadata ────────────────────────────────────────────────────────

    /// Save when something changed, otherwise close the item.
    pub fn submit_or_close(&self) -> LocalBoxFuture<'static, ()> {
        let changed = self.store.borrow().view_model().changed.any;
        if changed {
            self.submit_details()
        } else {
            self.reset();
            future::ready(()).boxed_local()
        }
    }

    pub fn submit_details(&self) -> LocalBoxFuture<'static, ()> {
        let (item_url, update, comment) = {
            let store = self.store.borrow();
            let state = store.state();
            let Some(item_url) = state.item_url.clone() else {
                log::warn!("submit requested before the item has a location");
                return future::ready(()).boxed_local();
            };
            (item_url, gather_details(state), state.comment.clone())
        };

        let body = match update.to_json() {
            Ok(body) => body,
            Err(err) => {
                log::error!("could not encode metadata: {err}");
                self.update(StateDelta {
                    save_details: Some(SaveDetails::Failed(Failure::from(
                        RequestError::MalformedBody(err.to_string()),
                    ))),
                    ..StateDelta::default()
                });
                return future::ready(()).boxed_local();
            }
        };
        let request = self.backend.post_json(&meta_url(&item_url), body);

        self.update(StateDelta {
            save_details: Some(SaveDetails::InProgress),
            ..StateDelta::default()
        });

        let store = self.store.clone();
        async move {
            let result = request.await.and_then(HttpResponse::ensure_success);

            let mut store = store.borrow_mut();
            if store.state().item_url.as_deref() != Some(item_url.as_str()) {
                log::debug!("discarding stale save result for {item_url}");
                return;
            }

            match result {
                Ok(_) => {
                    log::info!("saved metadata for {item_url}");
                    let sent = update.metadata;
                    store.update_state(StateDelta {
                        save_details: Some(SaveDetails::Succeeded),
                        saved_recipients: Some(sent.recipients.clone()),
                        recipients: Some(sent.recipients.clone()),
                        saved_comment: Some(comment.clone()),
                        comment: Some(comment),
                        crop_horizontal: Some(CropState::loaded(sent.horizontal())),
                        crop_vertical: Some(CropState::loaded(sent.vertical())),
                        ..StateDelta::default()
                    });
                }
                Err(err) => {
                    log::warn!("saving metadata for {item_url} failed: {err}");
                    store.update_state(StateDelta {
                        save_details: Some(SaveDetails::Failed(Failure::from(&err))),
                        ..StateDelta::default()
                    });
                }
            }
        }
        .boxed_local()
    }

    /// Open an existing item for editing: show `thumbnail` at once, swap to
    /// `full_resolution` on the next tick, and load its metadata.
    pub fn select_existing_image(
        &self,
        item_url: &str,
        thumbnail: &str,
        full_resolution: &str,
    ) -> LocalBoxFuture<'static, ()> {
        let request = self.backend.get(&meta_url(item_url));

        self.update(StateDelta {
            phase: Some(Phase::Details),
            upload: Some(UploadPhase::Finished(UploadOutcome::Success)),
            item_url: Some(Some(item_url.to_string())),
            file: Some(None),
            preview_url: Some(thumbnail.to_string()),
            load_details: Some(LoadDetails::Pending),
            save_details: Some(SaveDetails::Initial),
            saved_comment: Some(String::new()),
            comment: Some(String::new()),
            ..StateDelta::default()
        });

        let tick = self.backend.next_tick();
        let swap = {
            let store = self.store.clone();
            let item_url = item_url.to_string();
            let full_resolution = full_resolution.to_string();
            async move {
                tick.await;
                let mut store = store.borrow_mut();
                if store.state().item_url.as_deref() != Some(item_url.as_str()) {
                    return;
                }
                store.update_state(StateDelta {
                    preview_url: Some(full_resolution),
                    ..StateDelta::default()
                });
            }
        };

        let load = {
            let store = self.store.clone();
            let item_url = item_url.to_string();
            async move {
                let result = request
                    .await
                    .and_then(HttpResponse::ensure_success)
                    .and_then(|response| Metadata::parse(&response.body));

                let mut store = store.borrow_mut();
                if store.state().item_url.as_deref() != Some(item_url.as_str()) {
                    log::debug!("discarding stale metadata for {item_url}");
                    return;
                }

                match result {
                    Ok(metadata) => {
                        store.update_state(loaded_details(metadata));
                    }
                    Err(err) => {
                        log::warn!("loading metadata for {item_url} failed: {err}");
                        store.update_state(StateDelta {
                            load_details: Some(LoadDetails::Failed(Failure::from(&err))),
                            ..StateDelta::default()
                        });
                    }
                }
            }
        };

        future::join(swap, load).map(|_| ()).boxed_local()
    }
}

/// Metadata payload for the current form.
fn gather_details(state: &State) -> MetadataUpdate {
    let h: CropSpan = state.crop_horizontal.span();
    let v: CropSpan = state.crop_vertical.span();
    MetadataUpdate {
        metadata: Metadata {
            recipients: state.recipients.clone(),
            crop_left: h.start,
            crop_right: h.end,
            crop_top: v.start,
            crop_bottom: v.end,
        },
        send_email: state.send_email.then(|| EmailNotice {
            title: state.email_title.clone(),
            message: state.email_message.clone(),
        }),
    }
}

/// Both saved and live copies populated from the server.
fn loaded_details(metadata: Metadata) -> StateDelta {
    StateDelta {
        load_details: Some(LoadDetails::Ready),
        saved_recipients: Some(metadata.recipients.clone()),
        crop_horizontal: Some(CropState::loaded(metadata.horizontal())),
        crop_vertical: Some(CropState::loaded(metadata.vertical())),
        recipients: Some(metadata.recipients),
        ..StateDelta::default()
    }
}
