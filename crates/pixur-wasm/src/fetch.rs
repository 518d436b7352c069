//! Browser implementation of the action layer's `Backend`.

use futures::channel::oneshot;
use futures::future::{self, FutureExt, LocalBoxFuture};
use gloo_timers::future::TimeoutFuture;
use pixur_core::error::RequestError;
use pixur_core::state::SelectedFile;
use pixur_editor::actions::{Backend, HttpResponse};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    File, Headers, HtmlImageElement, Request, RequestCredentials, RequestInit, RequestRedirect,
    Response, Url,
};

pub struct WebBackend;

impl WebBackend {
    fn send(
        &self,
        method: &str,
        url: &str,
        body: Option<&JsValue>,
        content_type: Option<&str>,
    ) -> LocalBoxFuture<'static, Result<HttpResponse, RequestError>> {
        let request = match build_request(method, url, body, content_type) {
            Ok(request) => request,
            Err(err) => return future::ready(Err(connectivity(err))).boxed_local(),
        };
        fetch(request).boxed_local()
    }
}

fn connectivity(err: JsValue) -> RequestError {
    let detail = match err.dyn_ref::<js_sys::Error>() {
        Some(error) => String::from(error.message()),
        None => err.as_string().unwrap_or_else(|| format!("{err:?}")),
    };
    RequestError::Connectivity(detail)
}

fn build_request(
    method: &str,
    url: &str,
    body: Option<&JsValue>,
    content_type: Option<&str>,
) -> Result<Request, JsValue> {
    let init = RequestInit::new();
    init.set_method(method);
    init.set_credentials(RequestCredentials::SameOrigin);
    init.set_redirect(RequestRedirect::Follow);
    if let Some(body) = body {
        init.set_body(body);
    }
    if let Some(content_type) = content_type {
        let headers = Headers::new()?;
        headers.set("Content-Type", content_type)?;
        init.set_headers(&headers);
    }
    Request::new_with_str_and_init(url, &init)
}

/// A rejected fetch is a connectivity failure; any response, whatever its
/// status, is returned for the caller to validate.
async fn fetch(request: Request) -> Result<HttpResponse, RequestError> {
    let window = web_sys::window().ok_or_else(|| RequestError::Connectivity("no window".into()))?;
    let value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(connectivity)?;
    let response: Response = value
        .dyn_into()
        .map_err(|_| RequestError::MalformedBody("fetch did not yield a Response".into()))?;

    let location = response.headers().get("Location").ok().flatten();
    let body = match response.text() {
        Ok(promise) => JsFuture::from(promise)
            .await
            .map_err(connectivity)?
            .as_string()
            .unwrap_or_default(),
        Err(err) => return Err(connectivity(err)),
    };

    Ok(HttpResponse {
        status: response.status(),
        status_text: response.status_text(),
        location,
        body,
    })
}

impl Backend for WebBackend {
    fn object_url(&self, file: &SelectedFile) -> String {
        let Some(file) = file.downcast_ref::<File>() else {
            log::error!("{} is not a browser file", file.name());
            return String::new();
        };
        Url::create_object_url_with_blob(file).unwrap_or_else(|err| {
            log::warn!("could not create object URL: {err:?}");
            String::new()
        })
    }

    fn image_size(&self, url: &str) -> LocalBoxFuture<'static, Option<(f64, f64)>> {
        let img = match HtmlImageElement::new() {
            Ok(img) => img,
            Err(err) => {
                log::warn!("could not create image element: {err:?}");
                return future::ready(None).boxed_local();
            }
        };

        let (tx, rx) = oneshot::channel();
        let tx = Rc::new(RefCell::new(Some(tx)));

        let onload = {
            let tx = tx.clone();
            let img = img.clone();
            Closure::<dyn FnMut()>::new(move || {
                if let Some(tx) = tx.borrow_mut().take() {
                    let size = (f64::from(img.natural_width()), f64::from(img.natural_height()));
                    let _ = tx.send(Some(size));
                }
            })
        };
        let onerror = Closure::<dyn FnMut()>::new(move || {
            if let Some(tx) = tx.borrow_mut().take() {
                let _ = tx.send(None);
            }
        });
        img.set_onload(Some(onload.as_ref().unchecked_ref()));
        img.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        img.set_src(url);

        async move {
            let size = rx.await.ok().flatten();
            img.set_onload(None);
            img.set_onerror(None);
            drop((onload, onerror));
            size
        }
        .boxed_local()
    }

    fn post_file(
        &self,
        url: &str,
        file: &SelectedFile,
    ) -> LocalBoxFuture<'static, Result<HttpResponse, RequestError>> {
        let Some(file_handle) = file.downcast_ref::<File>() else {
            return future::ready(Err(RequestError::Connectivity(format!(
                "{} is not a browser file",
                file.name()
            ))))
            .boxed_local();
        };
        let body: &JsValue = file_handle.as_ref();
        self.send("POST", url, Some(body), None)
    }

    fn post_json(
        &self,
        url: &str,
        body: String,
    ) -> LocalBoxFuture<'static, Result<HttpResponse, RequestError>> {
        self.send(
            "POST",
            url,
            Some(&JsValue::from_str(&body)),
            Some("application/json"),
        )
    }

    fn get(&self, url: &str) -> LocalBoxFuture<'static, Result<HttpResponse, RequestError>> {
        self.send("GET", url, None, None)
    }

    fn next_tick(&self) -> LocalBoxFuture<'static, ()> {
        TimeoutFuture::new(0).boxed_local()
    }
}
