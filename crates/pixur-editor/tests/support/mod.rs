//! Shared fixtures for the editor integration tests: a scripted backend
//! whose requests stay pending until the test answers them, and a DOM sink
//! that records every patch.

#![allow(dead_code)]

use futures::channel::oneshot;
use futures::executor::LocalPool;
use futures::future::{self, FutureExt, LocalBoxFuture};
use futures::task::LocalSpawnExt;
use pixur_core::config::IngestConfig;
use pixur_core::error::RequestError;
use pixur_core::state::{FormDefaults, SelectedFile, State};
use pixur_editor::actions::{Actions, Backend, HttpResponse};
use pixur_editor::render::{DomPatch, DomSink};
use pixur_editor::store::Store;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ─── DOM spy ─────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct Spy(Rc<RefCell<Vec<DomPatch>>>);

impl Spy {
    pub fn take(&self) -> Vec<DomPatch> {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

impl DomSink for Spy {
    fn apply(&mut self, patch: &DomPatch) {
        self.0.borrow_mut().push(patch.clone());
    }
}

// ─── Scripted backend ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Sent {
    pub method: &'static str,
    pub url: String,
    pub body: Option<String>,
}

type Reply = Result<HttpResponse, RequestError>;

#[derive(Default)]
struct Inner {
    sent: Vec<Sent>,
    pending: Vec<(String, oneshot::Sender<Reply>)>,
    sizes: HashMap<String, (f64, f64)>,
}

#[derive(Clone, Default)]
pub struct FakeBackend(Rc<RefCell<Inner>>);

impl FakeBackend {
    pub fn with_image_size(self, url: &str, width: f64, height: f64) -> Self {
        self.0.borrow_mut().sizes.insert(url.to_string(), (width, height));
        self
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.0.borrow().sent.clone()
    }

    /// Complete the oldest pending request to `url`.
    pub fn respond(&self, url: &str, reply: Reply) {
        let sender = {
            let mut inner = self.0.borrow_mut();
            let index = inner
                .pending
                .iter()
                .position(|(pending, _)| pending == url)
                .unwrap_or_else(|| panic!("no pending request to {url}"));
            inner.pending.remove(index).1
        };
        sender.send(reply).unwrap();
    }

    fn request(
        &self,
        method: &'static str,
        url: &str,
        body: Option<String>,
    ) -> LocalBoxFuture<'static, Reply> {
        let (tx, rx) = oneshot::channel();
        let mut inner = self.0.borrow_mut();
        inner.sent.push(Sent {
            method,
            url: url.to_string(),
            body,
        });
        inner.pending.push((url.to_string(), tx));
        rx.map(|reply| {
            reply.unwrap_or_else(|_| Err(RequestError::Connectivity("request dropped".into())))
        })
        .boxed_local()
    }
}

impl Backend for FakeBackend {
    fn object_url(&self, file: &SelectedFile) -> String {
        format!("blob:{}", file.name())
    }

    fn image_size(&self, url: &str) -> LocalBoxFuture<'static, Option<(f64, f64)>> {
        future::ready(self.0.borrow().sizes.get(url).copied()).boxed_local()
    }

    fn post_file(&self, url: &str, file: &SelectedFile) -> LocalBoxFuture<'static, Reply> {
        self.request("POST", url, Some(file.name().to_string()))
    }

    fn post_json(&self, url: &str, body: String) -> LocalBoxFuture<'static, Reply> {
        self.request("POST", url, Some(body))
    }

    fn get(&self, url: &str) -> LocalBoxFuture<'static, Reply> {
        self.request("GET", url, None)
    }

    fn next_tick(&self) -> LocalBoxFuture<'static, ()> {
        future::ready(()).boxed_local()
    }
}

pub fn created(location: &str) -> Reply {
    Ok(HttpResponse {
        status: 201,
        status_text: "Created".into(),
        location: Some(location.to_string()),
        body: String::new(),
    })
}

pub fn ok_json(body: &str) -> Reply {
    Ok(HttpResponse {
        status: 200,
        status_text: "OK".into(),
        location: None,
        body: body.to_string(),
    })
}

pub fn status(status: u16, status_text: &str) -> Reply {
    Ok(HttpResponse {
        status,
        status_text: status_text.to_string(),
        location: None,
        body: String::new(),
    })
}

// ─── Harness ─────────────────────────────────────────────────────────────

pub struct Harness {
    pub actions: Actions<FakeBackend>,
    pub backend: FakeBackend,
    pub spy: Spy,
    pool: LocalPool,
}

impl Harness {
    pub fn new(backend: FakeBackend) -> Self {
        init_logger();
        let spy = Spy::default();
        let store = Store::new(
            State::initial(&FormDefaults::default()),
            Box::new(spy.clone()),
        )
        .shared();
        let actions = Actions::new(store, backend.clone(), IngestConfig::default());
        Self {
            actions,
            backend,
            spy,
            pool: LocalPool::new(),
        }
    }

    pub fn spawn(&mut self, task: LocalBoxFuture<'static, ()>) {
        self.pool.spawner().spawn_local(task).unwrap();
        self.pool.run_until_stalled();
    }

    /// Let pending continuations observe newly answered requests.
    pub fn settle(&mut self) {
        self.pool.run_until_stalled();
    }

    pub fn state(&self) -> State {
        self.actions.store().borrow().state().clone()
    }
}

pub fn file(name: &str) -> SelectedFile {
    SelectedFile::new(name, 2048, ())
}
