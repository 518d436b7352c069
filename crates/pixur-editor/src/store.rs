//! Application state store.
//!
//! Holds the canonical state and the view model derived from it. Every
//! change goes through `set_state`, which derives the next view model,
//! renders the difference against the previous one, and then keeps the new
//! pair as "previous" for the next cycle.

use crate::render::{DomSink, render};
use pixur_core::crop::{Axis, CropAction, CropError};
use pixur_core::state::{State, StateDelta};
use pixur_core::view_model::ViewModel;
use std::cell::RefCell;
use std::rc::Rc;

/// The store as shared between the action layer and input bindings.
pub type SharedStore = Rc<RefCell<Store>>;

pub struct Store {
    initial: State,
    state: State,
    view: ViewModel,
    dom: Box<dyn DomSink>,
}

impl Store {
    /// Create a store whose page already shows `initial`.
    pub fn new(initial: State, dom: Box<dyn DomSink>) -> Self {
        let view = ViewModel::derive(&initial);
        Self {
            state: initial.clone(),
            initial,
            view,
            dom,
        }
    }

    pub fn shared(self) -> SharedStore {
        Rc::new(RefCell::new(self))
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn view_model(&self) -> &ViewModel {
        &self.view
    }

    /// Shallow-merge `delta` over the current state and re-render.
    pub fn update_state(&mut self, delta: StateDelta) {
        let next = self.state.merge(delta);
        self.set_state(next);
    }

    /// Route a crop action to one axis and re-render. An invalid transition
    /// is logged and leaves the state untouched.
    pub fn dispatch(&mut self, axis: Axis, action: CropAction) -> Result<(), CropError> {
        match self.state.crop(axis).reduce(&action) {
            Ok(crop) => {
                let next = self.state.with_crop(axis, crop);
                self.set_state(next);
                Ok(())
            }
            Err(err) => {
                log::error!("{} crop: {err}", axis.name());
                Err(err)
            }
        }
    }

    /// Back to the state captured at page load.
    pub fn reset(&mut self) {
        self.set_state(self.initial.clone());
    }

    fn set_state(&mut self, next: State) {
        let view = ViewModel::derive(&next);
        log::debug!("view model: {view:?}");

        for patch in render(&self.view, &view) {
            self.dom.apply(&patch);
        }

        self.state = next;
        self.view = view;
    }
}
