//! Pointer wiring for one crop axis.
//!
//! Handles listen for mouse down and touch start. Window-level move, release
//! and cancel listeners are created once per axis and attached only while a
//! gesture is in progress.

use crate::dom::{query, selector};
use crate::fetch::WebBackend;
use pixur_core::crop::{Axis, CropAction, Edge, Handle};
use pixur_editor::actions::Actions;
use pixur_editor::input::{DragAdapter, PointerInput, PointerSource};
use pixur_editor::render::Node;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;
use web_sys::{Document, DomRect, Element, Event, MouseEvent, TouchEvent, Window};

type Listener = Closure<dyn FnMut(Event)>;

pub struct AxisDrag {
    axis: Axis,
    adapter: RefCell<DragAdapter>,
    actions: Actions<WebBackend>,
    window: Window,
    image: Element,
    /// Indexed by `Handle as usize`.
    guides: [Element; 3],
    handles: [Element; 3],
    grab: Vec<(Handle, &'static str, Listener)>,
    mouse_move: Listener,
    mouse_up: Listener,
    touch_move: Listener,
    touch_end: Listener,
    touch_cancel: Listener,
}

fn image_selector(axis: Axis) -> &'static str {
    match axis {
        Axis::Horizontal => ".cropping--image__horizontal",
        Axis::Vertical => ".cropping--image__vertical",
    }
}

/// Coordinate of a pointer along `axis`.
fn mouse_pos(axis: Axis, ev: &MouseEvent) -> f64 {
    f64::from(match axis {
        Axis::Horizontal => ev.client_x(),
        Axis::Vertical => ev.client_y(),
    })
}

fn touch_pos(axis: Axis, ev: &TouchEvent) -> Option<f64> {
    let touch = ev.touches().get(0)?;
    Some(f64::from(match axis {
        Axis::Horizontal => touch.client_x(),
        Axis::Vertical => touch.client_y(),
    }))
}

fn rect_edge(rect: &DomRect, edge: Edge) -> f64 {
    match edge {
        Edge::Left => rect.left(),
        Edge::Right => rect.right(),
        Edge::Top => rect.top(),
        Edge::Bottom => rect.bottom(),
    }
}

/// Window listener forwarding to the axis while it is alive.
fn forward(this: &Weak<AxisDrag>, on_event: fn(&AxisDrag, Event)) -> Listener {
    let this = this.clone();
    Closure::<dyn FnMut(Event)>::new(move |ev: Event| {
        if let Some(drag) = this.upgrade() {
            on_event(&drag, ev);
        }
    })
}

impl AxisDrag {
    pub fn bind(
        document: &Document,
        actions: Actions<WebBackend>,
        axis: Axis,
    ) -> Result<Rc<Self>, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let image: Element = query(document, image_selector(axis))?;
        let lookup = |node: fn(Axis, Handle) -> Node| -> Result<[Element; 3], JsValue> {
            Ok([
                query(document, selector(node(axis, Handle::Start)))?,
                query(document, selector(node(axis, Handle::Middle)))?,
                query(document, selector(node(axis, Handle::End)))?,
            ])
        };
        let guides = lookup(Node::CropGuide)?;
        let handles = lookup(Node::CropHandle)?;

        let drag = Rc::new_cyclic(|this: &Weak<AxisDrag>| {
            let mut grab = Vec::new();
            for handle in Handle::ALL {
                for (event, source) in [
                    ("mousedown", PointerSource::Mouse),
                    ("touchstart", PointerSource::Touch),
                ] {
                    let this = this.clone();
                    let listener = Closure::<dyn FnMut(Event)>::new(move |ev: Event| {
                        if let Some(drag) = this.upgrade() {
                            drag.on_down(handle, source, ev);
                        }
                    });
                    grab.push((handle, event, listener));
                }
            }

            AxisDrag {
                axis,
                adapter: RefCell::new(DragAdapter::new(axis)),
                actions,
                window,
                image,
                guides,
                handles,
                grab,
                mouse_move: forward(this, |drag, ev| {
                    if let Some(ev) = ev.dyn_ref::<MouseEvent>() {
                        drag.feed(PointerInput::Move {
                            source: PointerSource::Mouse,
                            pos: mouse_pos(drag.axis, ev),
                        });
                    }
                }),
                mouse_up: forward(this, |drag, _| {
                    drag.feed(PointerInput::Up {
                        source: PointerSource::Mouse,
                    });
                }),
                touch_move: forward(this, |drag, ev| {
                    if let Some(pos) = ev
                        .dyn_ref::<TouchEvent>()
                        .and_then(|ev| touch_pos(drag.axis, ev))
                    {
                        drag.feed(PointerInput::Move {
                            source: PointerSource::Touch,
                            pos,
                        });
                    }
                }),
                touch_end: forward(this, |drag, _| {
                    drag.feed(PointerInput::Up {
                        source: PointerSource::Touch,
                    });
                }),
                touch_cancel: forward(this, |drag, _| {
                    drag.feed(PointerInput::Cancel {
                        source: PointerSource::Touch,
                    });
                }),
            }
        });

        for (handle, event, listener) in &drag.grab {
            drag.handle_element(*handle)
                .add_event_listener_with_callback(event, listener.as_ref().unchecked_ref())?;
        }
        Ok(drag)
    }

    fn handle_element(&self, handle: Handle) -> &Element {
        &self.handles[handle as usize]
    }

    fn guide_element(&self, handle: Handle) -> &Element {
        &self.guides[handle as usize]
    }

    fn on_down(&self, handle: Handle, source: PointerSource, ev: Event) {
        let pos = match source {
            PointerSource::Mouse => ev.dyn_ref::<MouseEvent>().map(|ev| mouse_pos(self.axis, ev)),
            PointerSource::Touch => ev
                .dyn_ref::<TouchEvent>()
                .and_then(|ev| touch_pos(self.axis, ev)),
        };
        let Some(pos) = pos else {
            return;
        };

        let guide = self.guide_element(handle).get_bounding_client_rect();
        let image = self.image.get_bounding_client_rect();
        let (image_origin, image_extent) = match self.axis {
            Axis::Horizontal => (image.left(), image.width()),
            Axis::Vertical => (image.top(), image.height()),
        };

        let started = self.feed(PointerInput::Down {
            source,
            handle,
            pos,
            edge_pos: rect_edge(&guide, self.axis.anchor_edge(handle)),
            image_origin,
            image_extent,
            disabled: self.handle_element(handle).has_attribute("disabled"),
        });
        if started {
            ev.prevent_default();
            ev.stop_propagation();
        }
    }

    /// Run one pointer event through the adapter. Returns whether it
    /// produced a crop action.
    fn feed(&self, input: PointerInput) -> bool {
        let action = self.adapter.borrow_mut().handle(&input);
        let Some(action) = action else {
            return false;
        };

        let result = match action {
            CropAction::DragStart { .. } => match input {
                PointerInput::Down { source, .. } => self.attach(source),
                _ => Ok(()),
            },
            CropAction::DragStop | CropAction::DragCancel => self.detach(),
            CropAction::DragMove { .. } => Ok(()),
        };
        if let Err(err) = result {
            log::error!("{} crop: listener update failed: {err:?}", self.axis.name());
        }

        // Rejected transitions are logged by the store.
        if self.actions.dispatch_crop(self.axis, action).is_err()
            && self.adapter.borrow_mut().rejected(&action)
        {
            if let Err(err) = self.detach() {
                log::error!("{} crop: listener update failed: {err:?}", self.axis.name());
            }
            return false;
        }
        true
    }

    fn window_listeners(&self, source: PointerSource) -> Vec<(&'static str, &Listener)> {
        match source {
            PointerSource::Mouse => vec![
                ("mousemove", &self.mouse_move),
                ("mouseup", &self.mouse_up),
            ],
            PointerSource::Touch => vec![
                ("touchmove", &self.touch_move),
                ("touchend", &self.touch_end),
                ("touchcancel", &self.touch_cancel),
            ],
        }
    }

    fn attach(&self, source: PointerSource) -> Result<(), JsValue> {
        for (event, listener) in self.window_listeners(source) {
            self.window
                .add_event_listener_with_callback(event, listener.as_ref().unchecked_ref())?;
        }
        Ok(())
    }

    fn detach(&self) -> Result<(), JsValue> {
        for source in [PointerSource::Mouse, PointerSource::Touch] {
            for (event, listener) in self.window_listeners(source) {
                self.window
                    .remove_event_listener_with_callback(event, listener.as_ref().unchecked_ref())?;
            }
        }
        Ok(())
    }
}
