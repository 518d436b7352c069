//! Drag input adapter.
//!
//! Normalizes mouse and touch pointer events on the crop handles of one axis
//! into `CropAction`s. One adapter runs per axis; only one handle of an axis
//! can be active at a time, and only the device that started a gesture can
//! move, stop, or cancel it.

use pixur_core::crop::{Axis, CropAction, Handle};

/// Device a gesture came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSource {
    Mouse,
    Touch,
}

/// A pointer event, already projected onto the adapter's axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    /// Mouse down or touch start on a handle.
    Down {
        source: PointerSource,
        handle: Handle,
        /// Pointer coordinate along the axis.
        pos: f64,
        /// Current screen coordinate of the grabbed handle's anchor edge.
        edge_pos: f64,
        image_origin: f64,
        image_extent: f64,
        /// The handle carries the `disabled` attribute.
        disabled: bool,
    },
    /// Mouse move or touch move anywhere on the page.
    Move { source: PointerSource, pos: f64 },
    /// Mouse up or touch end.
    Up { source: PointerSource },
    /// Touch cancel (platform interrupted the gesture).
    Cancel { source: PointerSource },
}

/// Per-axis gesture tracker.
#[derive(Debug)]
pub struct DragAdapter {
    axis: Axis,
    active: Option<(Handle, PointerSource)>,
}

impl DragAdapter {
    pub fn new(axis: Axis) -> Self {
        Self { axis, active: None }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Device of the gesture in progress, if any.
    pub fn active_source(&self) -> Option<PointerSource> {
        self.active.map(|(_, source)| source)
    }

    pub fn active_handle(&self) -> Option<Handle> {
        self.active.map(|(handle, _)| handle)
    }

    /// Translate one pointer event into at most one crop action.
    pub fn handle(&mut self, input: &PointerInput) -> Option<CropAction> {
        match *input {
            PointerInput::Down {
                source,
                handle,
                pos,
                edge_pos,
                image_origin,
                image_extent,
                disabled,
            } => {
                if disabled {
                    return None;
                }
                if let Some((active, _)) = self.active {
                    log::debug!(
                        "{} crop: ignoring {handle:?} grab while {active:?} is dragged",
                        self.axis.name()
                    );
                    return None;
                }
                self.active = Some((handle, source));
                Some(CropAction::DragStart {
                    delta: edge_pos - pos,
                    image_origin,
                    image_extent,
                    handle,
                })
            }
            PointerInput::Move { source, pos } => {
                self.owns(source)?;
                Some(CropAction::DragMove { pointer_pos: pos })
            }
            PointerInput::Up { source } => {
                self.owns(source)?;
                self.active = None;
                Some(CropAction::DragStop)
            }
            PointerInput::Cancel { source } => {
                self.owns(source)?;
                self.active = None;
                Some(CropAction::DragCancel)
            }
        }
    }

    /// The store refused `action`. A refused `DragStart` never became a
    /// gesture, so the adapter lets go of it. Returns whether a gesture was
    /// dropped.
    pub fn rejected(&mut self, action: &CropAction) -> bool {
        match action {
            CropAction::DragStart { handle, .. } if self.active_handle() == Some(*handle) => {
                self.active = None;
                true
            }
            _ => false,
        }
    }

    fn owns(&self, source: PointerSource) -> Option<()> {
        match self.active {
            Some((_, active)) if active == source => Some(()),
            _ => None,
        }
    }
}
