//! Crop reducer for one axis of the crop box.
//!
//! Each axis (horizontal, vertical) holds a normalized span `[start, end]`
//! within `[0, 1]` and is driven by drag gestures on one of three handles.
//! The reducer is pure: it takes the current sub-state and an action and
//! returns the next sub-state, or an error leaving the caller's state as is.
//!
//! Invariant after every successful transition: `0 <= start <= end <= 1`.

use thiserror::Error;

/// One of the two independent crop dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub const ALL: [Axis; 2] = [Axis::Horizontal, Axis::Vertical];

    /// Screen edge a handle's guide is anchored to.
    ///
    /// The start guide is positioned from the far edge (right/bottom) and
    /// the middle and end guides from the near edge (left/top).
    pub fn anchor_edge(self, handle: Handle) -> Edge {
        match (self, handle) {
            (Axis::Horizontal, Handle::Start) => Edge::Right,
            (Axis::Horizontal, Handle::Middle | Handle::End) => Edge::Left,
            (Axis::Vertical, Handle::Start) => Edge::Bottom,
            (Axis::Vertical, Handle::Middle | Handle::End) => Edge::Top,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Axis::Horizontal => "horizontal",
            Axis::Vertical => "vertical",
        }
    }
}

/// A draggable control bound to one edge or to the whole box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    Start,
    Middle,
    End,
}

impl Handle {
    pub const ALL: [Handle; 3] = [Handle::Start, Handle::Middle, Handle::End];
}

/// A side of an on-screen rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

impl Edge {
    /// CSS property name for offsetting from this edge.
    pub fn css_property(self) -> &'static str {
        match self {
            Edge::Left => "left",
            Edge::Right => "right",
            Edge::Top => "top",
            Edge::Bottom => "bottom",
        }
    }
}

/// A normalized `[start, end]` pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropSpan {
    pub start: f64,
    pub end: f64,
}

impl CropSpan {
    /// Centered, zero-width.
    pub const CENTER: CropSpan = CropSpan::new(0.5, 0.5);

    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }

    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

/// Drag actions routed to one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CropAction {
    /// A handle was grabbed.
    DragStart {
        /// Offset from the pointer to the grabbed handle's anchor edge.
        delta: f64,
        /// Image position on screen along this axis.
        image_origin: f64,
        /// Image size on screen along this axis.
        image_extent: f64,
        handle: Handle,
    },
    /// Pointer moved to an absolute screen coordinate along this axis.
    DragMove { pointer_pos: f64 },
    /// Gesture ended normally; the current span is committed.
    DragStop,
    /// Gesture was interrupted; the span reverts to the drag-start snapshot.
    DragCancel,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CropError {
    #[error("drag move with no active handle")]
    NotDragging,

    #[error("drag start on {requested:?} while {active:?} is already active")]
    AlreadyDragging { active: Handle, requested: Handle },

    #[error("image extent must be positive, got {0}")]
    DegenerateImage(f64),

    #[error("non-finite pointer coordinate {0}")]
    NonFinite(f64),
}

/// Geometry captured when a drag starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragGeometry {
    pub delta: f64,
    pub image_origin: f64,
    pub image_extent: f64,
}

/// Crop sub-state for one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct CropState {
    pub start: f64,
    pub end: f64,
    /// Handle being dragged, if any.
    pub dragging: Option<Handle>,
    /// Span at drag start, restored by `DragCancel`.
    pub initial: CropSpan,
    pub geometry: DragGeometry,
    /// Last persisted span; `None` until the item has been saved or loaded.
    pub saved: Option<CropSpan>,
}

impl Default for CropState {
    fn default() -> Self {
        Self::placeholder()
    }
}

impl CropState {
    /// Centered zero-width span used until real values are known.
    pub fn placeholder() -> Self {
        Self::with_span(CropSpan::CENTER, None)
    }

    pub fn with_span(span: CropSpan, saved: Option<CropSpan>) -> Self {
        Self {
            start: span.start,
            end: span.end,
            dragging: None,
            initial: span,
            geometry: DragGeometry {
                delta: 0.0,
                image_origin: 0.0,
                image_extent: 1.0,
            },
            saved,
        }
    }

    /// Span known to be persisted: live and saved copies are equal.
    pub fn loaded(span: CropSpan) -> Self {
        Self::with_span(span, Some(span))
    }

    pub fn span(&self) -> CropSpan {
        CropSpan::new(self.start, self.end)
    }

    /// Whether the live span differs from the saved one. Never saved counts
    /// as changed.
    pub fn changed(&self) -> bool {
        match self.saved {
            Some(saved) => saved.start != self.start || saved.end != self.end,
            None => true,
        }
    }

    pub fn reduce(&self, action: &CropAction) -> Result<CropState, CropError> {
        match *action {
            CropAction::DragStart {
                delta,
                image_origin,
                image_extent,
                handle,
            } => {
                if let Some(active) = self.dragging {
                    return Err(CropError::AlreadyDragging {
                        active,
                        requested: handle,
                    });
                }
                if !(image_extent.is_finite() && image_extent > 0.0) {
                    return Err(CropError::DegenerateImage(image_extent));
                }
                for value in [delta, image_origin] {
                    if !value.is_finite() {
                        return Err(CropError::NonFinite(value));
                    }
                }
                Ok(CropState {
                    dragging: Some(handle),
                    initial: self.span(),
                    geometry: DragGeometry {
                        delta,
                        image_origin,
                        image_extent,
                    },
                    ..self.clone()
                })
            }

            CropAction::DragMove { pointer_pos } => {
                let handle = self.dragging.ok_or(CropError::NotDragging)?;
                if !pointer_pos.is_finite() {
                    return Err(CropError::NonFinite(pointer_pos));
                }
                let g = &self.geometry;
                let pos =
                    ((pointer_pos + g.delta - g.image_origin) / g.image_extent).clamp(0.0, 1.0);

                let (start, end) = match handle {
                    Handle::Start => (pos, self.initial.end.max(pos)),
                    Handle::End => (self.initial.start.min(pos), pos),
                    Handle::Middle => {
                        let half_width = (self.initial.width() / 2.0).min(pos).min(1.0 - pos);
                        (pos - half_width, pos + half_width)
                    }
                };

                Ok(CropState {
                    start,
                    end,
                    ..self.clone()
                })
            }

            CropAction::DragStop => Ok(CropState {
                dragging: None,
                ..self.clone()
            }),

            CropAction::DragCancel => {
                if self.dragging.is_none() {
                    return Ok(self.clone());
                }
                Ok(CropState {
                    start: self.initial.start,
                    end: self.initial.end,
                    dragging: None,
                    ..self.clone()
                })
            }
        }
    }
}

/// Largest centered crop whose aspect ratio fits the safe display bounds.
///
/// `safe_portrait` bounds the width on tall screens and `safe_landscape`
/// bounds the height on wide ones. Returns `(horizontal, vertical)` with no
/// saved values.
pub fn fit_crop(
    image_width: f64,
    image_height: f64,
    safe_portrait: f64,
    safe_landscape: f64,
) -> Option<(CropState, CropState)> {
    if !(image_width > 0.0 && image_height > 0.0) {
        return None;
    }
    let aspect = image_width / image_height;
    let half_width = (safe_portrait / aspect).min(1.0) / 2.0;
    let half_height = (safe_landscape * aspect).min(1.0) / 2.0;

    Some((
        CropState::with_span(CropSpan::new(0.5 - half_width, 0.5 + half_width), None),
        CropState::with_span(CropSpan::new(0.5 - half_height, 0.5 + half_height), None),
    ))
}
