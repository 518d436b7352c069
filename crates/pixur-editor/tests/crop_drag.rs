//! Integration tests: pointer gestures through the drag adapter into the
//! crop reducer (pixur-editor).

mod support;

use pixur_core::crop::{Axis, CropError, CropSpan, CropState, Handle};
use pixur_core::state::{FormDefaults, State, StateDelta};
use pixur_editor::input::{DragAdapter, PointerInput, PointerSource};
use pixur_editor::store::Store;
use support::Spy;

const ORIGIN: f64 = 100.0;
const EXTENT: f64 = 400.0;

fn store(span: CropSpan) -> Store {
    support::init_logger();
    Store::new(
        State::initial(&FormDefaults::default()).merge(StateDelta {
            crop_horizontal: Some(CropState::loaded(span)),
            ..StateDelta::default()
        }),
        Box::new(Spy::default()),
    )
}

/// Feed one pointer event through the adapter into the store.
fn feed(store: &mut Store, adapter: &mut DragAdapter, input: PointerInput) {
    if let Some(action) = adapter.handle(&input) {
        store.dispatch(adapter.axis(), action).unwrap();
    }
}

fn grab(handle: Handle, source: PointerSource, edge_pos: f64) -> PointerInput {
    PointerInput::Down {
        source,
        handle,
        pos: edge_pos,
        edge_pos,
        image_origin: ORIGIN,
        image_extent: EXTENT,
        disabled: false,
    }
}

/// Pointer positions sweeping well past both image edges.
fn sweep() -> impl Iterator<Item = f64> {
    (-20..=60).map(|step| f64::from(step) * 10.0)
}

// ─── Invariants over a sweep ────────────────────────────────────────────

#[test]
fn span_stays_ordered_for_every_handle() {
    for handle in Handle::ALL {
        let mut store = store(CropSpan::new(0.3, 0.6));
        let mut adapter = DragAdapter::new(Axis::Horizontal);
        feed(&mut store, &mut adapter, grab(handle, PointerSource::Mouse, 220.0));

        for pos in sweep() {
            feed(
                &mut store,
                &mut adapter,
                PointerInput::Move {
                    source: PointerSource::Mouse,
                    pos,
                },
            );
            let crop = &store.state().crop_horizontal;
            assert!(
                0.0 <= crop.start && crop.start <= crop.end && crop.end <= 1.0,
                "{handle:?} at {pos}: {} .. {}",
                crop.start,
                crop.end
            );
        }
    }
}

#[test]
fn middle_drag_never_grows_the_box() {
    let mut store = store(CropSpan::new(0.3, 0.6));
    let mut adapter = DragAdapter::new(Axis::Horizontal);
    feed(&mut store, &mut adapter, grab(Handle::Middle, PointerSource::Touch, 280.0));

    for pos in sweep() {
        feed(
            &mut store,
            &mut adapter,
            PointerInput::Move {
                source: PointerSource::Touch,
                pos,
            },
        );
        let span = store.state().crop_horizontal.span();
        assert!(span.width() <= 0.3 + 1e-12, "grew to {} at {pos}", span.width());

        // Wherever the whole box fits, it keeps its width exactly.
        let center = (pos - ORIGIN) / EXTENT;
        if (0.15..=0.85).contains(&center) {
            assert!(
                (span.width() - 0.3).abs() < 1e-9,
                "width {} at {pos}",
                span.width()
            );
            assert!((span.start + span.end - 2.0 * center).abs() < 1e-9);
        }
    }
}

// ─── Gestures ───────────────────────────────────────────────────────────

#[test]
fn touch_cancel_restores_span() {
    let mut store = store(CropSpan::new(0.25, 0.75));
    let mut adapter = DragAdapter::new(Axis::Horizontal);
    feed(&mut store, &mut adapter, grab(Handle::End, PointerSource::Touch, 400.0));
    feed(
        &mut store,
        &mut adapter,
        PointerInput::Move {
            source: PointerSource::Touch,
            pos: 300.0,
        },
    );
    assert_eq!(store.state().crop_horizontal.end, 0.5);

    feed(
        &mut store,
        &mut adapter,
        PointerInput::Cancel {
            source: PointerSource::Touch,
        },
    );
    let crop = &store.state().crop_horizontal;
    assert_eq!(crop.span(), CropSpan::new(0.25, 0.75));
    assert_eq!(crop.dragging, None);
    assert!(!crop.changed());
}

#[test]
fn grab_offset_keeps_handle_under_pointer() {
    let mut store = store(CropSpan::new(0.25, 0.75));
    let mut adapter = DragAdapter::new(Axis::Horizontal);
    // Grab the start handle 10px right of its edge at 200.
    feed(
        &mut store,
        &mut adapter,
        PointerInput::Down {
            source: PointerSource::Mouse,
            handle: Handle::Start,
            pos: 210.0,
            edge_pos: 200.0,
            image_origin: ORIGIN,
            image_extent: EXTENT,
            disabled: false,
        },
    );
    feed(
        &mut store,
        &mut adapter,
        PointerInput::Move {
            source: PointerSource::Mouse,
            pos: 210.0,
        },
    );
    assert_eq!(store.state().crop_horizontal.start, 0.25);
}

#[test]
fn foreign_device_cannot_end_gesture() {
    let mut store = store(CropSpan::new(0.25, 0.75));
    let mut adapter = DragAdapter::new(Axis::Horizontal);
    feed(&mut store, &mut adapter, grab(Handle::End, PointerSource::Mouse, 400.0));
    feed(
        &mut store,
        &mut adapter,
        PointerInput::Up {
            source: PointerSource::Touch,
        },
    );
    assert_eq!(store.state().crop_horizontal.dragging, Some(Handle::End));

    feed(
        &mut store,
        &mut adapter,
        PointerInput::Up {
            source: PointerSource::Mouse,
        },
    );
    assert_eq!(store.state().crop_horizontal.dragging, None);
}

#[test]
fn disabled_handle_is_inert() {
    let mut store = store(CropSpan::new(0.25, 0.75));
    let mut adapter = DragAdapter::new(Axis::Horizontal);
    feed(
        &mut store,
        &mut adapter,
        PointerInput::Down {
            source: PointerSource::Mouse,
            handle: Handle::Start,
            pos: 200.0,
            edge_pos: 200.0,
            image_origin: ORIGIN,
            image_extent: EXTENT,
            disabled: true,
        },
    );
    assert_eq!(adapter.active_handle(), None);
    assert_eq!(store.state().crop_horizontal.dragging, None);
}

#[test]
fn refused_start_does_not_leave_a_gesture_behind() {
    let mut store = store(CropSpan::new(0.25, 0.75));
    let mut adapter = DragAdapter::new(Axis::Horizontal);

    let start = adapter
        .handle(&PointerInput::Down {
            source: PointerSource::Mouse,
            handle: Handle::End,
            pos: 300.0,
            edge_pos: 300.0,
            image_origin: ORIGIN,
            image_extent: 0.0,
            disabled: false,
        })
        .unwrap();
    assert_eq!(
        store.dispatch(Axis::Horizontal, start),
        Err(CropError::DegenerateImage(0.0))
    );
    assert!(adapter.rejected(&start));

    let moved = adapter.handle(&PointerInput::Move {
        source: PointerSource::Mouse,
        pos: 320.0,
    });
    assert_eq!(moved, None);
    assert_eq!(store.state().crop_horizontal.dragging, None);
    assert_eq!(
        store.state().crop_horizontal.span(),
        CropSpan::new(0.25, 0.75)
    );
}
