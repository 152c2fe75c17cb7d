// Copyright 2025 the View Layout Authors
// SPDX-License-Identifier: Apache-2.0

//! Tests for the load, layout and resize cycle of a [`ViewHost`].

use kurbo::{Point, Size};
use view_delegate::testing::{NativeWrite, RecordingView};
use view_delegate::view_layout::LayoutRect;
use view_delegate::{DefaultSize, Dimension, ViewEvent, ViewHost, ViewId, assert_debug_panics};

struct Fixture {
    host: ViewHost<RecordingView>,
    window: ViewId,
    window_view: RecordingView,
}

fn window(size: Size) -> Fixture {
    let _ = view_delegate::tracing_backend::try_init_test_tracing();
    let mut host = ViewHost::new();
    let window = host.create_delegate("window", DefaultSize::FILL);
    let window_view = RecordingView::panel();
    host.bind(window, window_view.clone());
    host.set_root_bounds(window, size);
    Fixture {
        host,
        window,
        window_view,
    }
}

#[test]
fn load_lays_out_children() {
    let Fixture {
        mut host,
        window,
        window_view,
    } = window(Size::new(300., 200.));
    let box_id = host.create_delegate("box", DefaultSize::default());
    let box_view = RecordingView::control();
    host.bind(box_id, box_view.clone());
    host.set_left(box_id, "10");
    host.set_top(box_id, "20");
    host.set_width(box_id, "50%");
    host.set_height(box_id, "40");
    host.add(window, box_id);

    assert_eq!(window_view.recorded().children, [box_view.serial()]);
    assert!(box_view.geometry_writes().is_empty());

    host.on_native_loaded(window);
    assert_eq!(
        box_view.geometry_writes(),
        [
            NativeWrite::Width(150.),
            NativeWrite::Height(40.),
            NativeWrite::CanvasPosition(Point::new(10., 20.)),
        ]
    );
    assert_eq!(
        host.rect(box_id),
        Dimension {
            x: 10,
            y: 20,
            width: 150,
            height: 40
        }
    );
    assert_eq!(
        host.size(box_id),
        Dimension {
            x: 0,
            y: 0,
            width: 150,
            height: 40
        }
    );
}

#[test]
fn repeated_layout_writes_nothing_new() {
    let Fixture { mut host, window, .. } = window(Size::new(300., 200.));
    let child = host.create_delegate("child", DefaultSize::default());
    let view = RecordingView::control();
    host.bind(child, view.clone());
    host.set_width(child, "100");
    host.set_height(child, "100");
    host.add(window, child);
    host.on_native_loaded(window);
    assert_eq!(view.geometry_writes().len(), 3);

    view.clear_writes();
    host.request_layout(window, false);
    host.request_layout(child, true);
    assert!(view.geometry_writes().is_empty());
}

#[test]
fn content_sized_view_follows_native_size() {
    let Fixture { mut host, window, .. } = window(Size::new(300., 200.));
    let label = host.create_delegate("label", DefaultSize::SIZE);
    let view = RecordingView::control();
    host.bind(label, view.clone());
    host.add(window, label);
    host.on_native_loaded(window);
    host.on_native_loaded(label);

    // The content size is not known yet.
    assert!(view.geometry_writes().is_empty());

    host.enable_event(label, "postlayout").unwrap();
    host.on_native_size_changed(label, Size::new(80., 20.));
    assert_eq!(
        view.geometry_writes(),
        [
            NativeWrite::Width(80.),
            NativeWrite::Height(20.),
            NativeWrite::CanvasPosition(Point::new(110., 90.)),
        ]
    );
    assert_eq!(host.take_events(), [ViewEvent::PostLayout { source: label }]);
}

#[test]
fn height_set_before_bind_is_kept() {
    let Fixture { mut host, window, .. } = window(Size::new(300., 200.));
    let label = host.create_delegate("label", DefaultSize::SIZE);
    host.set_height(label, "100");
    let view = RecordingView::control();
    host.bind(label, view.clone());
    host.add(window, label);
    assert!(!host.delegate(label).unwrap().is_height_size());

    host.on_native_size_changed(label, Size::new(80., 30.));
    host.on_native_loaded(window);
    assert_eq!(
        view.geometry_writes(),
        [
            NativeWrite::Width(80.),
            NativeWrite::Height(100.),
            NativeWrite::CanvasPosition(Point::new(110., 50.)),
        ]
    );
    assert_eq!(
        host.rect(label),
        Dimension {
            x: 110,
            y: 50,
            width: 80,
            height: 100
        }
    );
}

#[test]
fn unset_axes_without_default_follow_native_size() {
    let Fixture { mut host, window, .. } = window(Size::new(300., 200.));
    let button = host.create_delegate("button", DefaultSize::default());
    let view = RecordingView::control();
    host.bind(button, view.clone());
    host.set_top(button, "10");
    host.add(window, button);
    host.on_native_loaded(window);
    host.on_native_loaded(button);
    assert!(view.geometry_writes().is_empty());

    host.on_native_size_changed(button, Size::new(80., 30.));
    assert_eq!(
        view.geometry_writes(),
        [
            NativeWrite::Width(80.),
            NativeWrite::Height(30.),
            NativeWrite::CanvasPosition(Point::new(110., 10.)),
        ]
    );
    assert_eq!(
        host.rect(button),
        Dimension {
            x: 110,
            y: 10,
            width: 80,
            height: 30
        }
    );
}

#[test]
fn size_change_before_load_waits_for_load() {
    let Fixture { mut host, window, .. } = window(Size::new(300., 200.));
    let label = host.create_delegate("label", DefaultSize::SIZE);
    let view = RecordingView::control();
    host.bind(label, view.clone());
    host.add(window, label);

    host.on_native_size_changed(label, Size::new(80., 20.));
    assert!(view.geometry_writes().is_empty());

    host.on_native_loaded(label);
    assert_eq!(host.rect(label).width, 80);
}

#[test]
fn panel_size_changes_are_ignored() {
    let Fixture {
        mut host,
        window,
        window_view,
    } = window(Size::new(300., 200.));
    host.on_native_loaded(window);
    window_view.clear_writes();
    host.on_native_size_changed(window, Size::new(10., 10.));
    assert!(window_view.geometry_writes().is_empty());
}

#[test]
fn root_resize_relays_out() {
    let Fixture {
        mut host,
        window,
        window_view,
    } = window(Size::new(300., 200.));
    host.on_native_loaded(window);
    assert_eq!(host.rect(window).width, 300);

    host.set_root_bounds(window, Size::new(640., 480.));
    assert_eq!(
        host.rect(window),
        Dimension {
            x: 0,
            y: 0,
            width: 640,
            height: 480
        }
    );
    assert_eq!(
        window_view.geometry_writes().last(),
        Some(&NativeWrite::ChildrenVisibility(true))
    );
}

#[test]
fn oversized_content_is_clamped_to_parent() {
    let Fixture { mut host, window, .. } = window(Size::new(100., 100.));
    let label = host.create_delegate("label", DefaultSize::SIZE);
    let view = RecordingView::control();
    host.bind(label, view.clone());
    host.add(window, label);
    host.on_native_loaded(window);
    host.on_native_loaded(label);
    host.on_native_size_changed(label, Size::new(250., 30.));

    assert_eq!(view.recorded().width, Some(100.));
    assert_eq!(host.rect(label).width, 100);
}

#[test]
fn add_to_non_panel_keeps_logical_tree() {
    let Fixture { mut host, window, .. } = window(Size::new(100., 100.));
    let button = host.create_delegate("button", DefaultSize::default());
    let button_view = RecordingView::control();
    host.bind(button, button_view.clone());
    host.add(window, button);

    let icon = host.create_delegate("icon", DefaultSize::default());
    host.bind(icon, RecordingView::control());
    host.add(button, icon);

    assert_eq!(host.tree().parent(icon), Some(button));
    assert!(button_view.recorded().children.is_empty());
}

#[test]
fn add_unbound_child_to_panel_keeps_logical_tree() {
    let Fixture {
        mut host,
        window,
        window_view,
    } = window(Size::new(100., 100.));
    let child = host.create_delegate("child", DefaultSize::default());
    host.set_width(child, "10");
    host.set_height(child, "10");
    host.add(window, child);
    host.on_native_loaded(window);

    assert_eq!(host.tree().parent(child), Some(window));
    assert_eq!(host.tree().children(window), [child]);
    assert!(window_view.recorded().children.is_empty());
    assert_eq!(host.rect(child), Dimension::default());
}

#[test]
fn hidden_children_stay_hidden_after_panel_update() {
    let Fixture {
        mut host,
        window,
        window_view,
    } = window(Size::new(300., 200.));
    let mut views = Vec::new();
    for name in ["shown", "hidden"] {
        let id = host.create_delegate(name, DefaultSize::default());
        let view = RecordingView::control();
        host.bind(id, view.clone());
        host.set_width(id, "50");
        host.set_height(id, "50");
        host.add(window, id);
        views.push((id, view));
    }
    let (_, shown_view) = &views[0];
    let (hidden, hidden_view) = &views[1];
    host.hide(*hidden);

    host.on_native_loaded(window);
    assert_eq!(
        window_view.geometry_writes().last(),
        Some(&NativeWrite::ChildrenVisibility(true))
    );
    assert!(shown_view.recorded().visible);
    assert!(!hidden_view.recorded().visible);

    host.set_root_bounds(window, Size::new(640., 480.));
    assert!(shown_view.recorded().visible);
    assert!(!hidden_view.recorded().visible);

    host.show(*hidden);
    assert!(hidden_view.recorded().visible);
}

#[test]
fn remove_and_destroy_detach_natively() {
    let Fixture {
        mut host,
        window,
        window_view,
    } = window(Size::new(100., 100.));
    let first = host.create_delegate("first", DefaultSize::default());
    let first_view = RecordingView::control();
    host.bind(first, first_view.clone());
    let second = host.create_delegate("second", DefaultSize::default());
    let second_view = RecordingView::control();
    host.bind(second, second_view.clone());
    host.add(window, first);
    host.add(window, second);
    assert_eq!(window_view.recorded().children.len(), 2);

    host.remove(window, first);
    assert_eq!(window_view.recorded().children, [second_view.serial()]);
    assert_eq!(host.tree().parent(first), None);

    host.destroy(second);
    assert!(window_view.recorded().children.is_empty());
    assert!(host.delegate(second).is_none());
    assert!(!second_view.is_subscribed(view_delegate::NativeEvent::Loaded));
}

#[test]
fn moving_a_view_reparents_it_natively() {
    let Fixture {
        mut host,
        window,
        window_view,
    } = window(Size::new(100., 100.));
    let panel = host.create_delegate("panel", DefaultSize::FILL);
    let panel_view = RecordingView::panel();
    host.bind(panel, panel_view.clone());
    host.add(window, panel);

    let child = host.create_delegate("child", DefaultSize::default());
    let child_view = RecordingView::control();
    host.bind(child, child_view.clone());
    host.add(window, child);
    host.add(panel, child);

    assert_eq!(window_view.recorded().children, [panel_view.serial()]);
    assert_eq!(panel_view.recorded().children, [child_view.serial()]);
}

#[test]
fn detached_view_is_never_laid_out() {
    let mut host = ViewHost::new();
    let orphan = host.create_delegate("orphan", DefaultSize::default());
    let view = RecordingView::control();
    host.bind(orphan, view.clone());
    host.set_width(orphan, "10");
    host.set_height(orphan, "10");
    host.enable_event(orphan, "postlayout").unwrap();
    host.on_native_loaded(orphan);

    assert!(view.geometry_writes().is_empty());
    assert_eq!(host.pop_event(), None);
}

#[test]
fn negative_input_never_reaches_native_view() {
    let Fixture { mut host, window, .. } = window(Size::new(100., 100.));
    let child = host.create_delegate("child", DefaultSize::default());
    let view = RecordingView::control();
    host.bind(child, view.clone());
    host.set_width(child, "-20");
    host.set_height(child, "10");
    host.add(window, child);
    host.on_native_loaded(window);

    assert!(view.geometry_writes().is_empty());
    assert_eq!(host.rect(child), Dimension::default());
}

#[test]
fn relative_size_through_host() {
    let mut host: ViewHost<RecordingView> = ViewHost::new();
    let image = host.create_delegate("image", DefaultSize::SIZE);
    host.bind(image, RecordingView::control());
    host.set_height(image, "25");

    assert_eq!(
        host.compute_relative_size(image, 0., 0., 100., 50.),
        LayoutRect::new(0., 0., 50., 25.)
    );
}

#[test]
fn operations_on_destroyed_views_debug_panic() {
    let mut host: ViewHost<RecordingView> = ViewHost::new();
    let id = host.create_delegate("gone", DefaultSize::default());
    host.destroy(id);
    assert_debug_panics!(host.on_native_loaded(id), "does not exist");
    assert_debug_panics!(host.set_width(id, "10"), "does not exist");
    assert_debug_panics!(host.bind(id, RecordingView::control()), "does not exist");
}
