// Copyright 2025 the View Layout Authors
// SPDX-License-Identifier: Apache-2.0

//! The seam between the delegate and the native retained-mode view tree.

use kurbo::{Affine, Point, Vec2};
use peniko::Color;

use crate::animation::{Timeline, TimelineId};

/// Which native update strategy applies to a view.
///
/// This is decided once, when the view is bound.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ViewCapability {
    /// A container hosting and arranging native children.
    Panel,
    /// A leaf or interactive widget with its own background and border.
    Control,
    /// Anything else.
    #[default]
    Other,
}

/// A native notification the delegate can subscribe to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NativeEvent {
    /// The view entered the live tree.
    Loaded,
    /// The rendered size of the view changed.
    SizeChanged,
    /// The view received keyboard focus.
    GotFocus,
}

/// A render transform installed on a view, distinct from its layout position.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RenderTransform {
    /// A full affine matrix.
    Matrix(Affine),
    /// A translation.
    Translate(Vec2),
}

/// A handle to a native view.
///
/// Handles are cheap to clone and all clones refer to the same native view,
/// which is how a parent panel receives its children.
///
/// The native side reports its notifications back through
/// [`ViewHost`](crate::ViewHost): `on_native_loaded`, `on_native_size_changed`,
/// `on_native_focus` and `on_timeline_completed`.
pub trait NativeView: Clone {
    /// The capability of the view.
    fn capability(&self) -> ViewCapability;

    /// Starts forwarding `event` to the host.
    fn subscribe(&mut self, event: NativeEvent);

    /// Stops forwarding `event` to the host.
    fn unsubscribe(&mut self, event: NativeEvent);

    /// The position of the view inside its parent canvas.
    fn canvas_position(&self) -> Point;

    /// Moves the view inside its parent canvas.
    fn set_canvas_position(&mut self, position: Point);

    /// Sets an explicit width.
    fn set_width(&mut self, width: f64);

    /// Sets an explicit height.
    fn set_height(&mut self, height: f64);

    /// Shows or collapses the view.
    fn set_visibility(&mut self, visible: bool);

    /// Shows or collapses every native child of a panel.
    fn set_children_visibility(&mut self, visible: bool);

    /// Appends `child` to the native children of a panel.
    fn append_child(&mut self, child: &Self);

    /// Removes `child` from the native children of a panel.
    fn remove_child(&mut self, child: &Self);

    /// Sets a solid background brush.
    fn set_background(&mut self, color: Color);

    /// Sets the border thickness of a control.
    fn set_border_thickness(&mut self, thickness: f64);

    /// Sets the opacity.
    fn set_opacity(&mut self, opacity: f64);

    /// Replaces the render transform.
    fn set_render_transform(&mut self, transform: RenderTransform);

    /// Starts playing `timeline` without waiting for it.
    ///
    /// When playback ends, the native side calls
    /// [`ViewHost::on_timeline_completed`](crate::ViewHost::on_timeline_completed) with `token`.
    fn begin_timeline(&mut self, token: TimelineId, timeline: Timeline);
}
