// Copyright 2025 the View Layout Authors
// SPDX-License-Identifier: Apache-2.0

use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use kurbo::Point;
use peniko::Color;

use crate::animation::{Timeline, TimelineId};
use crate::native::{NativeEvent, NativeView, RenderTransform, ViewCapability};

/// A geometry write received by a [`RecordingView`], in call order.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum NativeWrite {
    /// [`NativeView::set_width`].
    Width(f64),
    /// [`NativeView::set_height`].
    Height(f64),
    /// [`NativeView::set_canvas_position`].
    CanvasPosition(Point),
    /// [`NativeView::set_children_visibility`].
    ChildrenVisibility(bool),
}

/// Everything a [`RecordingView`] has been told.
#[derive(Debug)]
pub struct RecordedView {
    /// A process-unique number identifying the view.
    pub serial: u64,
    /// The capability reported to the delegate.
    pub capability: ViewCapability,
    /// The active subscriptions.
    pub subscriptions: Vec<NativeEvent>,
    /// Geometry writes, in order.
    pub writes: Vec<NativeWrite>,
    /// The current canvas position.
    pub canvas_position: Point,
    /// The last explicit width.
    pub width: Option<f64>,
    /// The last explicit height.
    pub height: Option<f64>,
    /// Whether the view is shown.
    pub visible: bool,
    /// The serials of the native children.
    pub children: Vec<u64>,
    /// The native children, whose visibility follows [`NativeView::set_children_visibility`].
    child_views: Vec<RecordingView>,
    /// The last background brush.
    pub background: Option<Color>,
    /// The last border thickness.
    pub border_thickness: Option<f64>,
    /// The last opacity.
    pub opacity: Option<f64>,
    /// The installed render transform.
    pub render_transform: Option<RenderTransform>,
    /// Every timeline started on the view.
    pub timelines: Vec<(TimelineId, Timeline)>,
}

/// A [`NativeView`] that records the calls made to it.
///
/// Clones share their recording, so a test can keep one clone while the host owns another.
#[derive(Clone, Debug)]
pub struct RecordingView {
    inner: Rc<RefCell<RecordedView>>,
}

impl RecordingView {
    /// Creates a view with the given capability.
    pub fn new(capability: ViewCapability) -> Self {
        static SERIAL_COUNTER: AtomicU64 = AtomicU64::new(1);
        let recorded = RecordedView {
            serial: SERIAL_COUNTER.fetch_add(1, Ordering::Relaxed),
            capability,
            subscriptions: Vec::new(),
            writes: Vec::new(),
            canvas_position: Point::ZERO,
            width: None,
            height: None,
            visible: true,
            children: Vec::new(),
            child_views: Vec::new(),
            background: None,
            border_thickness: None,
            opacity: None,
            render_transform: None,
            timelines: Vec::new(),
        };
        Self {
            inner: Rc::new(RefCell::new(recorded)),
        }
    }

    /// Creates a panel.
    pub fn panel() -> Self {
        Self::new(ViewCapability::Panel)
    }

    /// Creates a control.
    pub fn control() -> Self {
        Self::new(ViewCapability::Control)
    }

    /// Creates a view that is neither a panel nor a control.
    pub fn other() -> Self {
        Self::new(ViewCapability::Other)
    }

    /// The recording.
    pub fn recorded(&self) -> Ref<'_, RecordedView> {
        self.inner.borrow()
    }

    /// The process-unique number of this view.
    pub fn serial(&self) -> u64 {
        self.inner.borrow().serial
    }

    /// A copy of the geometry writes so far.
    pub fn geometry_writes(&self) -> Vec<NativeWrite> {
        self.inner.borrow().writes.clone()
    }

    /// Forgets the geometry writes so far.
    pub fn clear_writes(&self) {
        self.inner.borrow_mut().writes.clear();
    }

    /// Whether the delegate listens to `event`.
    pub fn is_subscribed(&self, event: NativeEvent) -> bool {
        self.inner.borrow().subscriptions.contains(&event)
    }

    /// The last timeline started on the view.
    pub fn last_timeline(&self) -> Option<(TimelineId, Timeline)> {
        self.inner.borrow().timelines.last().cloned()
    }
}

impl NativeView for RecordingView {
    fn capability(&self) -> ViewCapability {
        self.inner.borrow().capability
    }

    fn subscribe(&mut self, event: NativeEvent) {
        let mut recorded = self.inner.borrow_mut();
        if !recorded.subscriptions.contains(&event) {
            recorded.subscriptions.push(event);
        }
    }

    fn unsubscribe(&mut self, event: NativeEvent) {
        self.inner.borrow_mut().subscriptions.retain(|e| *e != event);
    }

    fn canvas_position(&self) -> Point {
        self.inner.borrow().canvas_position
    }

    fn set_canvas_position(&mut self, position: Point) {
        let mut recorded = self.inner.borrow_mut();
        recorded.canvas_position = position;
        recorded.writes.push(NativeWrite::CanvasPosition(position));
    }

    fn set_width(&mut self, width: f64) {
        let mut recorded = self.inner.borrow_mut();
        recorded.width = Some(width);
        recorded.writes.push(NativeWrite::Width(width));
    }

    fn set_height(&mut self, height: f64) {
        let mut recorded = self.inner.borrow_mut();
        recorded.height = Some(height);
        recorded.writes.push(NativeWrite::Height(height));
    }

    fn set_visibility(&mut self, visible: bool) {
        self.inner.borrow_mut().visible = visible;
    }

    fn set_children_visibility(&mut self, visible: bool) {
        let recorded = &mut *self.inner.borrow_mut();
        recorded.writes.push(NativeWrite::ChildrenVisibility(visible));
        for child in &recorded.child_views {
            child.inner.borrow_mut().visible = visible;
        }
    }

    fn append_child(&mut self, child: &Self) {
        let serial = child.serial();
        let mut recorded = self.inner.borrow_mut();
        recorded.children.push(serial);
        recorded.child_views.push(child.clone());
    }

    fn remove_child(&mut self, child: &Self) {
        let serial = child.serial();
        let mut recorded = self.inner.borrow_mut();
        recorded.children.retain(|c| *c != serial);
        recorded.child_views.retain(|c| c.serial() != serial);
    }

    fn set_background(&mut self, color: Color) {
        self.inner.borrow_mut().background = Some(color);
    }

    fn set_border_thickness(&mut self, thickness: f64) {
        self.inner.borrow_mut().border_thickness = Some(thickness);
    }

    fn set_opacity(&mut self, opacity: f64) {
        self.inner.borrow_mut().opacity = Some(opacity);
    }

    fn set_render_transform(&mut self, transform: RenderTransform) {
        self.inner.borrow_mut().render_transform = Some(transform);
    }

    fn begin_timeline(&mut self, token: TimelineId, timeline: Timeline) {
        self.inner.borrow_mut().timelines.push((token, timeline));
    }
}
