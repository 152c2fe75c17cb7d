// Copyright 2025 the View Layout Authors
// SPDX-License-Identifier: Apache-2.0

//! The owner of all delegates and the entry point for both the widget layer and
//! the native toolkit.

use std::collections::VecDeque;
use std::fmt;

use hashbrown::HashMap;
use kurbo::{Point, Size};
use tracing::{debug, info_span, trace, warn};
use view_layout::{
    FILL_TOKEN, InputProperty, LayoutConfig, LayoutRect, LayoutTree, LayoutType, NodeId,
    SIZE_TOKEN, Value, ValueName, debug_panic,
};

use crate::animation::{Animation, AnimationId, Timeline, TimelineId};
use crate::color::resolve_color;
use crate::delegate::{DefaultSize, Dimension, LayoutDelegate, compute_relative_size};
use crate::event::{EventFlags, UnknownEventError, ViewEvent};
use crate::native::{NativeEvent, NativeView, ViewCapability};

/// The identity of a view inside a [`ViewHost`].
pub type ViewId = NodeId;

/// Called once when an animation finishes.
pub type CompletionCallback = Box<dyn FnOnce()>;

struct PendingTimeline {
    view: ViewId,
    animation: AnimationId,
    on_complete: Option<CompletionCallback>,
}

/// Holds the layout tree of every view, each node carrying the [`LayoutDelegate`]
/// of its view.
///
/// All methods are expected to run on the UI thread, including the `on_native_*`
/// notifications forwarded by the native toolkit.
/// Events for the script side are queued and drained with [`pop_event`](Self::pop_event).
pub struct ViewHost<V> {
    tree: LayoutTree<LayoutDelegate<V>>,
    events: VecDeque<ViewEvent>,
    timelines: HashMap<TimelineId, PendingTimeline>,
}

impl<V> fmt::Debug for ViewHost<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewHost")
            .field("views", &self.tree.len())
            .field("queued_events", &self.events.len())
            .field("playing_timelines", &self.timelines.len())
            .finish_non_exhaustive()
    }
}

impl<V: NativeView> Default for ViewHost<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps the widget-level `size` and `fill` constants to their layout tokens.
fn normalize_size_token(value: &str) -> &str {
    if value.eq_ignore_ascii_case("size") {
        SIZE_TOKEN
    } else if value.eq_ignore_ascii_case("fill") {
        FILL_TOKEN
    } else {
        value
    }
}

impl<V: NativeView> ViewHost<V> {
    /// Creates a host with the default [`LayoutConfig`].
    pub fn new() -> Self {
        Self::with_config(LayoutConfig::default())
    }

    /// Creates a host whose layout inputs are parsed with `config`.
    pub fn with_config(config: LayoutConfig) -> Self {
        Self {
            tree: LayoutTree::new(config),
            events: VecDeque::new(),
            timelines: HashMap::new(),
        }
    }

    /// The layout tree.
    pub fn tree(&self) -> &LayoutTree<LayoutDelegate<V>> {
        &self.tree
    }

    /// The delegate of `id`.
    pub fn delegate(&self, id: ViewId) -> Option<&LayoutDelegate<V>> {
        self.tree.data(id)
    }

    fn delegate_mut(&mut self, id: ViewId, operation: &str) -> Option<&mut LayoutDelegate<V>> {
        let delegate = self.tree.data_mut(id);
        if delegate.is_none() {
            debug_panic!("{operation}: view {id} does not exist");
        }
        delegate
    }

    fn is_loaded(&self, id: ViewId) -> bool {
        self.tree.data(id).is_some_and(|delegate| delegate.loaded)
    }

    // --- MARK: LIFECYCLE

    /// Creates the delegate and layout node of a new widget.
    ///
    /// `defaults` decides how the widget sizes the axes the script leaves unset.
    pub fn create_delegate(&mut self, name: impl Into<String>, defaults: DefaultSize) -> ViewId {
        let name = name.into();
        let id = self.tree.insert(name.clone(), LayoutDelegate::new(defaults));
        debug!("created delegate {id} for {name}");
        id
    }

    /// Binds the native view of `id`.
    ///
    /// # Panics
    ///
    /// If `id` is already bound.
    pub fn bind(&mut self, id: ViewId, mut view: V) {
        let Some(node) = self.tree.get_mut(id) else {
            debug_panic!("bind: view {id} does not exist");
            return;
        };
        assert!(
            node.data.view.is_none(),
            "view {id} ({}) is already bound to a native view",
            node.name
        );

        let delegate = &mut node.data;
        delegate.capability = view.capability();
        view.subscribe(NativeEvent::Loaded);
        view.subscribe(NativeEvent::SizeChanged);
        if delegate.listening.contains(EventFlags::FOCUS) {
            view.subscribe(NativeEvent::GotFocus);
        }
        delegate.apply_defaults(&mut node.properties);

        // Visual properties set before binding.
        let properties = &delegate.properties;
        if let Some(color) = &properties.background_color
            && matches!(delegate.capability, ViewCapability::Panel | ViewCapability::Control)
        {
            view.set_background(resolve_color(color));
        }
        if properties.border_width != 0. && delegate.capability == ViewCapability::Control {
            view.set_border_thickness(properties.border_width);
        }
        if properties.opacity != 1. {
            view.set_opacity(properties.opacity);
        }
        if !properties.visible {
            view.set_visibility(false);
        }

        debug!("bound {id} ({}) as {:?}", node.name, delegate.capability);
        delegate.view = Some(view);
        self.refresh_content_sizing(id);
    }

    /// Adds `child` as the last child of `parent`.
    ///
    /// The layout tree is always updated. The native view of `child` is only appended
    /// when `parent` is a bound panel and `child` is bound.
    pub fn add(&mut self, parent: ViewId, child: ViewId) {
        let old_parent = self.tree.parent(child);
        if !self.tree.add_child(parent, child) {
            return;
        }
        if let Some(old_parent) = old_parent {
            self.detach_native(old_parent, child);
        }
        self.refresh_content_sizing(child);

        let child_view = self.tree.data(child).and_then(|delegate| delegate.view.clone());
        let Some(parent_delegate) = self.tree.data_mut(parent) else {
            return;
        };
        match (parent_delegate.capability, parent_delegate.view.as_mut(), child_view) {
            (ViewCapability::Panel, Some(parent_view), Some(child_view)) => {
                parent_view.append_child(&child_view);
            }
            _ => warn!("add: unknown component, {child} is not attached natively to {parent}"),
        }

        if parent_delegate.loaded {
            self.request_layout(parent, false);
        }
    }

    /// Removes `child` from the children of `parent`.
    pub fn remove(&mut self, parent: ViewId, child: ViewId) {
        if !self.tree.remove_child(parent, child) {
            warn!("remove: {child} is not a child of {parent}");
            return;
        }
        self.detach_native(parent, child);
        self.refresh_content_sizing(child);
        if self.is_loaded(parent) {
            self.request_layout(parent, false);
        }
    }

    /// Removes `id` and all its descendants, releasing their native subscriptions.
    ///
    /// Animations still playing on the removed views are forgotten: their completion
    /// is ignored and their callbacks are dropped without running.
    pub fn destroy(&mut self, id: ViewId) {
        if !self.tree.contains(id) {
            debug_panic!("destroy: view {id} does not exist");
            return;
        }
        let parent = self.tree.parent(id);
        if let Some(parent) = parent {
            self.detach_native(parent, id);
        }
        let removed_views = self.tree.remove(id);
        self.timelines
            .retain(|_, pending| !removed_views.iter().any(|(view, _)| *view == pending.view));
        for (removed, delegate) in removed_views {
            trace!("destroyed {removed}");
            if let Some(mut view) = delegate.view {
                view.unsubscribe(NativeEvent::Loaded);
                view.unsubscribe(NativeEvent::SizeChanged);
                if delegate.listening.contains(EventFlags::FOCUS) {
                    view.unsubscribe(NativeEvent::GotFocus);
                }
            }
        }
        if let Some(parent) = parent
            && self.is_loaded(parent)
        {
            self.request_layout(parent, false);
        }
    }

    fn detach_native(&mut self, parent: ViewId, child: ViewId) {
        let Some(child_view) = self.tree.data(child).and_then(|delegate| delegate.view.clone())
        else {
            return;
        };
        if let Some(parent_delegate) = self.tree.data_mut(parent)
            && parent_delegate.capability == ViewCapability::Panel
            && let Some(parent_view) = parent_delegate.view.as_mut()
        {
            parent_view.remove_child(&child_view);
        }
    }

    /// Re-evaluates which axes of `id` follow its native content.
    fn refresh_content_sizing(&mut self, id: ViewId) {
        let pinned = self
            .tree
            .parent(id)
            .and_then(|parent| self.tree.get(parent))
            .map_or((true, true), |parent| {
                parent.element.layout_type.pinned_axes()
            });
        if let Some(node) = self.tree.get_mut(id) {
            node.data.refresh_content_sizing(&node.properties, pinned);
        }
    }

    // --- MARK: LAYOUT

    /// Lays out the tree containing `id`.
    ///
    /// Does nothing if `id` is not attached to a layout root.
    /// When `fire_event` is set and `id` listens to `postlayout`, a
    /// [`ViewEvent::PostLayout`] is queued for `id` alone.
    pub fn request_layout(&mut self, id: ViewId, fire_event: bool) {
        let Some(root) = self.tree.request_layout(id) else {
            trace!("request_layout: {id} is not attached to a layout root");
            return;
        };
        let _span = info_span!("request_layout", %id, %root).entered();
        let mut updated_panels = Vec::new();
        self.tree.layout(root, |delegate, info| {
            if delegate.apply_computed_rect(info) && delegate.capability == ViewCapability::Panel {
                updated_panels.push(info.id);
            }
        });
        for panel in updated_panels {
            self.collapse_hidden_children(panel);
        }

        if fire_event
            && self
                .tree
                .data(id)
                .is_some_and(|delegate| delegate.listening.contains(EventFlags::POSTLAYOUT))
        {
            self.events.push_back(ViewEvent::PostLayout { source: id });
        }
    }

    /// Collapses the children of `panel` hidden with [`hide`](Self::hide) again, after
    /// the panel update showed all of them.
    fn collapse_hidden_children(&mut self, panel: ViewId) {
        for child in self.tree.children(panel).to_vec() {
            if let Some(delegate) = self.tree.data_mut(child)
                && !delegate.properties.visible
                && let Some(view) = delegate.view.as_mut()
            {
                view.set_visibility(false);
            }
        }
    }

    /// Makes `id` a layout root of the given size, such as a window.
    pub fn set_root_bounds(&mut self, id: ViewId, size: Size) {
        self.tree.set_root_bounds(id, size);
        if self.is_loaded(id) {
            self.request_layout(id, true);
        }
    }

    /// Sets one layout input of `id` and lays out again if the view is loaded.
    ///
    /// The widget-level constants `size` and `fill` are accepted in any case.
    pub fn set_layout_property(&mut self, id: ViewId, name: ValueName, value: &str) {
        if !self.tree.contains(id) {
            debug_panic!("set_layout_property: view {id} does not exist");
            return;
        }
        let value = normalize_size_token(value);
        self.tree
            .populate_layout_properties(id, &[InputProperty::new(name, value)]);

        if let Some(node) = self.tree.get_mut(id) {
            match name {
                ValueName::Width => node.data.width_input = node.properties.width.value_type,
                ValueName::Height => node.data.height_input = node.properties.height.value_type,
                _ => {}
            }
        }
        if matches!(
            name,
            ValueName::Width
                | ValueName::Height
                | ValueName::Top
                | ValueName::Left
                | ValueName::Bottom
                | ValueName::Right
        ) {
            self.refresh_content_sizing(id);
        }

        if self.is_loaded(id) {
            self.request_layout(id, false);
        }
    }

    /// Sets how `id` arranges its children: `"horizontal"`, `"vertical"`, or
    /// anything else for absolute positioning.
    pub fn set_layout(&mut self, id: ViewId, layout: &str) {
        let Some(node) = self.tree.get_mut(id) else {
            debug_panic!("set_layout: view {id} does not exist");
            return;
        };
        node.element.layout_type = match layout {
            "horizontal" => LayoutType::Horizontal,
            "vertical" => LayoutType::Vertical,
            _ => LayoutType::Composite,
        };
        let loaded = node.data.loaded;
        for child in self.tree.children(id).to_vec() {
            self.refresh_content_sizing(child);
        }
        if loaded {
            self.request_layout(id, false);
        }
    }

    /// Sets the `top` input.
    pub fn set_top(&mut self, id: ViewId, value: &str) {
        self.set_layout_property(id, ValueName::Top, value);
    }

    /// Sets the `left` input.
    pub fn set_left(&mut self, id: ViewId, value: &str) {
        self.set_layout_property(id, ValueName::Left, value);
    }

    /// Sets the `bottom` input.
    pub fn set_bottom(&mut self, id: ViewId, value: &str) {
        self.set_layout_property(id, ValueName::Bottom, value);
    }

    /// Sets the `right` input.
    pub fn set_right(&mut self, id: ViewId, value: &str) {
        self.set_layout_property(id, ValueName::Right, value);
    }

    /// Sets the `width` input.
    pub fn set_width(&mut self, id: ViewId, value: &str) {
        self.set_layout_property(id, ValueName::Width, value);
    }

    /// Sets the `height` input.
    pub fn set_height(&mut self, id: ViewId, value: &str) {
        self.set_layout_property(id, ValueName::Height, value);
    }

    /// Sets the `minWidth` input.
    pub fn set_min_width(&mut self, id: ViewId, value: &str) {
        self.set_layout_property(id, ValueName::MinWidth, value);
    }

    /// Sets the `minHeight` input.
    pub fn set_min_height(&mut self, id: ViewId, value: &str) {
        self.set_layout_property(id, ValueName::MinHeight, value);
    }

    /// Positions the center of `id` inside its parent.
    pub fn set_center(&mut self, id: ViewId, center: Point) {
        let Some(delegate) = self.delegate_mut(id, "set_center") else {
            return;
        };
        delegate.properties.center = Some(center);
        self.set_layout_property(id, ValueName::CenterX, &center.x.to_string());
        self.set_layout_property(id, ValueName::CenterY, &center.y.to_string());
    }

    /// Scales `base_width` and `base_height` so that the aspect ratio is kept when
    /// exactly one axis of `id` follows its content.
    pub fn compute_relative_size(
        &self,
        id: ViewId,
        x: f64,
        y: f64,
        base_width: f64,
        base_height: f64,
    ) -> LayoutRect {
        let Some(node) = self.tree.get(id) else {
            debug_panic!("compute_relative_size: view {id} does not exist");
            return LayoutRect::new(x, y, base_width, base_height);
        };
        compute_relative_size(
            &node.properties,
            node.data.is_width_size,
            node.data.is_height_size,
            Point::new(x, y),
            base_width,
            base_height,
        )
    }

    /// The last rectangle applied to `id`, rounded.
    pub fn rect(&self, id: ViewId) -> Dimension {
        self.tree.data(id).map(LayoutDelegate::rect).unwrap_or_default()
    }

    /// The size of the last rectangle applied to `id`, rounded.
    pub fn size(&self, id: ViewId) -> Dimension {
        self.tree.data(id).map(LayoutDelegate::size).unwrap_or_default()
    }

    // --- MARK: NATIVE NOTIFICATIONS

    /// The native view of `id` entered the live tree.
    pub fn on_native_loaded(&mut self, id: ViewId) {
        let Some(delegate) = self.delegate_mut(id, "on_native_loaded") else {
            return;
        };
        delegate.loaded = true;
        debug!("{id} loaded");
        self.request_layout(id, true);
    }

    /// The native view of `id` now renders at `size`.
    ///
    /// Content-sized axes of non-panel views adopt the reported size as a fixed value.
    pub fn on_native_size_changed(&mut self, id: ViewId, size: Size) {
        let Some(node) = self.tree.get_mut(id) else {
            debug_panic!("on_native_size_changed: view {id} does not exist");
            return;
        };
        let delegate = &node.data;
        if delegate.capability == ViewCapability::Panel {
            return;
        }
        let mut needs_layout = false;
        if delegate.is_width_size {
            node.properties.width = Value::fixed(size.width);
            needs_layout = delegate.loaded;
        }
        if delegate.is_height_size {
            node.properties.height = Value::fixed(size.height);
            needs_layout = delegate.loaded;
        }
        if needs_layout {
            trace!("{id} changed size to {size:?}");
            self.request_layout(id, true);
        }
    }

    /// The native view of `id` received focus.
    pub fn on_native_focus(&mut self, id: ViewId) {
        if self
            .tree
            .data(id)
            .is_some_and(|delegate| delegate.listening.contains(EventFlags::FOCUS))
        {
            self.events.push_back(ViewEvent::Focus { source: id });
        }
    }

    /// The native timeline `token` finished playing.
    ///
    /// Runs the completion callback, then queues [`ViewEvent::AnimationComplete`].
    pub fn on_timeline_completed(&mut self, token: TimelineId) {
        let Some(pending) = self.timelines.remove(&token) else {
            debug!("completion of unknown {token}");
            return;
        };
        trace!("{token} of {} completed", pending.view);
        if let Some(on_complete) = pending.on_complete {
            on_complete();
        }
        self.events.push_back(ViewEvent::AnimationComplete {
            animation: pending.animation,
        });
    }

    // --- MARK: EVENTS

    /// Starts reporting the event `name` (`"focus"` or `"postlayout"`) for `id`.
    pub fn enable_event(&mut self, id: ViewId, name: &str) -> Result<(), UnknownEventError> {
        let flag: EventFlags = name.parse()?;
        let Some(delegate) = self.delegate_mut(id, "enable_event") else {
            return Ok(());
        };
        if flag == EventFlags::FOCUS
            && !delegate.listening.contains(flag)
            && let Some(view) = delegate.view.as_mut()
        {
            view.subscribe(NativeEvent::GotFocus);
        }
        delegate.listening.insert(flag);
        Ok(())
    }

    /// Stops reporting the event `name` for `id`.
    pub fn disable_event(&mut self, id: ViewId, name: &str) -> Result<(), UnknownEventError> {
        let flag: EventFlags = name.parse()?;
        let Some(delegate) = self.delegate_mut(id, "disable_event") else {
            return Ok(());
        };
        if flag == EventFlags::FOCUS
            && delegate.listening.contains(flag)
            && let Some(view) = delegate.view.as_mut()
        {
            view.unsubscribe(NativeEvent::GotFocus);
        }
        delegate.listening.remove(flag);
        Ok(())
    }

    /// Takes the oldest queued event.
    pub fn pop_event(&mut self) -> Option<ViewEvent> {
        self.events.pop_front()
    }

    /// Takes all queued events, oldest first.
    pub fn take_events(&mut self) -> Vec<ViewEvent> {
        self.events.drain(..).collect()
    }

    // --- MARK: ANIMATION

    /// Plays `animation` on `id`.
    ///
    /// Queues [`ViewEvent::AnimationStart`] and hands the timeline to the native view.
    /// A new animation replaces the render transform of one still playing, whose
    /// completion is still reported.
    ///
    /// Returns `None` if `id` is not bound.
    pub fn animate(
        &mut self,
        id: ViewId,
        animation: &Animation,
        on_complete: Option<CompletionCallback>,
    ) -> Option<TimelineId> {
        // Borrows the tree alone, so the timeline and event queues stay usable.
        let Some(delegate) = self.tree.data_mut(id) else {
            debug_panic!("animate: view {id} does not exist");
            return None;
        };
        let capability = delegate.capability;
        let Some(view) = delegate.view.as_mut() else {
            warn!("animate: {id} has no native view");
            return None;
        };

        let (timeline, render_transform) =
            Timeline::build(animation, capability, view.canvas_position());
        if let Some(render_transform) = render_transform {
            view.set_render_transform(render_transform);
        }

        let token = TimelineId::next();
        self.timelines.insert(
            token,
            PendingTimeline {
                view: id,
                animation: animation.id,
                on_complete,
            },
        );
        self.events.push_back(ViewEvent::AnimationStart {
            animation: animation.id,
        });
        debug!("{id} starts {} as {token}", animation.id);
        view.begin_timeline(token, timeline);
        Some(token)
    }

    // --- MARK: VISUAL PROPERTIES

    /// Sets the background color of a panel or control.
    pub fn set_background_color(&mut self, id: ViewId, color: &str) {
        let Some(delegate) = self.delegate_mut(id, "set_background_color") else {
            return;
        };
        delegate.properties.background_color = Some(color.to_string());
        let capability = delegate.capability;
        let Some(view) = delegate.view.as_mut() else {
            return;
        };
        match capability {
            ViewCapability::Panel | ViewCapability::Control => {
                view.set_background(resolve_color(color));
            }
            ViewCapability::Other => {
                warn!("set_background_color: {id} is neither a panel nor a control");
            }
        }
    }

    /// Stores the border color of `id`.
    pub fn set_border_color(&mut self, id: ViewId, color: &str) {
        if let Some(delegate) = self.delegate_mut(id, "set_border_color") {
            delegate.properties.border_color = Some(color.to_string());
        }
    }

    /// Sets the border thickness of a control.
    pub fn set_border_width(&mut self, id: ViewId, width: f64) {
        let Some(delegate) = self.delegate_mut(id, "set_border_width") else {
            return;
        };
        delegate.properties.border_width = width;
        let capability = delegate.capability;
        let Some(view) = delegate.view.as_mut() else {
            return;
        };
        if capability == ViewCapability::Control {
            view.set_border_thickness(width);
        } else {
            warn!("set_border_width: {id} is not a control");
        }
    }

    /// Sets the opacity of `id`.
    pub fn set_opacity(&mut self, id: ViewId, opacity: f64) {
        let Some(delegate) = self.delegate_mut(id, "set_opacity") else {
            return;
        };
        delegate.properties.opacity = opacity;
        if let Some(view) = delegate.view.as_mut() {
            view.set_opacity(opacity);
        }
    }

    /// Stores the tint color of `id`.
    pub fn set_tint_color(&mut self, id: ViewId, color: &str) {
        if let Some(delegate) = self.delegate_mut(id, "set_tint_color") {
            delegate.properties.tint_color = Some(color.to_string());
        }
    }

    /// Stores whether `id` reacts to touch.
    pub fn set_touch_enabled(&mut self, id: ViewId, enabled: bool) {
        if let Some(delegate) = self.delegate_mut(id, "set_touch_enabled") {
            delegate.properties.touch_enabled = enabled;
        }
    }

    /// Collapses `id`.
    pub fn hide(&mut self, id: ViewId) {
        self.set_visible(id, false);
    }

    /// Shows `id` again.
    pub fn show(&mut self, id: ViewId) {
        self.set_visible(id, true);
    }

    fn set_visible(&mut self, id: ViewId, visible: bool) {
        let Some(delegate) = self.delegate_mut(id, "set_visible") else {
            return;
        };
        delegate.properties.visible = visible;
        if let Some(view) = delegate.view.as_mut() {
            view.set_visibility(visible);
        }
    }
}
