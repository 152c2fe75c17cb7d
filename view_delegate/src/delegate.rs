// Copyright 2025 the View Layout Authors
// SPDX-License-Identifier: Apache-2.0

//! The per-view state that links a layout node to a native view.

use kurbo::Point;
use tracing::trace;
use view_layout::{LayoutInfo, LayoutProperties, LayoutRect, ValueType};

use crate::event::EventFlags;
use crate::native::{NativeView, ViewCapability};

/// How a widget sizes an axis when the script leaves it unset.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum SizePolicy {
    /// No widget default: the axis follows the content unless both offsets pin it.
    #[default]
    Auto,
    /// Size to the native content.
    Size,
    /// Fill the parent.
    Fill,
}

impl SizePolicy {
    fn value_type(self) -> ValueType {
        match self {
            Self::Auto => ValueType::None,
            Self::Size => ValueType::Size,
            Self::Fill => ValueType::Fill,
        }
    }
}

/// The widget-level default sizing of both axes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DefaultSize {
    /// Default for the width.
    pub width: SizePolicy,
    /// Default for the height.
    pub height: SizePolicy,
}

impl DefaultSize {
    /// Labels, buttons and other content-sized widgets.
    pub const SIZE: Self = Self::new(SizePolicy::Size, SizePolicy::Size);
    /// Containers that fill their parent.
    pub const FILL: Self = Self::new(SizePolicy::Fill, SizePolicy::Fill);

    /// Creates a default from a width and height policy.
    pub const fn new(width: SizePolicy, height: SizePolicy) -> Self {
        Self { width, height }
    }
}

/// A rectangle reported to scripts, rounded to whole pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Dimension {
    /// Horizontal position inside the parent.
    pub x: u32,
    /// Vertical position inside the parent.
    pub y: u32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

impl Dimension {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "float to int casts saturate, and negative values become 0"
    )]
    fn from_rect(rect: LayoutRect) -> Self {
        Self {
            x: rect.x.round() as u32,
            y: rect.y.round() as u32,
            width: rect.width.round() as u32,
            height: rect.height.round() as u32,
        }
    }
}

/// Visual properties that are stored as given and, when the view supports
/// them, forwarded to it.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewProperties {
    /// Background color, as given.
    pub background_color: Option<String>,
    /// Border color, as given.
    pub border_color: Option<String>,
    /// Border width in pixels.
    pub border_width: f64,
    /// Opacity in `0..=1`.
    pub opacity: f64,
    /// Tint color, as given.
    pub tint_color: Option<String>,
    /// Whether the view reacts to touch.
    pub touch_enabled: bool,
    /// Requested center point.
    pub center: Option<Point>,
    /// Whether the view is shown.
    pub visible: bool,
}

impl Default for ViewProperties {
    fn default() -> Self {
        Self {
            background_color: None,
            border_color: None,
            border_width: 0.,
            opacity: 1.,
            tint_color: None,
            touch_enabled: true,
            center: None,
            visible: true,
        }
    }
}

/// The delegate of one view.
///
/// It lives as the payload of a layout node, so the layout callback reaches it directly.
#[derive(Debug)]
pub struct LayoutDelegate<V> {
    pub(crate) view: Option<V>,
    pub(crate) capability: ViewCapability,
    pub(crate) defaults: DefaultSize,
    pub(crate) old_rect: LayoutRect,
    pub(crate) is_width_size: bool,
    pub(crate) is_height_size: bool,
    /// The type of the last `width` input set by the script.
    pub(crate) width_input: ValueType,
    /// The type of the last `height` input set by the script.
    pub(crate) height_input: ValueType,
    pub(crate) loaded: bool,
    pub(crate) listening: EventFlags,
    pub(crate) properties: ViewProperties,
}

impl<V: NativeView> LayoutDelegate<V> {
    pub(crate) fn new(defaults: DefaultSize) -> Self {
        Self {
            view: None,
            capability: ViewCapability::Other,
            defaults,
            old_rect: LayoutRect::ZERO,
            is_width_size: false,
            is_height_size: false,
            width_input: ValueType::None,
            height_input: ValueType::None,
            loaded: false,
            listening: EventFlags::empty(),
            properties: ViewProperties::default(),
        }
    }

    /// The bound native view.
    pub fn view(&self) -> Option<&V> {
        self.view.as_ref()
    }

    /// The capability recorded at bind time.
    pub fn capability(&self) -> ViewCapability {
        self.capability
    }

    /// The widget-level default sizing.
    pub fn defaults(&self) -> DefaultSize {
        self.defaults
    }

    /// Whether the native view has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Whether the width follows the native content.
    pub fn is_width_size(&self) -> bool {
        self.is_width_size
    }

    /// Whether the height follows the native content.
    pub fn is_height_size(&self) -> bool {
        self.is_height_size
    }

    /// The events currently reported.
    pub fn listening(&self) -> EventFlags {
        self.listening
    }

    /// The last rectangle written to the native view.
    pub fn old_rect(&self) -> LayoutRect {
        self.old_rect
    }

    /// The stored visual properties.
    pub fn properties(&self) -> &ViewProperties {
        &self.properties
    }

    /// [`Self::old_rect`], rounded.
    pub fn rect(&self) -> Dimension {
        Dimension::from_rect(self.old_rect)
    }

    /// The size of [`Self::old_rect`], rounded, at the origin.
    pub fn size(&self) -> Dimension {
        Dimension::from_rect(LayoutRect::from_origin_size(Point::ZERO, self.old_rect.size()))
    }

    /// Writes the geometry computed by a layout pass onto the native view.
    ///
    /// Returns whether anything was written.
    pub(crate) fn apply_computed_rect(&mut self, info: &LayoutInfo<'_>) -> bool {
        let Some(view) = self.view.as_mut() else {
            trace!("skipping {}: no native view", info.name);
            return false;
        };
        let mut rect = info.rect;

        if (self.is_height_size && rect.height == 0.) || (self.is_width_size && rect.width == 0.) {
            trace!("skipping {}: content size not known yet", info.name);
            return false;
        }
        if rect.width < 0. || rect.height < 0. || rect.is_empty() {
            trace!("skipping {}: degenerate rect {rect:?}", info.name);
            return false;
        }

        let panel = self.capability == ViewCapability::Panel;
        let mut write_width = !self.is_width_size;
        let mut write_height = !self.is_height_size;
        if !panel && let Some(parent) = info.parent_measured {
            if self.is_width_size {
                if rect.width > parent.width && parent.width > 0. {
                    rect.width = parent.width;
                    write_width = true;
                } else if info.width_type == ValueType::Fixed {
                    write_width = true;
                }
            }
            if self.is_height_size {
                if rect.height > parent.height && parent.height > 0. {
                    rect.height = parent.height;
                    write_height = true;
                } else if info.height_type == ValueType::Fixed {
                    write_height = true;
                }
            }
        }

        if rect == self.old_rect {
            return false;
        }
        self.old_rect = rect;
        trace!("applying {rect:?} to {}", info.name);

        if panel {
            view.set_children_visibility(false);
            write_width = true;
            write_height = true;
        }
        if write_width {
            view.set_width(rect.width);
        }
        if write_height {
            view.set_height(rect.height);
        }
        view.set_canvas_position(rect.origin());
        if panel {
            view.set_children_visibility(true);
        }
        true
    }

    /// Applies the default sizing to the layout inputs of the node.
    pub(crate) fn apply_defaults(&self, properties: &mut LayoutProperties) {
        properties.default_width_type = self.defaults.width.value_type();
        properties.default_height_type = self.defaults.height.value_type();
    }

    /// Decides which axes follow the native content, resolving them as the layout pass does.
    ///
    /// The script inputs are used rather than `properties.width` and `properties.height`,
    /// which hold the native size once it is known. `pinned` comes from
    /// [`LayoutType::pinned_axes`](view_layout::LayoutType::pinned_axes) of the parent.
    pub(crate) fn refresh_content_sizing(&mut self, properties: &LayoutProperties, pinned: (bool, bool)) {
        let horizontal = pinned.0 && properties.left.is_length() && properties.right.is_length();
        let vertical = pinned.1 && properties.top.is_length() && properties.bottom.is_length();
        self.is_width_size = self
            .width_input
            .resolve(properties.default_width_type, horizontal)
            == ValueType::Size;
        self.is_height_size = self
            .height_input
            .resolve(properties.default_height_type, vertical)
            == ValueType::Size;
    }
}

/// Keeps the aspect ratio of `base` when exactly one axis follows the content.
///
/// The content-driven axis is scaled by the ratio between the fixed value of the
/// other axis and its base dimension.
pub(crate) fn compute_relative_size(
    properties: &LayoutProperties,
    is_width_size: bool,
    is_height_size: bool,
    origin: Point,
    base_width: f64,
    base_height: f64,
) -> LayoutRect {
    let base = LayoutRect::new(origin.x, origin.y, base_width, base_height);
    if is_width_size == is_height_size || base_width <= 0. || base_height <= 0. {
        return base;
    }
    if is_width_size && properties.height.value_type == ValueType::Fixed {
        let height = properties.height.value;
        return LayoutRect::new(origin.x, origin.y, base_width * (height / base_height), height);
    }
    if is_height_size && properties.width.value_type == ValueType::Fixed {
        let width = properties.width.value;
        return LayoutRect::new(origin.x, origin.y, width, base_height * (width / base_width));
    }
    base
}

#[cfg(test)]
mod tests {
    use kurbo::Size;
    use view_layout::{LayoutTree, NodeId, Value};

    use super::*;
    use crate::testing::{NativeWrite, RecordingView};

    fn bound(view: &RecordingView, defaults: DefaultSize) -> LayoutDelegate<RecordingView> {
        let mut delegate = LayoutDelegate::new(defaults);
        delegate.capability = view.capability();
        delegate.view = Some(view.clone());
        let mut properties = LayoutProperties::default();
        delegate.apply_defaults(&mut properties);
        delegate.refresh_content_sizing(&properties, (true, true));
        delegate
    }

    fn node_id() -> NodeId {
        LayoutTree::<()>::default().insert("test", ())
    }

    fn info(rect: LayoutRect) -> LayoutInfo<'static> {
        LayoutInfo {
            id: node_id(),
            name: "test",
            rect,
            width_type: ValueType::Fixed,
            height_type: ValueType::Fixed,
            parent_measured: Some(Size::new(500., 500.)),
        }
    }

    #[test]
    fn same_rect_written_once() {
        let view = RecordingView::control();
        let mut delegate = bound(&view, DefaultSize::FILL);
        let rect = info(LayoutRect::new(1., 2., 30., 40.));

        assert!(delegate.apply_computed_rect(&rect));
        assert!(!delegate.apply_computed_rect(&rect));
        assert_eq!(
            view.geometry_writes(),
            [
                NativeWrite::Width(30.),
                NativeWrite::Height(40.),
                NativeWrite::CanvasPosition(Point::new(1., 2.)),
            ]
        );
    }

    #[test]
    fn negative_and_empty_rects_are_skipped() {
        let view = RecordingView::control();
        let mut delegate = bound(&view, DefaultSize::FILL);
        assert!(!delegate.apply_computed_rect(&info(LayoutRect::new(0., 0., -5., 10.))));
        assert!(!delegate.apply_computed_rect(&info(LayoutRect::new(0., 0., 10., -5.))));
        assert!(!delegate.apply_computed_rect(&info(LayoutRect::new(0., 0., 0., 10.))));
        assert!(view.geometry_writes().is_empty());
        assert_eq!(delegate.old_rect(), LayoutRect::ZERO);
    }

    #[test]
    fn content_sized_axis_waits_for_native_size() {
        let view = RecordingView::control();
        let mut delegate = bound(&view, DefaultSize::SIZE);
        assert!(!delegate.apply_computed_rect(&info(LayoutRect::new(0., 0., 0., 0.))));
        assert!(view.geometry_writes().is_empty());
    }

    #[test]
    fn content_sized_axis_clamps_to_parent() {
        let view = RecordingView::control();
        let mut delegate = bound(&view, DefaultSize::SIZE);
        let mut rect = info(LayoutRect::new(0., 0., 800., 20.));
        rect.width_type = ValueType::Size;
        rect.height_type = ValueType::Size;

        assert!(delegate.apply_computed_rect(&rect));
        assert_eq!(
            view.geometry_writes(),
            [
                NativeWrite::Width(500.),
                NativeWrite::CanvasPosition(Point::ZERO),
            ]
        );
        assert_eq!(delegate.old_rect(), LayoutRect::new(0., 0., 500., 20.));
    }

    #[test]
    fn panel_hides_children_during_update() {
        let view = RecordingView::panel();
        let mut delegate = bound(&view, DefaultSize::SIZE);
        assert!(delegate.apply_computed_rect(&info(LayoutRect::new(5., 5., 50., 60.))));
        assert_eq!(
            view.geometry_writes(),
            [
                NativeWrite::ChildrenVisibility(false),
                NativeWrite::Width(50.),
                NativeWrite::Height(60.),
                NativeWrite::CanvasPosition(Point::new(5., 5.)),
                NativeWrite::ChildrenVisibility(true),
            ]
        );
    }

    #[test]
    fn content_sizing_follows_inputs() {
        let view = RecordingView::control();
        let mut delegate = bound(&view, DefaultSize::default());
        assert!(delegate.is_width_size());
        assert!(delegate.is_height_size());

        let mut properties = LayoutProperties::default();
        delegate.apply_defaults(&mut properties);
        properties.left = Value::fixed(10.);
        properties.right = Value::percent(10.);
        delegate.height_input = ValueType::Fixed;
        delegate.refresh_content_sizing(&properties, (true, true));
        assert!(!delegate.is_width_size());
        assert!(!delegate.is_height_size());

        // Along the stacking axis, offsets are margins.
        delegate.refresh_content_sizing(&properties, (false, true));
        assert!(delegate.is_width_size());

        // A native size stored as the width does not count as script input.
        properties.width = Value::fixed(80.);
        delegate.refresh_content_sizing(&properties, (false, true));
        assert!(delegate.is_width_size());
    }

    #[test]
    fn relative_size_keeps_aspect_ratio() {
        let mut properties = LayoutProperties::default();
        properties.height = Value::fixed(25.);
        let rect = compute_relative_size(&properties, true, false, Point::ZERO, 100., 50.);
        assert_eq!(rect, LayoutRect::new(0., 0., 50., 25.));

        let mut properties = LayoutProperties::default();
        properties.width = Value::fixed(50.);
        let rect = compute_relative_size(&properties, false, true, Point::new(3., 4.), 100., 50.);
        assert_eq!(rect, LayoutRect::new(3., 4., 50., 25.));
    }

    #[test]
    fn relative_size_unchanged_otherwise() {
        let properties = LayoutProperties::default();
        let base = LayoutRect::new(0., 0., 100., 50.);
        assert_eq!(compute_relative_size(&properties, true, true, Point::ZERO, 100., 50.), base);
        assert_eq!(compute_relative_size(&properties, false, false, Point::ZERO, 100., 50.), base);
        // The other axis is not fixed.
        assert_eq!(compute_relative_size(&properties, true, false, Point::ZERO, 100., 50.), base);
    }

    #[test]
    fn rounded_dimensions() {
        let view = RecordingView::control();
        let mut delegate = bound(&view, DefaultSize::default());
        delegate.apply_computed_rect(&info(LayoutRect::new(1.4, 2.6, 30.5, 40.2)));
        assert_eq!(
            delegate.rect(),
            Dimension { x: 1, y: 3, width: 31, height: 40 }
        );
        assert_eq!(
            delegate.size(),
            Dimension { x: 0, y: 0, width: 31, height: 40 }
        );
    }
}
