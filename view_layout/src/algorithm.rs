// Copyright 2025 the View Layout Authors
// SPDX-License-Identifier: Apache-2.0

//! The layout pass.
//!
//! The pass runs in two phases. First, every measured rectangle in the subtree
//! of the root is recomputed top-down, each parent arranging its children inside
//! its own measured bounds. Then the callback is invoked once per node, in pre-order,
//! so that a callback always sees the final geometry of its parent.

use kurbo::Size;
use tracing::{info_span, trace};

use crate::{LayoutRect, LayoutTree, LayoutType, NodeId, Value, ValueType, debug_panic};

/// What the layout callback learns about a node.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LayoutInfo<'a> {
    /// The node being reported.
    pub id: NodeId,
    /// The debug name of the node.
    pub name: &'a str,
    /// The measured rectangle, relative to the parent.
    pub rect: LayoutRect,
    /// The value type of the node's `width` input.
    pub width_type: ValueType,
    /// The value type of the node's `height` input.
    pub height_type: ValueType,
    /// The measured size of the parent, if the node has one.
    pub parent_measured: Option<Size>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

/// The inputs of one node along one axis.
struct AxisInputs {
    length: Value,
    min: Value,
    default_type: ValueType,
    lead: Value,
    trail: Value,
    center: Value,
}

/// Converts an offset input to pixels, if it is set.
fn offset(value: Value, available: f64) -> Option<f64> {
    match value.value_type {
        ValueType::Fixed => Some(value.value),
        ValueType::Percent => Some(value.value / 100. * available),
        _ => None,
    }
}

fn pick(size: Size, axis: Axis) -> f64 {
    match axis {
        Axis::Horizontal => size.width,
        Axis::Vertical => size.height,
    }
}

impl<T> LayoutTree<T> {
    /// Runs the layout algorithm on the subtree of `root`.
    ///
    /// A root with bounds (see [`set_root_bounds`](Self::set_root_bounds)) is measured as
    /// `(0, 0, bounds)`; any other node keeps its current measured rectangle and only
    /// its descendants are recomputed.
    ///
    /// `on_layout` is then invoked once per node of the subtree, root included.
    pub fn layout(&mut self, root: NodeId, mut on_layout: impl FnMut(&mut T, &LayoutInfo<'_>)) {
        let _span = info_span!("layout", root = %root).entered();
        let Some(node) = self.nodes.get_mut(&root) else {
            debug_panic!("layout: node {root} is not in the layout tree");
            return;
        };
        if let Some(bounds) = node.root_bounds {
            node.element.measured = LayoutRect::new(0., 0., bounds.width, bounds.height);
        }
        self.arrange_subtree(root);

        for id in self.subtree_preorder(root) {
            let parent_measured = self
                .parent(id)
                .and_then(|parent| self.nodes.get(&parent))
                .map(|parent| parent.element.measured.size());
            let Some(node) = self.nodes.get_mut(&id) else {
                continue;
            };
            let info = LayoutInfo {
                id,
                name: &node.name,
                rect: node.element.measured,
                width_type: node.properties.width.value_type,
                height_type: node.properties.height.value_type,
                parent_measured,
            };
            trace!("Laid out {} ({}) at {:?}", info.name, id, info.rect);
            on_layout(&mut node.data, &info);
        }
    }

    fn arrange_subtree(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let layout_type = node.element.layout_type;
        let bounds = node.element.measured.size();
        let children = node.children.clone();

        let frames = self.arrange(layout_type, bounds, &children);
        for (child, frame) in children.iter().zip(frames) {
            if let Some(child_node) = self.nodes.get_mut(child) {
                child_node.element.measured = frame;
            }
            self.arrange_subtree(*child);
        }
    }

    /// Computes the frames of `children` inside a parent of the given bounds.
    fn arrange(&self, layout_type: LayoutType, bounds: Size, children: &[NodeId]) -> Vec<LayoutRect> {
        let mut frames = Vec::with_capacity(children.len());
        let mut cursor = 0.;
        let pinned = layout_type.pinned_axes();
        for &child in children {
            let frame = match layout_type {
                LayoutType::Composite => {
                    let size = self.resolve_size(child, bounds, bounds, pinned);
                    LayoutRect::new(
                        self.position(child, Axis::Horizontal, bounds.width, size.width),
                        self.position(child, Axis::Vertical, bounds.height, size.height),
                        size.width,
                        size.height,
                    )
                }
                LayoutType::Vertical => {
                    let inputs = self.axis_inputs(child, Axis::Vertical);
                    let top = offset(inputs.lead, bounds.height).unwrap_or(0.);
                    let bottom = offset(inputs.trail, bounds.height).unwrap_or(0.);
                    let remaining = Size::new(bounds.width, (bounds.height - cursor).max(0.));
                    let size = self.resolve_size(child, bounds, remaining, pinned);
                    let y = cursor + top;
                    cursor = y + size.height + bottom;
                    LayoutRect::new(
                        self.position(child, Axis::Horizontal, bounds.width, size.width),
                        y,
                        size.width,
                        size.height,
                    )
                }
                LayoutType::Horizontal => {
                    let inputs = self.axis_inputs(child, Axis::Horizontal);
                    let left = offset(inputs.lead, bounds.width).unwrap_or(0.);
                    let right = offset(inputs.trail, bounds.width).unwrap_or(0.);
                    let remaining = Size::new((bounds.width - cursor).max(0.), bounds.height);
                    let size = self.resolve_size(child, bounds, remaining, pinned);
                    let x = cursor + left;
                    cursor = x + size.width + right;
                    LayoutRect::new(
                        x,
                        self.position(child, Axis::Vertical, bounds.height, size.height),
                        size.width,
                        size.height,
                    )
                }
            };
            frames.push(frame);
        }
        frames
    }

    fn axis_inputs(&self, id: NodeId, axis: Axis) -> AxisInputs {
        let props = &self.nodes[&id].properties;
        match axis {
            Axis::Horizontal => AxisInputs {
                length: props.width,
                min: props.min_width,
                default_type: props.default_width_type,
                lead: props.left,
                trail: props.right,
                center: props.center_x,
            },
            Axis::Vertical => AxisInputs {
                length: props.height,
                min: props.min_height,
                default_type: props.default_height_type,
                lead: props.top,
                trail: props.bottom,
                center: props.center_y,
            },
        }
    }

    /// Returns the value type that decides the node's length along `axis`.
    ///
    /// A pinned axis is one where both offsets constrain the node, as opposed to the
    /// stacking axis of a vertical or horizontal parent where they act as margins.
    fn effective_type(inputs: &AxisInputs, pinned: bool) -> ValueType {
        let pinned = pinned && inputs.lead.is_length() && inputs.trail.is_length();
        inputs.length.value_type.resolve(inputs.default_type, pinned)
    }

    /// Resolves the size of `id` inside a parent offering `available`.
    ///
    /// `remaining` is the space left along the stacking axis, which is what fill uses there.
    fn resolve_size(&self, id: NodeId, available: Size, remaining: Size, pinned: (bool, bool)) -> Size {
        let horizontal = self.axis_inputs(id, Axis::Horizontal);
        let vertical = self.axis_inputs(id, Axis::Vertical);
        let width_type = Self::effective_type(&horizontal, pinned.0);
        let height_type = Self::effective_type(&vertical, pinned.1);

        let margins = |inputs: &AxisInputs, available: f64| {
            offset(inputs.lead, available).unwrap_or(0.) + offset(inputs.trail, available).unwrap_or(0.)
        };
        let content = if width_type == ValueType::Size || height_type == ValueType::Size {
            let inner = Size::new(
                (available.width - margins(&horizontal, available.width)).max(0.),
                (available.height - margins(&vertical, available.height)).max(0.),
            );
            self.content_extent(id, inner)
        } else {
            Size::ZERO
        };

        let resolve = |inputs: &AxisInputs, value_type: ValueType, axis: Axis| {
            let available = pick(available, axis);
            let length = match value_type {
                ValueType::Fixed => inputs.length.value,
                ValueType::Percent => inputs.length.value / 100. * available,
                ValueType::Fill => (pick(remaining, axis) - margins(inputs, available)).max(0.),
                ValueType::Size | ValueType::None => pick(content, axis),
            };
            match offset(inputs.min, available) {
                Some(min) => length.max(min),
                None => length,
            }
        };

        Size::new(
            resolve(&horizontal, width_type, Axis::Horizontal),
            resolve(&vertical, height_type, Axis::Vertical),
        )
    }

    /// Measures how much room the children of `id` need inside `available`.
    ///
    /// A leaf has no content of its own: its size is reported by whoever draws it.
    fn content_extent(&self, id: NodeId, available: Size) -> Size {
        let node = &self.nodes[&id];
        let mut extent = Size::ZERO;
        let mut cursor = 0.;
        let pinned = node.element.layout_type.pinned_axes();
        for &child in &node.children {
            let horizontal = self.axis_inputs(child, Axis::Horizontal);
            let vertical = self.axis_inputs(child, Axis::Vertical);
            let left = offset(horizontal.lead, available.width).unwrap_or(0.);
            let right = offset(horizontal.trail, available.width).unwrap_or(0.);
            let top = offset(vertical.lead, available.height).unwrap_or(0.);
            let bottom = offset(vertical.trail, available.height).unwrap_or(0.);

            match node.element.layout_type {
                LayoutType::Composite => {
                    let size = self.resolve_size(child, available, available, pinned);
                    extent.width = extent.width.max(left + size.width + right);
                    extent.height = extent.height.max(top + size.height + bottom);
                }
                LayoutType::Vertical => {
                    let remaining = Size::new(available.width, (available.height - cursor).max(0.));
                    let size = self.resolve_size(child, available, remaining, pinned);
                    cursor += top + size.height + bottom;
                    extent.width = extent.width.max(left + size.width + right);
                    extent.height = cursor;
                }
                LayoutType::Horizontal => {
                    let remaining = Size::new((available.width - cursor).max(0.), available.height);
                    let size = self.resolve_size(child, available, remaining, pinned);
                    cursor += left + size.width + right;
                    extent.width = cursor;
                    extent.height = extent.height.max(top + size.height + bottom);
                }
            }
        }
        extent
    }

    /// Positions a node of the given length along a pinned axis.
    fn position(&self, id: NodeId, axis: Axis, available: f64, length: f64) -> f64 {
        let inputs = self.axis_inputs(id, axis);
        if let Some(lead) = offset(inputs.lead, available) {
            lead
        } else if let Some(trail) = offset(inputs.trail, available) {
            available - trail - length
        } else if let Some(center) = offset(inputs.center, available) {
            center - length / 2.
        } else {
            (available - length) / 2.
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InputProperty, ValueName};

    fn tree_with_root(width: f64, height: f64) -> (LayoutTree<Vec<LayoutRect>>, NodeId) {
        let mut tree = LayoutTree::default();
        let root = tree.insert("root", Vec::new());
        tree.set_root_bounds(root, Size::new(width, height));
        (tree, root)
    }

    fn child(tree: &mut LayoutTree<Vec<LayoutRect>>, parent: NodeId, inputs: &[(ValueName, &str)]) -> NodeId {
        let id = tree.insert("child", Vec::new());
        let inputs: Vec<_> = inputs
            .iter()
            .map(|(name, value)| InputProperty::new(*name, value))
            .collect();
        tree.populate_layout_properties(id, &inputs);
        tree.add_child(parent, id);
        id
    }

    fn measured(tree: &LayoutTree<Vec<LayoutRect>>, id: NodeId) -> LayoutRect {
        tree.get(id).unwrap().element.measured
    }

    #[test]
    fn composite_centers_unpositioned_children() {
        let (mut tree, root) = tree_with_root(200., 100.);
        let id = child(&mut tree, root, &[(ValueName::Width, "50"), (ValueName::Height, "20")]);
        tree.layout(root, |_, _| {});
        assert_eq!(measured(&tree, id), LayoutRect::new(75., 40., 50., 20.));
    }

    #[test]
    fn composite_offsets_and_fill() {
        let (mut tree, root) = tree_with_root(200., 100.);
        let pinned = child(
            &mut tree,
            root,
            &[
                (ValueName::Left, "10"),
                (ValueName::Right, "20"),
                (ValueName::Bottom, "5"),
                (ValueName::Height, "30"),
            ],
        );
        let filled = child(&mut tree, root, &[(ValueName::Width, "UI.FILL"), (ValueName::Height, "50%")]);
        tree.layout(root, |_, _| {});
        assert_eq!(measured(&tree, pinned), LayoutRect::new(10., 65., 170., 30.));
        assert_eq!(measured(&tree, filled), LayoutRect::new(0., 25., 200., 50.));
    }

    #[test]
    fn vertical_stacks_with_margins() {
        let (mut tree, root) = tree_with_root(100., 300.);
        tree.get_mut(root).unwrap().element.layout_type = LayoutType::Vertical;
        let first = child(
            &mut tree,
            root,
            &[(ValueName::Top, "10"), (ValueName::Height, "40"), (ValueName::Width, "100")],
        );
        let second = child(
            &mut tree,
            root,
            &[(ValueName::Top, "5"), (ValueName::Height, "UI.FILL"), (ValueName::Width, "50")],
        );
        tree.layout(root, |_, _| {});
        assert_eq!(measured(&tree, first), LayoutRect::new(0., 10., 100., 40.));
        assert_eq!(measured(&tree, second), LayoutRect::new(25., 55., 50., 245.));
    }

    #[test]
    fn horizontal_flows_left_to_right() {
        let (mut tree, root) = tree_with_root(300., 100.);
        tree.get_mut(root).unwrap().element.layout_type = LayoutType::Horizontal;
        let first = child(&mut tree, root, &[(ValueName::Width, "100"), (ValueName::Height, "20")]);
        let second = child(
            &mut tree,
            root,
            &[(ValueName::Left, "10"), (ValueName::Width, "UI.FILL"), (ValueName::Top, "0"), (ValueName::Height, "10")],
        );
        tree.layout(root, |_, _| {});
        assert_eq!(measured(&tree, first), LayoutRect::new(0., 40., 100., 20.));
        assert_eq!(measured(&tree, second), LayoutRect::new(110., 0., 190., 10.));
    }

    #[test]
    fn size_to_content_wraps_children() {
        let (mut tree, root) = tree_with_root(400., 400.);
        let container = child(
            &mut tree,
            root,
            &[(ValueName::Left, "0"), (ValueName::Top, "0"), (ValueName::Width, "UI.SIZE"), (ValueName::Height, "UI.SIZE")],
        );
        tree.get_mut(container).unwrap().element.layout_type = LayoutType::Vertical;
        child(&mut tree, container, &[(ValueName::Width, "80"), (ValueName::Height, "30")]);
        child(&mut tree, container, &[(ValueName::Width, "120"), (ValueName::Height, "20"), (ValueName::Top, "10")]);
        tree.layout(root, |_, _| {});
        assert_eq!(measured(&tree, container), LayoutRect::new(0., 0., 120., 60.));
    }

    #[test]
    fn leaf_sized_to_content_measures_zero() {
        let (mut tree, root) = tree_with_root(100., 100.);
        let id = child(&mut tree, root, &[]);
        tree.layout(root, |_, _| {});
        assert_eq!(measured(&tree, id).size(), Size::ZERO);
    }

    #[test]
    fn minimums_clamp() {
        let (mut tree, root) = tree_with_root(100., 100.);
        let id = child(
            &mut tree,
            root,
            &[(ValueName::Width, "10"), (ValueName::MinWidth, "30"), (ValueName::Height, "10")],
        );
        tree.layout(root, |_, _| {});
        assert_eq!(measured(&tree, id).width, 30.);
    }

    #[test]
    fn callback_runs_in_preorder_with_parent_size() {
        let (mut tree, root) = tree_with_root(200., 200.);
        let outer = child(&mut tree, root, &[(ValueName::Width, "100"), (ValueName::Height, "100")]);
        let inner = child(&mut tree, outer, &[(ValueName::Width, "10"), (ValueName::Height, "10")]);

        let mut seen = Vec::new();
        tree.layout(root, |rects, info| {
            rects.push(info.rect);
            seen.push((info.id, info.parent_measured));
        });
        assert_eq!(
            seen,
            vec![
                (root, None),
                (outer, Some(Size::new(200., 200.))),
                (inner, Some(Size::new(100., 100.))),
            ]
        );
        assert_eq!(tree.data(inner).unwrap(), &vec![LayoutRect::new(45., 45., 10., 10.)]);
    }
}
