// Copyright 2025 the View Layout Authors
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

use hashbrown::HashMap;
use kurbo::Size;
use smallvec::SmallVec;
use tracing::warn;

use crate::util::Sanitize;
use crate::{InputProperty, LayoutConfig, LayoutProperties, LayoutRect, Value, debug_panic};

/// A unique identifier for a node of a [`LayoutTree`].
///
/// Ids are allocated from a process-wide counter and are never reused.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct NodeId(NonZeroU64);

impl NodeId {
    pub(crate) fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        // An u64 counter won't overflow.
        Self(NonZeroU64::new(id).unwrap())
    }

    /// Returns the integer value of the id.
    pub fn to_raw(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a node stacks its children.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum LayoutType {
    /// Children are positioned independently of each other.
    #[default]
    Composite,
    /// Children are stacked top to bottom.
    Vertical,
    /// Children are placed left to right.
    Horizontal,
}

impl LayoutType {
    /// Whether the offsets of a child constrain its horizontal and vertical axis.
    ///
    /// Along the stacking axis of a vertical or horizontal parent they act as margins.
    pub fn pinned_axes(self) -> (bool, bool) {
        match self {
            Self::Composite => (true, true),
            Self::Vertical => (true, false),
            Self::Horizontal => (false, true),
        }
    }
}

/// The resolved part of a node.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Element {
    /// How the node stacks its children.
    pub layout_type: LayoutType,
    /// The rectangle computed by the last layout pass that reached this node.
    ///
    /// This is zero until then.
    pub measured: LayoutRect,
}

/// A node of a [`LayoutTree`].
#[derive(Debug)]
pub struct LayoutNode<T> {
    /// A debug name reported to the layout callback.
    pub name: String,
    /// The declarative inputs.
    pub properties: LayoutProperties,
    /// The resolved layout type and measured rectangle.
    pub element: Element,
    /// The payload attached by the owner of the node.
    pub data: T,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: SmallVec<[NodeId; 8]>,
    pub(crate) root_bounds: Option<Size>,
}

impl<T> LayoutNode<T> {
    /// The parent of this node, if any.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The children of this node, in layout order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// The bounds of this node if it is a layout root.
    pub fn root_bounds(&self) -> Option<Size> {
        self.root_bounds
    }
}

/// An arena of layout nodes.
///
/// Nodes are addressed by [`NodeId`]. A parent owns the ordered list of its children's ids;
/// each child keeps the id of its parent as a back-reference.
/// Nodes without a parent are either layout roots (see [`set_root_bounds`](Self::set_root_bounds))
/// or detached.
#[derive(Debug)]
pub struct LayoutTree<T> {
    pub(crate) nodes: HashMap<NodeId, LayoutNode<T>>,
    pub(crate) config: LayoutConfig,
}

impl<T> Default for LayoutTree<T> {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl<T> LayoutTree<T> {
    /// Creates an empty tree.
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            nodes: HashMap::new(),
            config,
        }
    }

    /// The config used to parse layout inputs.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Inserts a new detached node and returns its id.
    pub fn insert(&mut self, name: impl Into<String>, data: T) -> NodeId {
        let id = NodeId::next();
        self.nodes.insert(
            id,
            LayoutNode {
                name: name.into(),
                properties: LayoutProperties::default(),
                element: Element::default(),
                data,
                parent: None,
                children: SmallVec::new(),
                root_bounds: None,
            },
        );
        id
    }

    /// Returns the number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the arena holds no node.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns `true` if `id` is in the arena.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Returns the node with the given id.
    pub fn get(&self, id: NodeId) -> Option<&LayoutNode<T>> {
        self.nodes.get(&id)
    }

    /// Returns the node with the given id.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut LayoutNode<T>> {
        self.nodes.get_mut(&id)
    }

    /// Returns the payload of the node with the given id.
    pub fn data(&self, id: NodeId) -> Option<&T> {
        self.nodes.get(&id).map(|node| &node.data)
    }

    /// Returns the payload of the node with the given id.
    pub fn data_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.nodes.get_mut(&id).map(|node| &mut node.data)
    }

    /// Returns the parent of `id`.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }

    /// Returns the children of `id`, or an empty slice if the node doesn't exist.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    /// Returns `true` if `ancestor` is `id` or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if node_id == ancestor {
                return true;
            }
            current = self.parent(node_id);
        }
        false
    }

    /// Appends `child` to the children of `parent`.
    ///
    /// If `child` already has a parent, it is moved.
    /// Returns `false` and leaves the tree untouched if either node is missing
    /// or if the insertion would create a cycle.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.contains(parent) || !self.contains(child) {
            debug_panic!("add_child: node {parent} or {child} is not in the layout tree");
            return false;
        }
        if self.is_ancestor_or_self(child, parent) {
            debug_panic!("add_child: adding {child} under {parent} would create a cycle");
            return false;
        }

        if let Some(old_parent) = self.parent(child) {
            self.remove_child(old_parent, child);
        }
        self.nodes.get_mut(&child).unwrap().parent = Some(parent);
        self.nodes.get_mut(&parent).unwrap().children.push(child);
        true
    }

    /// Detaches `child` from `parent`.
    ///
    /// Returns `false` if `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let Some(parent_node) = self.nodes.get_mut(&parent) else {
            return false;
        };
        let Some(index) = parent_node.children.iter().position(|id| *id == child) else {
            return false;
        };
        parent_node.children.remove(index);
        if let Some(child_node) = self.nodes.get_mut(&child) {
            child_node.parent = None;
        }
        true
    }

    /// Removes `id` and its whole subtree from the arena.
    ///
    /// Returns the removed payloads, the node itself first.
    pub fn remove(&mut self, id: NodeId) -> Vec<(NodeId, T)> {
        if let Some(parent) = self.parent(id) {
            self.remove_child(parent, id);
        }
        self.subtree_preorder(id)
            .into_iter()
            .filter_map(|node_id| {
                self.nodes
                    .remove(&node_id)
                    .map(|node| (node_id, node.data))
            })
            .collect()
    }

    /// Returns the ids of `id` and its descendants in pre-order.
    pub fn subtree_preorder(&self, id: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(node_id) = stack.pop() {
            let Some(node) = self.nodes.get(&node_id) else {
                continue;
            };
            order.push(node_id);
            stack.extend(node.children.iter().rev().copied());
        }
        order
    }

    /// Parses each input and stores it on the node.
    ///
    /// Inputs that fail to parse are logged and reset the property to unset.
    pub fn populate_layout_properties(&mut self, id: NodeId, inputs: &[InputProperty<'_>]) {
        let config = self.config;
        let Some(node) = self.nodes.get_mut(&id) else {
            debug_panic!("populate_layout_properties: node {id} is not in the layout tree");
            return;
        };
        for input in inputs {
            let value = match Value::parse(input.value, &config) {
                Ok(value) => value,
                Err(err) => {
                    warn!(node = %id, property = ?input.name, "{err}");
                    Value::NONE
                }
            };
            *node.properties.get_mut(input.name) = value;
        }
    }

    /// Marks `id` as a layout root with the given bounds.
    pub fn set_root_bounds(&mut self, id: NodeId, bounds: Size) {
        let Some(node) = self.nodes.get_mut(&id) else {
            debug_panic!("set_root_bounds: node {id} is not in the layout tree");
            return;
        };
        node.root_bounds = Some(Size::new(
            bounds.width.sanitize("root width"),
            bounds.height.sanitize("root height"),
        ));
    }

    /// Walks up from `id` to the top of its tree.
    ///
    /// Returns the topmost ancestor if it is a layout root, and `None` if the node is
    /// detached from any root.
    pub fn request_layout(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        loop {
            let node = self.nodes.get(&current)?;
            match node.parent {
                Some(parent) => current = parent,
                None => return node.root_bounds.map(|_| current),
            }
        }
    }
}
