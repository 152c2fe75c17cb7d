// Copyright 2025 the View Layout Authors
// SPDX-License-Identifier: Apache-2.0

//! View Layout is a small constraint and measurement engine for retained-mode view trees.
//!
//! Each node of a [`LayoutTree`] carries declarative inputs per axis
//! (`width`, `height`, `top`, `left`, ...), each of which can be a fixed length,
//! a percentage of the parent, a request to fill the parent, or a request to size
//! to content. The layout pass turns these inputs into one measured rectangle per node,
//! relative to the node's parent, and reports each rectangle to a callback.
//!
//! The tree is an arena: nodes are addressed by [`NodeId`], parents own an ordered list
//! of child ids, and children keep their parent's id as a back-reference.
//!
//! ```
//! use kurbo::Size;
//! use view_layout::{InputProperty, LayoutTree, ValueName};
//!
//! let mut tree = LayoutTree::default();
//! let window = tree.insert("window", ());
//! tree.set_root_bounds(window, Size::new(320., 480.));
//!
//! let banner = tree.insert("banner", ());
//! tree.populate_layout_properties(
//!     banner,
//!     &[
//!         InputProperty::new(ValueName::Top, "0"),
//!         InputProperty::new(ValueName::Width, "UI.FILL"),
//!         InputProperty::new(ValueName::Height, "10%"),
//!     ],
//! );
//! tree.add_child(window, banner);
//!
//! let root = tree.request_layout(banner).unwrap();
//! tree.layout(root, |_, info| println!("{} -> {:?}", info.name, info.rect));
//! assert_eq!(tree.get(banner).unwrap().element.measured.height, 48.);
//! ```

// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET

pub use kurbo;

#[macro_use]
pub mod util;

mod algorithm;
mod config;
mod rect;
mod tree;
mod value;

pub use algorithm::LayoutInfo;
pub use config::{LayoutConfig, Unit, UnknownUnitError};
pub use rect::LayoutRect;
pub use tree::{Element, LayoutNode, LayoutTree, LayoutType, NodeId};
pub use value::{
    FILL_TOKEN, InputProperty, LayoutProperties, SIZE_TOKEN, Value, ValueName, ValueParseError,
    ValueType,
};
