// Copyright 2025 the View Layout Authors
// SPDX-License-Identifier: Apache-2.0

//! View Delegate connects a [`view_layout`] tree to a native retained-mode view tree.
//!
//! Every widget gets a [`LayoutDelegate`], stored as the payload of its layout node
//! inside a [`ViewHost`]. The host:
//!
//! - binds each delegate to a [`NativeView`] exactly once,
//! - lays out the tree when native views load or change size, and writes the
//!   computed geometry back onto the native views without redundant writes,
//! - translates [`Animation`] descriptors into native [`Timeline`]s,
//! - queues [`ViewEvent`]s for the script side.
//!
//! Colors given by name or hex code are resolved with [`resolve_color`].
//!
//! ```
//! use kurbo::Size;
//! use view_delegate::testing::RecordingView;
//! use view_delegate::{DefaultSize, ViewHost};
//!
//! let mut host = ViewHost::new();
//! let window = host.create_delegate("window", DefaultSize::FILL);
//! host.bind(window, RecordingView::panel());
//! host.set_root_bounds(window, Size::new(320., 480.));
//!
//! let button = host.create_delegate("button", DefaultSize::default());
//! host.bind(button, RecordingView::control());
//! host.set_width(button, "100");
//! host.set_height(button, "40");
//! host.set_top(button, "10");
//! host.add(window, button);
//!
//! host.on_native_loaded(window);
//! let rect = host.rect(button);
//! assert_eq!((rect.x, rect.y, rect.width, rect.height), (110, 10, 100, 40));
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
pub use peniko;
pub use view_layout;

pub mod animation;
pub mod color;
pub mod testing;
pub mod tracing_backend;

mod delegate;
mod event;
mod host;
mod native;

pub use animation::{Animation, AnimationId, Timeline, TimelineId};
pub use color::resolve_color;
pub use delegate::{DefaultSize, Dimension, LayoutDelegate, SizePolicy, ViewProperties};
pub use event::{EventFlags, UnknownEventError, ViewEvent};
pub use host::{CompletionCallback, ViewHost, ViewId};
pub use native::{NativeEvent, NativeView, RenderTransform, ViewCapability};
