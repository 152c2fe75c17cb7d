// Copyright 2025 the View Layout Authors
// SPDX-License-Identifier: Apache-2.0

//! Helpers for testing code built on the delegate without a native toolkit.

mod assert_debug_panics;
mod recording_view;

#[doc(hidden)]
pub use assert_debug_panics::assert_debug_panics_inner;
pub use recording_view::{NativeWrite, RecordedView, RecordingView};
