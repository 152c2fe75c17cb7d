// Copyright 2025 the View Layout Authors
// SPDX-License-Identifier: Apache-2.0

/// Checks that the given expression panics in debug mode. No-op in release mode.
///
/// Used to test the `debug_panic!` paths of the [`ViewHost`](crate::ViewHost),
/// such as operations on a destroyed view.
#[macro_export]
macro_rules! assert_debug_panics {
    ($expr:expr) => {
        $crate::testing::assert_debug_panics_inner(
            || {
                $expr;
            },
            "".into(),
        )
    };

    ($expr:expr, $needle:expr) => {
        $crate::testing::assert_debug_panics_inner(
            || {
                $expr;
            },
            ($needle).to_string(),
        )
    };
}

use std::panic::{AssertUnwindSafe, catch_unwind};

#[track_caller]
#[doc(hidden)]
pub fn assert_debug_panics_inner(callback: impl FnOnce(), needle: String) {
    if cfg!(not(debug_assertions)) {
        return;
    }

    // Only used in tests; unwind safety here is about logic, not memory.
    let res = catch_unwind(AssertUnwindSafe(callback));
    let Err(err) = res else {
        panic!("expression did not panic");
    };

    let message = if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else {
        panic!("panic payload is neither &str nor String");
    };

    assert!(
        message.contains(&needle),
        "panic message `{message}` does not contain `{needle}`"
    );
}
