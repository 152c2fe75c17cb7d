// Copyright 2025 the View Layout Authors
// SPDX-License-Identifier: Apache-2.0

//! Events a view reports to its script-facing owner.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;

use crate::animation::AnimationId;
use crate::host::ViewId;

/// An event queued by the [`ViewHost`](crate::ViewHost).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ViewEvent {
    /// The view received keyboard focus.
    Focus {
        /// The focused view.
        source: ViewId,
    },
    /// A layout pass requested from this view finished.
    PostLayout {
        /// The view whose request triggered the pass.
        source: ViewId,
    },
    /// An animation started.
    AnimationStart {
        /// The animation.
        animation: AnimationId,
    },
    /// An animation finished.
    AnimationComplete {
        /// The animation.
        animation: AnimationId,
    },
}

bitflags! {
    /// The optional events a view currently reports.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct EventFlags: u8 {
        /// `focus` events.
        const FOCUS = 1 << 0;
        /// `postlayout` events.
        const POSTLAYOUT = 1 << 1;
    }
}

/// The error returned when an event name is not one a view can report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownEventError(pub String);

impl fmt::Display for UnknownEventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown event `{}`", self.0)
    }
}

impl std::error::Error for UnknownEventError {}

impl FromStr for EventFlags {
    type Err = UnknownEventError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "focus" => Ok(Self::FOCUS),
            "postlayout" => Ok(Self::POSTLAYOUT),
            _ => Err(UnknownEventError(name.to_string())),
        }
    }
}
