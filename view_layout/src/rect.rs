// Copyright 2025 the View Layout Authors
// SPDX-License-Identifier: Apache-2.0

use kurbo::{Point, Size};

/// A rectangle as measured by the layout pass, relative to the parent node.
///
/// Unlike [`kurbo::Rect`], the width and height are stored as given and are never
/// normalized, so a negative size survives until a consumer decides what to do with it.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[expect(missing_docs, reason = "field names are self-descriptive")]
pub struct LayoutRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LayoutRect {
    /// The empty rectangle at the origin.
    pub const ZERO: Self = Self::new(0., 0., 0., 0.);

    /// Creates a new rectangle.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle from an origin and a size.
    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// Returns `true` if the rectangle covers no area.
    pub fn is_empty(&self) -> bool {
        self.width <= 0. || self.height <= 0.
    }

    /// The top-left corner.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// The width and height.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}
