// Copyright 2025 the View Layout Authors
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::str::FromStr;

/// A unit of length accepted by layout inputs.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Unit {
    /// Device pixels.
    #[default]
    Px,
    /// Density-independent pixels: one pixel at 160 dpi.
    Dp,
    /// Typographic points, 1/72 of an inch.
    Pt,
    /// Inches.
    In,
    /// Millimeters.
    Mm,
    /// Centimeters.
    Cm,
}

impl Unit {
    /// Returns the unit matching a length suffix such as `"dp"`, if any.
    ///
    /// The match is ASCII case-insensitive, and `"dip"` is accepted as an alias of `"dp"`.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        let unit = match suffix.to_ascii_lowercase().as_str() {
            "px" => Self::Px,
            "dp" | "dip" => Self::Dp,
            "pt" => Self::Pt,
            "in" => Self::In,
            "mm" => Self::Mm,
            "cm" => Self::Cm,
            _ => return None,
        };
        Some(unit)
    }

    /// Converts `value` expressed in this unit to device pixels at `dpi`.
    pub fn to_px(self, value: f64, dpi: f64) -> f64 {
        match self {
            Self::Px => value,
            Self::Dp => value * dpi / 160.,
            Self::Pt => value * dpi / 72.,
            Self::In => value * dpi,
            Self::Mm => value * dpi / 25.4,
            Self::Cm => value * dpi / 2.54,
        }
    }
}

/// The error returned when parsing an unknown [`Unit`] name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownUnitError(pub String);

impl fmt::Display for UnknownUnitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown layout unit `{}`", self.0)
    }
}

impl std::error::Error for UnknownUnitError {}

impl FromStr for Unit {
    type Err = UnknownUnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_suffix(s.trim()).ok_or_else(|| UnknownUnitError(s.to_string()))
    }
}

/// Settings shared by every node of a [`LayoutTree`](crate::LayoutTree).
///
/// These decide how numeric layout inputs are converted to device pixels.
/// A host usually builds this once from its application properties, e.g. with
/// `"dp".parse::<Unit>()` for the default unit.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LayoutConfig {
    /// The unit used for numbers that carry no suffix.
    pub default_unit: Unit,
    /// The display density used for every unit other than [`Unit::Px`].
    pub dpi: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            default_unit: Unit::Px,
            dpi: 96.,
        }
    }
}

impl LayoutConfig {
    /// Returns a copy of this config with `default_unit` replaced.
    pub fn with_default_unit(mut self, default_unit: Unit) -> Self {
        self.default_unit = default_unit;
        self
    }

    /// Returns a copy of this config with `dpi` replaced.
    pub fn with_dpi(mut self, dpi: f64) -> Self {
        self.dpi = dpi;
        self
    }
}
