// Copyright 2025 the View Layout Authors
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use crate::LayoutConfig;
use crate::config::Unit;

/// The token a layout input uses to request sizing to content.
pub const SIZE_TOKEN: &str = "UI.SIZE";
/// The token a layout input uses to request filling the parent.
pub const FILL_TOKEN: &str = "UI.FILL";

/// How a [`Value`] should be interpreted.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// The property was never set, or was set to `auto`.
    #[default]
    None,
    /// A length in device pixels.
    Fixed,
    /// A percentage of the parent's length.
    Percent,
    /// Occupy the space the parent makes available.
    Fill,
    /// Derive the length from the content.
    Size,
}

impl ValueType {
    /// Resolves the type that decides a length, `self` being the node's own input.
    ///
    /// An unset input falls back to fill when both offsets pin the axis, then to
    /// `default_type`. Without either, the length follows the content.
    pub fn resolve(self, default_type: Self, pinned: bool) -> Self {
        match (self, default_type) {
            (Self::None, _) if pinned => Self::Fill,
            (Self::None, Self::None) => Self::Size,
            (Self::None, default_type) => default_type,
            (value_type, _) => value_type,
        }
    }
}

/// A single declarative layout value.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Value {
    /// Pixels for [`ValueType::Fixed`], percent for [`ValueType::Percent`], otherwise zero.
    pub value: f64,
    /// How `value` is interpreted.
    pub value_type: ValueType,
}

impl Value {
    /// An unset value.
    pub const NONE: Self = Self {
        value: 0.,
        value_type: ValueType::None,
    };

    /// A fixed length in device pixels.
    pub const fn fixed(value: f64) -> Self {
        Self {
            value,
            value_type: ValueType::Fixed,
        }
    }

    /// A percentage of the parent's length.
    pub const fn percent(value: f64) -> Self {
        Self {
            value,
            value_type: ValueType::Percent,
        }
    }

    /// The fill sentinel.
    pub const fn fill() -> Self {
        Self {
            value: 0.,
            value_type: ValueType::Fill,
        }
    }

    /// The size-to-content sentinel.
    pub const fn size() -> Self {
        Self {
            value: 0.,
            value_type: ValueType::Size,
        }
    }

    /// Returns `true` unless the value is unset.
    pub fn is_set(&self) -> bool {
        self.value_type != ValueType::None
    }

    /// Returns `true` for a fixed length or a percentage, the values an offset accepts.
    pub fn is_length(&self) -> bool {
        matches!(self.value_type, ValueType::Fixed | ValueType::Percent)
    }

    /// Parses a layout input string.
    ///
    /// Accepts [`SIZE_TOKEN`], [`FILL_TOKEN`], `auto` or an empty string (unset),
    /// a percentage such as `"50%"`, and a number with an optional unit suffix
    /// (`px`, `dp`, `dip`, `pt`, `in`, `mm`, `cm`). Numbers without a suffix use
    /// the default unit of `config`.
    pub fn parse(input: &str, config: &LayoutConfig) -> Result<Self, ValueParseError> {
        let input = input.trim();
        if input.is_empty() || input.eq_ignore_ascii_case("auto") {
            return Ok(Self::NONE);
        }
        if input == SIZE_TOKEN {
            return Ok(Self::size());
        }
        if input == FILL_TOKEN {
            return Ok(Self::fill());
        }

        if let Some(percent) = input.strip_suffix('%') {
            let value = parse_number(percent, input)?;
            return Ok(Self::percent(value));
        }

        let split = input
            .find(|c: char| c.is_ascii_alphabetic())
            .unwrap_or(input.len());
        let (number, suffix) = input.split_at(split);
        if number.trim().is_empty() {
            return Err(ValueParseError::InvalidNumber(input.to_string()));
        }
        let unit = if suffix.is_empty() {
            config.default_unit
        } else {
            Unit::from_suffix(suffix).ok_or_else(|| ValueParseError::UnknownUnit {
                input: input.to_string(),
                unit: suffix.to_string(),
            })?
        };
        let value = parse_number(number, input)?;
        Ok(Self::fixed(unit.to_px(value, config.dpi)))
    }
}

fn parse_number(number: &str, input: &str) -> Result<f64, ValueParseError> {
    match number.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ValueParseError::InvalidNumber(input.to_string())),
    }
}

/// The error returned by [`Value::parse`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValueParseError {
    /// The numeric part of the input is not a finite number.
    InvalidNumber(String),
    /// The input carries a suffix which is not a known unit.
    UnknownUnit {
        /// The whole input.
        input: String,
        /// The unrecognized suffix.
        unit: String,
    },
}

impl fmt::Display for ValueParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidNumber(input) => write!(f, "`{input}` is not a valid layout value"),
            Self::UnknownUnit { input, unit } => {
                write!(f, "`{input}` uses unknown unit `{unit}`")
            }
        }
    }
}

impl std::error::Error for ValueParseError {}

/// The name of a declarative layout property.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[expect(missing_docs, reason = "variant names are self-descriptive")]
pub enum ValueName {
    Width,
    Height,
    MinWidth,
    MinHeight,
    Top,
    Left,
    Bottom,
    Right,
    CenterX,
    CenterY,
}

/// One named input handed to [`LayoutTree::populate_layout_properties`].
///
/// [`LayoutTree::populate_layout_properties`]: crate::LayoutTree::populate_layout_properties
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InputProperty<'a> {
    /// Which property to set.
    pub name: ValueName,
    /// The unparsed input.
    pub value: &'a str,
}

impl<'a> InputProperty<'a> {
    /// Creates a new input.
    pub fn new(name: ValueName, value: &'a str) -> Self {
        Self { name, value }
    }
}

/// The declarative layout inputs of a node.
#[derive(Clone, Debug, Default, PartialEq)]
#[expect(missing_docs, reason = "field names are self-descriptive")]
pub struct LayoutProperties {
    pub top: Value,
    pub left: Value,
    pub bottom: Value,
    pub right: Value,
    pub center_x: Value,
    pub center_y: Value,
    pub width: Value,
    pub height: Value,
    pub min_width: Value,
    pub min_height: Value,
    /// Used in place of `width` when it is unset.
    pub default_width_type: ValueType,
    /// Used in place of `height` when it is unset.
    pub default_height_type: ValueType,
}

impl LayoutProperties {
    /// Returns the slot for `name`.
    pub fn get(&self, name: ValueName) -> &Value {
        match name {
            ValueName::Width => &self.width,
            ValueName::Height => &self.height,
            ValueName::MinWidth => &self.min_width,
            ValueName::MinHeight => &self.min_height,
            ValueName::Top => &self.top,
            ValueName::Left => &self.left,
            ValueName::Bottom => &self.bottom,
            ValueName::Right => &self.right,
            ValueName::CenterX => &self.center_x,
            ValueName::CenterY => &self.center_y,
        }
    }

    /// Returns the mutable slot for `name`.
    pub fn get_mut(&mut self, name: ValueName) -> &mut Value {
        match name {
            ValueName::Width => &mut self.width,
            ValueName::Height => &mut self.height,
            ValueName::MinWidth => &mut self.min_width,
            ValueName::MinHeight => &mut self.min_height,
            ValueName::Top => &mut self.top,
            ValueName::Left => &mut self.left,
            ValueName::Bottom => &mut self.bottom,
            ValueName::Right => &mut self.right,
            ValueName::CenterX => &mut self.center_x,
            ValueName::CenterY => &mut self.center_y,
        }
    }
}
