//! Length primitives for computed style values.
//!
//! Style values stay in authored CSS pixels (`f32`); the layout crate
//! converts to fixed-point units at the point of use.

use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub enum Length {
    Px(f32),
    Percent(f32),
    #[default]
    Auto,
}

impl Length {
    pub fn is_auto(&self) -> bool {
        matches!(self, Length::Auto)
    }

    pub fn is_percent(&self) -> bool {
        matches!(self, Length::Percent(_))
    }
}

/// Per-physical-edge values (margins, padding, border widths).
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct EdgeSizes {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl EdgeSizes {
    pub fn all(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

/// Per-physical-edge lengths, for properties where `auto` is meaningful
/// (margins).
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct EdgeLengths {
    pub top: Length,
    pub right: Length,
    pub bottom: Length,
    pub left: Length,
}

impl EdgeLengths {
    pub fn px(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top: Length::Px(top),
            right: Length::Px(right),
            bottom: Length::Px(bottom),
            left: Length::Px(left),
        }
    }
}
