//! Box and margin struts.

use crate::geometry::LayoutUnit;
use app_units::Au;
use std::ops::Add;

/// Per-edge lengths in logical coordinates (borders, padding, scrollbars,
/// margins once resolved).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoxStrut {
    pub inline_start: LayoutUnit,
    pub inline_end: LayoutUnit,
    pub block_start: LayoutUnit,
    pub block_end: LayoutUnit,
}

impl BoxStrut {
    pub fn new(
        inline_start: LayoutUnit,
        inline_end: LayoutUnit,
        block_start: LayoutUnit,
        block_end: LayoutUnit,
    ) -> Self {
        Self {
            inline_start,
            inline_end,
            block_start,
            block_end,
        }
    }

    pub fn inline_sum(&self) -> LayoutUnit {
        self.inline_start + self.inline_end
    }

    pub fn block_sum(&self) -> LayoutUnit {
        self.block_start + self.block_end
    }
}

impl Add for BoxStrut {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            inline_start: self.inline_start + rhs.inline_start,
            inline_end: self.inline_end + rhs.inline_end,
            block_start: self.block_start + rhs.block_start,
            block_end: self.block_end + rhs.block_end,
        }
    }
}

/// An uncommitted, potentially-collapsing run of adjacent vertical margins.
///
/// Positive and negative margins collapse independently: the effective
/// margin is the largest positive appended plus the most negative appended.
/// The strut is carried between siblings until some event (border, padding,
/// content, clearance) pins a concrete position, at which point `sum()` is
/// committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MarginStrut {
    pub positive_margin: LayoutUnit,
    pub negative_margin: LayoutUnit,
}

impl MarginStrut {
    pub fn append(&mut self, margin: LayoutUnit) {
        if margin < Au(0) {
            self.negative_margin = self.negative_margin.min(margin);
        } else {
            self.positive_margin = self.positive_margin.max(margin);
        }
    }

    pub fn sum(&self) -> LayoutUnit {
        self.positive_margin + self.negative_margin
    }

    pub fn is_empty(&self) -> bool {
        self.positive_margin == Au(0) && self.negative_margin == Au(0)
    }
}
