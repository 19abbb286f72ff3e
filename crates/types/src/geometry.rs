//! Logical and physical geometry primitives.
//!
//! All lengths are fixed-point [`LayoutUnit`]s (app units, 1/60 px), so
//! that repeated addition of fragment sizes stays exact. Layout algorithms
//! work in logical (inline/block) coordinates and convert to physical
//! (x/y) coordinates only when a fragment is finalized.

use crate::writing_mode::{Direction, WritingDirection, WritingMode};
use app_units::Au;
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Fixed-point layout length.
pub type LayoutUnit = Au;

/// Sentinel for "no definite size" (e.g. auto block-size while measuring).
///
/// Indefiniteness travels in-band rather than as an `Option`, which would
/// otherwise infect every size computation.
pub const INDEFINITE: LayoutUnit = Au(i32::MIN);

/// Upper bound reported by intrinsic sizing when content can use any
/// inline size it is given.
pub const MAX_SIZE: LayoutUnit = Au(i32::MAX);

/// Convenience constructors and queries on [`LayoutUnit`].
pub trait LayoutUnitExt: Sized {
    fn zero() -> Self;
    fn px(px: f32) -> Self;
    fn is_indefinite(self) -> bool;
    fn clamp_negative_to_zero(self) -> Self;
    /// Ceiling division by a positive count, used by column balancing to
    /// guarantee that the guessed column block-size never under-shoots.
    fn ceil_div(self, count: i32) -> Self;
}

impl LayoutUnitExt for Au {
    fn zero() -> Self {
        Au(0)
    }

    fn px(px: f32) -> Self {
        Au::from_f32_px(px)
    }

    fn is_indefinite(self) -> bool {
        self == INDEFINITE
    }

    fn clamp_negative_to_zero(self) -> Self {
        self.max(Au(0))
    }

    fn ceil_div(self, count: i32) -> Self {
        debug_assert!(count > 0);
        debug_assert!(!self.is_indefinite());
        let value = self.0 as i64;
        let count = count as i64;
        // Truncating division already rounds negative values up.
        let quotient = value / count;
        let quotient = if value % count > 0 { quotient + 1 } else { quotient };
        Au(quotient as i32)
    }
}

/// Formats a length as CSS pixels, dropping the fraction when whole so
/// values print the way the fragment-tree dump expects (`100`, not `100.0`).
pub fn px_string(unit: LayoutUnit) -> String {
    let px = unit.to_f32_px();
    if px.fract() == 0.0 {
        format!("{}", px as i64)
    } else {
        format!("{:.2}", px)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LogicalSize {
    pub inline_size: LayoutUnit,
    pub block_size: LayoutUnit,
}

impl LogicalSize {
    pub fn new(inline_size: LayoutUnit, block_size: LayoutUnit) -> Self {
        Self {
            inline_size,
            block_size,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LogicalOffset {
    pub inline_offset: LayoutUnit,
    pub block_offset: LayoutUnit,
}

impl LogicalOffset {
    pub fn new(inline_offset: LayoutUnit, block_offset: LayoutUnit) -> Self {
        Self {
            inline_offset,
            block_offset,
        }
    }
}

impl Add for LogicalOffset {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            inline_offset: self.inline_offset + rhs.inline_offset,
            block_offset: self.block_offset + rhs.block_offset,
        }
    }
}

impl AddAssign for LogicalOffset {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for LogicalOffset {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            inline_offset: self.inline_offset - rhs.inline_offset,
            block_offset: self.block_offset - rhs.block_offset,
        }
    }
}

impl SubAssign for LogicalOffset {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for LogicalOffset {
    type Output = Self;
    fn neg(self) -> Self {
        Self {
            inline_offset: -self.inline_offset,
            block_offset: -self.block_offset,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PhysicalSize {
    pub width: LayoutUnit,
    pub height: LayoutUnit,
}

impl PhysicalSize {
    pub fn new(width: LayoutUnit, height: LayoutUnit) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for PhysicalSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", px_string(self.width), px_string(self.height))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PhysicalOffset {
    pub x: LayoutUnit,
    pub y: LayoutUnit,
}

impl PhysicalOffset {
    pub fn new(x: LayoutUnit, y: LayoutUnit) -> Self {
        Self { x, y }
    }
}

impl Add for PhysicalOffset {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl fmt::Display for PhysicalOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", px_string(self.x), px_string(self.y))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PhysicalRect {
    pub origin: PhysicalOffset,
    pub size: PhysicalSize,
}

/// A position in block formatting context coordinates: the inline ("line")
/// offset from the BFC's inline-start edge, and the block offset from its
/// block-start edge. Floats and new-formatting-context placement work in
/// these coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BfcOffset {
    pub line_offset: LayoutUnit,
    pub block_offset: LayoutUnit,
}

impl BfcOffset {
    pub fn new(line_offset: LayoutUnit, block_offset: LayoutUnit) -> Self {
        Self {
            line_offset,
            block_offset,
        }
    }
}

/// Converts between logical and physical coordinates within a containing
/// box of a known physical size.
#[derive(Debug, Clone, Copy)]
pub struct WritingModeConverter {
    pub writing_direction: WritingDirection,
    pub outer_size: PhysicalSize,
}

impl WritingModeConverter {
    pub fn new(writing_direction: WritingDirection, outer_size: PhysicalSize) -> Self {
        Self {
            writing_direction,
            outer_size,
        }
    }

    pub fn to_physical_size(&self, logical: LogicalSize) -> PhysicalSize {
        match self.writing_direction.writing_mode {
            WritingMode::HorizontalTb => PhysicalSize::new(logical.inline_size, logical.block_size),
            WritingMode::VerticalRl | WritingMode::VerticalLr => {
                PhysicalSize::new(logical.block_size, logical.inline_size)
            }
        }
    }

    pub fn to_logical_size(&self, physical: PhysicalSize) -> LogicalSize {
        match self.writing_direction.writing_mode {
            WritingMode::HorizontalTb => LogicalSize::new(physical.width, physical.height),
            WritingMode::VerticalRl | WritingMode::VerticalLr => {
                LogicalSize::new(physical.height, physical.width)
            }
        }
    }

    /// Converts the logical offset of a child of size `inner_size` into a
    /// physical offset within `outer_size`.
    pub fn to_physical_offset(
        &self,
        logical: LogicalOffset,
        inner_size: PhysicalSize,
    ) -> PhysicalOffset {
        let ltr = self.writing_direction.direction == Direction::Ltr;
        match self.writing_direction.writing_mode {
            WritingMode::HorizontalTb => {
                let x = if ltr {
                    logical.inline_offset
                } else {
                    self.outer_size.width - logical.inline_offset - inner_size.width
                };
                PhysicalOffset::new(x, logical.block_offset)
            }
            WritingMode::VerticalRl => {
                let y = if ltr {
                    logical.inline_offset
                } else {
                    self.outer_size.height - logical.inline_offset - inner_size.height
                };
                PhysicalOffset::new(
                    self.outer_size.width - logical.block_offset - inner_size.width,
                    y,
                )
            }
            WritingMode::VerticalLr => {
                let y = if ltr {
                    logical.inline_offset
                } else {
                    self.outer_size.height - logical.inline_offset - inner_size.height
                };
                PhysicalOffset::new(logical.block_offset, y)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writing_mode::WritingDirection;

    #[test]
    fn ceil_div_rounds_up() {
        let total = Au::px(100.0);
        assert!(total.ceil_div(3) * 3 >= total);
        assert_eq!(Au::px(90.0).ceil_div(3), Au::px(30.0));
    }

    #[test]
    fn px_string_drops_trailing_zero() {
        assert_eq!(px_string(Au::px(100.0)), "100");
        assert_eq!(px_string(Au::px(37.5)), "37.50");
    }

    #[test]
    fn horizontal_rtl_flips_inline_axis() {
        let converter = WritingModeConverter::new(
            WritingDirection::horizontal_rtl(),
            PhysicalSize::new(Au::px(100.0), Au::px(50.0)),
        );
        let physical = converter.to_physical_offset(
            LogicalOffset::new(Au::px(10.0), Au::px(5.0)),
            PhysicalSize::new(Au::px(20.0), Au::px(20.0)),
        );
        assert_eq!(physical, PhysicalOffset::new(Au::px(70.0), Au::px(5.0)));
    }
}
