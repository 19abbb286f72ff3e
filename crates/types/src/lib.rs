pub mod geometry;
pub mod ids;
pub mod strut;
pub mod writing_mode;

pub use geometry::{
    px_string, BfcOffset, LayoutUnit, LayoutUnitExt, LogicalOffset, LogicalSize, PhysicalOffset,
    PhysicalRect, PhysicalSize, WritingModeConverter, INDEFINITE, MAX_SIZE,
};
pub use ids::BoxId;
pub use strut::{BoxStrut, MarginStrut};
pub use writing_mode::{Direction, WritingDirection, WritingMode};
