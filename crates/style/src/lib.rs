pub mod breaks;
pub mod column;
pub mod computed;
pub mod frameset;
pub mod length;

pub use breaks::{BreakBetween, BreakInside};
pub use column::{ColumnFill, ColumnSpan};
pub use computed::{Clear, ComputedStyle, Float, Overflow, StyleBuilder};
pub use frameset::FrameLength;
pub use length::{EdgeLengths, EdgeSizes, Length};
