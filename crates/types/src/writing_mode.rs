//! Writing modes and directions.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WritingMode {
    #[default]
    HorizontalTb,
    VerticalRl,
    VerticalLr,
}

impl WritingMode {
    pub fn is_horizontal(self) -> bool {
        self == WritingMode::HorizontalTb
    }

    /// Whether two modes lay their inline axis along the same physical axis.
    pub fn is_parallel_to(self, other: WritingMode) -> bool {
        self.is_horizontal() == other.is_horizontal()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct WritingDirection {
    pub writing_mode: WritingMode,
    pub direction: Direction,
}

impl WritingDirection {
    pub fn new(writing_mode: WritingMode, direction: Direction) -> Self {
        Self {
            writing_mode,
            direction,
        }
    }

    pub fn horizontal_ltr() -> Self {
        Self::new(WritingMode::HorizontalTb, Direction::Ltr)
    }

    pub fn horizontal_rtl() -> Self {
        Self::new(WritingMode::HorizontalTb, Direction::Rtl)
    }
}
