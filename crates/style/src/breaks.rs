//! Fragmentation-related style values: `break-before`, `break-after`,
//! `break-inside`, orphans and widows.

use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BreakBetween {
    #[default]
    Auto,
    Avoid,
    AvoidColumn,
    AvoidPage,
    Column,
    Page,
    /// `break-before: left|right` force a page break; which page face is
    /// chosen is a paint-time concern and not modeled here.
    Left,
    Right,
}

impl BreakBetween {
    pub fn is_forced(self) -> bool {
        matches!(
            self,
            BreakBetween::Column | BreakBetween::Page | BreakBetween::Left | BreakBetween::Right
        )
    }

    /// Whether this value requests break avoidance for the given
    /// fragmentation type (`is_column`: column context, else page).
    pub fn is_avoid(self, is_column: bool) -> bool {
        match self {
            BreakBetween::Avoid => true,
            BreakBetween::AvoidColumn => is_column,
            BreakBetween::AvoidPage => !is_column,
            _ => false,
        }
    }

    /// `break-before`/`break-after` values combine between a parent's edge
    /// and its first/last child; the stronger value wins. Forced beats
    /// avoid beats auto.
    pub fn join(self, other: BreakBetween) -> BreakBetween {
        if self.is_forced() {
            return self;
        }
        if other.is_forced() {
            return other;
        }
        if self != BreakBetween::Auto {
            return self;
        }
        other
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BreakInside {
    #[default]
    Auto,
    Avoid,
    AvoidColumn,
    AvoidPage,
}

impl BreakInside {
    pub fn is_avoid(self, is_column: bool) -> bool {
        match self {
            BreakInside::Auto => false,
            BreakInside::Avoid => true,
            BreakInside::AvoidColumn => is_column,
            BreakInside::AvoidPage => !is_column,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forced_break_wins_over_avoid() {
        assert_eq!(
            BreakBetween::Avoid.join(BreakBetween::Column),
            BreakBetween::Column
        );
        assert_eq!(
            BreakBetween::Page.join(BreakBetween::Avoid),
            BreakBetween::Page
        );
        assert_eq!(
            BreakBetween::Auto.join(BreakBetween::Avoid),
            BreakBetween::Avoid
        );
    }
}
