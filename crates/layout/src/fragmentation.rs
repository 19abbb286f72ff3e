//! Break appeal machinery shared by the fragmentation-aware algorithms.

use crate::constraint_space::ConstraintSpace;
use folio_style::BreakBetween;
use folio_types::{BoxId, LayoutUnit, INDEFINITE};
use smallvec::SmallVec;
use std::cmp::Ordering;

/// How appealing a breakpoint is. Higher is better; a candidate break is
/// only taken over another if its appeal is at least as good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BreakAppeal {
    /// A break that makes progress but honors nothing else.
    LastResort,
    ViolatingOrphansWidows,
    ViolatingBreakAvoid,
    Perfect,
}

/// Tie-break between violating orphans/widows and violating an explicit
/// break-avoidance rule when both cannot be satisfied. The upstream CSS
/// text leaves the precedence undefined, so it is a policy choice rather
/// than a derived rule; the default ranks candidates the way the original
/// engine's golden scenarios do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakPolicy {
    /// When set, a candidate that violates a break-avoidance rule ranks
    /// above one that violates orphans/widows (the default). Clearing it
    /// swaps the two middle rungs of the appeal ladder.
    pub avoid_violation_beats_orphans_widows: bool,
}

impl Default for BreakPolicy {
    fn default() -> Self {
        Self {
            avoid_violation_beats_orphans_widows: true,
        }
    }
}

impl BreakPolicy {
    fn rank(&self, appeal: BreakAppeal) -> u8 {
        match appeal {
            BreakAppeal::LastResort => 0,
            BreakAppeal::ViolatingOrphansWidows => {
                if self.avoid_violation_beats_orphans_widows {
                    1
                } else {
                    2
                }
            }
            BreakAppeal::ViolatingBreakAvoid => {
                if self.avoid_violation_beats_orphans_widows {
                    2
                } else {
                    1
                }
            }
            BreakAppeal::Perfect => 3,
        }
    }

    pub fn compare(&self, a: BreakAppeal, b: BreakAppeal) -> Ordering {
        self.rank(a).cmp(&self.rank(b))
    }

    pub fn is_better(&self, a: BreakAppeal, b: BreakAppeal) -> bool {
        self.compare(a, b) == Ordering::Greater
    }
}

/// A precomputed break location, found during a pass that had to be
/// abandoned. The retry pass breaks here unconditionally, which makes the
/// second pass deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EarlyBreak {
    /// Chain of box ids from the retrying box down to the child to break
    /// before (or inside, when `line_number` is set).
    pub path: SmallVec<[BoxId; 4]>,
    /// Break before this line inside the target, rather than before the
    /// target itself.
    pub line_number: Option<u32>,
    pub appeal: BreakAppeal,
}

impl EarlyBreak {
    pub fn before(child: BoxId, appeal: BreakAppeal) -> Self {
        let mut path = SmallVec::new();
        path.push(child);
        Self {
            path,
            line_number: None,
            appeal,
        }
    }

    pub fn target(&self) -> BoxId {
        self.path[0]
    }
}

/// Space left in the current fragmentainer below the position described by
/// the constraint space, or [`INDEFINITE`] outside a fragmentation context
/// (and during the initial column balancing pass, where the fragmentainer
/// size is not yet known).
pub fn fragmentainer_space_left(space: &ConstraintSpace) -> LayoutUnit {
    if !space.has_block_fragmentation() || !space.has_known_fragmentainer_block_size() {
        return INDEFINITE;
    }
    space.fragmentainer_block_size() - space.fragmentainer_offset()
}

/// Appeal of breaking between two siblings whose joined break rules are
/// `between`. A forced break is always perfect; an avoidance request makes
/// the break a violation rather than forbidding it.
pub fn appeal_of_break_between(between: BreakBetween, is_column: bool) -> BreakAppeal {
    if between.is_forced() {
        BreakAppeal::Perfect
    } else if between.is_avoid(is_column) {
        BreakAppeal::ViolatingBreakAvoid
    } else {
        BreakAppeal::Perfect
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appeal_ladder_orders_as_expected() {
        assert!(BreakAppeal::Perfect > BreakAppeal::ViolatingBreakAvoid);
        assert!(BreakAppeal::ViolatingBreakAvoid > BreakAppeal::ViolatingOrphansWidows);
        assert!(BreakAppeal::ViolatingOrphansWidows > BreakAppeal::LastResort);
    }

    #[test]
    fn policy_can_swap_middle_rungs() {
        let default_policy = BreakPolicy::default();
        assert!(default_policy.is_better(
            BreakAppeal::ViolatingBreakAvoid,
            BreakAppeal::ViolatingOrphansWidows
        ));

        let swapped = BreakPolicy {
            avoid_violation_beats_orphans_widows: false,
        };
        assert!(swapped.is_better(
            BreakAppeal::ViolatingOrphansWidows,
            BreakAppeal::ViolatingBreakAvoid
        ));
        assert!(swapped.is_better(BreakAppeal::Perfect, BreakAppeal::ViolatingOrphansWidows));
    }

    #[test]
    fn forced_break_is_always_perfect() {
        assert_eq!(
            appeal_of_break_between(BreakBetween::Column, true),
            BreakAppeal::Perfect
        );
        assert_eq!(
            appeal_of_break_between(BreakBetween::Avoid, true),
            BreakAppeal::ViolatingBreakAvoid
        );
        assert_eq!(
            appeal_of_break_between(BreakBetween::AvoidPage, true),
            BreakAppeal::Perfect
        );
    }
}
