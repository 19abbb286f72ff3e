//! The shared record of float positions within one block formatting context.
//!
//! Every float placed in a BFC is parked here as an exclusion (its margin
//! box in BFC coordinates). Boxes that establish a new formatting context
//! query the space for a "layout opportunity": the highest position where
//! their inline-size fits between the floats already placed.
//!
//! The backing store is shared copy-on-write. A derived space that only
//! appends sees the same backing as its parent; equality is by backing
//! identity plus length, which is what the layout cache compares (two
//! spaces with equal contents in different backings are different inputs).

use folio_style::Clear;
use folio_types::{BfcOffset, LayoutUnit, LayoutUnitExt, INDEFINITE};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionKind {
    Left,
    Right,
}

/// One float's margin box in BFC coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exclusion {
    pub kind: ExclusionKind,
    pub line_start: LayoutUnit,
    pub line_end: LayoutUnit,
    pub block_start: LayoutUnit,
    pub block_end: LayoutUnit,
}

/// A band of available inline space at a given block offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutOpportunity {
    pub line_start: LayoutUnit,
    pub line_end: LayoutUnit,
    pub block_offset: LayoutUnit,
}

impl LayoutOpportunity {
    pub fn inline_size(&self) -> LayoutUnit {
        self.line_end - self.line_start
    }

    pub fn origin(&self) -> BfcOffset {
        BfcOffset::new(self.line_start, self.block_offset)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExclusionSpace {
    store: Rc<RefCell<Vec<Exclusion>>>,
    len: usize,
}

/// Identity-based: two spaces are equal when they view the same prefix of
/// the same backing store. The cache relies on this.
impl PartialEq for ExclusionSpace {
    fn eq(&self, other: &Self) -> bool {
        if self.len == 0 && other.len == 0 {
            return true;
        }
        Rc::ptr_eq(&self.store, &other.store) && self.len == other.len
    }
}

impl ExclusionSpace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn add(&mut self, exclusion: Exclusion) {
        // Another clone of this space may have appended past our prefix.
        // Fork the backing before pushing so they don't see our float.
        if self.store.borrow().len() != self.len {
            let prefix = self.store.borrow()[..self.len].to_vec();
            self.store = Rc::new(RefCell::new(prefix));
        }
        self.store.borrow_mut().push(exclusion);
        self.len += 1;
    }

    fn for_each<F: FnMut(&Exclusion)>(&self, mut f: F) {
        let store = self.store.borrow();
        for exclusion in &store[..self.len] {
            f(exclusion);
        }
    }

    /// The block offset below every float the given `clear` value applies
    /// to, or [`INDEFINITE`] when nothing needs clearing.
    pub fn clearance_offset(&self, clear: Clear) -> LayoutUnit {
        let mut offset = INDEFINITE;
        self.for_each(|exclusion| {
            let applies = match clear {
                Clear::None => false,
                Clear::Left => exclusion.kind == ExclusionKind::Left,
                Clear::Right => exclusion.kind == ExclusionKind::Right,
                Clear::Both => true,
            };
            if applies && (offset.is_indefinite() || exclusion.block_end > offset) {
                offset = exclusion.block_end;
            }
        });
        offset
    }

    /// Block start of the most recently added float, if any. Used to keep
    /// later floats from stacking above earlier ones.
    pub fn last_float_block_start(&self) -> Option<LayoutUnit> {
        if self.len == 0 {
            return None;
        }
        Some(self.store.borrow()[self.len - 1].block_start)
    }

    /// Finds the highest block offset at or below `min_block_offset` where
    /// `inline_size` fits between the floats, within the line range
    /// `[line_start, line_end]`.
    pub fn find_layout_opportunity(
        &self,
        min_block_offset: LayoutUnit,
        line_start: LayoutUnit,
        line_end: LayoutUnit,
        inline_size: LayoutUnit,
    ) -> LayoutOpportunity {
        let mut candidates = vec![min_block_offset];
        self.for_each(|exclusion| {
            if exclusion.block_end > min_block_offset {
                candidates.push(exclusion.block_end);
            }
        });
        candidates.sort();
        candidates.dedup();

        for candidate in candidates {
            let band = self.available_band_at(candidate, line_start, line_end);
            if band.line_end - band.line_start >= inline_size {
                return band;
            }
        }

        // Below every float the full line range is available.
        let below_all = self.bottom();
        LayoutOpportunity {
            line_start,
            line_end,
            block_offset: below_all.max(min_block_offset),
        }
    }

    fn available_band_at(
        &self,
        block_offset: LayoutUnit,
        line_start: LayoutUnit,
        line_end: LayoutUnit,
    ) -> LayoutOpportunity {
        let mut start = line_start;
        let mut end = line_end;
        self.for_each(|exclusion| {
            if exclusion.block_start <= block_offset && exclusion.block_end > block_offset {
                match exclusion.kind {
                    ExclusionKind::Left => start = start.max(exclusion.line_end),
                    ExclusionKind::Right => end = end.min(exclusion.line_start),
                }
            }
        });
        LayoutOpportunity {
            line_start: start,
            line_end: end,
            block_offset,
        }
    }

    fn bottom(&self) -> LayoutUnit {
        let mut bottom = LayoutUnit::zero();
        self.for_each(|exclusion| {
            bottom = bottom.max(exclusion.block_end);
        });
        bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_types::LayoutUnitExt;

    fn left_float(line_start: f32, line_end: f32, block_start: f32, block_end: f32) -> Exclusion {
        Exclusion {
            kind: ExclusionKind::Left,
            line_start: LayoutUnit::px(line_start),
            line_end: LayoutUnit::px(line_end),
            block_start: LayoutUnit::px(block_start),
            block_end: LayoutUnit::px(block_end),
        }
    }

    #[test]
    fn opportunity_skips_past_wide_float() {
        let mut space = ExclusionSpace::new();
        space.add(left_float(0.0, 80.0, 0.0, 50.0));

        let opportunity = space.find_layout_opportunity(
            LayoutUnit::zero(),
            LayoutUnit::zero(),
            LayoutUnit::px(100.0),
            LayoutUnit::px(40.0),
        );
        // 20px remain beside the float, not enough for 40px. The first fit
        // is below it.
        assert_eq!(opportunity.block_offset, LayoutUnit::px(50.0));
        assert_eq!(opportunity.line_start, LayoutUnit::zero());
    }

    #[test]
    fn opportunity_fits_beside_narrow_float() {
        let mut space = ExclusionSpace::new();
        space.add(left_float(0.0, 30.0, 0.0, 50.0));

        let opportunity = space.find_layout_opportunity(
            LayoutUnit::zero(),
            LayoutUnit::zero(),
            LayoutUnit::px(100.0),
            LayoutUnit::px(40.0),
        );
        assert_eq!(opportunity.block_offset, LayoutUnit::zero());
        assert_eq!(opportunity.line_start, LayoutUnit::px(30.0));
    }

    #[test]
    fn clearance_is_below_matching_floats() {
        let mut space = ExclusionSpace::new();
        space.add(left_float(0.0, 30.0, 0.0, 50.0));
        assert_eq!(space.clearance_offset(Clear::Left), LayoutUnit::px(50.0));
        assert!(space.clearance_offset(Clear::Right).is_indefinite());
    }

    #[test]
    fn equality_is_by_backing_identity() {
        let mut a = ExclusionSpace::new();
        a.add(left_float(0.0, 30.0, 0.0, 50.0));
        let b = a.clone();
        assert_eq!(a, b);

        let mut c = ExclusionSpace::new();
        c.add(left_float(0.0, 30.0, 0.0, 50.0));
        // Same contents, different backing store.
        assert_ne!(a, c);

        // Appending forks `a` away from `b`'s view when needed, but `b`
        // keeps seeing its own prefix.
        let mut d = a.clone();
        d.add(left_float(0.0, 30.0, 50.0, 70.0));
        assert_ne!(a, d);
        assert_eq!(a, b);
    }
}
