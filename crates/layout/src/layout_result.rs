//! The immutable output of one layout pass.

use crate::builder::LayoutSideData;
use crate::constraint_space::ConstraintSpace;
use crate::exclusion::ExclusionSpace;
use crate::fragment::PhysicalFragment;
use crate::fragmentation::{BreakAppeal, EarlyBreak};
use folio_types::{BoxId, LayoutUnit, LayoutUnitExt, MarginStrut, INDEFINITE};
use std::sync::Arc;

/// Terminal state of a layout pass. Only `Success` carries a fragment;
/// the other states are recoverable signals between an algorithm and its
/// caller and never escape the entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutStatus {
    Success,
    /// The box discovered its own BFC block-offset mid-walk (clearance or
    /// a collapse losing its strut); restart with the offset known.
    BfcBlockOffsetResolved,
    /// A better breakpoint exists before content already committed; retry
    /// with the recorded early break.
    NeedsEarlierBreak,
    /// Nothing of this box fits in the remaining fragmentainer space and
    /// breaking before it is better than placing it here.
    OutOfFragmentainerSpace,
}

#[derive(Debug, Clone)]
pub struct LayoutResult {
    status: LayoutStatus,
    fragment: Option<Arc<PhysicalFragment>>,
    space: ConstraintSpace,
    bfc_block_offset: Option<LayoutUnit>,
    end_margin_strut: MarginStrut,
    intrinsic_block_size: LayoutUnit,
    break_appeal: BreakAppeal,
    has_forced_break: bool,
    minimal_space_shortage: LayoutUnit,
    tallest_unbreakable_block_size: LayoutUnit,
    /// Block-size this box wants in total across all fragmentainers, used
    /// by column balancing to size its initial guess.
    block_size_for_fragmentation: LayoutUnit,
    is_self_collapsing: bool,
    /// Set when a descendant column spanner interrupted the content walk.
    column_spanner: Option<BoxId>,
    early_break: Option<EarlyBreak>,
    exclusion_space: ExclusionSpace,
    /// Resolved `@page` name of the first box starting in this fragment.
    page_name: Option<String>,
    side_data: LayoutSideData,
}

impl LayoutResult {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        fragment: Arc<PhysicalFragment>,
        space: ConstraintSpace,
        bfc_block_offset: Option<LayoutUnit>,
        end_margin_strut: MarginStrut,
        intrinsic_block_size: LayoutUnit,
        break_appeal: BreakAppeal,
        has_forced_break: bool,
        minimal_space_shortage: LayoutUnit,
        tallest_unbreakable_block_size: LayoutUnit,
        block_size_for_fragmentation: LayoutUnit,
        is_self_collapsing: bool,
        column_spanner: Option<BoxId>,
        exclusion_space: ExclusionSpace,
        page_name: Option<String>,
        side_data: LayoutSideData,
    ) -> Self {
        Self {
            status: LayoutStatus::Success,
            fragment: Some(fragment),
            space,
            bfc_block_offset,
            end_margin_strut,
            intrinsic_block_size,
            break_appeal,
            has_forced_break,
            minimal_space_shortage,
            tallest_unbreakable_block_size,
            block_size_for_fragmentation,
            is_self_collapsing,
            column_spanner,
            early_break: None,
            exclusion_space,
            page_name,
            side_data,
        }
    }

    fn abort(status: LayoutStatus, space: ConstraintSpace) -> Self {
        Self {
            status,
            fragment: None,
            space,
            bfc_block_offset: None,
            end_margin_strut: MarginStrut::default(),
            intrinsic_block_size: LayoutUnit::zero(),
            break_appeal: BreakAppeal::LastResort,
            has_forced_break: false,
            minimal_space_shortage: INDEFINITE,
            tallest_unbreakable_block_size: LayoutUnit::zero(),
            block_size_for_fragmentation: LayoutUnit::zero(),
            is_self_collapsing: false,
            column_spanner: None,
            early_break: None,
            exclusion_space: ExclusionSpace::new(),
            page_name: None,
            side_data: LayoutSideData::None,
        }
    }

    pub(crate) fn bfc_block_offset_resolved(space: ConstraintSpace, resolved: LayoutUnit) -> Self {
        let mut result = Self::abort(LayoutStatus::BfcBlockOffsetResolved, space);
        result.bfc_block_offset = Some(resolved);
        result
    }

    pub(crate) fn needs_earlier_break(space: ConstraintSpace, early_break: EarlyBreak) -> Self {
        let mut result = Self::abort(LayoutStatus::NeedsEarlierBreak, space);
        result.early_break = Some(early_break);
        result
    }

    pub(crate) fn out_of_fragmentainer_space(space: ConstraintSpace) -> Self {
        Self::abort(LayoutStatus::OutOfFragmentainerSpace, space)
    }

    pub fn status(&self) -> LayoutStatus {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status == LayoutStatus::Success
    }

    /// The produced fragment. `None` only for abort statuses.
    pub fn fragment(&self) -> Option<&Arc<PhysicalFragment>> {
        self.fragment.as_ref()
    }

    pub fn space(&self) -> &ConstraintSpace {
        &self.space
    }

    pub fn bfc_block_offset(&self) -> Option<LayoutUnit> {
        self.bfc_block_offset
    }

    pub fn end_margin_strut(&self) -> MarginStrut {
        self.end_margin_strut
    }

    pub fn intrinsic_block_size(&self) -> LayoutUnit {
        self.intrinsic_block_size
    }

    pub fn break_appeal(&self) -> BreakAppeal {
        self.break_appeal
    }

    pub fn has_forced_break(&self) -> bool {
        self.has_forced_break
    }

    /// Smallest amount of extra fragmentainer block-size that would have
    /// let some piece of content fit, or [`INDEFINITE`] when no break was
    /// short of space. Column balancing stretches by this amount.
    pub fn minimal_space_shortage(&self) -> LayoutUnit {
        self.minimal_space_shortage
    }

    pub fn tallest_unbreakable_block_size(&self) -> LayoutUnit {
        self.tallest_unbreakable_block_size
    }

    pub fn block_size_for_fragmentation(&self) -> LayoutUnit {
        self.block_size_for_fragmentation
    }

    pub fn is_self_collapsing(&self) -> bool {
        self.is_self_collapsing
    }

    pub fn column_spanner(&self) -> Option<BoxId> {
        self.column_spanner
    }

    pub fn early_break(&self) -> Option<&EarlyBreak> {
        self.early_break.as_ref()
    }

    pub fn exclusion_space(&self) -> &ExclusionSpace {
        &self.exclusion_space
    }

    pub fn page_name(&self) -> Option<&str> {
        self.page_name.as_deref()
    }

    pub fn side_data(&self) -> &LayoutSideData {
        &self.side_data
    }
}
