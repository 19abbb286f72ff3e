//! The stack-scoped accumulator a layout algorithm assembles its result in.

use crate::break_token::{BlockBreakToken, BreakToken, ChildBreakState};
use crate::constraint_space::ConstraintSpace;
use crate::exclusion::ExclusionSpace;
use crate::fragment::{FragmentKind, PhysicalFragment, PhysicalFragmentLink};
use crate::fragmentation::BreakAppeal;
use crate::layout_result::LayoutResult;
use folio_types::{
    BoxId, BoxStrut, LayoutUnit, LayoutUnitExt, LogicalOffset, LogicalSize, MarginStrut,
    WritingModeConverter, INDEFINITE,
};
use std::sync::Arc;

/// Specialized payload attached to a fragment's result. At most one is
/// active per box type; everything this engine doesn't produce stays out.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LayoutSideData {
    #[default]
    None,
    FrameSet(FrameSetSideData),
}

/// Resolved grid geometry of a frameset, kept for the legacy write-back
/// and for user resizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSetSideData {
    pub row_sizes: Vec<LayoutUnit>,
    pub col_sizes: Vec<LayoutUnit>,
    pub border_thickness: LayoutUnit,
}

/// Assembles one fragment. Lives on the stack for the duration of one
/// `layout()` call and is consumed exactly once by [`Self::to_box_fragment`].
pub struct BoxFragmentBuilder {
    node: BoxId,
    kind: FragmentKind,
    space: ConstraintSpace,
    border_scrollbar_padding: BoxStrut,
    inline_size: LayoutUnit,
    children: Vec<(LogicalOffset, Arc<PhysicalFragment>)>,
    child_break_states: Vec<ChildBreakState>,
    has_seen_all_children: bool,
    did_break: bool,
    sequence_number: u32,
    previously_consumed_block_size: LayoutUnit,
    consumed_block_size: Option<LayoutUnit>,
    intrinsic_block_size: LayoutUnit,
    bfc_block_offset: Option<LayoutUnit>,
    end_margin_strut: MarginStrut,
    break_appeal: BreakAppeal,
    has_forced_break: bool,
    minimal_space_shortage: LayoutUnit,
    tallest_unbreakable_block_size: LayoutUnit,
    block_size_for_fragmentation: LayoutUnit,
    monolithic_overflow: LayoutUnit,
    is_at_block_end: bool,
    is_self_collapsing: bool,
    column_spanner: Option<BoxId>,
    first_baseline: Option<LayoutUnit>,
    last_baseline: Option<LayoutUnit>,
    page_name: Option<String>,
    side_data: LayoutSideData,
    is_first_for_node: bool,
}

impl BoxFragmentBuilder {
    pub fn new(
        node: BoxId,
        kind: FragmentKind,
        space: ConstraintSpace,
        border_scrollbar_padding: BoxStrut,
        inline_size: LayoutUnit,
        previous_break_token: Option<&BlockBreakToken>,
    ) -> Self {
        Self {
            node,
            kind,
            space,
            border_scrollbar_padding,
            inline_size,
            children: Vec::new(),
            child_break_states: Vec::new(),
            has_seen_all_children: false,
            did_break: false,
            sequence_number: BlockBreakToken::sequence_after(previous_break_token),
            previously_consumed_block_size: previous_break_token
                .map_or(LayoutUnit::zero(), |token| token.consumed_block_size),
            consumed_block_size: None,
            intrinsic_block_size: LayoutUnit::zero(),
            bfc_block_offset: None,
            end_margin_strut: MarginStrut::default(),
            break_appeal: BreakAppeal::Perfect,
            has_forced_break: false,
            minimal_space_shortage: INDEFINITE,
            tallest_unbreakable_block_size: LayoutUnit::zero(),
            block_size_for_fragmentation: LayoutUnit::zero(),
            monolithic_overflow: LayoutUnit::zero(),
            is_at_block_end: false,
            is_self_collapsing: false,
            column_spanner: None,
            first_baseline: None,
            last_baseline: None,
            page_name: None,
            side_data: LayoutSideData::None,
            is_first_for_node: previous_break_token.is_none(),
        }
    }

    pub fn node(&self) -> BoxId {
        self.node
    }

    pub fn space(&self) -> &ConstraintSpace {
        &self.space
    }

    pub fn border_scrollbar_padding(&self) -> BoxStrut {
        self.border_scrollbar_padding
    }

    pub fn inline_size(&self) -> LayoutUnit {
        self.inline_size
    }

    pub fn previously_consumed_block_size(&self) -> LayoutUnit {
        self.previously_consumed_block_size
    }

    pub fn add_child(&mut self, fragment: Arc<PhysicalFragment>, offset: LogicalOffset) {
        self.children.push((offset, fragment));
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn add_break_before_child(&mut self, child: BoxId) {
        self.child_break_states
            .push(ChildBreakState::StartBefore(child));
        self.did_break = true;
    }

    pub fn add_child_resume(&mut self, token: Arc<BreakToken>) {
        self.child_break_states.push(ChildBreakState::Resume(token));
        self.did_break = true;
    }

    pub fn add_finished_child(&mut self, child: BoxId) {
        self.child_break_states
            .push(ChildBreakState::Finished(child));
        self.did_break = true;
    }

    pub fn set_has_seen_all_children(&mut self, seen: bool) {
        self.has_seen_all_children = seen;
    }

    pub fn set_did_break(&mut self) {
        self.did_break = true;
    }

    pub fn did_break(&self) -> bool {
        self.did_break
    }

    pub fn set_consumed_block_size(&mut self, consumed: LayoutUnit) {
        self.consumed_block_size = Some(consumed);
    }

    pub fn set_intrinsic_block_size(&mut self, size: LayoutUnit) {
        self.intrinsic_block_size = size;
    }

    pub fn intrinsic_block_size(&self) -> LayoutUnit {
        self.intrinsic_block_size
    }

    pub fn set_bfc_block_offset(&mut self, offset: LayoutUnit) {
        self.bfc_block_offset = Some(offset);
    }

    pub fn bfc_block_offset(&self) -> Option<LayoutUnit> {
        self.bfc_block_offset
    }

    pub fn set_end_margin_strut(&mut self, strut: MarginStrut) {
        self.end_margin_strut = strut;
    }

    /// Lower the recorded appeal to `appeal` if it is worse than what the
    /// fragment has seen so far. The result reports the worst break taken
    /// anywhere in the subtree.
    pub fn clamp_break_appeal(&mut self, appeal: BreakAppeal) {
        self.break_appeal = self.break_appeal.min(appeal);
    }

    pub fn break_appeal(&self) -> BreakAppeal {
        self.break_appeal
    }

    pub fn set_has_forced_break(&mut self) {
        self.has_forced_break = true;
    }

    pub fn has_forced_break(&self) -> bool {
        self.has_forced_break
    }

    /// Track the smallest space shortage reported by any break in the
    /// subtree. Stretching a balanced column by this amount is the
    /// smallest change that could fit more content.
    pub fn propagate_space_shortage(&mut self, shortage: LayoutUnit) {
        if shortage.is_indefinite() || shortage <= LayoutUnit::zero() {
            return;
        }
        if self.minimal_space_shortage.is_indefinite() || shortage < self.minimal_space_shortage {
            self.minimal_space_shortage = shortage;
        }
    }

    pub fn minimal_space_shortage(&self) -> LayoutUnit {
        self.minimal_space_shortage
    }

    pub fn propagate_tallest_unbreakable(&mut self, size: LayoutUnit) {
        self.tallest_unbreakable_block_size = self.tallest_unbreakable_block_size.max(size);
    }

    pub fn set_block_size_for_fragmentation(&mut self, size: LayoutUnit) {
        self.block_size_for_fragmentation = self.block_size_for_fragmentation.max(size);
    }

    pub fn set_monolithic_overflow(&mut self, overflow: LayoutUnit) {
        self.monolithic_overflow = overflow;
    }

    pub fn set_is_at_block_end(&mut self, at_end: bool) {
        self.is_at_block_end = at_end;
    }

    pub fn set_is_self_collapsing(&mut self, collapsing: bool) {
        self.is_self_collapsing = collapsing;
    }

    pub fn set_column_spanner(&mut self, spanner: Option<BoxId>) {
        self.column_spanner = spanner;
    }

    pub fn column_spanner(&self) -> Option<BoxId> {
        self.column_spanner
    }

    pub fn propagate_baseline(&mut self, baseline: LayoutUnit) {
        if self.first_baseline.is_none() {
            self.first_baseline = Some(baseline);
        }
        self.last_baseline = Some(baseline);
    }

    pub fn set_page_name(&mut self, name: Option<String>) {
        if self.page_name.is_none() {
            self.page_name = name;
        }
    }

    pub fn set_side_data(&mut self, side_data: LayoutSideData) {
        self.side_data = side_data;
    }

    /// Carry break bookkeeping up from a child's result: space shortage,
    /// unbreakable content and the worst appeal taken in the subtree.
    pub fn propagate_from_child_result(&mut self, result: &LayoutResult) {
        self.propagate_space_shortage(result.minimal_space_shortage());
        self.propagate_tallest_unbreakable(result.tallest_unbreakable_block_size());
        if result.has_forced_break() {
            self.has_forced_break = true;
        }
        self.clamp_break_appeal(result.break_appeal());
    }

    /// Converts the accumulated state into an immutable result. The
    /// border-box block-size is decided by the algorithm and passed in;
    /// everything else has been collected along the way.
    pub fn to_box_fragment(
        self,
        block_size: LayoutUnit,
        exclusion_space: ExclusionSpace,
    ) -> LayoutResult {
        let logical_size = LogicalSize::new(self.inline_size, block_size);
        let writing_direction = self.space.writing_direction();
        let physical_size =
            WritingModeConverter::new(writing_direction, Default::default())
                .to_physical_size(logical_size);
        let converter = WritingModeConverter::new(writing_direction, physical_size);

        let children = self
            .children
            .into_iter()
            .map(|(offset, fragment)| PhysicalFragmentLink {
                offset: converter.to_physical_offset(offset, fragment.size),
                fragment,
            })
            .collect();

        let break_token = if self.did_break {
            let consumed = self
                .consumed_block_size
                .unwrap_or(self.previously_consumed_block_size + block_size);
            Some(Arc::new(BreakToken::Block(BlockBreakToken {
                node: self.node,
                sequence_number: self.sequence_number,
                consumed_block_size: consumed,
                child_break_states: self.child_break_states,
                has_seen_all_children: self.has_seen_all_children,
                is_at_block_end: self.is_at_block_end,
                monolithic_overflow: self.monolithic_overflow,
                is_repeated: false,
            })))
        } else {
            None
        };

        let fragment = Arc::new(PhysicalFragment {
            kind: self.kind,
            node: self.node,
            size: physical_size,
            children,
            break_token,
            first_baseline: self.first_baseline,
            last_baseline: self.last_baseline,
            is_first_for_node: self.is_first_for_node,
        });

        LayoutResult::new(
            fragment,
            self.space,
            self.bfc_block_offset,
            self.end_margin_strut,
            self.intrinsic_block_size,
            self.break_appeal,
            self.has_forced_break,
            self.minimal_space_shortage,
            self.tallest_unbreakable_block_size,
            self.block_size_for_fragmentation.max(block_size),
            self.is_self_collapsing,
            self.column_spanner,
            exclusion_space,
            self.page_name,
            self.side_data,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_types::WritingDirection;

    fn builder() -> BoxFragmentBuilder {
        let space = ConstraintSpace::builder(WritingDirection::horizontal_ltr()).build();
        BoxFragmentBuilder::new(
            BoxId::new(3),
            FragmentKind::Box,
            space,
            BoxStrut::default(),
            LayoutUnit::px(100.0),
            None,
        )
    }

    #[test]
    fn no_break_means_no_token() {
        let result = builder().to_box_fragment(LayoutUnit::px(50.0), ExclusionSpace::new());
        let fragment = result.fragment().unwrap();
        assert!(fragment.break_token.is_none());
        assert!(fragment.is_first_for_node);
    }

    #[test]
    fn breaking_produces_a_token_with_consumed_size() {
        let mut builder = builder();
        builder.set_did_break();
        let result = builder.to_box_fragment(LayoutUnit::px(50.0), ExclusionSpace::new());
        let fragment = result.fragment().unwrap();
        let token = fragment.block_break_token().unwrap();
        assert_eq!(token.sequence_number, 0);
        assert_eq!(token.consumed_block_size, LayoutUnit::px(50.0));
    }

    #[test]
    fn space_shortage_keeps_the_minimum() {
        let mut builder = builder();
        builder.propagate_space_shortage(LayoutUnit::px(30.0));
        builder.propagate_space_shortage(LayoutUnit::px(10.0));
        builder.propagate_space_shortage(LayoutUnit::zero());
        assert_eq!(builder.minimal_space_shortage(), LayoutUnit::px(10.0));
    }
}
