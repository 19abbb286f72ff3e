//! The immutable input to one layout pass.

use crate::exclusion::ExclusionSpace;
use crate::fragmentation::BreakAppeal;
use folio_types::{
    BfcOffset, LayoutUnit, LayoutUnitExt, LogicalSize, MarginStrut, WritingDirection, INDEFINITE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FragmentationType {
    #[default]
    None,
    Column,
    Page,
}

/// How an `auto` inline-size resolves against the available size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoInlineBehavior {
    /// Stretch to fill the available inline size (in-flow block children).
    #[default]
    Stretch,
    /// Shrink to fit the content (floats and other new formatting
    /// contexts placed next to floats).
    FitContent,
}

/// Everything a parent tells a child before laying it out. Built once per
/// child invocation, never mutated afterwards. Kept by the produced
/// `LayoutResult` so the cache can compare a later request against the
/// inputs that produced the stored result.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintSpace {
    available_size: LogicalSize,
    percentage_resolution_size: LogicalSize,
    writing_direction: WritingDirection,
    bfc_offset: BfcOffset,
    margin_strut: MarginStrut,
    forced_bfc_block_offset: Option<LayoutUnit>,
    clearance_offset: LayoutUnit,
    fragmentation: FragmentationType,
    fragmentainer_block_size: LayoutUnit,
    fragmentainer_offset: LayoutUnit,
    is_new_formatting_context: bool,
    is_anonymous: bool,
    is_fixed_inline_size: bool,
    is_fixed_block_size: bool,
    is_inside_balanced_columns: bool,
    is_initial_column_balancing_pass: bool,
    auto_inline_behavior: AutoInlineBehavior,
    min_break_appeal: BreakAppeal,
    exclusion_space: ExclusionSpace,
}

impl ConstraintSpace {
    pub fn builder(writing_direction: WritingDirection) -> ConstraintSpaceBuilder {
        ConstraintSpaceBuilder::new(writing_direction)
    }

    pub fn available_size(&self) -> LogicalSize {
        self.available_size
    }

    pub fn percentage_resolution_size(&self) -> LogicalSize {
        self.percentage_resolution_size
    }

    pub fn writing_direction(&self) -> WritingDirection {
        self.writing_direction
    }

    pub fn bfc_offset(&self) -> BfcOffset {
        self.bfc_offset
    }

    pub fn margin_strut(&self) -> MarginStrut {
        self.margin_strut
    }

    pub fn forced_bfc_block_offset(&self) -> Option<LayoutUnit> {
        self.forced_bfc_block_offset
    }

    pub fn clearance_offset(&self) -> LayoutUnit {
        self.clearance_offset
    }

    pub fn has_clearance_offset(&self) -> bool {
        !self.clearance_offset.is_indefinite()
    }

    pub fn fragmentation(&self) -> FragmentationType {
        self.fragmentation
    }

    pub fn has_block_fragmentation(&self) -> bool {
        self.fragmentation != FragmentationType::None
    }

    pub fn fragmentainer_block_size(&self) -> LayoutUnit {
        self.fragmentainer_block_size
    }

    pub fn has_known_fragmentainer_block_size(&self) -> bool {
        !self.fragmentainer_block_size.is_indefinite()
    }

    /// Block offset of the box being laid out within the current
    /// fragmentainer.
    pub fn fragmentainer_offset(&self) -> LayoutUnit {
        self.fragmentainer_offset
    }

    pub fn is_at_fragmentainer_start(&self) -> bool {
        self.fragmentainer_offset == LayoutUnit::zero()
    }

    pub fn is_new_formatting_context(&self) -> bool {
        self.is_new_formatting_context
    }

    /// The box is laid out as an anonymous content holder (multicol and
    /// page content reuse their container's box this way); its own border,
    /// padding and size rules do not apply.
    pub fn is_anonymous(&self) -> bool {
        self.is_anonymous
    }

    pub fn is_fixed_inline_size(&self) -> bool {
        self.is_fixed_inline_size
    }

    pub fn is_fixed_block_size(&self) -> bool {
        self.is_fixed_block_size
    }

    pub fn is_inside_balanced_columns(&self) -> bool {
        self.is_inside_balanced_columns
    }

    pub fn is_initial_column_balancing_pass(&self) -> bool {
        self.is_initial_column_balancing_pass
    }

    pub fn auto_inline_behavior(&self) -> AutoInlineBehavior {
        self.auto_inline_behavior
    }

    /// Breaks with lower appeal than this must not be taken; content is
    /// pushed onward instead. Used by column rows that may continue in the
    /// next outer fragmentainer.
    pub fn min_break_appeal(&self) -> BreakAppeal {
        self.min_break_appeal
    }

    pub fn exclusion_space(&self) -> &ExclusionSpace {
        &self.exclusion_space
    }
}

pub struct ConstraintSpaceBuilder {
    space: ConstraintSpace,
}

impl ConstraintSpaceBuilder {
    pub fn new(writing_direction: WritingDirection) -> Self {
        Self {
            space: ConstraintSpace {
                available_size: LogicalSize::new(INDEFINITE, INDEFINITE),
                percentage_resolution_size: LogicalSize::new(INDEFINITE, INDEFINITE),
                writing_direction,
                bfc_offset: BfcOffset::default(),
                margin_strut: MarginStrut::default(),
                forced_bfc_block_offset: None,
                clearance_offset: INDEFINITE,
                fragmentation: FragmentationType::None,
                fragmentainer_block_size: INDEFINITE,
                fragmentainer_offset: LayoutUnit::zero(),
                is_new_formatting_context: false,
                is_anonymous: false,
                is_fixed_inline_size: false,
                is_fixed_block_size: false,
                is_inside_balanced_columns: false,
                is_initial_column_balancing_pass: false,
                auto_inline_behavior: AutoInlineBehavior::Stretch,
                min_break_appeal: BreakAppeal::LastResort,
                exclusion_space: ExclusionSpace::new(),
            },
        }
    }

    pub fn available_size(mut self, size: LogicalSize) -> Self {
        self.space.available_size = size;
        self
    }

    pub fn percentage_resolution_size(mut self, size: LogicalSize) -> Self {
        self.space.percentage_resolution_size = size;
        self
    }

    pub fn bfc_offset(mut self, offset: BfcOffset) -> Self {
        self.space.bfc_offset = offset;
        self
    }

    pub fn margin_strut(mut self, strut: MarginStrut) -> Self {
        self.space.margin_strut = strut;
        self
    }

    pub fn forced_bfc_block_offset(mut self, offset: Option<LayoutUnit>) -> Self {
        self.space.forced_bfc_block_offset = offset;
        self
    }

    pub fn clearance_offset(mut self, offset: LayoutUnit) -> Self {
        self.space.clearance_offset = offset;
        self
    }

    pub fn fragmentation(mut self, fragmentation: FragmentationType) -> Self {
        self.space.fragmentation = fragmentation;
        self
    }

    pub fn fragmentainer_block_size(mut self, size: LayoutUnit) -> Self {
        self.space.fragmentainer_block_size = size;
        self
    }

    pub fn fragmentainer_offset(mut self, offset: LayoutUnit) -> Self {
        self.space.fragmentainer_offset = offset;
        self
    }

    pub fn new_formatting_context(mut self, is_new: bool) -> Self {
        self.space.is_new_formatting_context = is_new;
        self
    }

    pub fn anonymous(mut self, is_anonymous: bool) -> Self {
        self.space.is_anonymous = is_anonymous;
        self
    }

    pub fn fixed_inline_size(mut self, fixed: bool) -> Self {
        self.space.is_fixed_inline_size = fixed;
        self
    }

    pub fn fixed_block_size(mut self, fixed: bool) -> Self {
        self.space.is_fixed_block_size = fixed;
        self
    }

    pub fn inside_balanced_columns(mut self, inside: bool) -> Self {
        self.space.is_inside_balanced_columns = inside;
        self
    }

    pub fn initial_column_balancing_pass(mut self, initial: bool) -> Self {
        self.space.is_initial_column_balancing_pass = initial;
        self
    }

    pub fn auto_inline_behavior(mut self, behavior: AutoInlineBehavior) -> Self {
        self.space.auto_inline_behavior = behavior;
        self
    }

    pub fn min_break_appeal(mut self, appeal: BreakAppeal) -> Self {
        self.space.min_break_appeal = appeal;
        self
    }

    pub fn exclusion_space(mut self, exclusion_space: ExclusionSpace) -> Self {
        self.space.exclusion_space = exclusion_space;
        self
    }

    pub fn build(self) -> ConstraintSpace {
        self.space
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_indefinite_and_unfragmented() {
        let space = ConstraintSpace::builder(WritingDirection::horizontal_ltr()).build();
        assert!(space.available_size().block_size.is_indefinite());
        assert!(!space.has_block_fragmentation());
        assert!(!space.has_known_fragmentainer_block_size());
        assert!(space.is_at_fragmentainer_start());
    }

    #[test]
    fn fragmentainer_inputs_round_trip() {
        let space = ConstraintSpace::builder(WritingDirection::horizontal_ltr())
            .fragmentation(FragmentationType::Column)
            .fragmentainer_block_size(LayoutUnit::px(100.0))
            .fragmentainer_offset(LayoutUnit::px(30.0))
            .build();
        assert!(space.has_block_fragmentation());
        assert!(space.has_known_fragmentainer_block_size());
        assert!(!space.is_at_fragmentainer_start());
        assert_eq!(
            crate::fragmentation::fragmentainer_space_left(&space),
            LayoutUnit::px(70.0)
        );
    }
}
