//! Resumption markers for content split across fragmentainers.

use folio_types::{BoxId, LayoutUnit, LayoutUnitExt};
use std::sync::Arc;

/// "Layout is not finished; resume here." Produced by a layout pass that
/// ran out of fragmentainer space, consumed read-only by the next pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreakToken {
    Block(BlockBreakToken),
    Inline(InlineBreakToken),
}

impl BreakToken {
    pub fn node(&self) -> BoxId {
        match self {
            BreakToken::Block(token) => token.node,
            BreakToken::Inline(token) => token.node,
        }
    }

    pub fn as_block(&self) -> Option<&BlockBreakToken> {
        match self {
            BreakToken::Block(token) => Some(token),
            BreakToken::Inline(_) => None,
        }
    }

    pub fn as_inline(&self) -> Option<&InlineBreakToken> {
        match self {
            BreakToken::Block(_) => None,
            BreakToken::Inline(token) => Some(token),
        }
    }

    pub fn sequence_number(&self) -> u32 {
        match self {
            BreakToken::Block(token) => token.sequence_number,
            BreakToken::Inline(token) => token.sequence_number,
        }
    }
}

/// Where a child of a broken box stands when its parent resumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildBreakState {
    /// The child produced no fragment yet; lay it out from the beginning
    /// in the next fragmentainer.
    StartBefore(BoxId),
    /// The child produced a fragment and continues with this token.
    Resume(Arc<BreakToken>),
    /// The child was laid out in full outside the normal flow of the walk
    /// (a column spanner). Continue with its next sibling.
    Finished(BoxId),
}

impl ChildBreakState {
    pub fn node(&self) -> BoxId {
        match self {
            ChildBreakState::StartBefore(id) | ChildBreakState::Finished(id) => *id,
            ChildBreakState::Resume(token) => token.node(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockBreakToken {
    pub node: BoxId,
    /// Index of the fragment this token ends. The first fragment's token is
    /// sequence number 0, and each successor increments it.
    pub sequence_number: u32,
    /// Block-size consumed by this and all earlier fragments of the box.
    pub consumed_block_size: LayoutUnit,
    pub child_break_states: Vec<ChildBreakState>,
    /// All children have been visited; only already-started children may
    /// continue, no new ones begin.
    pub has_seen_all_children: bool,
    /// The box's own content ended in this fragment; anything that resumes
    /// is trailing decoration (block-end border/padding).
    pub is_at_block_end: bool,
    /// Monolithic content overflowed the fragmentainer by this much; the
    /// next fragmentainer must skip past it before placing new content.
    pub monolithic_overflow: LayoutUnit,
    /// The fragment repeats on every fragmentainer (printed table headers
    /// and footers).
    pub is_repeated: bool,
}

impl BlockBreakToken {
    pub fn sequence_after(previous: Option<&BlockBreakToken>) -> u32 {
        previous.map_or(0, |token| token.sequence_number + 1)
    }
}

/// Resume marker for opaque inline content: continue with the given line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineBreakToken {
    pub node: BoxId,
    /// Same numbering as block tokens: fragment *i* carries sequence *i*.
    pub sequence_number: u32,
    pub line_index: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_increment_per_fragment() {
        assert_eq!(BlockBreakToken::sequence_after(None), 0);
        let token = BlockBreakToken {
            node: BoxId::new(1),
            sequence_number: 0,
            consumed_block_size: LayoutUnit::zero(),
            child_break_states: Vec::new(),
            has_seen_all_children: false,
            is_at_block_end: false,
            monolithic_overflow: LayoutUnit::zero(),
            is_repeated: false,
        };
        assert_eq!(BlockBreakToken::sequence_after(Some(&token)), 1);
    }
}
