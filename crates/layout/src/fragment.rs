//! Immutable physical fragments and the fragment-tree dump.

use crate::break_token::BreakToken;
use folio_types::{BoxId, LayoutUnit, PhysicalOffset, PhysicalSize};
use std::fmt::Write;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    /// An ordinary box fragment.
    Box,
    /// A column box receiving a slice of multicol content.
    Fragmentainer,
    /// A page box.
    Page,
    /// A frameset grid cell.
    Frame,
    /// One line of opaque inline content.
    Line,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalFragmentLink {
    pub offset: PhysicalOffset,
    pub fragment: Arc<PhysicalFragment>,
}

/// The border-box geometry produced by one layout pass over one box, plus
/// the child fragments placed within it. Never mutated once built.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalFragment {
    pub kind: FragmentKind,
    pub node: BoxId,
    pub size: PhysicalSize,
    pub children: Vec<PhysicalFragmentLink>,
    /// Present when the box's content continues in the next fragmentainer.
    pub break_token: Option<Arc<BreakToken>>,
    pub first_baseline: Option<LayoutUnit>,
    pub last_baseline: Option<LayoutUnit>,
    /// This is the first fragment generated for the box (it was not resumed
    /// from a break token).
    pub is_first_for_node: bool,
}

impl PhysicalFragment {
    pub fn block_break_token(&self) -> Option<&crate::break_token::BlockBreakToken> {
        self.break_token.as_deref().and_then(BreakToken::as_block)
    }

    /// Textual dump of the fragment tree, the shape golden tests compare
    /// against verbatim: two-space indent per level, the root unplaced.
    pub fn dump_tree(&self) -> String {
        let mut out = String::from(".:: LayoutNG Physical Fragment Tree ::.\n");
        let _ = writeln!(out, "  offset:unplaced size:{}", self.size);
        for child in &self.children {
            Self::dump_subtree(child, 2, &mut out);
        }
        out
    }

    fn dump_subtree(link: &PhysicalFragmentLink, depth: usize, out: &mut String) {
        for _ in 0..depth {
            out.push_str("  ");
        }
        let _ = writeln!(out, "offset:{} size:{}", link.offset, link.fragment.size);
        for child in &link.fragment.children {
            Self::dump_subtree(child, depth + 1, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_types::LayoutUnitExt;

    fn leaf(width: f32, height: f32) -> Arc<PhysicalFragment> {
        Arc::new(PhysicalFragment {
            kind: FragmentKind::Box,
            node: BoxId::new(1),
            size: PhysicalSize::new(LayoutUnit::px(width), LayoutUnit::px(height)),
            children: Vec::new(),
            break_token: None,
            first_baseline: None,
            last_baseline: None,
            is_first_for_node: true,
        })
    }

    #[test]
    fn dump_uses_two_space_indent_and_unplaced_root() {
        let child = PhysicalFragmentLink {
            offset: PhysicalOffset::new(LayoutUnit::px(110.0), LayoutUnit::zero()),
            fragment: leaf(100.0, 50.0),
        };
        let root = PhysicalFragment {
            kind: FragmentKind::Box,
            node: BoxId::new(0),
            size: PhysicalSize::new(LayoutUnit::px(210.0), LayoutUnit::px(100.0)),
            children: vec![child],
            break_token: None,
            first_baseline: None,
            last_baseline: None,
            is_first_for_node: true,
        };
        assert_eq!(
            root.dump_tree(),
            ".:: LayoutNG Physical Fragment Tree ::.\n  \
             offset:unplaced size:210x100\n    \
             offset:110,0 size:100x50\n"
        );
    }
}
