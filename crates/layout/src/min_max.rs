//! Min/max (intrinsic) inline-size queries.
//!
//! [`BlockNode::compute_min_max_sizes`](crate::block_node::BlockNode::compute_min_max_sizes)
//! is the read-only counterpart to layout: it never touches cached
//! results or per-box state, and its answer is independent of the
//! containing block's resolved size unless the result says otherwise via
//! `depends_on_block_constraints`.

use crate::algorithms::{border_padding, resolve_length, resolve_margins};
use crate::box_tree::{BoxContent, BoxTree};
use folio_types::{BoxId, LayoutUnit, LayoutUnitExt, MAX_SIZE};

/// Min-content and max-content border-box inline sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinMaxSizes {
    pub min_size: LayoutUnit,
    pub max_size: LayoutUnit,
}

impl MinMaxSizes {
    pub fn fixed(size: LayoutUnit) -> Self {
        Self {
            min_size: size,
            max_size: size,
        }
    }

    /// CSS shrink-to-fit: `min(max(min_size, available), max_size)`, with
    /// `min_size` winning over `max_size` when they conflict.
    pub fn shrink_to_fit(&self, available_size: LayoutUnit) -> LayoutUnit {
        self.max_size.min(available_size).max(self.min_size)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MinMaxSizesResult {
    pub sizes: MinMaxSizes,
    /// The answer changes when the containing block's block-size does
    /// (a percentage block-size somewhere in the subtree).
    pub depends_on_block_constraints: bool,
}

/// Computes the min/max inline contribution of one box. Percentage widths
/// resolve against `percentage_base`; during the recursive content walk
/// the base is indefinite, so descendants report pure content sizes.
pub(crate) fn compute_min_max_sizes(
    tree: &BoxTree,
    id: BoxId,
    percentage_base: LayoutUnit,
) -> MinMaxSizesResult {
    let style = tree.style(id);
    let bp = border_padding(style);
    let mut depends_on_block_constraints = style.height.is_percent()
        || style.min_height.is_percent()
        || style.max_height.is_percent();

    let specified = resolve_length(style.width, percentage_base);
    if !specified.is_indefinite() {
        return MinMaxSizesResult {
            sizes: MinMaxSizes::fixed(specified + bp.inline_sum()),
            depends_on_block_constraints,
        };
    }

    let content = match tree.content(id) {
        BoxContent::Replaced { size, .. } => MinMaxSizes::fixed(size.inline_size),
        // Opaque line content has no measurable intrinsic widths; it
        // takes whatever line width it is handed.
        BoxContent::LineContainer { .. } => MinMaxSizes {
            min_size: LayoutUnit::zero(),
            max_size: MAX_SIZE,
        },
        _ => {
            let mut min_size = LayoutUnit::zero();
            let mut max_size = LayoutUnit::zero();
            for &child in tree.children(id) {
                let child_result = compute_min_max_sizes(tree, child, folio_types::INDEFINITE);
                depends_on_block_constraints |= child_result.depends_on_block_constraints;
                // Percentage margins contribute nothing to intrinsic sizes.
                let margins = resolve_margins(tree.style(child), LayoutUnit::zero());
                min_size =
                    min_size.max(saturating_add(child_result.sizes.min_size, margins.inline_sum()));
                max_size =
                    max_size.max(saturating_add(child_result.sizes.max_size, margins.inline_sum()));
            }
            MinMaxSizes { min_size, max_size }
        }
    };

    MinMaxSizesResult {
        sizes: MinMaxSizes {
            min_size: saturating_add(content.min_size, bp.inline_sum()),
            max_size: saturating_add(content.max_size, bp.inline_sum()),
        },
        depends_on_block_constraints,
    }
}

fn saturating_add(size: LayoutUnit, amount: LayoutUnit) -> LayoutUnit {
    if size == MAX_SIZE {
        MAX_SIZE
    } else {
        size + amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_style::ComputedStyle;
    use std::sync::Arc;

    #[test]
    fn specified_width_is_border_box_and_exact() {
        let mut tree = BoxTree::new();
        let root = tree.insert(
            None,
            Arc::new(ComputedStyle::builder().width(100.0).border(5.0).build()),
            BoxContent::Block,
        );
        let result = compute_min_max_sizes(&tree, root, LayoutUnit::px(400.0));
        assert_eq!(result.sizes, MinMaxSizes::fixed(LayoutUnit::px(110.0)));
        assert!(!result.depends_on_block_constraints);
    }

    #[test]
    fn auto_width_takes_the_widest_child() {
        let mut tree = BoxTree::new();
        let root = tree.insert(
            None,
            Arc::new(ComputedStyle::builder().padding(10.0).build()),
            BoxContent::Block,
        );
        tree.insert(
            Some(root),
            Arc::new(ComputedStyle::builder().width(60.0).build()),
            BoxContent::Block,
        );
        tree.insert(
            Some(root),
            Arc::new(ComputedStyle::builder().width(90.0).margin(0.0, 5.0, 0.0, 5.0).build()),
            BoxContent::Block,
        );
        let result = compute_min_max_sizes(&tree, root, folio_types::INDEFINITE);
        // widest child: 90 + 2*5 margin, plus 2*10 padding.
        assert_eq!(result.sizes, MinMaxSizes::fixed(LayoutUnit::px(120.0)));
    }

    #[test]
    fn opaque_line_content_fills_any_available_size() {
        let mut tree = BoxTree::new();
        let root = tree.insert(
            None,
            Arc::new(ComputedStyle::default()),
            BoxContent::LineContainer {
                line_height: LayoutUnit::px(20.0),
                line_count: 3,
            },
        );
        let result = compute_min_max_sizes(&tree, root, folio_types::INDEFINITE);
        assert_eq!(result.sizes.min_size, LayoutUnit::zero());
        assert_eq!(result.sizes.max_size, MAX_SIZE);
        assert_eq!(
            result.sizes.shrink_to_fit(LayoutUnit::px(240.0)),
            LayoutUnit::px(240.0)
        );
    }

    #[test]
    fn percent_height_flags_block_constraint_dependence() {
        let mut tree = BoxTree::new();
        let root = tree.insert(
            None,
            Arc::new(ComputedStyle::default()),
            BoxContent::Block,
        );
        tree.insert(
            Some(root),
            Arc::new(ComputedStyle::builder().height_percent(50.0).build()),
            BoxContent::Block,
        );
        let result = compute_min_max_sizes(&tree, root, folio_types::INDEFINITE);
        assert!(result.depends_on_block_constraints);
    }
}
