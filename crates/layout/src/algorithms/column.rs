//! Multi-column layout: column geometry, row-by-row fragmentainer
//! generation, column balancing and spanners.
//!
//! Content is sliced into columns by running the block algorithm in
//! fragmentainer mode against the multicol container's own children, so
//! the resume tokens threaded between columns are ordinary block break
//! tokens of the container. Balancing first measures the content in an
//! unconstrained initial pass, guesses the smallest candidate column size
//! from the forced-break content runs, then stretches by the smallest
//! reported space shortage until the content fits the column count.

use crate::algorithms::block::BlockLayoutAlgorithm;
use crate::algorithms::{border_padding, resolve_block_size, resolve_inline_size, resolve_margins};
use crate::block_node::BlockNode;
use crate::box_tree::BoxTree;
use crate::break_token::{BreakToken, ChildBreakState};
use crate::builder::BoxFragmentBuilder;
use crate::constraint_space::{ConstraintSpace, FragmentationType};
use crate::context::LayoutContext;
use crate::fragment::FragmentKind;
use crate::layout_result::LayoutResult;
use crate::LayoutError;
use folio_style::{ColumnFill, ComputedStyle};
use folio_types::{
    BfcOffset, BoxId, LayoutUnit, LayoutUnitExt, LogicalOffset, LogicalSize,
    WritingModeConverter, INDEFINITE,
};
use log::{debug, trace};
use std::sync::Arc;

/// `column-gap: normal` (1em at the UA default font size).
pub(crate) const DEFAULT_COLUMN_GAP: f32 = 16.0;

/// Column count and per-column inline size for an available inline size,
/// per the CSS multicol pseudo-algorithm.
pub(crate) fn column_geometry(
    style: &ComputedStyle,
    available: LayoutUnit,
    gap: LayoutUnit,
) -> (u32, LayoutUnit) {
    let count_for_width = |width: LayoutUnit| -> u32 {
        if width <= LayoutUnit::zero() || available <= LayoutUnit::zero() {
            return 1;
        }
        (((available + gap).0 as i64 / (width + gap).0 as i64) as u32).max(1)
    };
    let count = match (style.column_count, style.column_width) {
        (Some(count), None) => count.max(1),
        (None, Some(width)) => count_for_width(LayoutUnit::px(width)),
        (Some(count), Some(width)) => count.max(1).min(count_for_width(LayoutUnit::px(width))),
        (None, None) => 1,
    };
    let inline = ((available - gap * (count as i32 - 1)) / count as i32).clamp_negative_to_zero();
    (count, inline)
}

/// What one row of columns produced.
struct RowResult {
    columns: Vec<Arc<LayoutResult>>,
    next_token: Option<Arc<BreakToken>>,
    spanner: Option<BoxId>,
    forced_break_count: u32,
    minimal_space_shortage: LayoutUnit,
    tallest_unbreakable: LayoutUnit,
    /// Tallest column content, meaningful in the initial (unconstrained)
    /// balancing pass where each column is one content run.
    run_sizes: Vec<LayoutUnit>,
}

impl RowResult {
    fn all_content_fit(&self) -> bool {
        self.next_token.is_none() || self.spanner.is_some()
    }
}

/// Lays out a multicol container in one pass. The container is monolithic
/// towards any outer fragmentation context: it takes no incoming break
/// token and never emits one, so an outer page either keeps it whole or
/// records monolithic overflow.
pub struct ColumnLayoutAlgorithm<'a> {
    tree: &'a BoxTree,
    node: BoxId,
    space: ConstraintSpace,
}

impl<'a> ColumnLayoutAlgorithm<'a> {
    pub fn new(tree: &'a BoxTree, node: BoxId, space: ConstraintSpace) -> Self {
        Self { tree, node, space }
    }

    pub fn layout(&self, ctx: &mut LayoutContext) -> Result<Arc<LayoutResult>, LayoutError> {
        let style = self.tree.style(self.node);
        let bp = border_padding(style);
        let percentage_inline = self.space.percentage_resolution_size().inline_size;
        let margins = resolve_margins(style, percentage_inline);
        let inline_size = resolve_inline_size(style, &self.space, bp, margins);
        let content_inline_size = (inline_size - bp.inline_sum()).clamp_negative_to_zero();

        let gap = LayoutUnit::px(style.column_gap.unwrap_or(DEFAULT_COLUMN_GAP));
        let (used_count, column_inline_size) = column_geometry(style, content_inline_size, gap);

        let definite_content_block = crate::algorithms::resolve_length(
            style.height,
            self.space.percentage_resolution_size().block_size,
        );
        let balanced = style.column_fill == ColumnFill::Balance
            || definite_content_block.is_indefinite();
        debug!(
            "multicol {:?}: {used_count} columns of {:?}px, balanced: {balanced}",
            self.node,
            column_inline_size.to_f32_px()
        );

        let mut builder = BoxFragmentBuilder::new(
            self.node,
            FragmentKind::Box,
            self.space.clone(),
            bp,
            inline_size,
            None,
        );
        builder.set_bfc_block_offset(self.space.bfc_offset().block_offset);
        builder.set_page_name(style.page_name.clone());

        let mut content_offset = bp.block_start;
        let mut token: Option<Arc<BreakToken>> = None;
        let has_content = !self.tree.children(self.node).is_empty();

        if !has_content {
            // An empty container still gets one (empty) column box.
            let column_size = if definite_content_block.is_indefinite() {
                LayoutUnit::zero()
            } else {
                definite_content_block
            };
            let column = self.layout_one_column(
                ctx,
                None,
                column_inline_size,
                column_size,
                definite_content_block,
                balanced,
                false,
            )?;
            if let Some(fragment) = column.fragment() {
                builder.add_child(
                    Arc::clone(fragment),
                    LogicalOffset::new(bp.inline_start, content_offset),
                );
            }
            content_offset += column_size;
        }

        let mut first_row = true;
        while has_content && (first_row || token.is_some()) {
            first_row = false;
            let row = if balanced {
                self.layout_balanced_row(
                    ctx,
                    token.clone(),
                    used_count,
                    definite_content_block,
                )?
            } else {
                self.layout_row(
                    ctx,
                    token.clone(),
                    used_count,
                    definite_content_block,
                    definite_content_block,
                    true,
                    false,
                )?
            };

            let mut row_block_size = LayoutUnit::zero();
            let mut columns_in_row = 0u32;
            for (i, column) in row.columns.iter().enumerate() {
                let fragment = column
                    .fragment()
                    .ok_or(LayoutError::MissingFragment(self.node))?;
                let column_logical = WritingModeConverter::new(
                    style.writing_direction(),
                    fragment.size,
                )
                .to_logical_size(fragment.size);
                row_block_size = row_block_size.max(column_logical.block_size);
                builder.add_child(
                    Arc::clone(fragment),
                    LogicalOffset::new(
                        bp.inline_start + (column_inline_size + gap) * i as i32,
                        content_offset,
                    ),
                );
                columns_in_row += 1;
            }
            builder.propagate_tallest_unbreakable(row.tallest_unbreakable);
            content_offset += row_block_size;

            // A constrained sequential row that ran out of content before
            // filling every column still presents the full column row.
            if row.spanner.is_none()
                && !balanced
                && !definite_content_block.is_indefinite()
                && columns_in_row < used_count
            {
                let filler = self.layout_one_column(
                    ctx,
                    None,
                    column_inline_size,
                    definite_content_block,
                    definite_content_block,
                    balanced,
                    false,
                )?;
                if let Some(fragment) = filler.fragment() {
                    builder.add_child(
                        Arc::clone(fragment),
                        LogicalOffset::new(
                            bp.inline_start + (column_inline_size + gap) * columns_in_row as i32,
                            content_offset - row_block_size,
                        ),
                    );
                }
            }

            token = row.next_token.clone();
            if let Some(spanner) = row.spanner {
                let spanner_margins = resolve_margins(self.tree.style(spanner), content_inline_size);
                let spanner_space =
                    ConstraintSpace::builder(self.tree.style(spanner).writing_direction())
                        .available_size(LogicalSize::new(
                            content_inline_size - spanner_margins.inline_sum(),
                            INDEFINITE,
                        ))
                        .percentage_resolution_size(LogicalSize::new(
                            content_inline_size,
                            definite_content_block,
                        ))
                        .new_formatting_context(true)
                        .bfc_offset(BfcOffset::default())
                        .build();
                let result =
                    BlockNode::new(spanner).layout(self.tree, ctx, spanner_space, None)?;
                let fragment = result
                    .fragment()
                    .ok_or(LayoutError::MissingFragment(spanner))?;
                let spanner_logical = WritingModeConverter::new(
                    self.tree.style(spanner).writing_direction(),
                    fragment.size,
                )
                .to_logical_size(fragment.size);
                content_offset += spanner_margins.block_start;
                builder.add_child(
                    Arc::clone(fragment),
                    LogicalOffset::new(
                        bp.inline_start + spanner_margins.inline_start,
                        content_offset,
                    ),
                );
                content_offset += spanner_logical.block_size + spanner_margins.block_end;
                token = token.map(|t| mark_spanner_finished(&t, spanner));
            } else if token.is_some() {
                // All overflow handling happens inside the row; a leftover
                // token without a spanner means the row logic is done and
                // the content has been exhausted into overflow columns.
                break;
            }
        }

        let content_size = content_offset + bp.block_end;
        let total = resolve_block_size(style, &self.space, bp, content_size);
        builder.set_intrinsic_block_size(content_size);
        if self.space.has_block_fragmentation() {
            builder.propagate_tallest_unbreakable(total);
        }
        Ok(Arc::new(builder.to_box_fragment(
            total,
            self.space.exclusion_space().clone(),
        )))
    }

    /// Lays out one row of columns at a fixed (or, in the initial
    /// balancing pass, unconstrained) column size.
    #[allow(clippy::too_many_arguments)]
    fn layout_row(
        &self,
        ctx: &mut LayoutContext,
        mut token: Option<Arc<BreakToken>>,
        used_count: u32,
        column_size: LayoutUnit,
        percentage_block: LayoutUnit,
        allow_overflow: bool,
        initial_pass: bool,
    ) -> Result<RowResult, LayoutError> {
        let mut row = RowResult {
            columns: Vec::new(),
            next_token: None,
            spanner: None,
            forced_break_count: 0,
            minimal_space_shortage: INDEFINITE,
            tallest_unbreakable: LayoutUnit::zero(),
            run_sizes: Vec::new(),
        };
        loop {
            let result = self.layout_one_column(
                ctx,
                token.clone(),
                self.column_inline_size(),
                column_size,
                percentage_block,
                !initial_pass,
                initial_pass,
            )?;
            let fragment = result
                .fragment()
                .ok_or(LayoutError::MissingFragment(self.node))?;
            row.forced_break_count += u32::from(result.has_forced_break());
            row.tallest_unbreakable =
                row.tallest_unbreakable.max(result.tallest_unbreakable_block_size());
            let shortage = result.minimal_space_shortage();
            if !shortage.is_indefinite()
                && shortage > LayoutUnit::zero()
                && (row.minimal_space_shortage.is_indefinite()
                    || shortage < row.minimal_space_shortage)
            {
                row.minimal_space_shortage = shortage;
            }
            row.run_sizes.push(result.intrinsic_block_size());
            row.spanner = result.column_spanner();
            token = fragment.break_token.clone();
            row.columns.push(result);

            if row.spanner.is_some() || token.is_none() {
                row.next_token = token;
                return Ok(row);
            }
            if !allow_overflow && row.columns.len() as u32 >= used_count {
                row.next_token = token;
                return Ok(row);
            }
        }
    }

    fn column_inline_size(&self) -> LayoutUnit {
        let style = self.tree.style(self.node);
        let bp = border_padding(style);
        let margins = resolve_margins(
            style,
            self.space.percentage_resolution_size().inline_size,
        );
        let inline_size = resolve_inline_size(style, &self.space, bp, margins);
        let content = (inline_size - bp.inline_sum()).clamp_negative_to_zero();
        let gap = LayoutUnit::px(style.column_gap.unwrap_or(DEFAULT_COLUMN_GAP));
        column_geometry(style, content, gap).1
    }

    #[allow(clippy::too_many_arguments)]
    fn layout_one_column(
        &self,
        ctx: &mut LayoutContext,
        token: Option<Arc<BreakToken>>,
        column_inline_size: LayoutUnit,
        column_size: LayoutUnit,
        percentage_block: LayoutUnit,
        balanced: bool,
        initial_pass: bool,
    ) -> Result<Arc<LayoutResult>, LayoutError> {
        let style = self.tree.style(self.node);
        let known_size = !column_size.is_indefinite() && !initial_pass;
        let mut space_builder = ConstraintSpace::builder(style.writing_direction())
            .available_size(LogicalSize::new(
                column_inline_size,
                if known_size { column_size } else { INDEFINITE },
            ))
            .percentage_resolution_size(LogicalSize::new(column_inline_size, percentage_block))
            .fragmentation(FragmentationType::Column)
            .fragmentainer_block_size(if initial_pass { INDEFINITE } else { column_size })
            .new_formatting_context(true)
            .fixed_inline_size(true)
            .inside_balanced_columns(balanced);
        if known_size {
            space_builder = space_builder.fixed_block_size(true);
        }
        if initial_pass {
            space_builder = space_builder.initial_column_balancing_pass(true);
        }
        BlockLayoutAlgorithm::new(self.tree, self.node, space_builder.build(), token)
            .for_fragmentainer(FragmentKind::Fragmentainer)
            .layout(ctx)
    }

    /// Balances one row: measures, guesses, stretches.
    fn layout_balanced_row(
        &self,
        ctx: &mut LayoutContext,
        token: Option<Arc<BreakToken>>,
        used_count: u32,
        definite_content_block: LayoutUnit,
    ) -> Result<RowResult, LayoutError> {
        let cap = definite_content_block;

        // Initial pass: unconstrained, forced breaks only. Each resulting
        // fragmentainer is one content run.
        let initial = ctx.measure(|ctx| {
            self.layout_row(
                ctx,
                token.clone(),
                used_count,
                INDEFINITE,
                definite_content_block,
                true,
                true,
            )
        })?;
        let mut size = balance_initial_size(&initial.run_sizes, used_count)
            .max(initial.tallest_unbreakable);
        if !cap.is_indefinite() {
            size = size.min(cap);
        }
        trace!(
            "balancing {:?}: initial column size guess {:?}px",
            self.node,
            size.to_f32_px()
        );

        loop {
            let attempt = ctx.measure(|ctx| {
                self.layout_row(
                    ctx,
                    token.clone(),
                    used_count,
                    size,
                    definite_content_block,
                    false,
                    false,
                )
            })?;
            let done = attempt.all_content_fit();
            let can_grow = cap.is_indefinite() || size < cap;
            let useful_to_grow = attempt.columns.len() as u32 > attempt.forced_break_count + 1
                || !attempt.all_content_fit();
            if done || !can_grow || !useful_to_grow {
                // Rerun outside the measure scope so results are cached
                // and geometry is written back. A capped row that still
                // overflows spills into extra columns.
                return self.layout_row(
                    ctx,
                    token,
                    used_count,
                    size,
                    definite_content_block,
                    done || !can_grow,
                    false,
                );
            }
            let shortage = attempt.minimal_space_shortage;
            if shortage.is_indefinite() || shortage <= LayoutUnit::zero() {
                return self.layout_row(
                    ctx,
                    token,
                    used_count,
                    size,
                    definite_content_block,
                    true,
                    false,
                );
            }
            let mut next = size + shortage;
            if !cap.is_indefinite() {
                next = next.min(cap);
            }
            if next <= size {
                return self.layout_row(
                    ctx,
                    token,
                    used_count,
                    size,
                    definite_content_block,
                    true,
                    false,
                );
            }
            trace!(
                "balancing {:?}: stretching columns to {:?}px",
                self.node,
                next.to_f32_px()
            );
            size = next;
        }
    }
}

/// Smallest candidate column size from the initial pass: distribute the
/// implicit breaks into the tallest runs, then take the tallest resulting
/// piece. Ceil-division guarantees the guess never under-shoots a run.
fn balance_initial_size(run_sizes: &[LayoutUnit], used_count: u32) -> LayoutUnit {
    if run_sizes.is_empty() {
        return LayoutUnit::zero();
    }
    let mut breaks: Vec<i32> = vec![1; run_sizes.len()];
    let implicit = (used_count as usize).saturating_sub(run_sizes.len());
    for _ in 0..implicit {
        let mut tallest = 0;
        for i in 1..run_sizes.len() {
            if run_sizes[i].ceil_div(breaks[i]) > run_sizes[tallest].ceil_div(breaks[tallest]) {
                tallest = i;
            }
        }
        breaks[tallest] += 1;
    }
    run_sizes
        .iter()
        .zip(&breaks)
        .map(|(size, pieces)| size.ceil_div(*pieces))
        .max()
        .unwrap_or(LayoutUnit::zero())
}

/// Rewrites a resume token so the given spanner, just laid out by the
/// column algorithm, is skipped when the next row starts.
fn mark_spanner_finished(token: &Arc<BreakToken>, spanner: BoxId) -> Arc<BreakToken> {
    let Some(block) = token.as_block() else {
        return Arc::clone(token);
    };
    let mut rewritten = block.clone();
    for state in &mut rewritten.child_break_states {
        if matches!(state, ChildBreakState::StartBefore(id) if *id == spanner) {
            *state = ChildBreakState::Finished(spanner);
        }
    }
    Arc::new(BreakToken::Block(rewritten))
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_style::ComputedStyle;

    #[test]
    fn count_wins_when_both_are_specified() {
        let style = ComputedStyle::builder()
            .columns(3)
            .column_width(1000.0)
            .column_gap(10.0)
            .build();
        let (count, inline) =
            column_geometry(&style, LayoutUnit::px(320.0), LayoutUnit::px(10.0));
        // 1000px columns don't fit three times; the available space caps
        // the count.
        assert_eq!(count, 1);
        assert_eq!(inline, LayoutUnit::px(320.0));
    }

    #[test]
    fn three_columns_with_gaps() {
        let style = ComputedStyle::builder().columns(3).column_gap(10.0).build();
        let (count, inline) =
            column_geometry(&style, LayoutUnit::px(320.0), LayoutUnit::px(10.0));
        assert_eq!(count, 3);
        assert_eq!(inline, LayoutUnit::px(100.0));
    }

    #[test]
    fn width_derives_the_count() {
        let style = ComputedStyle::builder()
            .column_width(100.0)
            .column_gap(10.0)
            .build();
        let (count, _) = column_geometry(&style, LayoutUnit::px(320.0), LayoutUnit::px(10.0));
        assert_eq!(count, 3);
    }

    #[test]
    fn initial_guess_splits_single_run_evenly() {
        let guess = balance_initial_size(&[LayoutUnit::px(90.0)], 3);
        assert_eq!(guess, LayoutUnit::px(30.0));
    }

    #[test]
    fn initial_guess_gives_breaks_to_the_tallest_run() {
        // Runs of 100 and 20 with three columns: the tall run is split in
        // two, the short one left alone.
        let guess = balance_initial_size(&[LayoutUnit::px(100.0), LayoutUnit::px(20.0)], 3);
        assert_eq!(guess, LayoutUnit::px(50.0));
    }
}
