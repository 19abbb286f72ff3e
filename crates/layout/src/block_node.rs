//! The node-boundary entry point into layout.
//!
//! Every recursion step goes through [`BlockNode::layout`]: it probes the
//! per-box result cache, dispatches to the algorithm the box's content
//! calls for, runs scrollbar stabilization, and writes results and
//! geometry back into the tree when side effects are enabled.

use crate::algorithms::block::{BlockLayoutAlgorithm, SCROLLBAR_THICKNESS};
use crate::algorithms::column::ColumnLayoutAlgorithm;
use crate::algorithms::frameset::FrameSetLayoutAlgorithm;
use crate::algorithms::page::PageLayoutAlgorithm;
use crate::box_tree::{BoxContent, BoxTree};
use crate::break_token::BreakToken;
use crate::cache::{self, CacheStatus};
use crate::constraint_space::ConstraintSpace;
use crate::context::LayoutContext;
use crate::layout_result::LayoutResult;
use crate::min_max::{self, MinMaxSizesResult};
use crate::LayoutError;
use folio_types::{BoxId, LayoutUnit, LogicalSize, PhysicalRect, WritingModeConverter};
use log::{debug, trace};
use std::sync::Arc;

/// A handle to one box in the tree, the unit of caching and dispatch.
#[derive(Debug, Clone, Copy)]
pub struct BlockNode(BoxId);

impl BlockNode {
    pub fn new(id: BoxId) -> Self {
        Self(id)
    }

    pub fn id(&self) -> BoxId {
        self.0
    }

    /// Read-only intrinsic sizing query. Never consults or mutates the
    /// cache and never writes box state.
    pub fn compute_min_max_sizes(
        &self,
        tree: &BoxTree,
        percentage_inline_base: LayoutUnit,
    ) -> MinMaxSizesResult {
        min_max::compute_min_max_sizes(tree, self.0, percentage_inline_base)
    }

    pub fn layout(
        &self,
        tree: &BoxTree,
        ctx: &mut LayoutContext,
        space: ConstraintSpace,
        break_token: Option<Arc<BreakToken>>,
    ) -> Result<Arc<LayoutResult>, LayoutError> {
        match cache::probe(tree, self.0, &space, break_token.as_ref(), false) {
            CacheStatus::Hit(result) => {
                trace!("cache hit for {:?}", self.0);
                return Ok(result);
            }
            CacheStatus::NeedsSimplifiedLayout(_) => {
                // Geometry is reusable but some descendant changed; a full
                // pass is always a correct (if slower) simplified pass.
                debug!("simplified layout for {:?} runs as a full pass", self.0);
            }
            CacheStatus::Miss => {}
        }

        let result = self.layout_with_scrollbars(tree, ctx, &space, &break_token)?;

        if ctx.side_effects_enabled() && result.is_success() {
            cache::store(tree, self.0, break_token, Arc::clone(&result));
            {
                let mut state = tree.state_mut(self.0);
                state.needs_layout = false;
                state.needs_simplified_layout = false;
            }
            if let Some(fragment) = result.fragment() {
                for link in &fragment.children {
                    if link.fragment.node != self.0 && link.fragment.is_first_for_node {
                        tree.state_mut(link.fragment.node).written_rect = Some(PhysicalRect {
                            origin: link.offset,
                            size: link.fragment.size,
                        });
                    }
                }
            }
        }
        Ok(result)
    }

    /// Runs layout, adding a block-axis scrollbar and rerunning when the
    /// content overflows a scrollable box. Bars are only ever added within
    /// one run, so the loop cannot oscillate.
    fn layout_with_scrollbars(
        &self,
        tree: &BoxTree,
        ctx: &mut LayoutContext,
        space: &ConstraintSpace,
        break_token: &Option<Arc<BreakToken>>,
    ) -> Result<Arc<LayoutResult>, LayoutError> {
        let scrollable = tree.style(self.0).overflow.may_have_scrollbar();
        loop {
            let result = self.run_algorithm(tree, ctx, space.clone(), break_token.clone())?;
            if !scrollable || !ctx.side_effects_enabled() {
                return Ok(result);
            }
            let Some(fragment) = result.fragment() else {
                return Ok(result);
            };
            let wd = tree.style(self.0).writing_direction();
            let box_block_size = WritingModeConverter::new(wd, fragment.size)
                .to_logical_size(fragment.size)
                .block_size;
            let overflows = result.intrinsic_block_size() > box_block_size;
            let mut state = tree.state_mut(self.0);
            if overflows && !state.scrollbars.has_block_bar && !state.scrollbars.frozen_block {
                debug!(
                    "{:?} overflows by {:?}px, adding a {SCROLLBAR_THICKNESS}px scrollbar",
                    self.0,
                    result.intrinsic_block_size() - box_block_size
                );
                state.scrollbars.has_block_bar = true;
                state.scrollbars.frozen_block = true;
                drop(state);
                continue;
            }
            return Ok(result);
        }
    }

    fn run_algorithm(
        &self,
        tree: &BoxTree,
        ctx: &mut LayoutContext,
        space: ConstraintSpace,
        break_token: Option<Arc<BreakToken>>,
    ) -> Result<Arc<LayoutResult>, LayoutError> {
        match tree.content(self.0) {
            BoxContent::Multicol => ColumnLayoutAlgorithm::new(tree, self.0, space).layout(ctx),
            BoxContent::PageRoot => PageLayoutAlgorithm::new(tree, self.0, space).layout(ctx),
            BoxContent::FrameSet { .. } => {
                FrameSetLayoutAlgorithm::new(tree, self.0, space).layout(ctx)
            }
            _ => BlockLayoutAlgorithm::new(tree, self.0, space, break_token).layout(ctx),
        }
    }
}

/// Lays out the tree's root box against a viewport-like available size.
pub fn layout_root(
    tree: &BoxTree,
    ctx: &mut LayoutContext,
    available: LogicalSize,
) -> Result<Arc<LayoutResult>, LayoutError> {
    if tree.is_empty() {
        return Err(LayoutError::EmptyTree);
    }
    let root = BoxId::new(0);
    let space = ConstraintSpace::builder(tree.style(root).writing_direction())
        .available_size(available)
        .percentage_resolution_size(available)
        .new_formatting_context(true)
        .build();
    BlockNode::new(root).layout(tree, ctx, space, None)
}
