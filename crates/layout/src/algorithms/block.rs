//! Block layout: the in-flow child walk, margin collapsing, float
//! placement and fragmentation for one block container.
//!
//! The algorithm is written as a restartable pass. A pass that discovers
//! its own BFC block offset mid-walk (a float appeared before any in-flow
//! content pinned the box) aborts with
//! [`LayoutStatus::BfcBlockOffsetResolved`] and is rerun with the offset
//! forced; a pass that ends up with an unacceptable break retries once
//! against a previously recorded [`EarlyBreak`]. Neither restart escapes
//! this module: callers only ever see `Success` or
//! `OutOfFragmentainerSpace` ("break before me").

use crate::algorithms::{
    border_padding, fit_content_inline_size, resolve_block_size, resolve_inline_size,
    resolve_length, resolve_margins,
};
use crate::block_node::BlockNode;
use crate::box_tree::{BoxContent, BoxTree};
use crate::break_token::{BlockBreakToken, BreakToken, ChildBreakState, InlineBreakToken};
use crate::builder::BoxFragmentBuilder;
use crate::constraint_space::{ConstraintSpace, FragmentationType};
use crate::context::LayoutContext;
use crate::exclusion::{Exclusion, ExclusionKind, ExclusionSpace};
use crate::fragment::{FragmentKind, PhysicalFragment, PhysicalFragmentLink};
use crate::fragmentation::{
    appeal_of_break_between, fragmentainer_space_left, BreakAppeal, EarlyBreak,
};
use crate::layout_result::{LayoutResult, LayoutStatus};
use crate::LayoutError;
use folio_style::{BreakBetween, ComputedStyle, Float};
use folio_types::{
    BfcOffset, BoxId, BoxStrut, LayoutUnit, LayoutUnitExt, LogicalOffset, LogicalSize,
    MarginStrut, WritingModeConverter, INDEFINITE,
};
use log::{debug, trace};
use std::sync::Arc;

/// Scrollbar thickness on overlay-free platforms.
pub(crate) const SCROLLBAR_THICKNESS: f32 = 15.0;

/// One child to visit in this pass, with its resume token if it already
/// produced fragments in earlier fragmentainers.
struct PlannedChild {
    id: BoxId,
    token: Option<Arc<BreakToken>>,
    /// The child came out of the incoming break token (its break-before
    /// has already been honored).
    from_token: bool,
}

pub struct BlockLayoutAlgorithm<'a> {
    tree: &'a BoxTree,
    node: BoxId,
    space: ConstraintSpace,
    break_token: Option<Arc<BreakToken>>,
    kind: FragmentKind,
    early_break: Option<EarlyBreak>,
}

impl<'a> BlockLayoutAlgorithm<'a> {
    pub fn new(
        tree: &'a BoxTree,
        node: BoxId,
        space: ConstraintSpace,
        break_token: Option<Arc<BreakToken>>,
    ) -> Self {
        Self {
            tree,
            node,
            space,
            break_token,
            kind: FragmentKind::Box,
            early_break: None,
        }
    }

    /// Lays the node's children into a fragmentainer (a column or page
    /// box) instead of a box of the node's own style: the node's border,
    /// padding and specified sizes are ignored, and the fragment gets the
    /// fragmentainer kind and size.
    pub(crate) fn for_fragmentainer(mut self, kind: FragmentKind) -> Self {
        self.kind = kind;
        self
    }

    pub(crate) fn with_early_break(mut self, early_break: Option<EarlyBreak>) -> Self {
        self.early_break = early_break;
        self
    }

    pub fn layout(self, ctx: &mut LayoutContext) -> Result<Arc<LayoutResult>, LayoutError> {
        let mut forced_bfc = self.space.forced_bfc_block_offset();
        let mut early_break = self.early_break.clone();
        let mut retried_with_early_break = early_break.is_some();
        loop {
            let result = self.attempt(ctx, forced_bfc, early_break.as_ref())?;
            match result.status() {
                LayoutStatus::BfcBlockOffsetResolved => {
                    trace!(
                        "restarting {:?} with forced bfc offset {:?}",
                        self.node,
                        result.bfc_block_offset()
                    );
                    forced_bfc = result.bfc_block_offset();
                }
                LayoutStatus::NeedsEarlierBreak if !retried_with_early_break => {
                    debug!("retrying {:?} against an earlier break", self.node);
                    retried_with_early_break = true;
                    early_break = result.early_break().cloned();
                }
                _ => return Ok(result),
            }
        }
    }

    fn block_token(&self) -> Option<&BlockBreakToken> {
        self.break_token.as_deref().and_then(BreakToken::as_block)
    }

    fn is_fragmentainer(&self) -> bool {
        self.kind != FragmentKind::Box
    }

    fn style(&self) -> &ComputedStyle {
        self.tree.style(self.node)
    }

    /// Border, padding and scrollbar edges for this fragment. Block-start
    /// decoration belongs to the first fragment only.
    fn border_scrollbar_padding(&self) -> BoxStrut {
        if self.is_fragmentainer() {
            return BoxStrut::default();
        }
        let mut bp = border_padding(self.style());
        let scrollbars = self.tree.state(self.node).scrollbars;
        if scrollbars.has_block_bar {
            bp.inline_end += LayoutUnit::px(SCROLLBAR_THICKNESS);
        }
        if self.block_token().is_some() {
            bp.block_start = LayoutUnit::zero();
        }
        bp
    }

    fn is_column_context(&self) -> bool {
        matches!(self.space.fragmentation(), FragmentationType::Column)
    }

    /// The node's definite content block-size, or [`INDEFINITE`].
    fn definite_content_block_size(&self, bp: BoxStrut) -> LayoutUnit {
        if self.space.is_fixed_block_size() {
            return (self.space.available_size().block_size - bp.block_sum())
                .clamp_negative_to_zero();
        }
        resolve_length(
            self.style().height,
            self.space.percentage_resolution_size().block_size,
        )
    }

    fn attempt(
        &self,
        ctx: &mut LayoutContext,
        forced_bfc: Option<LayoutUnit>,
        early_break: Option<&EarlyBreak>,
    ) -> Result<Arc<LayoutResult>, LayoutError> {
        if let Some(token) = self.block_token() {
            if token.is_at_block_end {
                return Ok(self.layout_trailing(token));
            }
        }
        match self.tree.content(self.node) {
            BoxContent::LineContainer {
                line_height,
                line_count,
            } => Ok(self.layout_lines(*line_height, *line_count)),
            BoxContent::Replaced { size, monolithic } => {
                Ok(self.layout_replaced(*size, *monolithic))
            }
            _ => self.layout_children(ctx, forced_bfc, early_break),
        }
    }

    /// Content is finished; this fragment only carries leftover specified
    /// block-size (and trailing decoration).
    fn layout_trailing(&self, token: &BlockBreakToken) -> Arc<LayoutResult> {
        let bp = self.border_scrollbar_padding();
        let margins = resolve_margins(
            self.style(),
            self.space.percentage_resolution_size().inline_size,
        );
        let inline_size = resolve_inline_size(self.style(), &self.space, bp, margins);
        let mut builder = BoxFragmentBuilder::new(
            self.node,
            self.kind,
            self.space.clone(),
            bp,
            inline_size,
            Some(token),
        );
        let total = resolve_block_size(self.style(), &self.space, bp, token.consumed_block_size);
        let remaining = (total - token.consumed_block_size).clamp_negative_to_zero();
        let space_left = fragmentainer_space_left(&self.space);
        let fragment_size = if !space_left.is_indefinite() && remaining > space_left {
            builder.set_did_break();
            builder.set_is_at_block_end(true);
            space_left
        } else {
            remaining
        };
        builder.set_bfc_block_offset(self.space.bfc_offset().block_offset);
        builder.set_intrinsic_block_size(fragment_size);
        Arc::new(builder.to_box_fragment(fragment_size, self.space.exclusion_space().clone()))
    }

    fn layout_replaced(&self, size: LogicalSize, monolithic: bool) -> Arc<LayoutResult> {
        let bp = self.border_scrollbar_padding();
        let inline_size = size.inline_size + bp.inline_sum();
        let block_size = size.block_size + bp.block_sum();
        let mut builder = BoxFragmentBuilder::new(
            self.node,
            self.kind,
            self.space.clone(),
            bp,
            inline_size,
            self.block_token(),
        );
        let bfc = self.space.bfc_offset().block_offset + self.space.margin_strut().sum();
        builder.set_bfc_block_offset(bfc);
        builder.set_intrinsic_block_size(block_size);
        if monolithic {
            builder.propagate_tallest_unbreakable(block_size);
            let space_left = fragmentainer_space_left(&self.space);
            if !space_left.is_indefinite() && block_size > space_left {
                builder.set_monolithic_overflow(block_size - space_left);
            }
        }
        Arc::new(builder.to_box_fragment(block_size, self.space.exclusion_space().clone()))
    }

    /// Lays out pre-shaped lines, honoring orphans and widows.
    ///
    /// The fit is decided in three steps: start from what physically fits,
    /// steal lines for the widows of the next fragment, then re-clamp to
    /// the orphans minimum (orphans win over widows). A fit that ends up
    /// violating either constraint is only accepted at the start of a
    /// fragmentainer; elsewhere the whole container asks its parent to
    /// break before it instead.
    fn layout_lines(&self, line_height: LayoutUnit, line_count: u32) -> Arc<LayoutResult> {
        let style = self.style();
        let bp = self.border_scrollbar_padding();
        let margins = resolve_margins(style, self.space.percentage_resolution_size().inline_size);
        let inline_size = resolve_inline_size(style, &self.space, bp, margins);
        let content_inline_size = (inline_size - bp.inline_sum()).clamp_negative_to_zero();

        let incoming = self.break_token.as_deref().and_then(BreakToken::as_inline);
        let start_line = incoming.map_or(0, |token| token.line_index);
        let sequence_number = incoming.map_or(0, |token| token.sequence_number + 1);
        let remaining = line_count.saturating_sub(start_line);
        let is_continuation = start_line > 0;

        let bfc = self.space.bfc_offset().block_offset + self.space.margin_strut().sum();
        let space_left = fragmentainer_space_left(&self.space);

        let mut fit = remaining;
        let mut appeal = BreakAppeal::Perfect;
        if !space_left.is_indefinite() && line_height > LayoutUnit::zero() {
            let content_space = (space_left - bp.block_start).clamp_negative_to_zero();
            let physical_fit =
                ((content_space.0 as i64 / line_height.0 as i64) as u32).min(remaining);
            fit = physical_fit;
            if fit < remaining && !is_continuation {
                // Breaking: widows steal from this fragment first, then
                // orphans pull back. Orphans win when both cannot hold.
                let widows = style.widows;
                let orphans = style.orphans;
                let mut wanted = fit;
                if remaining - wanted < widows {
                    wanted = remaining.saturating_sub(widows);
                }
                if wanted < orphans {
                    wanted = orphans;
                }
                let violating = wanted > physical_fit
                    || wanted < orphans
                    || (wanted < remaining && remaining - wanted.min(physical_fit) < widows);
                fit = wanted.min(physical_fit);
                if violating {
                    appeal = BreakAppeal::ViolatingOrphansWidows;
                    if !self.space.is_at_fragmentainer_start() {
                        // Push the whole container to the next
                        // fragmentainer; breaking before it is clean.
                        return Arc::new(LayoutResult::out_of_fragmentainer_space(
                            self.space.clone(),
                        ));
                    }
                    fit = fit.max(1);
                }
            } else if fit == 0 && remaining > 0 {
                if !self.space.is_at_fragmentainer_start() {
                    return Arc::new(LayoutResult::out_of_fragmentainer_space(self.space.clone()));
                }
                fit = 1;
            }
        }

        let did_break = fit < remaining;
        let writing_direction = style.writing_direction();
        let size_converter = WritingModeConverter::new(writing_direction, Default::default());
        let line_physical =
            size_converter.to_physical_size(LogicalSize::new(content_inline_size, line_height));

        let content_size = bp.block_start + line_height.scale_by(fit as f32);
        let fragment_size = if did_break {
            content_size
        } else {
            resolve_block_size(style, &self.space, bp, content_size + bp.block_end)
        };

        // The shared builder only mints block tokens; lines resume through
        // an inline token, so the fragment is assembled by hand here.
        let physical_size =
            size_converter.to_physical_size(LogicalSize::new(inline_size, fragment_size));
        let converter = WritingModeConverter::new(writing_direction, physical_size);
        let mut children = Vec::with_capacity(fit as usize);
        for i in 0..fit {
            let line = Arc::new(PhysicalFragment {
                kind: FragmentKind::Line,
                node: self.node,
                size: line_physical,
                children: Vec::new(),
                break_token: None,
                first_baseline: None,
                last_baseline: None,
                is_first_for_node: start_line == 0 && i == 0,
            });
            let offset = LogicalOffset::new(
                bp.inline_start,
                bp.block_start + line_height.scale_by(i as f32),
            );
            children.push(PhysicalFragmentLink {
                offset: converter.to_physical_offset(offset, line_physical),
                fragment: line,
            });
        }

        let break_token = did_break.then(|| {
            Arc::new(BreakToken::Inline(InlineBreakToken {
                node: self.node,
                sequence_number,
                line_index: start_line + fit,
            }))
        });
        let first_baseline = (fit > 0).then(|| bp.block_start + line_height);
        let last_baseline = (fit > 0).then(|| bp.block_start + line_height.scale_by(fit as f32));
        let fragment = Arc::new(PhysicalFragment {
            kind: self.kind,
            node: self.node,
            size: physical_size,
            children,
            break_token,
            first_baseline,
            last_baseline,
            is_first_for_node: !is_continuation,
        });

        let mut shortage = INDEFINITE;
        if did_break
            && appeal == BreakAppeal::ViolatingOrphansWidows
            && !space_left.is_indefinite()
        {
            // One more line would have satisfied the constraints.
            shortage = bp.block_start + line_height.scale_by((fit + 1) as f32) - space_left;
        }
        Arc::new(LayoutResult::new(
            fragment,
            self.space.clone(),
            Some(bfc),
            MarginStrut::default(),
            content_size + if did_break { LayoutUnit::zero() } else { bp.block_end },
            if did_break { appeal } else { BreakAppeal::Perfect },
            false,
            shortage,
            line_height,
            fragment_size,
            false,
            None,
            self.space.exclusion_space().clone(),
            style.page_name.clone(),
            crate::builder::LayoutSideData::None,
        ))
    }

    /// Builds the visit plan for this fragment from the incoming break
    /// token: resumed and restarted children first, then (unless the token
    /// saw everything) the siblings that follow the last of them.
    fn plan_children(&self) -> Vec<PlannedChild> {
        let children = self.tree.children(self.node);
        let Some(token) = self.block_token() else {
            return children
                .iter()
                .map(|&id| PlannedChild {
                    id,
                    token: None,
                    from_token: false,
                })
                .collect();
        };

        let mut plan = Vec::new();
        let mut last_node = None;
        for state in &token.child_break_states {
            last_node = Some(state.node());
            match state {
                ChildBreakState::StartBefore(id) => plan.push(PlannedChild {
                    id: *id,
                    token: None,
                    from_token: true,
                }),
                ChildBreakState::Resume(child_token) => plan.push(PlannedChild {
                    id: child_token.node(),
                    token: Some(Arc::clone(child_token)),
                    from_token: true,
                }),
                ChildBreakState::Finished(_) => {}
            }
        }
        if !token.has_seen_all_children {
            let resume_from = last_node
                .and_then(|node| children.iter().position(|&id| id == node))
                .map_or(0, |index| index + 1);
            for &id in &children[resume_from..] {
                plan.push(PlannedChild {
                    id,
                    token: None,
                    from_token: false,
                });
            }
        }
        plan
    }

    #[allow(clippy::too_many_lines)]
    fn layout_children(
        &self,
        ctx: &mut LayoutContext,
        forced_bfc: Option<LayoutUnit>,
        early_break: Option<&EarlyBreak>,
    ) -> Result<Arc<LayoutResult>, LayoutError> {
        let style = self.style();
        let bp = self.border_scrollbar_padding();
        let percentage_inline = self.space.percentage_resolution_size().inline_size;
        let margins = resolve_margins(style, percentage_inline);
        let inline_size = if self.is_fragmentainer() {
            self.space.available_size().inline_size
        } else {
            resolve_inline_size(style, &self.space, bp, margins)
        };
        let content_inline_size = (inline_size - bp.inline_sum()).clamp_negative_to_zero();
        let definite_content_block = self.definite_content_block_size(bp);

        let token = self.block_token();
        let is_resumed = token.is_some();
        let base = self.space.bfc_offset().block_offset;
        let own_line_start = self.space.bfc_offset().line_offset;

        let mut own_bfc: Option<LayoutUnit> = forced_bfc;
        let mut margin_strut = self.space.margin_strut();
        if own_bfc.is_none() {
            if self.is_fragmentainer() {
                own_bfc = Some(base);
            } else if self.space.is_new_formatting_context() || is_resumed {
                own_bfc = Some(base);
                margin_strut = MarginStrut::default();
            } else if bp.block_start != LayoutUnit::zero() || self.space.has_clearance_offset() {
                let mut offset = base + margin_strut.sum();
                if self.space.has_clearance_offset() {
                    offset = offset.max(self.space.clearance_offset());
                }
                own_bfc = Some(offset);
                margin_strut = MarginStrut::default();
            }
        } else {
            margin_strut = MarginStrut::default();
        }

        let mut builder = BoxFragmentBuilder::new(
            self.node,
            self.kind,
            self.space.clone(),
            bp,
            inline_size,
            token,
        );
        if let Some(token) = token {
            if token.has_seen_all_children {
                builder.set_has_seen_all_children(true);
            }
        }
        if !self.is_fragmentainer() {
            builder.set_page_name(style.page_name.clone());
        }

        let mut exclusion = self.space.exclusion_space().clone();
        // Flow cursor relative to the border box; meaningful once the BFC
        // offset is resolved.
        let mut content_offset = bp.block_start
            + token.map_or(LayoutUnit::zero(), |t| t.monolithic_overflow);
        let mut previous_break_after = BreakBetween::Auto;
        let mut best_break: Option<EarlyBreak> = None;
        let mut walk_complete = true;

        let plan = self.plan_children();
        for planned in &plan {
            let child = planned.id;
            let child_style = self.tree.style(child);
            let child_margins = resolve_margins(child_style, content_inline_size);
            let join = previous_break_after.join(child_style.break_before);
            previous_break_after = child_style.break_after;

            // Column spanners interrupt fragmentainer content; the column
            // algorithm lays them across all columns and resumes after.
            if self.is_fragmentainer()
                && self.kind == FragmentKind::Fragmentainer
                && child_style.is_column_spanner()
                && planned.token.is_none()
            {
                builder.set_column_spanner(Some(child));
                builder.add_break_before_child(child);
                walk_complete = false;
                break;
            }

            if let Some(early) = early_break {
                if early.target() == child && planned.token.is_none() {
                    builder.add_break_before_child(child);
                    builder.clamp_break_appeal(early.appeal);
                    walk_complete = false;
                    break;
                }
            }

            // Forced breaks between siblings, unless the break would leave
            // this fragmentainer empty.
            if self.space.has_block_fragmentation()
                && !planned.from_token
                && join.is_forced()
                && (builder.child_count() > 0
                    || is_resumed
                    || !self.space.is_at_fragmentainer_start())
            {
                builder.set_has_forced_break();
                builder.add_break_before_child(child);
                builder.clamp_break_appeal(BreakAppeal::Perfect);
                walk_complete = false;
                break;
            }

            if child_style.is_floated() {
                let Some(own) = own_bfc else {
                    // A float pins the container before any in-flow child
                    // did; restart with the offset known.
                    return Ok(Arc::new(LayoutResult::bfc_block_offset_resolved(
                        self.space.clone(),
                        base + margin_strut.sum(),
                    )));
                };
                let placed = self.place_float(
                    ctx,
                    &mut builder,
                    &mut exclusion,
                    child,
                    child_margins,
                    own,
                    own_line_start + bp.inline_start,
                    content_inline_size,
                    own + content_offset + margin_strut.sum(),
                    !planned.from_token,
                )?;
                if !placed {
                    builder.add_break_before_child(child);
                    builder.clamp_break_appeal(appeal_of_break_between(
                        join,
                        self.is_column_context(),
                    ));
                    walk_complete = false;
                    break;
                }
                continue;
            }

            // Candidate for a later "go back and break here" retry.
            if self.space.has_known_fragmentainer_block_size()
                && !planned.from_token
                && (builder.child_count() > 0 || !self.space.is_at_fragmentainer_start())
            {
                let appeal = appeal_of_break_between(join, self.is_column_context());
                let acceptable = match &best_break {
                    Some(existing) => !ctx.break_policy.is_better(existing.appeal, appeal),
                    None => true,
                };
                if acceptable {
                    best_break = Some(EarlyBreak::before(child, appeal));
                }
            }

            let mut strut_for_child = margin_strut;
            strut_for_child.append(child_margins.block_start);
            let position_base = own_bfc.map_or(base, |own| own + content_offset);
            let child_bfc_estimate = position_base + strut_for_child.sum();
            let child_is_nfc = child_style.establishes_new_formatting_context();

            let clearance = exclusion.clearance_offset(child_style.clear);
            let child_fragmentainer_offset = self.space.fragmentainer_offset()
                + (child_bfc_estimate - own_bfc.unwrap_or(base)).clamp_negative_to_zero();

            let mut space_builder = ConstraintSpace::builder(child_style.writing_direction())
                .available_size(LogicalSize::new(content_inline_size, definite_content_block))
                .percentage_resolution_size(LogicalSize::new(
                    content_inline_size,
                    definite_content_block,
                ))
                .exclusion_space(exclusion.clone());
            if self.space.has_block_fragmentation() {
                space_builder = space_builder
                    .fragmentation(self.space.fragmentation())
                    .fragmentainer_block_size(self.space.fragmentainer_block_size())
                    .fragmentainer_offset(child_fragmentainer_offset)
                    .min_break_appeal(self.space.min_break_appeal());
                if self.space.is_initial_column_balancing_pass() {
                    space_builder = space_builder.initial_column_balancing_pass(true);
                }
                if self.space.is_inside_balanced_columns() {
                    space_builder = space_builder.inside_balanced_columns(true);
                }
            }

            let child_space = if child_is_nfc {
                let fit_inline =
                    fit_content_inline_size(self.tree, child, content_inline_size)
                        .min(content_inline_size - child_margins.inline_sum());
                let inline_for_search = if resolve_length(child_style.width, content_inline_size)
                    .is_indefinite()
                {
                    content_inline_size - child_margins.inline_sum()
                } else {
                    fit_inline
                };
                let min_block = if clearance.is_indefinite() {
                    child_bfc_estimate
                } else {
                    child_bfc_estimate.max(clearance)
                };
                let opportunity = exclusion.find_layout_opportunity(
                    min_block,
                    own_line_start + bp.inline_start,
                    own_line_start + bp.inline_start + content_inline_size,
                    inline_for_search + child_margins.inline_sum(),
                );
                space_builder
                    .bfc_offset(BfcOffset::new(
                        opportunity.line_start + child_margins.inline_start,
                        opportunity.block_offset,
                    ))
                    .new_formatting_context(true)
                    .exclusion_space(ExclusionSpace::new())
                    .build()
            } else {
                let mut b = space_builder
                    .bfc_offset(BfcOffset::new(
                        own_line_start + bp.inline_start + child_margins.inline_start,
                        position_base,
                    ))
                    .margin_strut(strut_for_child);
                if !clearance.is_indefinite() {
                    b = b.clearance_offset(clearance);
                }
                b.build()
            };

            let child_line_offset = child_space.bfc_offset().line_offset;
            let result =
                BlockNode::new(child).layout(self.tree, ctx, child_space, planned.token.clone())?;

            if result.status() == LayoutStatus::OutOfFragmentainerSpace {
                // The child wants the break to happen before it.
                builder.add_break_before_child(child);
                builder
                    .clamp_break_appeal(appeal_of_break_between(join, self.is_column_context()));
                walk_complete = false;
                break;
            }

            if result.is_self_collapsing() {
                margin_strut = result.end_margin_strut();
                margin_strut.append(child_margins.block_end);
                if let Some(fragment) = result.fragment() {
                    let rel_block = (child_bfc_estimate
                        - own_bfc.unwrap_or(child_bfc_estimate))
                    .clamp_negative_to_zero();
                    builder.add_child(
                        Arc::clone(fragment),
                        LogicalOffset::new(
                            bp.inline_start + child_margins.inline_start,
                            rel_block,
                        ),
                    );
                }
                if !child_is_nfc {
                    exclusion = result.exclusion_space().clone();
                }
                builder.propagate_from_child_result(&result);
                continue;
            }

            let fragment = result
                .fragment()
                .ok_or(LayoutError::MissingFragment(child))?;
            let child_wd = child_style.writing_direction();
            let child_logical_size =
                WritingModeConverter::new(child_wd, fragment.size).to_logical_size(fragment.size);

            let child_bfc = result.bfc_block_offset().unwrap_or(child_bfc_estimate);
            if own_bfc.is_none() {
                // Margins collapsed through; the box starts where its
                // first real child starts.
                own_bfc = Some(child_bfc);
                content_offset = bp.block_start;
            }
            let own = own_bfc.unwrap_or(base);
            let rel_block = child_bfc - own;

            // Unbreakable content that no longer fits moves to the next
            // fragmentainer when a break before it is possible.
            if self.space.has_known_fragmentainer_block_size()
                && fragment.break_token.is_none()
                && !planned.from_token
            {
                let space_left_for_child = self.space.fragmentainer_block_size()
                    - (self.space.fragmentainer_offset() + rel_block);
                if child_logical_size.block_size > space_left_for_child {
                    let at_start = self.space.fragmentainer_offset() + rel_block
                        <= LayoutUnit::zero();
                    let appeal = appeal_of_break_between(join, self.is_column_context());
                    if !at_start {
                        builder.propagate_space_shortage(
                            child_logical_size.block_size - space_left_for_child,
                        );
                        builder.add_break_before_child(child);
                        builder.clamp_break_appeal(appeal);
                        walk_complete = false;
                        break;
                    }
                    builder.set_monolithic_overflow(
                        child_logical_size.block_size - space_left_for_child,
                    );
                }
            }

            // The child's BFC line offset already accounts for any float
            // avoidance; translate it back into parent-relative terms.
            let rel_inline = child_line_offset - own_line_start;
            builder.add_child(
                Arc::clone(fragment),
                LogicalOffset::new(rel_inline, rel_block),
            );
            builder.propagate_from_child_result(&result);
            if let Some(name) = result.page_name() {
                builder.set_page_name(Some(name.to_owned()));
            }
            if !child_is_nfc {
                exclusion = result.exclusion_space().clone();
            }

            content_offset = rel_block + child_logical_size.block_size;
            margin_strut = result.end_margin_strut();
            margin_strut.append(child_margins.block_end);

            if let Some(child_token) = &fragment.break_token {
                // The child split; whether that split is good enough
                // decides between resuming it and reworking this pass.
                if let Some(best) = &best_break {
                    if ctx.break_policy.is_better(best.appeal, result.break_appeal())
                        && result.break_appeal() < BreakAppeal::Perfect
                    {
                        return Ok(Arc::new(LayoutResult::needs_earlier_break(
                            self.space.clone(),
                            best.clone(),
                        )));
                    }
                }
                builder.add_child_resume(Arc::clone(child_token));
                builder.clamp_break_appeal(result.break_appeal());
                walk_complete = false;
                break;
            }
        }

        if walk_complete {
            builder.set_has_seen_all_children(true);
        }

        self.finish(
            builder,
            bp,
            own_bfc,
            base,
            margin_strut,
            content_offset,
            definite_content_block,
            exclusion,
            walk_complete,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn place_float(
        &self,
        ctx: &mut LayoutContext,
        builder: &mut BoxFragmentBuilder,
        exclusion: &mut ExclusionSpace,
        child: BoxId,
        child_margins: BoxStrut,
        own_bfc: LayoutUnit,
        content_line_start: LayoutUnit,
        content_inline_size: LayoutUnit,
        flow_position: LayoutUnit,
        may_break: bool,
    ) -> Result<bool, LayoutError> {
        let child_style = self.tree.style(child);
        let float_inline = fit_content_inline_size(self.tree, child, content_inline_size)
            .min(content_inline_size - child_margins.inline_sum())
            .clamp_negative_to_zero();
        let margin_box_inline = float_inline + child_margins.inline_sum();

        // Floats never rise above earlier floats or above cleared ones.
        let mut min_block = flow_position;
        if let Some(last) = exclusion.last_float_block_start() {
            min_block = min_block.max(last);
        }
        let clearance = exclusion.clearance_offset(child_style.clear);
        if !clearance.is_indefinite() {
            min_block = min_block.max(clearance);
        }

        let opportunity = exclusion.find_layout_opportunity(
            min_block,
            content_line_start,
            content_line_start + content_inline_size,
            margin_box_inline,
        );

        let is_right = child_style.float == Float::Right;
        let line_start = if is_right {
            opportunity.line_end - margin_box_inline
        } else {
            opportunity.line_start
        };

        let child_space = ConstraintSpace::builder(child_style.writing_direction())
            .available_size(LogicalSize::new(float_inline, INDEFINITE))
            .percentage_resolution_size(LogicalSize::new(content_inline_size, INDEFINITE))
            .fixed_inline_size(true)
            .new_formatting_context(true)
            .bfc_offset(BfcOffset::new(
                line_start + child_margins.inline_start,
                opportunity.block_offset + child_margins.block_start,
            ))
            .build();
        let result = BlockNode::new(child).layout(self.tree, ctx, child_space, None)?;
        let fragment = result
            .fragment()
            .ok_or(LayoutError::MissingFragment(child))?;
        let child_wd = child_style.writing_direction();
        let float_block_size = WritingModeConverter::new(child_wd, fragment.size)
            .to_logical_size(fragment.size)
            .block_size;

        let block_start = opportunity.block_offset;

        // Floats never split; one that no longer fits moves whole to the
        // next fragmentainer, and everything after it follows.
        if self.space.has_known_fragmentainer_block_size() {
            let rel_block = block_start - own_bfc;
            let space_left_for_float = self.space.fragmentainer_block_size()
                - (self.space.fragmentainer_offset() + rel_block);
            let needed = float_block_size + child_margins.block_sum();
            if needed > space_left_for_float {
                let at_start = self.space.fragmentainer_offset() + rel_block
                    <= LayoutUnit::zero();
                if may_break && !at_start {
                    builder.propagate_space_shortage(needed - space_left_for_float);
                    return Ok(false);
                }
                builder.set_monolithic_overflow(needed - space_left_for_float);
            }
        }

        exclusion.add(Exclusion {
            kind: if is_right {
                ExclusionKind::Right
            } else {
                ExclusionKind::Left
            },
            line_start,
            line_end: line_start + margin_box_inline,
            block_start,
            block_end: block_start + float_block_size + child_margins.block_sum(),
        });

        let bp_inline_start = self.border_scrollbar_padding().inline_start;
        builder.add_child(
            Arc::clone(fragment),
            LogicalOffset::new(
                line_start + child_margins.inline_start - content_line_start + bp_inline_start,
                block_start + child_margins.block_start - own_bfc,
            ),
        );
        builder.propagate_from_child_result(&result);
        Ok(true)
    }

    #[allow(clippy::too_many_arguments)]
    fn finish(
        &self,
        mut builder: BoxFragmentBuilder,
        bp: BoxStrut,
        own_bfc: Option<LayoutUnit>,
        base: LayoutUnit,
        margin_strut: MarginStrut,
        content_offset: LayoutUnit,
        definite_content_block: LayoutUnit,
        exclusion: ExclusionSpace,
        walk_complete: bool,
    ) -> Result<Arc<LayoutResult>, LayoutError> {
        let height_definite = !definite_content_block.is_indefinite();
        let previously_consumed = builder.previously_consumed_block_size();

        // The strut as handed over by the child walk; the box's own offset
        // resolves against it even when the end strut is committed below.
        let incoming_strut_sum = margin_strut.sum();
        let mut end_strut = margin_strut;
        let mut content_size = content_offset;
        if walk_complete {
            if bp.block_end != LayoutUnit::zero() {
                content_size = content_size + end_strut.sum() + bp.block_end;
                end_strut = MarginStrut::default();
            } else if height_definite || self.space.is_new_formatting_context() {
                end_strut = MarginStrut::default();
            }
        } else {
            end_strut = MarginStrut::default();
        }

        let total = if self.is_fragmentainer() {
            if self.space.is_fixed_block_size() {
                self.space.available_size().block_size
            } else {
                content_size
            }
        } else {
            resolve_block_size(
                self.style(),
                &self.space,
                bp,
                previously_consumed + content_size,
            )
        };

        let mut own_bfc = own_bfc;
        let self_collapsing = own_bfc.is_none() && total == LayoutUnit::zero() && walk_complete;
        if own_bfc.is_none() && !self_collapsing {
            own_bfc = Some(base + incoming_strut_sum);
            end_strut = MarginStrut::default();
        }

        let space_left = fragmentainer_space_left(&self.space);
        let fragment_size;
        if builder.did_break() {
            fragment_size = if self.is_fragmentainer() && self.space.is_fixed_block_size() {
                total
            } else if height_definite && !space_left.is_indefinite() {
                // Specified-size boxes stretch their non-final fragments to
                // the fragmentainer end; the final fragment takes the rest.
                (total - previously_consumed)
                    .min(space_left)
                    .clamp_negative_to_zero()
            } else {
                content_size
            };
        } else {
            let remaining = (total - previously_consumed).clamp_negative_to_zero();
            if !self.is_fragmentainer()
                && height_definite
                && !space_left.is_indefinite()
                && remaining > space_left
            {
                // Content is done but the specified size isn't; keep
                // producing fragments of empty space.
                builder.set_did_break();
                builder.set_is_at_block_end(true);
                fragment_size = space_left;
            } else {
                fragment_size = remaining.max(if self.is_fragmentainer() {
                    LayoutUnit::zero()
                } else {
                    bp.block_sum()
                });
            }
        }

        builder.set_intrinsic_block_size(content_size);
        builder.set_end_margin_strut(end_strut);
        builder.set_is_self_collapsing(self_collapsing);
        if let Some(own) = own_bfc {
            builder.set_bfc_block_offset(own);
        }
        Ok(Arc::new(builder.to_box_fragment(fragment_size, exclusion)))
    }
}
