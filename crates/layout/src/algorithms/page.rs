//! Paginated layout: stacks page-sized fragmentainers, honoring named
//! page areas.
//!
//! The page an element lands on decides that page's size, but the page
//! size must be known before anything can be laid into it. Each page is
//! therefore laid out twice when needed: a measuring pass against the
//! assumed page area discovers the name of the first element on the page,
//! and the real pass uses the area registered for that name.

use crate::algorithms::block::BlockLayoutAlgorithm;
use crate::box_tree::BoxTree;
use crate::break_token::BreakToken;
use crate::builder::BoxFragmentBuilder;
use crate::constraint_space::{ConstraintSpace, FragmentationType};
use crate::context::LayoutContext;
use crate::fragment::FragmentKind;
use crate::layout_result::LayoutResult;
use crate::LayoutError;
use folio_types::{BoxId, BoxStrut, LayoutUnit, LayoutUnitExt, LogicalOffset};
use log::debug;
use std::sync::Arc;

pub struct PageLayoutAlgorithm<'a> {
    tree: &'a BoxTree,
    node: BoxId,
    space: ConstraintSpace,
}

impl<'a> PageLayoutAlgorithm<'a> {
    pub fn new(tree: &'a BoxTree, node: BoxId, space: ConstraintSpace) -> Self {
        Self { tree, node, space }
    }

    pub fn layout(&self, ctx: &mut LayoutContext) -> Result<Arc<LayoutResult>, LayoutError> {
        let mut token: Option<Arc<BreakToken>> = None;
        let mut page_links: Vec<(LogicalOffset, Arc<LayoutResult>)> = Vec::new();
        let mut block_offset = LayoutUnit::zero();
        let mut max_inline = LayoutUnit::zero();
        let mut first = true;
        let mut assumed_name: Option<String> = None;

        while first || token.is_some() {
            first = false;
            let probe = ctx.measure(|ctx| {
                self.layout_page(ctx, token.clone(), assumed_name.as_deref())
            })?;
            let name = probe.page_name().map(str::to_owned);
            let result = if ctx.pages.area_for(name.as_deref())
                == ctx.pages.area_for(assumed_name.as_deref())
            {
                // The discovered name maps to the assumed geometry; the
                // probe already laid the page correctly, redo it with side
                // effects on.
                self.layout_page(ctx, token.clone(), assumed_name.as_deref())?
            } else {
                debug!(
                    "page {} switches to named area {:?}",
                    page_links.len(),
                    name.as_deref()
                );
                self.layout_page(ctx, token.clone(), name.as_deref())?
            };
            let area = ctx.pages.area_for(result.page_name());
            let fragment = result
                .fragment()
                .ok_or(LayoutError::MissingFragment(self.node))?;
            token = fragment.break_token.clone();
            page_links.push((LogicalOffset::new(LayoutUnit::zero(), block_offset), result));
            block_offset += area.block_size;
            max_inline = max_inline.max(area.inline_size);
            assumed_name = name;
        }

        let mut builder = BoxFragmentBuilder::new(
            self.node,
            FragmentKind::Box,
            self.space.clone(),
            BoxStrut::default(),
            max_inline,
            None,
        );
        builder.set_bfc_block_offset(self.space.bfc_offset().block_offset);
        for (offset, result) in &page_links {
            if let Some(fragment) = result.fragment() {
                builder.add_child(Arc::clone(fragment), *offset);
            }
        }
        builder.set_intrinsic_block_size(block_offset);
        builder.set_has_seen_all_children(true);
        Ok(Arc::new(builder.to_box_fragment(
            block_offset,
            self.space.exclusion_space().clone(),
        )))
    }

    fn layout_page(
        &self,
        ctx: &mut LayoutContext,
        token: Option<Arc<BreakToken>>,
        page_name: Option<&str>,
    ) -> Result<Arc<LayoutResult>, LayoutError> {
        let area = ctx.pages.area_for(page_name);
        let style = self.tree.style(self.node);
        let space = ConstraintSpace::builder(style.writing_direction())
            .available_size(area)
            .percentage_resolution_size(area)
            .fragmentation(FragmentationType::Page)
            .fragmentainer_block_size(area.block_size)
            .fixed_inline_size(true)
            .fixed_block_size(true)
            .new_formatting_context(true)
            .build();
        BlockLayoutAlgorithm::new(self.tree, self.node, space, token)
            .for_fragmentainer(FragmentKind::Page)
            .layout(ctx)
    }
}

#[cfg(test)]
mod tests {
    use crate::context::PageAreaProvider;
    use folio_types::{LayoutUnit, LayoutUnitExt};

    #[test]
    fn default_page_area_is_us_letter() {
        let pages = PageAreaProvider::default();
        let area = pages.area_for(None);
        assert_eq!(area.inline_size, LayoutUnit::px(816.0));
        assert_eq!(area.block_size, LayoutUnit::px(1056.0));
    }
}
