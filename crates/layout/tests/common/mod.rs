//! Shared helpers for the layout integration tests: tree construction
//! shorthands and the fragment-tree dump harness the golden tests
//! compare against.

use folio_layout::{
    layout_root, BoxContent, BoxTree, LayoutContext, LayoutError, LayoutResult, PhysicalFragment,
};
use folio_style::{ComputedStyle, StyleBuilder};
use folio_types::{BoxId, LayoutUnit, LayoutUnitExt, LogicalSize};
use std::sync::Arc;

pub type TestResult = Result<(), LayoutError>;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn style() -> StyleBuilder {
    ComputedStyle::builder()
}

pub fn insert(
    tree: &mut BoxTree,
    parent: Option<BoxId>,
    style: ComputedStyle,
    content: BoxContent,
) -> BoxId {
    tree.insert(parent, Arc::new(style), content)
}

pub fn block(tree: &mut BoxTree, parent: Option<BoxId>, style: ComputedStyle) -> BoxId {
    insert(tree, parent, style, BoxContent::Block)
}

pub fn multicol(tree: &mut BoxTree, style: ComputedStyle) -> BoxId {
    insert(tree, None, style, BoxContent::Multicol)
}

pub fn lines(
    tree: &mut BoxTree,
    parent: BoxId,
    style: ComputedStyle,
    line_height: f32,
    line_count: u32,
) -> BoxId {
    insert(
        tree,
        Some(parent),
        style,
        BoxContent::LineContainer {
            line_height: LayoutUnit::px(line_height),
            line_count,
        },
    )
}

pub fn layout(tree: &BoxTree, width: f32, height: f32) -> Result<Arc<LayoutResult>, LayoutError> {
    let mut ctx = LayoutContext::new();
    layout_with(tree, &mut ctx, width, height)
}

pub fn layout_with(
    tree: &BoxTree,
    ctx: &mut LayoutContext,
    width: f32,
    height: f32,
) -> Result<Arc<LayoutResult>, LayoutError> {
    layout_root(
        tree,
        ctx,
        LogicalSize::new(LayoutUnit::px(width), LayoutUnit::px(height)),
    )
}

pub fn dump(result: &LayoutResult) -> String {
    result
        .fragment()
        .map(|fragment| fragment.dump_tree())
        .unwrap_or_default()
}

pub fn root_fragment(result: &LayoutResult) -> Arc<PhysicalFragment> {
    Arc::clone(result.fragment().expect("layout produced no fragment"))
}

/// Block-axis sizes of every fragment belonging to `node`, in tree order.
pub fn fragment_heights(fragment: &PhysicalFragment, node: BoxId) -> Vec<LayoutUnit> {
    let mut heights = Vec::new();
    collect_heights(fragment, node, &mut heights);
    heights
}

fn collect_heights(fragment: &PhysicalFragment, node: BoxId, out: &mut Vec<LayoutUnit>) {
    for child in &fragment.children {
        if child.fragment.node == node {
            out.push(child.fragment.size.height);
        }
        collect_heights(&child.fragment, node, out);
    }
}

/// Number of line fragments inside each fragment generated for a line
/// container, in tree order.
pub fn line_counts(fragment: &PhysicalFragment, node: BoxId) -> Vec<usize> {
    let mut counts = Vec::new();
    collect_line_counts(fragment, node, &mut counts);
    counts
}

fn collect_line_counts(fragment: &PhysicalFragment, node: BoxId, out: &mut Vec<usize>) {
    for child in &fragment.children {
        if child.fragment.node == node
            && child.fragment.kind != folio_layout::FragmentKind::Line
        {
            out.push(
                child
                    .fragment
                    .children
                    .iter()
                    .filter(|line| line.fragment.kind == folio_layout::FragmentKind::Line)
                    .count(),
            );
        }
        collect_line_counts(&child.fragment, node, out);
    }
}
