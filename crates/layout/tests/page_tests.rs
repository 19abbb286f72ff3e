mod common;

use common::*;
use folio_layout::{BoxContent, LayoutContext, PageAreaProvider};
use folio_types::{LayoutUnit, LayoutUnitExt, LogicalSize};

#[test]
fn content_paginates_across_two_pages() -> TestResult {
    init_logging();

    let mut tree = folio_layout::BoxTree::new();
    let root = insert(&mut tree, None, style().build(), BoxContent::PageRoot);
    block(&mut tree, Some(root), style().height(2000.0).build());

    let result = layout(&tree, 800.0, 600.0)?;
    assert_eq!(
        dump(&result),
        "\
.:: LayoutNG Physical Fragment Tree ::.
  offset:unplaced size:816x2112
    offset:0,0 size:816x1056
      offset:0,0 size:816x1056
    offset:0,1056 size:816x1056
      offset:0,0 size:816x944
"
    );
    Ok(())
}

#[test]
fn single_page_when_content_fits() -> TestResult {
    init_logging();

    let mut tree = folio_layout::BoxTree::new();
    let root = insert(&mut tree, None, style().build(), BoxContent::PageRoot);
    block(&mut tree, Some(root), style().height(100.0).build());

    let result = layout(&tree, 800.0, 600.0)?;
    let fragment = root_fragment(&result);
    assert_eq!(fragment.children.len(), 1);
    assert_eq!(fragment.size.height, LayoutUnit::px(1056.0));
    Ok(())
}

#[test]
fn named_page_relayouts_with_its_registered_area() -> TestResult {
    init_logging();

    let mut tree = folio_layout::BoxTree::new();
    let root = insert(&mut tree, None, style().build(), BoxContent::PageRoot);
    block(
        &mut tree,
        Some(root),
        style().height(300.0).page_name("wide").build(),
    );

    let mut pages = PageAreaProvider::default();
    pages.set_named_page(
        "wide",
        LogicalSize::new(LayoutUnit::px(500.0), LayoutUnit::px(400.0)),
    );
    let mut ctx = LayoutContext::with_pages(pages);
    let result = layout_with(&tree, &mut ctx, 800.0, 600.0)?;
    let fragment = root_fragment(&result);
    assert_eq!(fragment.children.len(), 1);
    assert_eq!(fragment.size.width, LayoutUnit::px(500.0));
    assert_eq!(fragment.size.height, LayoutUnit::px(400.0));
    let page = &fragment.children[0].fragment;
    assert_eq!(page.size.width, LayoutUnit::px(500.0));
    assert_eq!(page.children[0].fragment.size.height, LayoutUnit::px(300.0));
    Ok(())
}

#[test]
fn multicol_that_straddles_a_page_boundary_moves_whole() -> TestResult {
    init_logging();

    let mut tree = folio_layout::BoxTree::new();
    let root = insert(&mut tree, None, style().build(), BoxContent::PageRoot);
    block(&mut tree, Some(root), style().height(1000.0).build());
    let columns = insert(
        &mut tree,
        Some(root),
        style().columns(2).build(),
        BoxContent::Multicol,
    );
    block(&mut tree, Some(columns), style().height(100.0).build());
    block(&mut tree, Some(columns), style().height(100.0).build());

    // Column rows never resume across pages; the whole container starts
    // the second page.
    let result = layout(&tree, 800.0, 600.0)?;
    assert_eq!(
        dump(&result),
        "\
.:: LayoutNG Physical Fragment Tree ::.
  offset:unplaced size:816x2112
    offset:0,0 size:816x1056
      offset:0,0 size:816x1000
    offset:0,1056 size:816x1056
      offset:0,0 size:816x100
        offset:0,0 size:400x100
          offset:0,0 size:400x100
        offset:416,0 size:400x100
          offset:0,0 size:400x100
"
    );
    Ok(())
}
