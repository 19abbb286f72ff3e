use folio::{layout_root, BoxContent, BoxTree, ComputedStyle, LayoutContext, LayoutUnit,
    LayoutUnitExt, LogicalSize};
use std::sync::Arc;

#[test]
fn facade_exposes_a_working_layout_entry_point() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut tree = BoxTree::new();
    let root = tree.insert(
        None,
        Arc::new(ComputedStyle::builder().width(200.0).build()),
        BoxContent::Block,
    );
    tree.insert(
        Some(root),
        Arc::new(ComputedStyle::builder().height(40.0).build()),
        BoxContent::Block,
    );

    let mut ctx = LayoutContext::new();
    let result = layout_root(
        &tree,
        &mut ctx,
        LogicalSize::new(LayoutUnit::px(800.0), LayoutUnit::px(600.0)),
    )
    .expect("layout");
    let fragment = result.fragment().expect("fragment");
    assert_eq!(fragment.size.width, LayoutUnit::px(200.0));
    assert_eq!(fragment.size.height, LayoutUnit::px(40.0));
}
