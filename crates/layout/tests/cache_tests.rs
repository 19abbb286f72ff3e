mod common;

use common::*;
use folio_layout::LayoutContext;
use folio_style::ColumnFill;
use std::sync::Arc;

#[test]
fn relayout_without_mutation_reuses_the_cached_fragment() -> TestResult {
    init_logging();

    let mut tree = folio_layout::BoxTree::new();
    let root = block(&mut tree, None, style().width(100.0).build());
    block(&mut tree, Some(root), style().height(30.0).build());

    let mut ctx = LayoutContext::new();
    let first = layout_with(&tree, &mut ctx, 800.0, 600.0)?;
    let second = layout_with(&tree, &mut ctx, 800.0, 600.0)?;
    assert!(Arc::ptr_eq(
        first.fragment().unwrap(),
        second.fragment().unwrap()
    ));
    Ok(())
}

#[test]
fn skipping_the_cache_reproduces_identical_geometry() -> TestResult {
    init_logging();

    let mut tree = folio_layout::BoxTree::new();
    let root = block(&mut tree, None, style().width(100.0).build());
    block(&mut tree, Some(root), style().height(30.0).build());
    block(&mut tree, Some(root), style().height(50.0).build());

    let mut ctx = LayoutContext::new();
    let first = layout_with(&tree, &mut ctx, 800.0, 600.0)?;
    let before = dump(&first);

    tree.set_should_skip_layout_cache(root, true);
    let second = layout_with(&tree, &mut ctx, 800.0, 600.0)?;
    assert!(!Arc::ptr_eq(
        first.fragment().unwrap(),
        second.fragment().unwrap()
    ));
    assert_eq!(before, dump(&second));
    Ok(())
}

#[test]
fn invalidation_recomputes_the_same_geometry() -> TestResult {
    init_logging();

    let mut tree = folio_layout::BoxTree::new();
    let root = block(&mut tree, None, style().width(100.0).build());
    block(&mut tree, Some(root), style().height(30.0).build());

    let mut ctx = LayoutContext::new();
    let first = layout_with(&tree, &mut ctx, 800.0, 600.0)?;
    tree.set_needs_layout(root);
    let second = layout_with(&tree, &mut ctx, 800.0, 600.0)?;
    assert_eq!(dump(&first), dump(&second));
    Ok(())
}

#[test]
fn break_token_sequence_numbers_are_monotonic() -> TestResult {
    init_logging();

    let mut tree = folio_layout::BoxTree::new();
    let root = multicol(
        &mut tree,
        style()
            .width(216.0)
            .height(50.0)
            .columns(3)
            .column_fill(ColumnFill::Auto)
            .build(),
    );
    let child = block(&mut tree, Some(root), style().height(150.0).build());

    let result = layout(&tree, 800.0, 600.0)?;
    let fragment = root_fragment(&result);
    let mut sequences = Vec::new();
    let mut finals = 0;
    for column in &fragment.children {
        for link in &column.fragment.children {
            if link.fragment.node != child {
                continue;
            }
            match link.fragment.block_break_token() {
                Some(token) => sequences.push(token.sequence_number),
                None => finals += 1,
            }
        }
    }
    assert_eq!(sequences, vec![0, 1]);
    assert_eq!(finals, 1);
    Ok(())
}

#[test]
fn line_container_fragments_each_keep_a_cached_result() -> TestResult {
    init_logging();

    let mut tree = folio_layout::BoxTree::new();
    let root = multicol(
        &mut tree,
        style()
            .width(216.0)
            .height(60.0)
            .columns(2)
            .column_fill(ColumnFill::Auto)
            .build(),
    );
    let text = lines(&mut tree, root, style().build(), 20.0, 5);

    let result = layout(&tree, 800.0, 600.0)?;
    let fragment = root_fragment(&result);
    assert_eq!(line_counts(&fragment, text), vec![3, 2]);

    // Entry i is the result for the i-th fragment; the continuation must
    // not displace the first fragment's entry.
    let cached = tree.cached_results(text);
    assert_eq!(cached.len(), 2);
    assert!(cached[0].fragment().unwrap().break_token.is_some());
    assert!(cached[1].fragment().unwrap().break_token.is_none());
    Ok(())
}
