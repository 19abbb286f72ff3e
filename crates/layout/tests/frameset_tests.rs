mod common;

use common::*;
use folio_layout::{BoxContent, FrameSetSideData, LayoutSideData};
use folio_style::FrameLength;
use folio_types::{LayoutUnit, LayoutUnitExt};

fn frameset(
    tree: &mut folio_layout::BoxTree,
    rows: Vec<FrameLength>,
    cols: Vec<FrameLength>,
    row_deltas: Vec<f32>,
    col_deltas: Vec<f32>,
) -> folio_types::BoxId {
    insert(
        tree,
        None,
        style().frame_rows(rows).frame_cols(cols).build(),
        BoxContent::FrameSet {
            row_deltas,
            col_deltas,
        },
    )
}

#[test]
fn grid_cells_fill_the_available_area() -> TestResult {
    init_logging();

    let mut tree = folio_layout::BoxTree::new();
    let root = frameset(
        &mut tree,
        vec![FrameLength::Percent(50.0), FrameLength::Percent(50.0)],
        vec![FrameLength::Fixed(100.0), FrameLength::Relative(1.0)],
        Vec::new(),
        Vec::new(),
    );
    for _ in 0..4 {
        block(&mut tree, Some(root), style().build());
    }

    let result = layout(&tree, 400.0, 300.0)?;
    assert_eq!(
        dump(&result),
        "\
.:: LayoutNG Physical Fragment Tree ::.
  offset:unplaced size:400x300
    offset:0,0 size:100x147
      offset:0,0 size:100x147
    offset:106,0 size:294x147
      offset:0,0 size:294x147
    offset:0,153 size:100x147
      offset:0,0 size:100x147
    offset:106,153 size:294x147
      offset:0,0 size:294x147
"
    );
    Ok(())
}

#[test]
fn track_sizes_are_recorded_as_side_data() -> TestResult {
    init_logging();

    let mut tree = folio_layout::BoxTree::new();
    frameset(
        &mut tree,
        vec![FrameLength::Percent(50.0), FrameLength::Percent(50.0)],
        vec![FrameLength::Fixed(100.0), FrameLength::Relative(1.0)],
        Vec::new(),
        Vec::new(),
    );

    let result = layout(&tree, 400.0, 300.0)?;
    let LayoutSideData::FrameSet(FrameSetSideData {
        row_sizes,
        col_sizes,
        border_thickness,
    }) = result.side_data()
    else {
        panic!("frameset layout must attach grid side data");
    };
    assert_eq!(*border_thickness, LayoutUnit::px(6.0));
    assert_eq!(row_sizes, &vec![LayoutUnit::px(147.0), LayoutUnit::px(147.0)]);
    assert_eq!(col_sizes, &vec![LayoutUnit::px(100.0), LayoutUnit::px(294.0)]);
    Ok(())
}

#[test]
fn resize_deltas_move_the_row_boundary() -> TestResult {
    init_logging();

    let mut tree = folio_layout::BoxTree::new();
    let root = insert(
        &mut tree,
        None,
        style()
            .frame_rows(vec![FrameLength::Percent(50.0), FrameLength::Percent(50.0)])
            .frame_border(0.0)
            .build(),
        BoxContent::FrameSet {
            row_deltas: vec![20.0],
            col_deltas: Vec::new(),
        },
    );
    block(&mut tree, Some(root), style().build());
    block(&mut tree, Some(root), style().build());

    let result = layout(&tree, 400.0, 300.0)?;
    let fragment = root_fragment(&result);
    assert_eq!(fragment.children[0].fragment.size.height, LayoutUnit::px(170.0));
    assert_eq!(fragment.children[1].offset.y, LayoutUnit::px(170.0));
    assert_eq!(fragment.children[1].fragment.size.height, LayoutUnit::px(130.0));
    Ok(())
}

#[test]
fn nested_framesets_lay_out_recursively() -> TestResult {
    init_logging();

    let mut tree = folio_layout::BoxTree::new();
    let root = frameset(
        &mut tree,
        vec![FrameLength::Relative(1.0)],
        vec![FrameLength::Fixed(200.0), FrameLength::Relative(1.0)],
        Vec::new(),
        Vec::new(),
    );
    block(&mut tree, Some(root), style().build());
    let inner = insert(
        &mut tree,
        Some(root),
        style()
            .frame_rows(vec![FrameLength::Percent(50.0), FrameLength::Percent(50.0)])
            .frame_border(0.0)
            .build(),
        BoxContent::FrameSet {
            row_deltas: Vec::new(),
            col_deltas: Vec::new(),
        },
    );
    block(&mut tree, Some(inner), style().build());
    block(&mut tree, Some(inner), style().build());

    let result = layout(&tree, 406.0, 300.0)?;
    let fragment = root_fragment(&result);
    let inner_cell = &fragment.children[1].fragment;
    assert_eq!(inner_cell.size.width, LayoutUnit::px(200.0));
    let inner_grid = &inner_cell.children[0].fragment;
    assert_eq!(inner_grid.children.len(), 2);
    assert_eq!(
        inner_grid.children[0].fragment.size.height,
        LayoutUnit::px(150.0)
    );
    Ok(())
}
