//! The per-formatting-context layout algorithms, plus the length and
//! edge resolution helpers they share.
//!
//! Each algorithm consumes a [`ConstraintSpace`](crate::constraint_space::ConstraintSpace)
//! and an optional incoming break token, and produces a
//! [`LayoutResult`](crate::layout_result::LayoutResult) through a
//! [`BoxFragmentBuilder`](crate::builder::BoxFragmentBuilder).

pub mod block;
pub mod column;
pub mod frameset;
pub mod page;

use crate::constraint_space::ConstraintSpace;
use folio_style::{ComputedStyle, EdgeSizes, Length};
use folio_types::{
    BoxStrut, Direction, LayoutUnit, LayoutUnitExt, WritingDirection, WritingMode, INDEFINITE,
};

/// Resolves a style length against a percentage base. `auto` and percents
/// against an indefinite base stay indefinite.
pub(crate) fn resolve_length(length: Length, percentage_base: LayoutUnit) -> LayoutUnit {
    match length {
        Length::Px(px) => LayoutUnit::px(px),
        Length::Percent(percent) => {
            if percentage_base.is_indefinite() {
                INDEFINITE
            } else {
                percentage_base.scale_by(percent / 100.0)
            }
        }
        Length::Auto => INDEFINITE,
    }
}

/// Maps per-physical-edge sizes into a logical strut for the given writing
/// direction.
pub(crate) fn physical_edges_to_logical(
    writing_direction: WritingDirection,
    edges: EdgeSizes,
) -> BoxStrut {
    let ltr = writing_direction.direction == Direction::Ltr;
    match writing_direction.writing_mode {
        WritingMode::HorizontalTb => {
            let (inline_start, inline_end) = if ltr {
                (edges.left, edges.right)
            } else {
                (edges.right, edges.left)
            };
            BoxStrut::new(
                LayoutUnit::px(inline_start),
                LayoutUnit::px(inline_end),
                LayoutUnit::px(edges.top),
                LayoutUnit::px(edges.bottom),
            )
        }
        WritingMode::VerticalRl => {
            let (inline_start, inline_end) = if ltr {
                (edges.top, edges.bottom)
            } else {
                (edges.bottom, edges.top)
            };
            BoxStrut::new(
                LayoutUnit::px(inline_start),
                LayoutUnit::px(inline_end),
                LayoutUnit::px(edges.right),
                LayoutUnit::px(edges.left),
            )
        }
        WritingMode::VerticalLr => {
            let (inline_start, inline_end) = if ltr {
                (edges.top, edges.bottom)
            } else {
                (edges.bottom, edges.top)
            };
            BoxStrut::new(
                LayoutUnit::px(inline_start),
                LayoutUnit::px(inline_end),
                LayoutUnit::px(edges.left),
                LayoutUnit::px(edges.right),
            )
        }
    }
}

/// Border plus padding of a box, in the box's own logical coordinates.
pub(crate) fn border_padding(style: &ComputedStyle) -> BoxStrut {
    let writing_direction = style.writing_direction();
    physical_edges_to_logical(writing_direction, style.border)
        + physical_edges_to_logical(writing_direction, style.padding)
}

/// Resolved margins in logical coordinates. `auto` margins resolve to zero
/// (no inline auto-margin centering in block layout here); percentage
/// margins resolve against the inline percentage base on every edge.
pub(crate) fn resolve_margins(style: &ComputedStyle, base: LayoutUnit) -> BoxStrut {
    let resolve = |length: Length| {
        let resolved = resolve_length(length, base);
        if resolved.is_indefinite() {
            LayoutUnit::zero()
        } else {
            resolved
        }
    };
    let writing_direction = style.writing_direction();
    let ltr = writing_direction.direction == Direction::Ltr;
    let margin = style.margin;
    match writing_direction.writing_mode {
        WritingMode::HorizontalTb => {
            let (inline_start, inline_end) = if ltr {
                (margin.left, margin.right)
            } else {
                (margin.right, margin.left)
            };
            BoxStrut::new(
                resolve(inline_start),
                resolve(inline_end),
                resolve(margin.top),
                resolve(margin.bottom),
            )
        }
        WritingMode::VerticalRl | WritingMode::VerticalLr => {
            let (inline_start, inline_end) = if ltr {
                (margin.top, margin.bottom)
            } else {
                (margin.bottom, margin.top)
            };
            let (block_start, block_end) =
                if writing_direction.writing_mode == WritingMode::VerticalRl {
                    (margin.right, margin.left)
                } else {
                    (margin.left, margin.right)
                };
            BoxStrut::new(
                resolve(inline_start),
                resolve(inline_end),
                resolve(block_start),
                resolve(block_end),
            )
        }
    }
}

/// Border-box inline size of a box. A definite `width` is content-box and
/// gets border and padding added; `auto` stretches to fill the available
/// space minus margins (fit-content is the caller's concern).
pub(crate) fn resolve_inline_size(
    style: &ComputedStyle,
    space: &ConstraintSpace,
    border_padding: BoxStrut,
    margins: BoxStrut,
) -> LayoutUnit {
    if space.is_fixed_inline_size() {
        return space.available_size().inline_size;
    }
    let specified = resolve_length(style.width, space.percentage_resolution_size().inline_size);
    if !specified.is_indefinite() {
        return specified + border_padding.inline_sum();
    }
    let available = space.available_size().inline_size;
    if available.is_indefinite() {
        return border_padding.inline_sum();
    }
    (available - margins.inline_sum()).clamp_negative_to_zero()
}

/// Border-box block size over all fragments of a box. A definite `height`
/// is content-box; `auto` takes the passed content size (already including
/// border and padding). `min-height`/`max-height` clamp either way.
pub(crate) fn resolve_block_size(
    style: &ComputedStyle,
    space: &ConstraintSpace,
    border_padding: BoxStrut,
    content_border_box_size: LayoutUnit,
) -> LayoutUnit {
    if space.is_fixed_block_size() {
        return space.available_size().block_size;
    }
    let base = space.percentage_resolution_size().block_size;
    let specified = resolve_length(style.height, base);
    let mut size = if specified.is_indefinite() {
        content_border_box_size
    } else {
        specified + border_padding.block_sum()
    };
    let max = resolve_length(style.max_height, base);
    if !max.is_indefinite() {
        size = size.min(max + border_padding.block_sum());
    }
    let min = resolve_length(style.min_height, base);
    if !min.is_indefinite() {
        size = size.max(min + border_padding.block_sum());
    }
    size.clamp_negative_to_zero()
}

/// Fit-content (shrink-to-fit) border-box inline size, used for floats and
/// other boxes that size to their content.
pub(crate) fn fit_content_inline_size(
    tree: &crate::box_tree::BoxTree,
    id: folio_types::BoxId,
    available: LayoutUnit,
) -> LayoutUnit {
    crate::min_max::compute_min_max_sizes(tree, id, available)
        .sizes
        .shrink_to_fit(available)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint_space::ConstraintSpace;
    use folio_types::LogicalSize;

    #[test]
    fn definite_width_is_content_box() {
        let style = ComputedStyle::builder().width(100.0).border(5.0).build();
        let space = ConstraintSpace::builder(WritingDirection::horizontal_ltr())
            .available_size(LogicalSize::new(
                LayoutUnit::px(300.0),
                LayoutUnit::px(300.0),
            ))
            .build();
        let bp = border_padding(&style);
        let margins = resolve_margins(&style, space.percentage_resolution_size().inline_size);
        assert_eq!(
            resolve_inline_size(&style, &space, bp, margins),
            LayoutUnit::px(110.0)
        );
    }

    #[test]
    fn auto_width_stretches_minus_margins() {
        let style = ComputedStyle::builder().margin(0.0, 10.0, 0.0, 10.0).build();
        let space = ConstraintSpace::builder(WritingDirection::horizontal_ltr())
            .available_size(LogicalSize::new(
                LayoutUnit::px(300.0),
                LayoutUnit::px(300.0),
            ))
            .build();
        let bp = border_padding(&style);
        let margins = resolve_margins(&style, space.percentage_resolution_size().inline_size);
        assert_eq!(
            resolve_inline_size(&style, &space, bp, margins),
            LayoutUnit::px(280.0)
        );
    }

    #[test]
    fn max_height_clamps_auto_content() {
        let style = ComputedStyle::builder().max_height(50.0).build();
        let space = ConstraintSpace::builder(WritingDirection::horizontal_ltr())
            .available_size(LogicalSize::new(
                LayoutUnit::px(300.0),
                LayoutUnit::px(300.0),
            ))
            .percentage_resolution_size(LogicalSize::new(
                LayoutUnit::px(300.0),
                LayoutUnit::px(300.0),
            ))
            .build();
        let bp = border_padding(&style);
        assert_eq!(
            resolve_block_size(&style, &space, bp, LayoutUnit::px(80.0)),
            LayoutUnit::px(50.0)
        );
    }
}
