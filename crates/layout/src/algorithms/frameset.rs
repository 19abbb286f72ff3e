//! Legacy `<frameset>` grid sizing.
//!
//! Implements the HTML "convert a list of dimensions to a list of pixel
//! values" algorithm: fixed tracks first, then percentages, then relative
//! (`N*`) tracks, then leftover distribution. User resize deltas are
//! applied last, atomically per axis.

use crate::block_node::BlockNode;
use crate::box_tree::{BoxContent, BoxTree};
use crate::builder::{BoxFragmentBuilder, FrameSetSideData, LayoutSideData};
use crate::constraint_space::ConstraintSpace;
use crate::context::LayoutContext;
use crate::fragment::{FragmentKind, PhysicalFragment, PhysicalFragmentLink};
use crate::layout_result::LayoutResult;
use crate::LayoutError;
use folio_style::FrameLength;
use folio_types::{
    BoxId, BoxStrut, LayoutUnit, LayoutUnitExt, LogicalOffset, LogicalSize, PhysicalOffset,
};
use std::sync::Arc;

/// A frameset grid is monolithic; it never participates in fragmentation.
pub struct FrameSetLayoutAlgorithm<'a> {
    tree: &'a BoxTree,
    node: BoxId,
    space: ConstraintSpace,
}

impl<'a> FrameSetLayoutAlgorithm<'a> {
    pub fn new(tree: &'a BoxTree, node: BoxId, space: ConstraintSpace) -> Self {
        Self { tree, node, space }
    }

    pub fn layout(&self, ctx: &mut LayoutContext) -> Result<Arc<LayoutResult>, LayoutError> {
        let style = self.tree.style(self.node);
        let border = LayoutUnit::px(style.frame_border);
        let (row_deltas, col_deltas) = match self.tree.content(self.node) {
            BoxContent::FrameSet {
                row_deltas,
                col_deltas,
            } => (row_deltas.as_slice(), col_deltas.as_slice()),
            _ => (&[] as &[f32], &[] as &[f32]),
        };

        let available = self.space.available_size();
        let inline_size = if available.inline_size.is_indefinite() {
            LayoutUnit::zero()
        } else {
            available.inline_size
        };
        let block_size = if available.block_size.is_indefinite() {
            LayoutUnit::zero()
        } else {
            available.block_size
        };

        let mut col_sizes = convert_to_pixel_values(&style.frame_cols, inline_size, border);
        let mut row_sizes = convert_to_pixel_values(&style.frame_rows, block_size, border);
        apply_resize_deltas(&mut col_sizes, col_deltas);
        apply_resize_deltas(&mut row_sizes, row_deltas);

        let mut builder = BoxFragmentBuilder::new(
            self.node,
            FragmentKind::Box,
            self.space.clone(),
            BoxStrut::default(),
            inline_size,
            None,
        );
        builder.set_bfc_block_offset(self.space.bfc_offset().block_offset);

        let children = self.tree.children(self.node);
        let mut child_index = 0;
        let mut block_offset = LayoutUnit::zero();
        for row_size in &row_sizes {
            let mut inline_offset = LayoutUnit::zero();
            for col_size in &col_sizes {
                if child_index >= children.len() {
                    break;
                }
                let child = children[child_index];
                child_index += 1;
                let cell = LogicalSize::new(*col_size, *row_size);
                let child_space = ConstraintSpace::builder(style.writing_direction())
                    .available_size(cell)
                    .percentage_resolution_size(cell)
                    .fixed_inline_size(true)
                    .fixed_block_size(true)
                    .new_formatting_context(true)
                    .build();
                let result = BlockNode::new(child).layout(self.tree, ctx, child_space, None)?;
                if let Some(fragment) = result.fragment() {
                    let cell = Arc::new(PhysicalFragment {
                        kind: FragmentKind::Frame,
                        node: child,
                        size: fragment.size,
                        children: vec![PhysicalFragmentLink {
                            offset: PhysicalOffset::default(),
                            fragment: Arc::clone(fragment),
                        }],
                        break_token: None,
                        first_baseline: fragment.first_baseline,
                        last_baseline: fragment.last_baseline,
                        is_first_for_node: true,
                    });
                    builder.add_child(cell, LogicalOffset::new(inline_offset, block_offset));
                }
                inline_offset += *col_size + border;
            }
            block_offset += *row_size + border;
        }

        builder.set_intrinsic_block_size(block_size);
        builder.set_has_seen_all_children(true);
        builder.set_side_data(LayoutSideData::FrameSet(FrameSetSideData {
            row_sizes,
            col_sizes,
            border_thickness: border,
        }));
        Ok(Arc::new(builder.to_box_fragment(
            block_size,
            self.space.exclusion_space().clone(),
        )))
    }
}

/// The HTML dimension-list algorithm. The returned sizes sum to the
/// available length minus the inter-track borders, with any rounding
/// remainder assigned to the last track.
pub(crate) fn convert_to_pixel_values(
    tracks: &[FrameLength],
    available: LayoutUnit,
    border: LayoutUnit,
) -> Vec<LayoutUnit> {
    let tracks: &[FrameLength] = if tracks.is_empty() {
        &[FrameLength::Relative(1.0)]
    } else {
        tracks
    };
    let count = tracks.len();
    let total = (available - border * (count as i32 - 1)).clamp_negative_to_zero();
    let mut sizes = vec![LayoutUnit::zero(); count];

    let total_fixed: f32 = tracks
        .iter()
        .filter_map(|t| match t {
            FrameLength::Fixed(v) => Some(v.max(0.0)),
            _ => None,
        })
        .sum();
    let mut remaining = total;
    if total_fixed > 0.0 {
        let fixed_fits = LayoutUnit::px(total_fixed) <= remaining;
        for (i, track) in tracks.iter().enumerate() {
            if let FrameLength::Fixed(v) = track {
                let v = v.max(0.0);
                sizes[i] = if fixed_fits {
                    LayoutUnit::px(v)
                } else {
                    remaining.scale_by(v / total_fixed)
                };
            }
        }
        remaining = (total - assigned_sum(&sizes)).clamp_negative_to_zero();
    }

    // Percentages resolve against the full axis; if their sum overflows
    // what is left, each gets its proportional share of the remainder.
    let total_percent: f32 = tracks
        .iter()
        .filter_map(|t| match t {
            FrameLength::Percent(v) => Some(v.max(0.0)),
            _ => None,
        })
        .sum();
    if total_percent > 0.0 {
        let desired: Vec<(usize, LayoutUnit)> = tracks
            .iter()
            .enumerate()
            .filter_map(|(i, t)| match t {
                FrameLength::Percent(v) => Some((i, total.scale_by(v.max(0.0) / 100.0))),
                _ => None,
            })
            .collect();
        let desired_sum = desired
            .iter()
            .fold(LayoutUnit::zero(), |acc, (_, s)| acc + *s);
        for (i, size) in &desired {
            sizes[*i] = if desired_sum <= remaining || desired_sum == LayoutUnit::zero() {
                *size
            } else {
                remaining.scale_by(size.to_f32_px() / desired_sum.to_f32_px())
            };
        }
        remaining = (total - assigned_sum(&sizes)).clamp_negative_to_zero();
    }

    // Relative tracks split what is left by weight. A `0*` counts as `1*`.
    let weights: Vec<(usize, f32)> = tracks
        .iter()
        .enumerate()
        .filter_map(|(i, t)| match t {
            FrameLength::Relative(v) => Some((i, if *v <= 0.0 { 1.0 } else { *v })),
            _ => None,
        })
        .collect();
    let total_weight: f32 = weights.iter().map(|(_, w)| *w).sum();
    if total_weight > 0.0 {
        for (i, w) in &weights {
            sizes[*i] = remaining.scale_by(w / total_weight);
        }
    }

    // Leftover priority: grow percentages, else fixed, else the last track.
    let leftover = total - assigned_sum(&sizes);
    if leftover > LayoutUnit::zero() && total_weight == 0.0 {
        let bucket: Vec<usize> = if total_percent > 0.0 {
            tracks
                .iter()
                .enumerate()
                .filter(|(_, t)| matches!(t, FrameLength::Percent(_)))
                .map(|(i, _)| i)
                .collect()
        } else if total_fixed > 0.0 {
            tracks
                .iter()
                .enumerate()
                .filter(|(_, t)| matches!(t, FrameLength::Fixed(_)))
                .map(|(i, _)| i)
                .collect()
        } else {
            Vec::new()
        };
        let bucket_sum = bucket
            .iter()
            .fold(LayoutUnit::zero(), |acc, i| acc + sizes[*i]);
        if bucket_sum > LayoutUnit::zero() {
            for i in &bucket {
                let share = sizes[*i].to_f32_px() / bucket_sum.to_f32_px();
                sizes[*i] += leftover.scale_by(share);
            }
        } else if !bucket.is_empty() {
            let share = leftover / bucket.len() as i32;
            for i in &bucket {
                sizes[*i] += share;
            }
        }
    }

    // Rounding remainder lands in the last track so the sum is exact.
    let diff = total - assigned_sum(&sizes);
    if let Some(last) = sizes.last_mut() {
        *last += diff;
    }
    sizes
}

fn assigned_sum(sizes: &[LayoutUnit]) -> LayoutUnit {
    sizes.iter().fold(LayoutUnit::zero(), |acc, s| acc + *s)
}

/// Applies user resize deltas between adjacent tracks. Delta `i` moves the
/// edge between tracks `i` and `i+1`. If any track that was positive would
/// end up non-positive, the whole axis rolls back.
pub(crate) fn apply_resize_deltas(sizes: &mut [LayoutUnit], deltas: &[f32]) {
    if deltas.iter().all(|d| *d == 0.0) {
        return;
    }
    let mut adjusted: Vec<LayoutUnit> = sizes.to_vec();
    for (i, delta) in deltas.iter().enumerate() {
        if i + 1 >= adjusted.len() {
            break;
        }
        let delta = LayoutUnit::px(*delta);
        adjusted[i] += delta;
        adjusted[i + 1] -= delta;
    }
    let violates = adjusted
        .iter()
        .zip(sizes.iter())
        .any(|(new, old)| *new <= LayoutUnit::zero() && *old > LayoutUnit::zero());
    if violates {
        return;
    }
    sizes.copy_from_slice(&adjusted);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn px(v: f32) -> LayoutUnit {
        LayoutUnit::px(v)
    }

    fn sum(sizes: &[LayoutUnit]) -> LayoutUnit {
        sizes.iter().fold(LayoutUnit::zero(), |acc, s| acc + *s)
    }

    #[test]
    fn fixed_percent_and_relative_mix() {
        let tracks = [
            FrameLength::Fixed(100.0),
            FrameLength::Percent(25.0),
            FrameLength::Relative(1.0),
        ];
        let sizes = convert_to_pixel_values(&tracks, px(412.0), px(6.0));
        // 412 - 2*6 = 400 to distribute.
        assert_eq!(sizes[0], px(100.0));
        assert_eq!(sizes[1], px(100.0));
        assert_eq!(sizes[2], px(200.0));
    }

    #[test]
    fn fixed_tracks_shrink_proportionally_when_overflowing() {
        let tracks = [FrameLength::Fixed(300.0), FrameLength::Fixed(100.0)];
        let sizes = convert_to_pixel_values(&tracks, px(200.0), px(0.0));
        assert_eq!(sizes[0], px(150.0));
        assert_eq!(sizes[1], px(50.0));
    }

    #[test]
    fn percent_overflow_splits_by_share_of_total_percentage() {
        let tracks = [FrameLength::Percent(100.0), FrameLength::Percent(300.0)];
        let sizes = convert_to_pixel_values(&tracks, px(400.0), px(0.0));
        assert_eq!(sizes[0], px(100.0));
        assert_eq!(sizes[1], px(300.0));
    }

    #[test]
    fn zero_star_counts_as_one_star() {
        let tracks = [FrameLength::Relative(0.0), FrameLength::Relative(1.0)];
        let sizes = convert_to_pixel_values(&tracks, px(100.0), px(0.0));
        assert_eq!(sizes[0], px(50.0));
        assert_eq!(sizes[1], px(50.0));
    }

    #[test]
    fn leftover_goes_to_percent_tracks_before_fixed() {
        let tracks = [FrameLength::Fixed(100.0), FrameLength::Percent(25.0)];
        let sizes = convert_to_pixel_values(&tracks, px(400.0), px(0.0));
        assert_eq!(sizes[0], px(100.0));
        assert_eq!(sizes[1], px(300.0));
    }

    #[test]
    fn leftover_goes_to_last_track_without_percent_or_fixed() {
        let tracks = [FrameLength::Relative(1.0), FrameLength::Relative(1.0)];
        let sizes = convert_to_pixel_values(&tracks, px(101.0), px(0.0));
        assert_eq!(sum(&sizes), px(101.0));
    }

    #[test]
    fn sizes_sum_to_available_minus_borders() {
        let tracks = [
            FrameLength::Fixed(37.0),
            FrameLength::Percent(13.0),
            FrameLength::Relative(2.0),
            FrameLength::Percent(41.0),
            FrameLength::Relative(0.0),
        ];
        let available = px(777.0);
        let border = px(6.0);
        let sizes = convert_to_pixel_values(&tracks, available, border);
        assert_eq!(sum(&sizes) + border * 4, available);
    }

    #[test]
    fn empty_track_list_is_one_full_track() {
        let sizes = convert_to_pixel_values(&[], px(500.0), px(6.0));
        assert_eq!(sizes, vec![px(500.0)]);
    }

    #[test]
    fn resize_delta_moves_the_shared_edge() {
        let mut sizes = vec![px(100.0), px(100.0)];
        apply_resize_deltas(&mut sizes, &[30.0]);
        assert_eq!(sizes, vec![px(130.0), px(70.0)]);
    }

    #[test]
    fn resize_deltas_roll_back_atomically() {
        let mut sizes = vec![px(100.0), px(100.0), px(100.0)];
        apply_resize_deltas(&mut sizes, &[50.0, 120.0]);
        // The second delta would empty the last track, so neither applies.
        assert_eq!(sizes, vec![px(100.0), px(100.0), px(100.0)]);
    }
}
