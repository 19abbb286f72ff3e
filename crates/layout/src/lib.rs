//! Block and column fragmentation layout.
//!
//! [`BlockNode::layout`] is the single entry point: it consults the
//! per-box result cache, dispatches to the algorithm the box's content
//! calls for, and post-processes (scrollbar stabilization, cached-result
//! storage). The algorithms recurse through `BlockNode::layout` on their
//! children with derived [`ConstraintSpace`]s, splitting content across
//! fragmentainers (columns, pages) via [`BreakToken`]s.

use folio_types::BoxId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("cannot lay out an empty box tree")]
    EmptyTree,
    #[error("layout of box {0:?} produced no fragment")]
    MissingFragment(BoxId),
}

pub mod algorithms;
pub mod block_node;
pub mod box_tree;
pub mod break_token;
pub mod builder;
pub mod cache;
pub mod constraint_space;
pub mod context;
pub mod exclusion;
pub mod fragment;
pub mod fragmentation;
pub mod layout_result;
pub mod min_max;

pub use self::block_node::{layout_root, BlockNode};
pub use self::box_tree::{BoxContent, BoxTree};
pub use self::break_token::{BlockBreakToken, BreakToken, ChildBreakState, InlineBreakToken};
pub use self::builder::{BoxFragmentBuilder, FrameSetSideData, LayoutSideData};
pub use self::cache::CacheStatus;
pub use self::constraint_space::{ConstraintSpace, FragmentationType};
pub use self::context::{LayoutContext, PageAreaProvider};
pub use self::exclusion::{ExclusionSpace, LayoutOpportunity};
pub use self::fragment::{FragmentKind, PhysicalFragment, PhysicalFragmentLink};
pub use self::fragmentation::{BreakAppeal, BreakPolicy, EarlyBreak};
pub use self::layout_result::{LayoutResult, LayoutStatus};
pub use self::min_max::{MinMaxSizes, MinMaxSizesResult};
