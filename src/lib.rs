//! Facade over the layout workspace.
//!
//! The interesting code lives in the member crates: `folio-types`
//! (geometry primitives), `folio-style` (computed style), and
//! `folio-layout` (the fragmentation algorithms). This crate re-exports
//! them under one roof for consumers that want a single dependency.

pub use folio_layout as layout;
pub use folio_style as style;
pub use folio_types as types;

pub use folio_layout::{
    layout_root, BlockNode, BoxContent, BoxTree, BreakToken, ConstraintSpace, FragmentKind,
    FragmentationType, LayoutContext, LayoutError, LayoutResult, PageAreaProvider,
    PhysicalFragment,
};
pub use folio_style::{ComputedStyle, StyleBuilder};
pub use folio_types::{LayoutUnit, LayoutUnitExt, LogicalSize};
