//! The mutable box tree the engine lays out.
//!
//! All boxes live in one slab owned by [`BoxTree`] and are addressed by
//! copyable [`BoxId`]s. Layout never restructures the tree; it only reads
//! structure and style, and writes per-box layout state (cached results,
//! dirty bits, scrollbar state, written-back geometry) through interior
//! mutability.

use crate::break_token::BreakToken;
use crate::layout_result::LayoutResult;
use folio_style::ComputedStyle;
use folio_types::{BoxId, LayoutUnit, LogicalSize, PhysicalRect};
use std::cell::{Ref, RefCell, RefMut};
use std::sync::Arc;

/// What a box holds besides block-level children.
#[derive(Debug, Clone)]
pub enum BoxContent {
    /// An ordinary block container; children are block-level boxes.
    Block,
    /// Opaque inline content, pre-shaped into `line_count` lines of
    /// `line_height` each. Inline layout itself is an external concern;
    /// fragmentation only needs the line geometry.
    LineContainer {
        line_height: LayoutUnit,
        line_count: u32,
    },
    /// Replaced content with an intrinsic size. Monolithic content never
    /// breaks; it overflows the fragmentainer instead.
    Replaced { size: LogicalSize, monolithic: bool },
    /// A multi-column container.
    Multicol,
    /// The root of paginated (print) content.
    PageRoot,
    /// A frameset grid; children fill the cells in row-major order.
    FrameSet {
        row_deltas: Vec<f32>,
        col_deltas: Vec<f32>,
    },
}

/// One stored layout result, keyed by the break token that produced it.
#[derive(Debug, Clone)]
pub struct CachedLayoutEntry {
    pub incoming_break_token: Option<Arc<BreakToken>>,
    pub result: Arc<LayoutResult>,
}

/// Only the block-axis bar is modeled; inline overflow stays visible.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrollbarState {
    pub has_block_bar: bool,
    pub frozen_block: bool,
}

/// Per-box mutable layout state.
#[derive(Debug, Default)]
pub struct BoxState {
    /// Ordered, index-addressed results: entry *i* is the result for the
    /// box's *i*-th fragment.
    pub cache: Vec<CachedLayoutEntry>,
    pub needs_layout: bool,
    pub skip_layout_cache: bool,
    pub needs_simplified_layout: bool,
    pub scrollbars: ScrollbarState,
    /// Geometry written back for hit-testing/DOM APIs: the box's first
    /// fragment rect, relative to its parent fragment.
    pub written_rect: Option<PhysicalRect>,
}

#[derive(Debug)]
pub struct LayoutBox {
    pub style: Arc<ComputedStyle>,
    pub content: BoxContent,
    pub parent: Option<BoxId>,
    pub children: Vec<BoxId>,
    pub(crate) state: RefCell<BoxState>,
}

#[derive(Debug, Default)]
pub struct BoxTree {
    boxes: Vec<LayoutBox>,
}

impl BoxTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a box. The first inserted box (with no parent) is the root.
    pub fn insert(
        &mut self,
        parent: Option<BoxId>,
        style: Arc<ComputedStyle>,
        content: BoxContent,
    ) -> BoxId {
        let id = BoxId::new(self.boxes.len());
        self.boxes.push(LayoutBox {
            style,
            content,
            parent,
            children: Vec::new(),
            state: RefCell::new(BoxState {
                needs_layout: true,
                ..BoxState::default()
            }),
        });
        if let Some(parent) = parent {
            self.boxes[parent.index()].children.push(id);
        }
        id
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub(crate) fn get(&self, id: BoxId) -> &LayoutBox {
        &self.boxes[id.index()]
    }

    pub fn style(&self, id: BoxId) -> &ComputedStyle {
        &self.get(id).style
    }

    pub fn content(&self, id: BoxId) -> &BoxContent {
        &self.get(id).content
    }

    pub fn children(&self, id: BoxId) -> &[BoxId] {
        &self.get(id).children
    }

    pub(crate) fn state(&self, id: BoxId) -> Ref<'_, BoxState> {
        self.get(id).state.borrow()
    }

    pub(crate) fn state_mut(&self, id: BoxId) -> RefMut<'_, BoxState> {
        self.get(id).state.borrow_mut()
    }

    /// Marks the box (and its cached results) dirty, the way a style or
    /// content mutation would.
    pub fn set_needs_layout(&self, id: BoxId) {
        let mut state = self.state_mut(id);
        state.needs_layout = true;
        state.cache.clear();
        state.written_rect = None;
    }

    /// Bypasses the cache probe for this box while still storing fresh
    /// results. Layout must produce identical geometry either way.
    pub fn set_should_skip_layout_cache(&self, id: BoxId, skip: bool) {
        self.state_mut(id).skip_layout_cache = skip;
    }

    /// Flags that only out-of-flow descendants changed: cached geometry is
    /// reusable, children need a re-walk.
    pub fn mark_needs_simplified_layout(&self, id: BoxId) {
        self.state_mut(id).needs_simplified_layout = true;
    }

    /// The geometry written back by the last layout with side effects
    /// enabled: the box's first-fragment rect relative to its parent
    /// fragment.
    pub fn written_geometry(&self, id: BoxId) -> Option<PhysicalRect> {
        self.state(id).written_rect
    }

    pub fn cached_results(&self, id: BoxId) -> Vec<Arc<LayoutResult>> {
        self.state(id)
            .cache
            .iter()
            .map(|entry| Arc::clone(&entry.result))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_links_children_in_order() {
        let mut tree = BoxTree::new();
        let style = Arc::new(ComputedStyle::default());
        let root = tree.insert(None, Arc::clone(&style), BoxContent::Block);
        let a = tree.insert(Some(root), Arc::clone(&style), BoxContent::Block);
        let b = tree.insert(Some(root), style, BoxContent::Block);
        assert_eq!(tree.children(root), &[a, b]);
        assert_eq!(tree.get(a).parent, Some(root));
        assert!(tree.state(root).needs_layout);
    }

    #[test]
    fn set_needs_layout_clears_the_cache() {
        let mut tree = BoxTree::new();
        let style = Arc::new(ComputedStyle::default());
        let root = tree.insert(None, style, BoxContent::Block);
        tree.state_mut(root).needs_layout = false;
        tree.set_needs_layout(root);
        assert!(tree.state(root).needs_layout);
        assert!(tree.state(root).cache.is_empty());
    }
}
