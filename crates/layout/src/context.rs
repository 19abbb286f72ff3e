//! Per-layout-run state threaded through the call chain.

use crate::fragmentation::BreakPolicy;
use folio_types::{LayoutUnit, LayoutUnitExt, LogicalSize};
use std::collections::HashMap;

/// Maps `@page` names to page-area sizes. Page geometry can differ per
/// named page, which is what forces the double layout in pagination.
#[derive(Debug, Clone)]
pub struct PageAreaProvider {
    default_size: LogicalSize,
    named: HashMap<String, LogicalSize>,
}

impl PageAreaProvider {
    pub fn new(default_size: LogicalSize) -> Self {
        Self {
            default_size,
            named: HashMap::new(),
        }
    }

    pub fn set_named_page(&mut self, name: &str, size: LogicalSize) {
        self.named.insert(name.to_owned(), size);
    }

    pub fn area_for(&self, name: Option<&str>) -> LogicalSize {
        name.and_then(|name| self.named.get(name).copied())
            .unwrap_or(self.default_size)
    }
}

impl Default for PageAreaProvider {
    fn default() -> Self {
        // US letter at 96dpi.
        Self::new(LogicalSize::new(
            LayoutUnit::px(816.0),
            LayoutUnit::px(1056.0),
        ))
    }
}

/// Mutable context for one layout run. Replaces process-wide state: the
/// side-effects switch is a counter scoped by [`LayoutContext::measure`],
/// not a global.
#[derive(Debug, Default)]
pub struct LayoutContext {
    measure_depth: u32,
    pub pages: PageAreaProvider,
    pub break_policy: BreakPolicy,
}

impl LayoutContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pages(pages: PageAreaProvider) -> Self {
        Self {
            pages,
            ..Self::default()
        }
    }

    /// Whether layout may write geometry back into the box tree and store
    /// cache entries. Disabled inside measure-only passes.
    pub fn side_effects_enabled(&self) -> bool {
        self.measure_depth == 0
    }

    /// Runs `f` with side effects disabled. Nesting is fine; effects come
    /// back on when the outermost scope exits.
    pub fn measure<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.measure_depth += 1;
        let result = f(self);
        self.measure_depth -= 1;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_scopes_nest() {
        let mut ctx = LayoutContext::new();
        assert!(ctx.side_effects_enabled());
        ctx.measure(|ctx| {
            assert!(!ctx.side_effects_enabled());
            ctx.measure(|ctx| assert!(!ctx.side_effects_enabled()));
            assert!(!ctx.side_effects_enabled());
        });
        assert!(ctx.side_effects_enabled());
    }

    #[test]
    fn named_pages_fall_back_to_default() {
        let mut pages = PageAreaProvider::new(LogicalSize::new(
            LayoutUnit::px(400.0),
            LayoutUnit::px(600.0),
        ));
        pages.set_named_page("wide", LogicalSize::new(LayoutUnit::px(600.0), LayoutUnit::px(400.0)));
        assert_eq!(
            pages.area_for(Some("wide")).inline_size,
            LayoutUnit::px(600.0)
        );
        assert_eq!(pages.area_for(None).inline_size, LayoutUnit::px(400.0));
        assert_eq!(
            pages.area_for(Some("unknown")).inline_size,
            LayoutUnit::px(400.0)
        );
    }
}
