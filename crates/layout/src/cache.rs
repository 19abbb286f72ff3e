//! The per-box layout result cache.
//!
//! Each box owns an ordered list of results, one per fragment. A probe
//! compares the incoming constraint space and break token against the
//! stored ones; the exclusion space comparison is by backing identity, so
//! a float added anywhere in the BFC invalidates dependents for free.

use crate::box_tree::{BoxTree, CachedLayoutEntry};
use crate::break_token::BreakToken;
use crate::constraint_space::ConstraintSpace;
use crate::layout_result::LayoutResult;
use folio_types::BoxId;
use std::sync::Arc;

#[derive(Debug)]
pub enum CacheStatus {
    /// Reuse the stored result verbatim.
    Hit(Arc<LayoutResult>),
    /// Geometry is reusable but children must be re-walked (out-of-flow
    /// descendants changed).
    NeedsSimplifiedLayout(Arc<LayoutResult>),
    Miss,
}

fn tokens_equal(a: Option<&Arc<BreakToken>>, b: Option<&Arc<BreakToken>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => **a == **b,
        _ => false,
    }
}

pub fn probe(
    tree: &BoxTree,
    id: BoxId,
    space: &ConstraintSpace,
    break_token: Option<&Arc<BreakToken>>,
    has_early_break: bool,
) -> CacheStatus {
    // An early-break hint always forces a fresh pass; the hint is not part
    // of the stored key.
    if has_early_break {
        return CacheStatus::Miss;
    }
    let state = tree.state(id);
    if state.needs_layout || state.skip_layout_cache {
        return CacheStatus::Miss;
    }
    for entry in &state.cache {
        if tokens_equal(entry.incoming_break_token.as_ref(), break_token)
            && entry.result.space() == space
        {
            let result = Arc::clone(&entry.result);
            return if state.needs_simplified_layout {
                CacheStatus::NeedsSimplifiedLayout(result)
            } else {
                CacheStatus::Hit(result)
            };
        }
    }
    CacheStatus::Miss
}

/// Stores a fresh result at its fragment index. Storing fragment 0 starts
/// a new generation and drops stale later fragments.
pub fn store(
    tree: &BoxTree,
    id: BoxId,
    incoming_break_token: Option<Arc<BreakToken>>,
    result: Arc<LayoutResult>,
) {
    let index = incoming_break_token
        .as_deref()
        .map_or(0, |token| token.sequence_number() as usize + 1);
    let mut state = tree.state_mut(id);
    state.cache.truncate(index);
    state.cache.push(CachedLayoutEntry {
        incoming_break_token,
        result,
    });
}
