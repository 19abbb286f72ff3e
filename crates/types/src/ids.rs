//! Newtype wrappers for semantic IDs.
//!
//! These provide compile-time safety against mixing up indices into
//! different stores (box tree slots vs. fragment indices, etc.).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one box in a box-tree slab. Copyable; the tree owns the box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoxId(u32);

impl BoxId {
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "box#{}", self.0)
    }
}
