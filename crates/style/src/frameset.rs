//! `<frameset>` row/column track definitions.

use serde::{Deserialize, Serialize};

/// One entry in a frameset `rows`/`cols` list.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum FrameLength {
    /// A fixed pixel length (`"200"`).
    Fixed(f32),
    /// A percentage of the available axis length (`"30%"`).
    Percent(f32),
    /// A relative share of the leftover space (`"2*"`). `0*` counts as `1*`.
    Relative(f32),
}
