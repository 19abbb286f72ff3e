//! Multi-column style values.

use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnFill {
    /// Balance content equally between columns (the initial value).
    #[default]
    Balance,
    /// Fill columns sequentially to the column block-size.
    Auto,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnSpan {
    #[default]
    None,
    All,
}
