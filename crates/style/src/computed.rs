//! The read-only computed style consumed by the layout engine.
//!
//! The engine never resolves a cascade; it receives one `ComputedStyle`
//! per box, fully resolved. Tests construct styles through the builder.

use crate::breaks::{BreakBetween, BreakInside};
use crate::column::{ColumnFill, ColumnSpan};
use crate::frameset::FrameLength;
use crate::length::{EdgeLengths, EdgeSizes, Length};
use folio_types::{Direction, WritingDirection, WritingMode};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Float {
    #[default]
    None,
    Left,
    Right,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Clear {
    #[default]
    None,
    Left,
    Right,
    Both,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Auto,
    Scroll,
}

impl Overflow {
    pub fn may_have_scrollbar(self) -> bool {
        matches!(self, Overflow::Auto | Overflow::Scroll)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ComputedStyle {
    pub width: Length,
    pub height: Length,
    pub min_height: Length,
    pub max_height: Length,
    pub margin: EdgeLengths,
    pub padding: EdgeSizes,
    pub border: EdgeSizes,

    pub writing_mode: WritingMode,
    pub direction: Direction,

    pub break_before: BreakBetween,
    pub break_after: BreakBetween,
    pub break_inside: BreakInside,
    pub orphans: u32,
    pub widows: u32,

    pub column_count: Option<u32>,
    pub column_width: Option<f32>,
    pub column_gap: Option<f32>,
    pub column_fill: ColumnFill,
    pub column_span: ColumnSpan,

    pub float: Float,
    pub clear: Clear,
    pub overflow: Overflow,

    /// The `@page` name this box requests for the page it starts on.
    pub page_name: Option<String>,

    pub frame_rows: Vec<FrameLength>,
    pub frame_cols: Vec<FrameLength>,
    pub frame_border: f32,

    /// Forces a new block formatting context even when no other property
    /// would (e.g. `display:flow-root`, `contain:layout`).
    pub contain_layout: bool,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            width: Length::Auto,
            height: Length::Auto,
            min_height: Length::Auto,
            max_height: Length::Auto,
            margin: EdgeLengths::default(),
            padding: EdgeSizes::default(),
            border: EdgeSizes::default(),
            writing_mode: WritingMode::default(),
            direction: Direction::default(),
            break_before: BreakBetween::Auto,
            break_after: BreakBetween::Auto,
            break_inside: BreakInside::Auto,
            orphans: 2,
            widows: 2,
            column_count: None,
            column_width: None,
            column_gap: None,
            column_fill: ColumnFill::Balance,
            column_span: ColumnSpan::None,
            float: Float::None,
            clear: Clear::None,
            overflow: Overflow::Visible,
            page_name: None,
            frame_rows: Vec::new(),
            frame_cols: Vec::new(),
            frame_border: 6.0,
            contain_layout: false,
        }
    }
}

impl ComputedStyle {
    pub fn builder() -> StyleBuilder {
        StyleBuilder::default()
    }

    pub fn writing_direction(&self) -> WritingDirection {
        WritingDirection::new(self.writing_mode, self.direction)
    }

    /// Whether this box is a multi-column container.
    pub fn is_multicol(&self) -> bool {
        self.column_count.is_some() || self.column_width.is_some()
    }

    pub fn is_floated(&self) -> bool {
        self.float != Float::None
    }

    pub fn is_column_spanner(&self) -> bool {
        self.column_span == ColumnSpan::All
    }

    /// Whether this box establishes a new block formatting context, which
    /// makes it opaque to outside floats and stops margin collapsing
    /// through its edges.
    pub fn establishes_new_formatting_context(&self) -> bool {
        self.contain_layout
            || self.is_floated()
            || self.is_multicol()
            || self.overflow != Overflow::Visible
    }
}

/// Fluent construction of computed styles for programmatic callers.
#[derive(Debug, Clone, Default)]
pub struct StyleBuilder {
    style: ComputedStyle,
}

impl StyleBuilder {
    pub fn width(mut self, width: f32) -> Self {
        self.style.width = Length::Px(width);
        self
    }

    pub fn width_percent(mut self, percent: f32) -> Self {
        self.style.width = Length::Percent(percent);
        self
    }

    pub fn height(mut self, height: f32) -> Self {
        self.style.height = Length::Px(height);
        self
    }

    pub fn height_percent(mut self, percent: f32) -> Self {
        self.style.height = Length::Percent(percent);
        self
    }

    pub fn min_height(mut self, min_height: f32) -> Self {
        self.style.min_height = Length::Px(min_height);
        self
    }

    pub fn max_height(mut self, max_height: f32) -> Self {
        self.style.max_height = Length::Px(max_height);
        self
    }

    pub fn margin(mut self, top: f32, right: f32, bottom: f32, left: f32) -> Self {
        self.style.margin = EdgeLengths::px(top, right, bottom, left);
        self
    }

    pub fn margin_top(mut self, top: f32) -> Self {
        self.style.margin.top = Length::Px(top);
        self
    }

    pub fn margin_bottom(mut self, bottom: f32) -> Self {
        self.style.margin.bottom = Length::Px(bottom);
        self
    }

    pub fn padding(mut self, all: f32) -> Self {
        self.style.padding = EdgeSizes::all(all);
        self
    }

    pub fn border(mut self, all: f32) -> Self {
        self.style.border = EdgeSizes::all(all);
        self
    }

    pub fn writing_mode(mut self, writing_mode: WritingMode) -> Self {
        self.style.writing_mode = writing_mode;
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.style.direction = direction;
        self
    }

    pub fn break_before(mut self, value: BreakBetween) -> Self {
        self.style.break_before = value;
        self
    }

    pub fn break_after(mut self, value: BreakBetween) -> Self {
        self.style.break_after = value;
        self
    }

    pub fn break_inside(mut self, value: BreakInside) -> Self {
        self.style.break_inside = value;
        self
    }

    pub fn orphans(mut self, orphans: u32) -> Self {
        self.style.orphans = orphans;
        self
    }

    pub fn widows(mut self, widows: u32) -> Self {
        self.style.widows = widows;
        self
    }

    pub fn columns(mut self, count: u32) -> Self {
        self.style.column_count = Some(count);
        self
    }

    pub fn column_width(mut self, width: f32) -> Self {
        self.style.column_width = Some(width);
        self
    }

    pub fn column_gap(mut self, gap: f32) -> Self {
        self.style.column_gap = Some(gap);
        self
    }

    pub fn column_fill(mut self, fill: ColumnFill) -> Self {
        self.style.column_fill = fill;
        self
    }

    pub fn column_span_all(mut self) -> Self {
        self.style.column_span = ColumnSpan::All;
        self
    }

    pub fn float(mut self, float: Float) -> Self {
        self.style.float = float;
        self
    }

    pub fn clear(mut self, clear: Clear) -> Self {
        self.style.clear = clear;
        self
    }

    pub fn overflow(mut self, overflow: Overflow) -> Self {
        self.style.overflow = overflow;
        self
    }

    pub fn page_name(mut self, name: &str) -> Self {
        self.style.page_name = Some(name.to_owned());
        self
    }

    pub fn frame_rows(mut self, rows: Vec<FrameLength>) -> Self {
        self.style.frame_rows = rows;
        self
    }

    pub fn frame_cols(mut self, cols: Vec<FrameLength>) -> Self {
        self.style.frame_cols = cols;
        self
    }

    pub fn frame_border(mut self, thickness: f32) -> Self {
        self.style.frame_border = thickness;
        self
    }

    pub fn new_formatting_context(mut self) -> Self {
        self.style.contain_layout = true;
        self
    }

    pub fn build(self) -> ComputedStyle {
        self.style
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multicol_establishes_formatting_context() {
        let style = ComputedStyle::builder().columns(3).build();
        assert!(style.is_multicol());
        assert!(style.establishes_new_formatting_context());
    }

    #[test]
    fn plain_block_does_not_establish_formatting_context() {
        let style = ComputedStyle::builder().width(100.0).build();
        assert!(!style.establishes_new_formatting_context());
    }

    #[test]
    fn float_establishes_formatting_context() {
        let style = ComputedStyle::builder().float(Float::Left).build();
        assert!(style.is_floated());
        assert!(style.establishes_new_formatting_context());
    }
}
