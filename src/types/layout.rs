use serde::{Deserialize, Serialize};

use super::cell::{clamp_span, one, MAX_COLSPAN, MAX_ROWSPAN};

/// A table cell as the rendering surface reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedCell {
    /// `data-key` of the cell; cells without one are laid out but never resized
    #[serde(default)]
    pub key: Option<String>,
    /// Rendered width in pixels (`offsetWidth`)
    pub width: f64,
    #[serde(default = "one")]
    pub row_span: i64,
    #[serde(default = "one")]
    pub col_span: i64,
}

impl RenderedCell {
    pub fn new(key: impl Into<String>, width: f64) -> Self {
        Self {
            key: Some(key.into()),
            width,
            row_span: 1,
            col_span: 1,
        }
    }

    pub fn with_span(mut self, row_span: i64, col_span: i64) -> Self {
        self.row_span = row_span;
        self.col_span = col_span;
        self
    }

    /// `row_span` clamped to `1..=max_rows`
    pub fn rows_spanned(&self, max_rows: usize) -> usize {
        clamp_span(self.row_span, max_rows.min(MAX_ROWSPAN))
    }

    /// `col_span` clamped to at least 1
    pub fn cols_spanned(&self) -> usize {
        clamp_span(self.col_span, MAX_COLSPAN)
    }
}

/// Geometry of one cell at drag start.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaidOutCell {
    /// Left edge relative to the table
    pub x_start: f64,
    pub width: f64,
    pub colspan: usize,
    pub key: Option<String>,
}

impl LaidOutCell {
    /// Right edge relative to the table
    pub fn x_end(&self) -> f64 {
        self.x_start + self.width
    }

    /// True if `boundary` lies in `(x_start, x_end]`: the cell sits just left of it.
    pub fn ends_at_or_spans(&self, boundary: f64) -> bool {
        self.x_start < boundary && self.x_end() >= boundary
    }

    /// True for a merged cell with `boundary` strictly inside it
    pub fn straddles(&self, boundary: f64) -> bool {
        self.colspan >= 2 && self.x_start < boundary && boundary < self.x_end()
    }
}

/// Snapshot of every row's cell geometry, captured once per drag.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RowLayout {
    pub rows: Vec<Vec<LaidOutCell>>,
}

impl RowLayout {
    /// Every keyed cell with its snapshot width
    pub fn keyed_cells(&self) -> impl Iterator<Item = (&str, &LaidOutCell)> {
        self.rows
            .iter()
            .flatten()
            .filter_map(|cell| cell.key.as_deref().map(|key| (key, cell)))
    }
}
