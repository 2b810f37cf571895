use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// Address of a node in the host document: child indices from the root.
///
/// For a cell, the two components right after the table's own path are its
/// row and column; everything before them is the ancestor prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellPath(pub Vec<usize>);

impl CellPath {
    /// The document root (empty path)
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path of the `index`-th child of this node
    pub fn child(&self, index: usize) -> Self {
        let mut path = self.0.clone();
        path.push(index);
        Self(path)
    }

    /// True if `other` is this node or one of its descendants
    pub fn is_prefix_of(&self, other: &CellPath) -> bool {
        other.0.starts_with(&self.0)
    }

    /// Row and column components of a cell path under a table at `table_depth`.
    pub fn grid_position(&self, table_depth: usize) -> Option<(usize, usize)> {
        let row = self.0.get(table_depth).copied()?;
        let col = self.0.get(table_depth + 1).copied()?;
        Some((row, col))
    }

    /// Logical path for slot `(row, col)`: this path's ancestor prefix followed by `[row, col]`.
    pub fn with_grid_position(&self, table_depth: usize, row: usize, col: usize) -> Self {
        let mut path: Vec<usize> = self.0.iter().take(table_depth).copied().collect();
        path.push(row);
        path.push(col);
        Self(path)
    }
}

impl Deref for CellPath {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for CellPath {
    fn from(path: Vec<usize>) -> Self {
        Self(path)
    }
}

impl From<&[usize]> for CellPath {
    fn from(path: &[usize]) -> Self {
        Self(path.to_vec())
    }
}

impl fmt::Display for CellPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{index}")?;
        }
        write!(f, "]")
    }
}

/// Widest colspan honoured, as in HTML tables.
pub const MAX_COLSPAN: usize = 1000;

/// Tallest rowspan honoured, as in HTML tables.
pub const MAX_ROWSPAN: usize = 65534;

pub(crate) fn one() -> i64 {
    1
}

/// A declared span as a slot count: at least 1 and at most `limit`.
///
/// Hosts write whatever their users typed, so zero and negative spans occur.
pub fn clamp_span(declared: i64, limit: usize) -> usize {
    usize::try_from(declared)
        .unwrap_or(1)
        .clamp(1, limit.max(1))
}

/// The part of a table cell node the core reads: identity and span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    /// Stable unique identifier
    pub key: String,
    #[serde(default = "one")]
    pub rowspan: i64,
    #[serde(default = "one")]
    pub colspan: i64,
    /// Selection marker, present while the cell is part of a cell selection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_color: Option<String>,
}

impl Cell {
    /// Create an unspanned 1x1 cell
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            rowspan: 1,
            colspan: 1,
            selection_color: None,
        }
    }

    /// Set the declared rowspan and colspan
    pub fn with_span(mut self, rowspan: i64, colspan: i64) -> Self {
        self.rowspan = rowspan;
        self.colspan = colspan;
        self
    }

    /// `(rowspan, colspan)` clamped to `1..=max_rows` and `1..=MAX_COLSPAN`.
    pub fn span(&self, max_rows: usize) -> (usize, usize) {
        let span = (
            clamp_span(self.rowspan, max_rows.min(MAX_ROWSPAN)),
            clamp_span(self.colspan, MAX_COLSPAN),
        );
        if i64::try_from(span.0).ok() != Some(self.rowspan)
            || i64::try_from(span.1).ok() != Some(self.colspan)
        {
            log::warn!(
                "cell {} declares a {}x{} span, using {}x{}",
                self.key,
                self.rowspan,
                self.colspan,
                span.0,
                span.1
            );
        }
        span
    }
}
