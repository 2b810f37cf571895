use serde::Serialize;

use super::CellPath;

/// Normalized bounding box between two logical slot paths.
///
/// `head[i] <= tail[i]` on every axis. Axes cover the full path, so cells
/// from the same table compare equal on their ancestor components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRect {
    pub head: CellPath,
    pub tail: CellPath,
}

impl SelectionRect {
    /// Component-wise min/max of two paths. Extra components of the longer path are dropped.
    pub fn normalized(a: &CellPath, b: &CellPath) -> Self {
        let (head, tail): (Vec<usize>, Vec<usize>) = a
            .iter()
            .zip(b.iter())
            .map(|(&x, &y)| (x.min(y), x.max(y)))
            .unzip();
        Self {
            head: CellPath(head),
            tail: CellPath(tail),
        }
    }

    /// Closed containment on every axis the rectangle has.
    pub fn contains(&self, path: &CellPath) -> bool {
        path.iter()
            .zip(self.head.iter().zip(self.tail.iter()))
            .all(|(&value, (&lo, &hi))| lo <= value && value <= hi)
    }
}
