//! What the resize engine needs from the rendering surface.

use super::geometry::{HandleId, ResizeHandle};
use crate::types::RenderedCell;

/// A rendered table the resize engine measures and writes widths into.
///
/// All reads are synchronous: the engine never defers a measurement.
pub trait TableSurface {
    /// Guard for document-level pointer listeners, held for the length of a drag.
    ///
    /// Dropping it must detach the listeners.
    type Capture;

    /// Rendered cells row by row, each row listing only the cells that start in it.
    fn rows(&self) -> Vec<Vec<RenderedCell>>;

    fn table_height(&self) -> f64;

    /// Current rendered width of the cell with `key`
    fn rendered_width(&self, key: &str) -> Option<f64>;

    /// Assign an inline width to the cell with `key`
    fn apply_width(&mut self, key: &str, width: f64);

    fn show_handles(&mut self, handles: &[ResizeHandle]);

    /// Remove every handle except `keep`
    fn remove_handles(&mut self, keep: Option<HandleId>);

    /// Start receiving pointer move/up events from the whole document.
    fn capture_pointer(&mut self) -> Self::Capture;
}
