//! Plugin options: node type names, selection colour and resize limits.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpanTableError};

/// Node attribute that carries the selection marker.
pub const SELECTION_ATTRIBUTE: &str = "selectionColor";

/// How the resize engine decides that a shrink would breach the floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SaturationPolicy {
    /// Only the last target cell examined decides `adjust` and saturation.
    LastTarget,
    /// Every target cell on the boundary is examined; `adjust` is the largest shortfall.
    #[default]
    AllRows,
}

/// Options shared by selection and resizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableOptions {
    /// Node type of the table root
    pub type_table: String,
    /// Node type of a table row
    pub type_row: String,
    /// Node type of a table cell
    pub type_cell: String,
    /// Value stamped into the selection marker attribute
    pub selection_color: String,
    /// Resizing never takes a cell below this many pixels
    pub minimum_cell_width: f64,
    /// Width of the invisible drag handle in pixels
    pub handle_width: f64,
    pub saturation: SaturationPolicy,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            type_table: "table".to_string(),
            type_row: "table-row".to_string(),
            type_cell: "table-cell".to_string(),
            selection_color: "rgb(185, 211, 252)".to_string(),
            minimum_cell_width: 32.0,
            handle_width: 10.0,
            saturation: SaturationPolicy::AllRows,
        }
    }
}

impl TableOptions {
    /// Parse options from JSON, filling unspecified fields with defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Reject widths the resize engine cannot honour.
    pub fn validate(&self) -> Result<()> {
        if !self.minimum_cell_width.is_finite() || self.minimum_cell_width < 0.0 {
            return Err(SpanTableError::Options(format!(
                "minimumCellWidth must be a non-negative number, got {}",
                self.minimum_cell_width
            )));
        }
        if !self.handle_width.is_finite() || self.handle_width < 0.0 {
            return Err(SpanTableError::Options(format!(
                "handleWidth must be a non-negative number, got {}",
                self.handle_width
            )));
        }
        if self.type_cell.is_empty() || self.type_table.is_empty() {
            return Err(SpanTableError::Options(
                "node type names must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
