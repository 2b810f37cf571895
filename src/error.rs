//! Structured error types for spantable.
//!
//! None of these are fatal to the host editor: the public entry points turn
//! them into no-ops or empty results, but the core keeps them typed so callers
//! can tell a stale key from an empty table.

/// All errors that can occur while projecting, selecting or resizing a table.
#[derive(Debug, thiserror::Error)]
pub enum SpanTableError {
    /// A cell key did not resolve to any grid slot.
    #[error("Unresolved cell reference: {key}")]
    UnresolvedReference { key: String },

    /// The table has no cells under it.
    #[error("Table has no cells")]
    EmptyTable,

    /// No table node encloses the requested location.
    #[error("No table found at the given location")]
    TableNotFound,

    /// Geometry the resize engine cannot work with.
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// JSON (de)serialization error.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid option values.
    #[error("Invalid options: {0}")]
    Options(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SpanTableError>;

impl SpanTableError {
    /// True for the conditions the host should treat as a silent no-op.
    pub fn is_no_op(&self) -> bool {
        matches!(
            self,
            Self::UnresolvedReference { .. } | Self::EmptyTable | Self::TableNotFound
        )
    }
}

#[cfg(target_arch = "wasm32")]
impl From<SpanTableError> for wasm_bindgen::JsValue {
    fn from(e: SpanTableError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
