//! Browser bindings.
//!
//! This module handles:
//! - Reading rendered cells and writing widths through the DOM ([`DomTable`])
//! - The page-wide selection style element ([`DomStyleSheet`])
//! - The `#[wasm_bindgen]` classes JavaScript hosts construct

mod bindings;
mod style;
mod table;

pub use bindings::{EditorStore, JsCallbacks, ResizableTable};
pub use style::DomStyleSheet;
pub use table::{enters_cell, handle_under, DomCapture, DomTable, DragListeners, HandleDown};

use wasm_bindgen::prelude::*;

/// Route `log` output to the browser console and install the panic hook.
///
/// `level` is one of `error`, `warn`, `info`, `debug`, `trace`; defaults to `info`.
///
/// # Errors
/// Returns an error if `level` is not a log level.
#[wasm_bindgen]
pub fn init_logging(level: Option<String>) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let level = match level.as_deref() {
        Some(name) => name
            .parse::<log::Level>()
            .map_err(|e| JsValue::from_str(&format!("{name}: {e}")))?,
        None => log::Level::Info,
    };
    if console_log::init_with_level(level).is_err() {
        log::debug!("console logger already installed");
    }
    Ok(())
}
