//! Data types for table projection, selection and resizing.

mod cell;
mod grid;
mod layout;
mod selection;

pub use cell::*;
pub use grid::*;
pub use layout::*;
pub use selection::*;
