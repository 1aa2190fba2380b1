//! HTTP handlers for criteria-driven table access.

pub mod table;
pub use table::*;
