//! HTTP handlers for entity CRUD and database diagnostics.

pub mod diagnostics;
pub mod entity;
pub use entity::*;
