//! Runtime view of the database schema: introspection and key discovery.

pub mod diagnostics;
mod introspect;
mod keys;

pub use introspect::*;
pub use keys::*;
