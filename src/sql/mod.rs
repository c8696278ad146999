//! Safe SQL builder: identifiers from config and catalog only, values as parameters.

mod builder;
pub mod params;
pub mod record;
pub use builder::*;
pub use params::*;
pub use record::*;
