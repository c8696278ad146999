//! Restaurant backend: CRUD over tables whose columns are discovered at request time.

pub mod case;
pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod schema;
pub mod service;
pub mod sql;
pub mod state;

pub use config::{builtin, load_from_path, resolve, FullConfig, ResolvedEntity, ResolvedModel, Settings};
pub use error::{AppError, ConfigError, ValidationError};
pub use routes::app;
pub use service::{Catalog, CrudService, PgCatalog};
pub use state::AppState;
