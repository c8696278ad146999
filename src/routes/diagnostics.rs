//! Diagnostics routes: connection details, visible tables, live table structure.

use crate::handlers::diagnostics::{connection, structure, tables};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn diagnostics_routes(state: AppState) -> Router {
    Router::new()
        .route("/test/connection", get(connection))
        .route("/test/tables", get(tables))
        .route("/test/structure/:table", get(structure))
        .with_state(state)
}
