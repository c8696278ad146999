//! Entity routes. Paths are parameterized; handlers resolve the entity by segment.

use crate::handlers::entity::{create, list, read};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn entity_routes(state: AppState) -> Router {
    Router::new()
        .route("/:path_segment", get(list).post(create))
        .route("/:path_segment/:id", get(read))
        .with_state(state)
}
