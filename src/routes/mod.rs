//! Router assembly: common routes at the root, entity and diagnostics routes under `/api`.

mod common;
mod diagnostics;
mod entity;

pub use common::common_routes;
pub use diagnostics::diagnostics_routes;
pub use entity::entity_routes;

use crate::config::Settings;
use crate::state::AppState;
use axum::http::HeaderValue;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

fn cors_layer(origins: Option<&[String]>) -> CorsLayer {
    let allow_origin = match origins {
        None => AllowOrigin::any(),
        Some(list) => AllowOrigin::list(list.iter().filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })),
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Full application router. The body limit is outermost; CORS sits directly
/// on the routes since it needs a `Default` response body.
pub fn app(state: AppState, settings: &Settings) -> Router {
    let api = Router::new()
        .merge(diagnostics_routes(state.clone()))
        .merge(entity_routes(state.clone()));

    Router::new()
        .merge(common_routes(state))
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(RequestBodyLimitLayer::new(settings.body_limit_bytes))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(settings.cors_origins.as_deref())),
        )
}
