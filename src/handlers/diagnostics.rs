//! Connection and schema diagnostics.

use crate::error::AppError;
use crate::response::success_one_ok;
use crate::schema::diagnostics::{list_tables, server_info};
use crate::schema::discover_columns;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};

/// Always 200: a failed connection is reported in the body.
pub async fn connection(State(state): State<AppState>) -> impl IntoResponse {
    let info = match state.pool.acquire().await {
        Ok(mut conn) => server_info(&mut conn).await,
        Err(e) => Err(AppError::Db(e)),
    };
    match info {
        Ok(info) => {
            tracing::info!(database = %info.database_name, "database connection successful");
            Json(serde_json::to_value(info).unwrap_or_default())
        }
        Err(e) => {
            tracing::error!(error = %e, "database connection failed");
            Json(serde_json::json!({ "connected": false, "error": e.to_string() }))
        }
    }
}

pub async fn tables(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut conn = state.pool.acquire().await?;
    let tables = list_tables(&mut conn).await?;
    Ok(Json(serde_json::json!({ "count": tables.len(), "tables": tables })))
}

pub async fn structure(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = state.pool.acquire().await?;
    let schema = discover_columns(&mut conn, &table).await?.require_columns()?;
    Ok(success_one_ok(serde_json::json!({
        "table": schema.table(),
        "schema": schema.namespace(),
        "columns": schema.columns(),
    })))
}
