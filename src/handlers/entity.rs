//! Entity handlers: list, read by id, create.

use crate::config::ResolvedEntity;
use crate::error::AppError;
use crate::response::{success_created, success_many, success_one_ok};
use crate::service::{CreatedFrom, CrudService, PgCatalog};
use crate::sql::SqlValue;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde_json::{Map, Value};
use std::collections::HashMap;

fn entity_for<'a>(state: &'a AppState, path_segment: &str, operation: &str) -> Result<&'a ResolvedEntity, AppError> {
    let entity = state
        .model
        .entity_by_path(path_segment)
        .ok_or_else(|| AppError::NotFound(path_segment.to_string()))?;
    if !entity.allows(operation) {
        return Err(AppError::BadRequest(format!("{} not allowed", operation)));
    }
    Ok(entity)
}

fn body_to_map(value: Value) -> Result<Map<String, Value>, AppError> {
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

/// Path ids are bound as text exactly as sent; the placeholder cast converts
/// them to the key column's type (`007` stays `007` on a varchar key).
fn path_id(id_str: &str) -> SqlValue {
    SqlValue::Text(id_str.to_string())
}

pub async fn list(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let entity = entity_for(&state, &path_segment, "read")?;

    let mut limit: Option<u32> = None;
    let mut offset: Option<u32> = None;
    let mut filters: Vec<(String, SqlValue)> = Vec::new();
    for (k, v) in params {
        match k.as_str() {
            "limit" => limit = v.parse().ok(),
            "offset" => offset = v.parse().ok(),
            // matched against live columns by the builder once the schema is known
            _ => filters.push((k, SqlValue::Text(v))),
        }
    }

    let mut conn = state.pool.acquire().await?;
    let rows = CrudService::list(&mut PgCatalog::new(&mut conn), entity, &filters, limit, offset).await?;
    Ok(success_many(rows))
}

pub async fn read(
    State(state): State<AppState>,
    Path((path_segment, id_str)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let entity = entity_for(&state, &path_segment, "read")?;
    let mut conn = state.pool.acquire().await?;
    let row = CrudService::read(&mut PgCatalog::new(&mut conn), entity, path_id(&id_str))
        .await?
        .ok_or(AppError::NotFound(id_str))?;
    Ok(success_one_ok(row))
}

pub async fn create(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let entity = entity_for(&state, &path_segment, "create")?;
    let body = body_to_map(body)?;
    let mut conn = state.pool.acquire().await?;
    let created = CrudService::create(&mut PgCatalog::new(&mut conn), entity, &body).await?;
    let source = match created.source {
        CreatedFrom::Refetched => "refetched",
        CreatedFrom::Echoed => "echoed",
    };
    Ok(success_created(created.record, Some(serde_json::json!({ "source": source }))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_ids_keep_their_text() {
        assert_eq!(path_id("007"), SqlValue::from("007"));
        assert_eq!(path_id("42"), SqlValue::from("42"));
        assert_eq!(path_id("a1b2"), SqlValue::from("a1b2"));
    }

    #[test]
    fn body_must_be_object() {
        assert!(body_to_map(serde_json::json!([1, 2])).is_err());
        assert!(body_to_map(serde_json::json!({"name": "x"})).is_ok());
    }
}
