//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid identifier for {kind}: '{value}'")]
    InvalidIdentifier { kind: &'static str, value: String },
    #[error("entity '{0}' declares no primary key candidates")]
    NoKeyCandidates(String),
    #[error("duplicate path segment: {0}")]
    DuplicatePathSegment(String),
    #[error("entity '{entity}': synonym '{synonym}' is claimed by more than one field")]
    OverlappingSynonym { entity: String, synonym: String },
    #[error("config load: {0}")]
    Load(String),
    #[error("validation: {0}")]
    Validation(String),
}

/// Input rejected by the field resolver. Carries the offending field name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingRequiredField(String),
    #[error("no supported columns to insert into {0}")]
    NoInsertableColumns(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("no columns found for table '{table}'")]
    SchemaMissing { table: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("insert into '{table}' affected 0 rows")]
    ZeroRowsAffected { table: String },
    #[error("no primary key column found for '{table}'")]
    NoKeyColumn { table: String },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("bad request: {0}")]
    BadRequest(String),
}

/// Boundary category for an error: validation, not found, or internal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    BadRequest,
    Internal,
}

impl ErrorCategory {
    pub fn code(self) -> &'static str {
        match self {
            ErrorCategory::Validation => "validation",
            ErrorCategory::NotFound => "not_found",
            ErrorCategory::BadRequest => "bad_request",
            ErrorCategory::Internal => "internal",
        }
    }

    fn status(self) -> StatusCode {
        match self {
            ErrorCategory::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCategory::NotFound => StatusCode::NOT_FOUND,
            ErrorCategory::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCategory::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl AppError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::Validation(_) => ErrorCategory::Validation,
            AppError::NotFound(_) => ErrorCategory::NotFound,
            AppError::BadRequest(_) => ErrorCategory::BadRequest,
            AppError::Config(_)
            | AppError::SchemaMissing { .. }
            | AppError::ZeroRowsAffected { .. }
            | AppError::NoKeyColumn { .. }
            | AppError::Db(_) => ErrorCategory::Internal,
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let category = self.category();
        if category == ErrorCategory::Internal {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: category.code().to_string(),
                message: self.to_string(),
            },
        };
        (category.status(), Json(body)).into_response()
    }
}
