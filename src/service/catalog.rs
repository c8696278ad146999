//! Per-request database access used by the CRUD engine.

use crate::error::AppError;
use crate::schema::{discover_columns, TableSchema};
use crate::sql::{map_row, QueryBuf, Record};
use async_trait::async_trait;
use sqlx::postgres::{PgArguments, Postgres};
use sqlx::PgConnection;

/// Result of an INSERT: affected row count and the generated-key row, if any.
#[derive(Clone, Debug, Default)]
pub struct InsertOutcome {
    pub rows_affected: u64,
    pub generated: Option<Record>,
}

/// What the engine needs from one connection: introspection and statement execution.
#[async_trait]
pub trait Catalog: Send {
    async fn discover_columns(&mut self, table: &str) -> Result<TableSchema, AppError>;
    async fn insert(&mut self, q: &QueryBuf) -> Result<InsertOutcome, AppError>;
    async fn fetch_optional(&mut self, q: &QueryBuf) -> Result<Option<Record>, AppError>;
    async fn fetch_all(&mut self, q: &QueryBuf) -> Result<Vec<Record>, AppError>;
}

/// Catalog over a single borrowed connection. The connection goes back to the
/// pool when the handler's `PoolConnection` drops, on every exit path.
pub struct PgCatalog<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PgCatalog<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        PgCatalog { conn }
    }
}

/// Statements run unprepared: parameter wire types vary per value and the row
/// type of `SELECT *` follows the live table, so no plan may outlive one call.
fn bind_all(q: &QueryBuf) -> sqlx::query::Query<'_, Postgres, PgArguments> {
    let mut query = sqlx::query(&q.sql).persistent(false);
    for p in &q.params {
        query = query.bind(p.clone());
    }
    query
}

#[async_trait]
impl Catalog for PgCatalog<'_> {
    async fn discover_columns(&mut self, table: &str) -> Result<TableSchema, AppError> {
        discover_columns(&mut *self.conn, table).await
    }

    async fn insert(&mut self, q: &QueryBuf) -> Result<InsertOutcome, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "insert");
        let rows = bind_all(q).fetch_all(&mut *self.conn).await?;
        Ok(InsertOutcome {
            rows_affected: rows.len() as u64,
            generated: rows.first().map(map_row),
        })
    }

    async fn fetch_optional(&mut self, q: &QueryBuf) -> Result<Option<Record>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let row = bind_all(q).fetch_optional(&mut *self.conn).await?;
        Ok(row.as_ref().map(map_row))
    }

    async fn fetch_all(&mut self, q: &QueryBuf) -> Result<Vec<Record>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let rows = bind_all(q).fetch_all(&mut *self.conn).await?;
        Ok(rows.iter().map(map_row).collect())
    }
}
