//! Connection and catalog diagnostics (database product, visible tables).

use crate::error::AppError;
use serde::Serialize;
use sqlx::PgConnection;

#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub connected: bool,
    pub database_name: String,
    pub database_version: String,
    pub username: String,
}

pub async fn server_info(conn: &mut PgConnection) -> Result<ServerInfo, AppError> {
    let (database_name, database_version, username) =
        sqlx::query_as::<_, (String, String, String)>("SELECT current_database()::text, version(), current_user::text")
            .fetch_one(&mut *conn)
            .await?;
    Ok(ServerInfo {
        connected: true,
        database_name,
        database_version,
        username,
    })
}

/// Base tables visible to the connection, excluding system schemas.
pub async fn list_tables(conn: &mut PgConnection) -> Result<Vec<String>, AppError> {
    let rows = sqlx::query_as::<_, (String,)>(
        "SELECT table_name::text FROM information_schema.tables \
         WHERE table_type = 'BASE TABLE' \
           AND table_schema NOT IN ('pg_catalog', 'information_schema') \
         ORDER BY table_schema, table_name",
    )
    .fetch_all(&mut *conn)
    .await?;
    for (t,) in &rows {
        tracing::debug!(table = %t, "found table");
    }
    Ok(rows.into_iter().map(|(t,)| t).collect())
}
