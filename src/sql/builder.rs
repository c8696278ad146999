//! Builds parameterized INSERT and SELECT statements against an introspected table.
//! Identifiers come only from config and the catalog; every value is a `$n` parameter.

use crate::case::to_snake_case;
use crate::schema::{ColumnDescriptor, TableSchema};
use crate::service::ResolvedInsert;
use crate::sql::{decodes_natively, SqlValue};

/// Quote identifier for PostgreSQL (safe: only from config or catalog).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Table name, schema-qualified when introspection reported where it lives.
fn qualified_table(schema: &TableSchema) -> String {
    match schema.namespace() {
        Some(ns) => format!("{}.{}", quoted(ns), quoted(schema.table())),
        None => quoted(schema.table()),
    }
}

fn read_as_text(c: &ColumnDescriptor) -> bool {
    c.row_type_name().is_some_and(|t| !decodes_natively(&t))
}

/// Result columns: `*` when every column decodes natively, otherwise an
/// explicit list reading the other columns as text.
fn projection(schema: &TableSchema) -> String {
    if !schema.columns().iter().any(read_as_text) {
        return "*".to_string();
    }
    schema
        .columns()
        .iter()
        .map(|c| {
            if read_as_text(c) {
                format!("{0}::text AS {0}", quoted(&c.name))
            } else {
                quoted(&c.name)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    /// Push a value and return its placeholder, cast to the column's type when known
    /// so text-encoded values bind to any column type.
    fn push_param(&mut self, v: SqlValue, column: Option<&ColumnDescriptor>) -> String {
        self.params.push(v);
        let n = self.params.len();
        match column.and_then(|c| c.cast_type()) {
            Some(t) => format!("${}::{}", n, t),
            None => format!("${}", n),
        }
    }
}

/// INSERT of the resolved columns, one positional parameter per value.
/// Returning the inserted row is how PostgreSQL reports generated keys.
pub fn insert(schema: &TableSchema, resolved: &ResolvedInsert) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::with_capacity(resolved.columns.len());
    let mut placeholders = Vec::with_capacity(resolved.values.len());
    for (col, val) in resolved.columns.iter().zip(&resolved.values) {
        let ph = q.push_param(val.clone(), schema.find(col));
        cols.push(quoted(col));
        placeholders.push(ph);
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        qualified_table(schema),
        cols.join(", "),
        placeholders.join(", "),
        projection(schema)
    );
    q
}

/// SELECT by a single key column.
pub fn select_by_key(schema: &TableSchema, key_column: &str, key: SqlValue) -> QueryBuf {
    let mut q = QueryBuf::new();
    let ph = q.push_param(key, schema.find(key_column));
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = {}",
        projection(schema),
        qualified_table(schema),
        quoted(key_column),
        ph
    );
    q
}

/// SELECT in scan order. Optional exact-match filters and LIMIT/OFFSET (limit
/// max 1000). A filter key matches a column as given, then in its snake_case
/// spelling; keys naming no live column are skipped.
pub fn select_all(
    schema: &TableSchema,
    filters: &[(String, SqlValue)],
    limit: Option<u32>,
    offset: Option<u32>,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut where_parts = Vec::new();
    for (col, val) in filters {
        let Some(c) = schema.find(col).or_else(|| schema.find(&to_snake_case(col))) else {
            tracing::debug!(table = %schema.table(), filter = %col, "filter names no live column, skipped");
            continue;
        };
        let ph = q.push_param(val.clone(), Some(c));
        where_parts.push(format!("{} = {}", quoted(&c.name), ph));
    }
    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };
    let limit_clause = limit.map(|n| format!(" LIMIT {}", n.min(1000))).unwrap_or_default();
    let offset_clause = offset.map(|n| format!(" OFFSET {}", n)).unwrap_or_default();
    q.sql = format!(
        "SELECT {} FROM {}{}{}{}",
        projection(schema),
        qualified_table(schema),
        where_clause,
        limit_clause,
        offset_clause
    );
    q
}
