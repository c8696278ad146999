//! In-memory catalog: serves fixed schemas and keeps inserted rows so the
//! engine can be driven end to end without a database.
#![allow(dead_code)]

use async_trait::async_trait;
use restaurant_api::schema::{ColumnDescriptor, TableSchema};
use restaurant_api::service::{Catalog, InsertOutcome};
use restaurant_api::sql::{QueryBuf, Record, SqlValue};
use restaurant_api::AppError;
use std::collections::HashMap;

/// How the fake reports the generated-key row of an insert.
pub enum Generated {
    /// The full stored row, like `RETURNING *`.
    Row,
    /// A fixed record.
    Fixed(Record),
    /// Nothing reported.
    Nothing,
}

pub struct FakeCatalog {
    schemas: HashMap<String, Vec<String>>,
    rows: HashMap<String, Vec<Record>>,
    /// Column filled with a sequence value when an insert leaves it out.
    auto_key: HashMap<String, String>,
    next_id: i64,
    pub generated: Generated,
    pub affect_rows: bool,
    /// Every statement executed after discovery, in order.
    pub executed: Vec<QueryBuf>,
    pub discoveries: usize,
}

impl FakeCatalog {
    pub fn new() -> Self {
        FakeCatalog {
            schemas: HashMap::new(),
            rows: HashMap::new(),
            auto_key: HashMap::new(),
            next_id: 1,
            generated: Generated::Row,
            affect_rows: true,
            executed: Vec::new(),
            discoveries: 0,
        }
    }

    pub fn table(mut self, name: &str, columns: &[&str]) -> Self {
        self.schemas
            .insert(name.to_string(), columns.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn auto_key(mut self, table: &str, column: &str) -> Self {
        self.auto_key.insert(table.to_string(), column.to_string());
        self
    }

    pub fn rows(&self, table: &str) -> &[Record] {
        self.rows.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn inserts(&self) -> Vec<&QueryBuf> {
        self.executed.iter().filter(|q| q.sql.starts_with("INSERT")).collect()
    }

    pub fn selects(&self) -> Vec<&QueryBuf> {
        self.executed.iter().filter(|q| q.sql.starts_with("SELECT")).collect()
    }
}

fn unquote(s: &str) -> String {
    s.trim().trim_matches('"').to_string()
}

/// Table name following `keyword` (e.g. `INTO`, `FROM`).
fn table_after(sql: &str, keyword: &str) -> String {
    let rest = sql.split(keyword).nth(1).unwrap_or_default().trim_start();
    unquote(rest.split_whitespace().next().unwrap_or_default())
}

/// Column list of an `INSERT INTO t (a, b) VALUES ...`.
pub fn insert_columns(sql: &str) -> Vec<String> {
    let start = sql.find('(').map(|i| i + 1).unwrap_or(0);
    let end = sql.find(')').unwrap_or(sql.len());
    sql[start..end].split(',').map(unquote).collect()
}

/// Column of a `... WHERE "col" = $1` clause.
fn where_column(sql: &str) -> Option<String> {
    let rest = sql.split(" WHERE ").nth(1)?;
    Some(unquote(rest.split(" = ").next()?))
}

fn loose_key(v: &SqlValue) -> String {
    match v {
        SqlValue::Text(s) => s.clone(),
        other => other.to_json().to_string(),
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn discover_columns(&mut self, table: &str) -> Result<TableSchema, AppError> {
        self.discoveries += 1;
        let columns = self
            .schemas
            .get(table)
            .map(|cols| cols.iter().map(|c| ColumnDescriptor::new(c.as_str())).collect())
            .unwrap_or_default();
        Ok(TableSchema::new(table, columns))
    }

    async fn insert(&mut self, q: &QueryBuf) -> Result<InsertOutcome, AppError> {
        self.executed.push(QueryBuf {
            sql: q.sql.clone(),
            params: q.params.clone(),
        });
        if !self.affect_rows {
            return Ok(InsertOutcome::default());
        }
        let table = table_after(&q.sql, "INTO");
        let supplied: Vec<(String, SqlValue)> = insert_columns(&q.sql).into_iter().zip(q.params.clone()).collect();
        let auto = self.auto_key.get(&table).cloned();
        let mut row = Record::new();
        for col in self.schemas.get(&table).cloned().unwrap_or_default() {
            let value = match supplied.iter().find(|(c, _)| *c == col) {
                Some((_, v)) => v.clone(),
                None if auto.as_deref() == Some(col.as_str()) => {
                    let id = self.next_id;
                    self.next_id += 1;
                    SqlValue::Int(id)
                }
                None => SqlValue::Null,
            };
            row.push(col, value);
        }
        self.rows.entry(table).or_default().push(row.clone());
        let generated = match &self.generated {
            Generated::Row => Some(row),
            Generated::Fixed(r) => Some(r.clone()),
            Generated::Nothing => None,
        };
        Ok(InsertOutcome {
            rows_affected: 1,
            generated,
        })
    }

    async fn fetch_optional(&mut self, q: &QueryBuf) -> Result<Option<Record>, AppError> {
        Ok(self.fetch_all(q).await?.into_iter().next())
    }

    async fn fetch_all(&mut self, q: &QueryBuf) -> Result<Vec<Record>, AppError> {
        self.executed.push(QueryBuf {
            sql: q.sql.clone(),
            params: q.params.clone(),
        });
        let table = table_after(&q.sql, "FROM");
        let rows = self.rows(&table).to_vec();
        Ok(match (where_column(&q.sql), q.params.first()) {
            (Some(col), Some(want)) => rows
                .into_iter()
                .filter(|r| r.get(&col).map(loose_key) == Some(loose_key(want)))
                .collect(),
            _ => rows,
        })
    }
}
