//! Ordered column -> value rows and the mapper from PostgreSQL result rows.

use crate::sql::SqlValue;
use chrono::{FixedOffset, NaiveTime};
use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use sqlx::postgres::types::{PgInterval, PgTimeTz};
use sqlx::postgres::{PgRow, Postgres};
use sqlx::{Column, Decode, Row, Type, TypeInfo};

/// A row as an ordered association list. Order is the order the columns were
/// produced in (result metadata for fetched rows, insert order for echoes).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, SqlValue)>,
}

impl Record {
    pub fn new() -> Self {
        Record { fields: Vec::new() }
    }

    pub fn push(&mut self, column: impl Into<String>, value: SqlValue) {
        self.fields.push((column.into(), value));
    }

    /// Exact-name lookup, falling back to a case-insensitive match.
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.fields
            .iter()
            .find(|(c, _)| c == column)
            .or_else(|| self.fields.iter().find(|(c, _)| c.eq_ignore_ascii_case(column)))
            .map(|(_, v)| v)
    }

    pub fn first(&self) -> Option<(&str, &SqlValue)> {
        self.fields.first().map(|(c, v)| (c.as_str(), v))
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(c, _)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.fields.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, SqlValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, SqlValue)>>(iter: I) -> Self {
        Record {
            fields: iter.into_iter().collect(),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (column, value) in &self.fields {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Build a record from the row's own column metadata. The result may be
/// narrower than, or named differently from, the introspected table.
pub fn map_row(row: &PgRow) -> Record {
    row.columns()
        .iter()
        .map(|col| (col.name().to_string(), decode_cell(row, col.ordinal(), col.type_info().name())))
        .collect()
}

/// Scalar types `map_row` decodes itself, by result type name.
const SCALAR_TYPES: &[&str] = &[
    "BOOL", "INT2", "INT4", "INT8", "FLOAT4", "FLOAT8", "NUMERIC", "UUID", "TIMESTAMP", "TIMESTAMPTZ", "DATE",
    "TIME", "TIMETZ", "INTERVAL", "BYTEA", "JSON", "JSONB", "TEXT", "VARCHAR", "BPCHAR", "NAME",
];

/// Array types `map_row` decodes into JSON arrays.
const ARRAY_TYPES: &[&str] = &[
    "BOOL[]", "INT2[]", "INT4[]", "INT8[]", "FLOAT8[]", "NUMERIC[]", "UUID[]", "TEXT[]", "VARCHAR[]",
];

/// True when cells of this result type decode natively. Other columns have to
/// be selected as `::text`.
pub fn decodes_natively(type_name: &str) -> bool {
    let upper = type_name.to_ascii_uppercase();
    SCALAR_TYPES.contains(&upper.as_str()) || ARRAY_TYPES.contains(&upper.as_str())
}

fn decode_cell(row: &PgRow, idx: usize, type_name: &str) -> SqlValue {
    let decoded: Result<Option<SqlValue>, sqlx::Error> = match type_name.to_ascii_uppercase().as_str() {
        "BOOL" => row.try_get::<Option<bool>, _>(idx).map(|v| v.map(SqlValue::Bool)),
        "INT2" => row
            .try_get::<Option<i16>, _>(idx)
            .map(|v| v.map(|n| SqlValue::Int(n.into()))),
        "INT4" => row
            .try_get::<Option<i32>, _>(idx)
            .map(|v| v.map(|n| SqlValue::Int(n.into()))),
        "INT8" => row.try_get::<Option<i64>, _>(idx).map(|v| v.map(SqlValue::Int)),
        "FLOAT4" => row
            .try_get::<Option<f32>, _>(idx)
            .map(|v| v.map(|n| SqlValue::Float(n.into()))),
        "FLOAT8" => row.try_get::<Option<f64>, _>(idx).map(|v| v.map(SqlValue::Float)),
        "NUMERIC" => row
            .try_get::<Option<Decimal>, _>(idx)
            .map(|v| v.map(SqlValue::Decimal)),
        "UUID" => row.try_get::<Option<uuid::Uuid>, _>(idx).map(|v| v.map(SqlValue::Uuid)),
        "TIMESTAMP" => row
            .try_get::<Option<chrono::NaiveDateTime>, _>(idx)
            .map(|v| v.map(SqlValue::Timestamp)),
        "TIMESTAMPTZ" => row
            .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(idx)
            .map(|v| v.map(SqlValue::TimestampTz)),
        "DATE" => row
            .try_get::<Option<chrono::NaiveDate>, _>(idx)
            .map(|v| v.map(SqlValue::Date)),
        "TIME" => row
            .try_get::<Option<NaiveTime>, _>(idx)
            .map(|v| v.map(|t| SqlValue::Text(t.to_string()))),
        "TIMETZ" => row
            .try_get::<Option<PgTimeTz<NaiveTime, FixedOffset>>, _>(idx)
            .map(|v| v.map(|t| SqlValue::Text(format!("{}{}", t.time, t.offset)))),
        "INTERVAL" => row
            .try_get::<Option<PgInterval>, _>(idx)
            .map(|v| v.map(|i| SqlValue::Text(interval_iso8601(&i)))),
        "BYTEA" => row
            .try_get::<Option<Vec<u8>>, _>(idx)
            .map(|v| v.map(|b| SqlValue::Text(bytea_hex(&b)))),
        "JSON" | "JSONB" => row
            .try_get::<Option<Value>, _>(idx)
            .map(|v| v.map(SqlValue::Json)),
        // text family only: these are UTF-8 on the wire
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => row
            .try_get_unchecked::<Option<String>, _>(idx)
            .map(|v| v.map(SqlValue::Text)),
        "BOOL[]" => array::<bool>(row, idx, SqlValue::Bool),
        "INT2[]" => array::<i16>(row, idx, |n| SqlValue::Int(n.into())),
        "INT4[]" => array::<i32>(row, idx, |n| SqlValue::Int(n.into())),
        "INT8[]" => array::<i64>(row, idx, SqlValue::Int),
        "FLOAT8[]" => array::<f64>(row, idx, SqlValue::Float),
        "NUMERIC[]" => array::<Decimal>(row, idx, SqlValue::Decimal),
        "UUID[]" => array::<uuid::Uuid>(row, idx, SqlValue::Uuid),
        "TEXT[]" | "VARCHAR[]" => array::<String>(row, idx, SqlValue::Text),
        _ => {
            tracing::warn!(column = idx, pg_type = %type_name, "no decoder for column type, returning null");
            return SqlValue::Null;
        }
    };
    match decoded {
        Ok(Some(v)) => v,
        Ok(None) => SqlValue::Null,
        Err(e) => {
            tracing::warn!(column = idx, pg_type = %type_name, error = %e, "undecodable cell, returning null");
            SqlValue::Null
        }
    }
}

fn array<T>(row: &PgRow, idx: usize, convert: impl Fn(T) -> SqlValue) -> Result<Option<SqlValue>, sqlx::Error>
where
    Vec<Option<T>>: for<'r> Decode<'r, Postgres> + Type<Postgres>,
{
    row.try_get::<Option<Vec<Option<T>>>, _>(idx).map(|v| {
        v.map(|items| {
            SqlValue::Json(Value::Array(
                items
                    .into_iter()
                    .map(|x| x.map(&convert).unwrap_or(SqlValue::Null).to_json())
                    .collect(),
            ))
        })
    })
}

/// ISO 8601 duration, e.g. `P14M3DT1.5S`.
fn interval_iso8601(i: &PgInterval) -> String {
    let mut out = String::from("P");
    if i.months != 0 {
        out.push_str(&format!("{}M", i.months));
    }
    if i.days != 0 {
        out.push_str(&format!("{}D", i.days));
    }
    if i.microseconds != 0 || out.len() == 1 {
        let sign = if i.microseconds < 0 { "-" } else { "" };
        let micros = i.microseconds.unsigned_abs();
        let (secs, frac) = (micros / 1_000_000, micros % 1_000_000);
        if frac == 0 {
            out.push_str(&format!("T{}{}S", sign, secs));
        } else {
            let frac = format!("{:06}", frac);
            out.push_str(&format!("T{}{}.{}S", sign, secs, frac.trim_end_matches('0')));
        }
    }
    out
}

/// PostgreSQL hex output form: `\x` followed by two digits per byte.
fn bytea_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("\\x");
    for b in bytes {
        out.push_str(&format!("{:02x}", b));
    }
    out
}
