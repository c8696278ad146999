//! Typed cell value: bound as a PostgreSQL parameter and decoded from result rows.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use serde_json::Value;
use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::{Database, Type};

/// One database cell. Request JSON converts into it, rows decode into it, and
/// responses serialize it back to JSON.
#[derive(Clone, Debug, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Uuid(uuid::Uuid),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    Date(NaiveDate),
    Json(Value),
}

impl SqlValue {
    pub fn from_json(v: &Value) -> Self {
        match v {
            Value::Null => SqlValue::Null,
            Value::Bool(b) => SqlValue::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    SqlValue::Int(i)
                } else if let Some(f) = n.as_f64() {
                    SqlValue::Float(f)
                } else {
                    SqlValue::Text(n.to_string())
                }
            }
            Value::String(s) => SqlValue::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => SqlValue::Json(v.clone()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Null or a whitespace-only string. Both count as "not provided".
    pub fn is_blank(&self) -> bool {
        match self {
            SqlValue::Null => true,
            SqlValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            SqlValue::Null => Value::Null,
            SqlValue::Bool(b) => Value::Bool(*b),
            SqlValue::Int(n) => Value::Number((*n).into()),
            SqlValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            SqlValue::Decimal(d) => d
                .to_string()
                .parse::<serde_json::Number>()
                .map(Value::Number)
                .unwrap_or_else(|_| Value::String(d.to_string())),
            SqlValue::Text(s) => Value::String(s.clone()),
            SqlValue::Uuid(u) => Value::String(u.to_string()),
            SqlValue::Timestamp(t) => Value::String(t.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
            SqlValue::TimestampTz(t) => Value::String(t.to_rfc3339()),
            SqlValue::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
            SqlValue::Json(v) => v.clone(),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl From<i64> for SqlValue {
    fn from(n: i64) -> Self {
        SqlValue::Int(n)
    }
}

impl Serialize for SqlValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'q> Encode<'q, Postgres> for SqlValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        match self {
            SqlValue::Null => <Option<String> as Encode<Postgres>>::encode_by_ref(&None, buf),
            SqlValue::Bool(b) => <bool as Encode<Postgres>>::encode_by_ref(b, buf),
            SqlValue::Int(n) => <i64 as Encode<Postgres>>::encode_by_ref(n, buf),
            SqlValue::Float(f) => <f64 as Encode<Postgres>>::encode_by_ref(f, buf),
            SqlValue::Decimal(d) => <Decimal as Encode<Postgres>>::encode_by_ref(d, buf),
            SqlValue::Text(s) => <String as Encode<Postgres>>::encode_by_ref(s, buf),
            SqlValue::Uuid(u) => <uuid::Uuid as Encode<Postgres>>::encode_by_ref(u, buf),
            SqlValue::Timestamp(t) => <NaiveDateTime as Encode<Postgres>>::encode_by_ref(t, buf),
            SqlValue::TimestampTz(t) => <DateTime<Utc> as Encode<Postgres>>::encode_by_ref(t, buf),
            SqlValue::Date(d) => <NaiveDate as Encode<Postgres>>::encode_by_ref(d, buf),
            SqlValue::Json(v) => <Value as Encode<Postgres>>::encode_by_ref(v, buf),
        }
    }

    fn produces(&self) -> Option<PgTypeInfo> {
        Some(match self {
            // untyped null: the placeholder cast decides the column type
            SqlValue::Null => return None,
            SqlValue::Bool(_) => <bool as Type<Postgres>>::type_info(),
            SqlValue::Int(_) => <i64 as Type<Postgres>>::type_info(),
            SqlValue::Float(_) => <f64 as Type<Postgres>>::type_info(),
            SqlValue::Decimal(_) => <Decimal as Type<Postgres>>::type_info(),
            SqlValue::Text(_) => <String as Type<Postgres>>::type_info(),
            SqlValue::Uuid(_) => <uuid::Uuid as Type<Postgres>>::type_info(),
            SqlValue::Timestamp(_) => <NaiveDateTime as Type<Postgres>>::type_info(),
            SqlValue::TimestampTz(_) => <DateTime<Utc> as Type<Postgres>>::type_info(),
            SqlValue::Date(_) => <NaiveDate as Type<Postgres>>::type_info(),
            SqlValue::Json(_) => <Value as Type<Postgres>>::type_info(),
        })
    }
}

impl Type<Postgres> for SqlValue {
    fn type_info() -> PgTypeInfo {
        <String as Type<Postgres>>::type_info()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_numbers_keep_integer_precision() {
        assert_eq!(SqlValue::from_json(&json!(42)), SqlValue::Int(42));
        assert_eq!(SqlValue::from_json(&json!(12.5)), SqlValue::Float(12.5));
        assert_eq!(SqlValue::from_json(&json!({"a": 1})), SqlValue::Json(json!({"a": 1})));
    }

    #[test]
    fn blank_covers_null_and_whitespace() {
        assert!(SqlValue::Null.is_blank());
        assert!(SqlValue::from("   ").is_blank());
        assert!(!SqlValue::from("Curry").is_blank());
        assert!(!SqlValue::Int(0).is_blank());
    }

    #[test]
    fn serializes_as_plain_json() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(12, 30, 0))
            .map(SqlValue::Timestamp);
        assert_eq!(serde_json::to_value(ts).ok(), Some(json!("2024-03-01T12:30:00")));
        let price = SqlValue::Decimal(Decimal::new(1250, 2));
        assert_eq!(serde_json::to_value(&price).ok(), Some(json!(12.5)));
        assert_eq!(serde_json::to_value(SqlValue::Null).ok(), Some(Value::Null));
    }
}
