//! Raw entity config types as read from JSON (or built in).

use serde::{Deserialize, Serialize};

/// Server-side value producers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Generator {
    /// Current time.
    Now,
}

/// What to bind for a live column whose field was not supplied.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsentPolicy {
    /// Leave the column out of the INSERT (database default applies).
    #[default]
    Omit,
    /// Bind NULL.
    Null,
    /// Bind a fixed value.
    Default(serde_json::Value),
    /// Bind a server-generated value.
    Generate(Generator),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Request keys accepted for this field, first non-empty wins.
    #[serde(default)]
    pub input_keys: Vec<String>,
    /// Column names that may hold the field. Every live one receives the value.
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub required: bool,
    /// When set, request input is ignored and the value is generated.
    #[serde(default)]
    pub generated: Option<Generator>,
    #[serde(default)]
    pub when_absent: AbsentPolicy,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EntityConfig {
    pub path_segment: String,
    pub table: String,
    /// Primary key names tried in priority order against live columns.
    pub key_candidates: Vec<String>,
    #[serde(default = "default_operations")]
    pub operations: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

fn default_operations() -> Vec<String> {
    vec!["read".into(), "create".into()]
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FullConfig {
    pub entities: Vec<EntityConfig>,
}
