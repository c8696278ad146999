//! Resolved entity model: config validated and flattened for runtime use.

use crate::config::{AbsentPolicy, Generator};
use crate::sql::SqlValue;
use std::collections::HashMap;

impl Generator {
    pub fn generate(self) -> SqlValue {
        match self {
            Generator::Now => SqlValue::TimestampTz(chrono::Utc::now()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueSource {
    Request,
    Server(Generator),
}

#[derive(Clone, Debug, PartialEq)]
pub enum WhenAbsent {
    Omit,
    Null,
    Value(SqlValue),
    Generate(Generator),
}

impl From<&AbsentPolicy> for WhenAbsent {
    fn from(p: &AbsentPolicy) -> Self {
        match p {
            AbsentPolicy::Omit => WhenAbsent::Omit,
            AbsentPolicy::Null => WhenAbsent::Null,
            AbsentPolicy::Default(v) => WhenAbsent::Value(SqlValue::from_json(v)),
            AbsentPolicy::Generate(g) => WhenAbsent::Generate(*g),
        }
    }
}

/// One semantic input field and the columns it may land in.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSpec {
    pub input_keys: Vec<String>,
    pub synonyms: Vec<String>,
    pub required: bool,
    pub source: ValueSource,
    pub when_absent: WhenAbsent,
}

impl FieldSpec {
    pub fn request(input_keys: &[&str], synonyms: &[&str]) -> Self {
        FieldSpec {
            input_keys: input_keys.iter().map(|s| s.to_string()).collect(),
            synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
            required: false,
            source: ValueSource::Request,
            when_absent: WhenAbsent::Omit,
        }
    }

    pub fn server(synonyms: &[&str], generator: Generator) -> Self {
        FieldSpec {
            source: ValueSource::Server(generator),
            ..Self::request(&[], synonyms)
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn when_absent(mut self, policy: WhenAbsent) -> Self {
        self.when_absent = policy;
        self
    }
}

#[derive(Clone, Debug)]
pub struct ResolvedEntity {
    pub path_segment: String,
    pub table_name: String,
    pub key_candidates: Vec<String>,
    pub operations: Vec<String>,
    pub fields: Vec<FieldSpec>,
}

impl ResolvedEntity {
    pub fn allows(&self, operation: &str) -> bool {
        self.operations.iter().any(|o| o == operation)
    }
}

#[derive(Clone, Debug, Default)]
pub struct ResolvedModel {
    pub entity_by_path: HashMap<String, ResolvedEntity>,
}

impl ResolvedModel {
    pub fn entity_by_path(&self, path: &str) -> Option<&ResolvedEntity> {
        self.entity_by_path.get(path)
    }
}
