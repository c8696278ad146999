//! Maps semantic request fields onto whichever synonym columns the live table has.

use crate::case::key_matches;
use crate::config::{FieldSpec, ValueSource, WhenAbsent};
use crate::error::ValidationError;
use crate::schema::{ColumnDescriptor, TableSchema};
use crate::sql::{Record, SqlValue};
use serde_json::{Map, Value};

/// Column/value pairs ready for a parameterized INSERT. Always co-indexed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResolvedInsert {
    pub columns: Vec<String>,
    pub values: Vec<SqlValue>,
}

impl ResolvedInsert {
    fn push(&mut self, column: &str, value: SqlValue) {
        self.columns.push(column.to_string());
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn value_of(&self, column: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))
            .map(|i| &self.values[i])
    }

    /// The echo returned when the created row cannot be refetched.
    pub fn to_record(&self) -> Record {
        self.columns.iter().cloned().zip(self.values.iter().cloned()).collect()
    }
}

pub struct FieldResolver;

impl FieldResolver {
    /// Match each field against the live schema and pick its value.
    ///
    /// Fields with no live synonym are skipped silently. A field with several
    /// live synonyms writes the same value into each of them. Fields and
    /// synonyms are visited in declaration order.
    pub fn resolve(
        schema: &TableSchema,
        fields: &[FieldSpec],
        input: &Map<String, Value>,
    ) -> Result<ResolvedInsert, ValidationError> {
        let mut out = ResolvedInsert::default();
        for field in fields {
            let live = live_synonyms(schema, field);
            if live.is_empty() {
                continue;
            }
            let value = match field.source {
                ValueSource::Server(generator) => Some(generator.generate()),
                ValueSource::Request => match supplied_value(input, &field.input_keys, field.required) {
                    Some(v) => Some(v),
                    None if field.required => {
                        let name = field
                            .input_keys
                            .first()
                            .or_else(|| field.synonyms.first())
                            .cloned()
                            .unwrap_or_default();
                        return Err(ValidationError::MissingRequiredField(name));
                    }
                    None => match &field.when_absent {
                        WhenAbsent::Omit => None,
                        WhenAbsent::Null => Some(SqlValue::Null),
                        WhenAbsent::Value(v) => Some(v.clone()),
                        WhenAbsent::Generate(generator) => Some(generator.generate()),
                    },
                },
            };
            if let Some(value) = value {
                for col in live {
                    out.push(&col.name, value.clone());
                }
            }
        }
        if out.is_empty() {
            return Err(ValidationError::NoInsertableColumns(schema.table().to_string()));
        }
        Ok(out)
    }
}

/// Live columns for a field's synonyms, in synonym order, each at most once.
fn live_synonyms<'s>(schema: &'s TableSchema, field: &FieldSpec) -> Vec<&'s ColumnDescriptor> {
    let mut live: Vec<&ColumnDescriptor> = Vec::new();
    for s in &field.synonyms {
        if let Some(c) = schema.find(s) {
            if !live.iter().any(|l| std::ptr::eq(*l, c)) {
                live.push(c);
            }
        }
    }
    live
}

/// First accepted key carrying a usable value. Required fields also reject
/// blank strings; optional fields only reject null.
fn supplied_value(input: &Map<String, Value>, accepted: &[String], required: bool) -> Option<SqlValue> {
    for key in accepted {
        let exact = input.get(key).into_iter();
        let loose = input
            .iter()
            .filter(|(k, _)| *k != key && key_matches(k, key))
            .map(|(_, v)| v);
        for v in exact.chain(loose) {
            let value = SqlValue::from_json(v);
            let usable = if required { !value.is_blank() } else { !value.is_null() };
            if usable {
                return Some(value);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Generator;
    use serde_json::json;

    fn input(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => Map::new(),
        }
    }

    fn category_fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::request(&["category_name", "name"], &["category_name", "name"]).required(),
            FieldSpec::request(&["description"], &["description"]),
            FieldSpec::server(&["created_at"], Generator::Now),
        ]
    }

    #[test]
    fn duplicates_value_into_every_live_synonym() {
        let schema = TableSchema::from_names("categories", &["id", "name", "category_name"]);
        let r = FieldResolver::resolve(&schema, &category_fields(), &input(json!({"name": "Curry"}))).unwrap();
        assert_eq!(r.columns, vec!["category_name", "name"]);
        assert_eq!(r.values, vec![SqlValue::from("Curry"), SqlValue::from("Curry")]);
    }

    #[test]
    fn absent_synonyms_are_skipped() {
        let schema = TableSchema::from_names("categories", &["id", "Name"]);
        let r = FieldResolver::resolve(&schema, &category_fields(), &input(json!({"category_name": "Soup"}))).unwrap();
        assert_eq!(r.columns, vec!["Name"]);
    }

    #[test]
    fn required_rejects_missing_and_blank() {
        let schema = TableSchema::from_names("categories", &["id", "category_name"]);
        for body in [json!({}), json!({"category_name": "  ", "name": ""}), json!({"name": null})] {
            let err = FieldResolver::resolve(&schema, &category_fields(), &input(body)).unwrap_err();
            assert_eq!(err, ValidationError::MissingRequiredField("category_name".into()));
        }
    }

    #[test]
    fn first_accepted_key_wins_and_blank_falls_through() {
        let schema = TableSchema::from_names("categories", &["category_name"]);
        let r = FieldResolver::resolve(
            &schema,
            &category_fields(),
            &input(json!({"category_name": "", "name": "Noodles"})),
        )
        .unwrap();
        assert_eq!(r.value_of("category_name"), Some(&SqlValue::from("Noodles")));

        let r = FieldResolver::resolve(
            &schema,
            &category_fields(),
            &input(json!({"category_name": "Rice", "name": "Noodles"})),
        )
        .unwrap();
        assert_eq!(r.value_of("category_name"), Some(&SqlValue::from("Rice")));
    }

    #[test]
    fn accepts_camel_case_and_upper_case_keys() {
        let schema = TableSchema::from_names("categories", &["category_name"]);
        let r = FieldResolver::resolve(&schema, &category_fields(), &input(json!({"categoryName": "Salad"}))).unwrap();
        assert_eq!(r.value_of("category_name"), Some(&SqlValue::from("Salad")));
        let r = FieldResolver::resolve(&schema, &category_fields(), &input(json!({"NAME": "Salad"}))).unwrap();
        assert_eq!(r.value_of("category_name"), Some(&SqlValue::from("Salad")));
    }

    #[test]
    fn required_not_enforced_without_live_synonym() {
        let schema = TableSchema::from_names("categories", &["id", "created_at"]);
        let r = FieldResolver::resolve(&schema, &category_fields(), &input(json!({}))).unwrap();
        assert_eq!(r.columns, vec!["created_at"]);
        assert!(matches!(r.values[0], SqlValue::TimestampTz(_)));
    }

    #[test]
    fn server_generated_ignores_input() {
        let schema = TableSchema::from_names("categories", &["category_name", "created_at"]);
        let r = FieldResolver::resolve(
            &schema,
            &category_fields(),
            &input(json!({"name": "Tea", "created_at": "1999-01-01"})),
        )
        .unwrap();
        assert!(matches!(r.value_of("created_at"), Some(SqlValue::TimestampTz(_))));
    }

    #[test]
    fn absent_policies() {
        let fields = vec![
            FieldSpec::request(&["customer_id"], &["customer_id"]).when_absent(WhenAbsent::Null),
            FieldSpec::request(&["status"], &["status"]).when_absent(WhenAbsent::Value("pending".into())),
            FieldSpec::request(&["note"], &["note"]),
            FieldSpec::request(&["order_date"], &["order_date"]).when_absent(WhenAbsent::Generate(Generator::Now)),
        ];
        let schema = TableSchema::from_names("orders", &["id", "customer_id", "status", "note", "order_date"]);
        let r = FieldResolver::resolve(&schema, &fields, &input(json!({}))).unwrap();
        assert_eq!(r.columns, vec!["customer_id", "status", "order_date"]);
        assert_eq!(r.values[0], SqlValue::Null);
        assert_eq!(r.values[1], SqlValue::from("pending"));

        let r = FieldResolver::resolve(&schema, &fields, &input(json!({"status": "paid", "note": ""}))).unwrap();
        assert_eq!(r.value_of("status"), Some(&SqlValue::from("paid")));
        assert_eq!(r.value_of("note"), Some(&SqlValue::from("")));
    }

    #[test]
    fn nothing_insertable_is_error() {
        let schema = TableSchema::from_names("categories", &["id"]);
        let err = FieldResolver::resolve(&schema, &category_fields(), &input(json!({"name": "x"}))).unwrap_err();
        assert_eq!(err, ValidationError::NoInsertableColumns("categories".into()));
    }

    #[test]
    fn echo_record_keeps_insert_order() {
        let schema = TableSchema::from_names("categories", &["name", "category_name"]);
        let r = FieldResolver::resolve(&schema, &category_fields(), &input(json!({"name": "Curry"}))).unwrap();
        let echo = r.to_record();
        assert_eq!(echo.columns().collect::<Vec<_>>(), vec!["category_name", "name"]);
        assert_eq!(r.len(), echo.len());
    }
}
