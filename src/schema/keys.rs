//! Primary key discovery from a per-entity list of candidate names.

use crate::schema::{ColumnDescriptor, TableSchema};
use crate::sql::{Record, SqlValue};

/// First candidate (in priority order) that is a live column.
pub fn find_key_column<'s>(schema: &'s TableSchema, candidates: &[String]) -> Option<&'s ColumnDescriptor> {
    candidates.iter().find_map(|c| schema.find(c))
}

/// Key column as reported by the insert's generated-key row: its first column,
/// accepted only when it names a live column of the table.
pub fn generated_key_column<'s>(schema: &'s TableSchema, generated: &Record) -> Option<&'s ColumnDescriptor> {
    generated.first().and_then(|(name, _)| schema.find(name))
}

/// Column and value to refetch a freshly inserted row by. The candidate list
/// always wins; generated-key metadata is only consulted when no candidate is live.
pub fn resolve_created_key(
    schema: &TableSchema,
    candidates: &[String],
    generated: &Record,
) -> Option<(String, SqlValue)> {
    let column = match find_key_column(schema, candidates) {
        Some(c) => c,
        None => {
            let c = generated_key_column(schema, generated)?;
            tracing::debug!(table = %schema.table(), column = %c.name, "no key candidate live, using generated key column");
            c
        }
    };
    let value = generated
        .get(&column.name)
        .or_else(|| generated.first().map(|(_, v)| v))
        .filter(|v| !v.is_null())?
        .clone();
    Some((column.name.clone(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn candidate_priority_beats_column_order() {
        let schema = TableSchema::from_names("categories", &["id", "category_id", "name"]);
        let key = find_key_column(&schema, &names(&["category_id", "id"]));
        assert_eq!(key.map(|c| c.name.as_str()), Some("category_id"));
    }

    #[test]
    fn candidates_match_case_insensitively() {
        let schema = TableSchema::from_names("menu_items", &["IdItem", "item_name"]);
        let key = find_key_column(&schema, &names(&["id_item", "id", "Iditem"]));
        assert_eq!(key.map(|c| c.name.as_str()), Some("IdItem"));
        assert!(find_key_column(&schema, &names(&["id"])).is_none());
    }

    #[test]
    fn created_key_takes_value_from_generated_row() {
        let schema = TableSchema::from_names("categories", &["category_name", "id"]);
        let generated: Record = vec![
            ("category_name".to_string(), SqlValue::from("Soup")),
            ("id".to_string(), SqlValue::Int(9)),
        ]
        .into_iter()
        .collect();
        let key = resolve_created_key(&schema, &names(&["id"]), &generated);
        assert_eq!(key, Some(("id".to_string(), SqlValue::Int(9))));
    }

    #[test]
    fn generated_column_is_fallback_only_when_live() {
        let schema = TableSchema::from_names("orders", &["order_no", "status"]);
        let generated: Record = vec![("order_no".to_string(), SqlValue::Int(4))].into_iter().collect();
        let key = resolve_created_key(&schema, &names(&["id"]), &generated);
        assert_eq!(key, Some(("order_no".to_string(), SqlValue::Int(4))));

        let unknown: Record = vec![("?column?".to_string(), SqlValue::Int(4))].into_iter().collect();
        assert_eq!(resolve_created_key(&schema, &names(&["id"]), &unknown), None);
    }
}
