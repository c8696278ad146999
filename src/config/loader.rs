//! Load entity config from a JSON file or the built-in restaurant defaults, and
//! resolve it into the runtime model.

use crate::config::resolved::{FieldSpec, ResolvedEntity, ResolvedModel, ValueSource, WhenAbsent};
use crate::config::types::*;
use crate::config::validate;
use crate::error::ConfigError;
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;

/// Build resolved model from full config (validates first).
pub fn resolve(config: &FullConfig) -> Result<ResolvedModel, ConfigError> {
    validate(config)?;

    let mut entity_by_path = HashMap::new();
    for e in &config.entities {
        let fields = e
            .fields
            .iter()
            .map(|f| FieldSpec {
                input_keys: f.input_keys.clone(),
                synonyms: f.synonyms.clone(),
                required: f.required,
                source: match f.generated {
                    Some(g) => ValueSource::Server(g),
                    None => ValueSource::Request,
                },
                when_absent: WhenAbsent::from(&f.when_absent),
            })
            .collect();
        entity_by_path.insert(
            e.path_segment.clone(),
            ResolvedEntity {
                path_segment: e.path_segment.clone(),
                table_name: e.table.clone(),
                key_candidates: e.key_candidates.clone(),
                operations: e.operations.clone(),
                fields,
            },
        );
    }
    Ok(ResolvedModel { entity_by_path })
}

/// Read a JSON config file shaped like [`FullConfig`].
pub async fn load_from_path(path: &Path) -> Result<FullConfig, ConfigError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&text).map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))
}

fn field(keys: &[&str], synonyms: &[&str]) -> FieldConfig {
    FieldConfig {
        input_keys: keys.iter().map(|s| s.to_string()).collect(),
        synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
        required: false,
        generated: None,
        when_absent: AbsentPolicy::Omit,
    }
}

fn timestamp(column: &str) -> FieldConfig {
    FieldConfig {
        generated: Some(Generator::Now),
        ..field(&[], &[column])
    }
}

fn strings(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

/// Categories, menu items and orders as the restaurant schema has them, with
/// the naming drift seen in deployed databases.
pub fn builtin() -> FullConfig {
    let categories = EntityConfig {
        path_segment: "categories".into(),
        table: "categories".into(),
        key_candidates: strings(&["category_id", "id", "categoryId"]),
        operations: strings(&["read", "create"]),
        fields: vec![
            FieldConfig {
                required: true,
                ..field(&["category_name", "name"], &["category_name", "name"])
            },
            field(&["description"], &["description"]),
            timestamp("created_at"),
        ],
    };

    let menus = EntityConfig {
        path_segment: "menus".into(),
        table: "menu_items".into(),
        key_candidates: strings(&["id_item", "id", "Iditem"]),
        operations: strings(&["read", "create"]),
        fields: vec![
            FieldConfig {
                required: true,
                ..field(&["item_name", "name"], &["item_name", "name"])
            },
            field(&["description"], &["description"]),
            field(&["price"], &["price"]),
            field(&["image_url"], &["image_url"]),
            field(&["is_available", "available"], &["is_available"]),
            field(&["category_id"], &["category_id"]),
            timestamp("created_at"),
            timestamp("updated_at"),
        ],
    };

    let orders = EntityConfig {
        path_segment: "orders".into(),
        table: "orders".into(),
        key_candidates: strings(&["id"]),
        operations: strings(&["read", "create"]),
        fields: vec![
            FieldConfig {
                when_absent: AbsentPolicy::Null,
                ..field(&["customer_id"], &["customer_id"])
            },
            FieldConfig {
                when_absent: AbsentPolicy::Generate(Generator::Now),
                ..field(&["order_date"], &["order_date"])
            },
            FieldConfig {
                when_absent: AbsentPolicy::Default(json!("pending")),
                ..field(&["status"], &["status"])
            },
            FieldConfig {
                when_absent: AbsentPolicy::Null,
                ..field(&["amount"], &["amount"])
            },
        ],
    };

    FullConfig {
        entities: vec![categories, menus, orders],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_resolves_three_entities() {
        let model = resolve(&builtin()).expect("builtin config resolves");
        let categories = model.entity_by_path("categories").expect("categories");
        assert_eq!(categories.table_name, "categories");
        assert!(categories.fields[0].required);
        assert_eq!(categories.fields[2].source, ValueSource::Server(Generator::Now));

        let menus = model.entity_by_path("menus").expect("menus");
        assert_eq!(menus.table_name, "menu_items");
        assert_eq!(menus.key_candidates[0], "id_item");

        let orders = model.entity_by_path("orders").expect("orders");
        assert_eq!(orders.fields[0].when_absent, WhenAbsent::Null);
        assert_eq!(orders.fields[2].when_absent, WhenAbsent::Value("pending".into()));
        assert!(orders.allows("create"));
        assert!(!orders.allows("delete"));
    }

    #[tokio::test]
    async fn missing_file_is_load_error() {
        let err = load_from_path(Path::new("/nonexistent/entities.json")).await.unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }
}
