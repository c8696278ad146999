//! Config validation: identifiers, key candidates, path segments, field shape.

use crate::config::FullConfig;
use crate::error::ConfigError;
use regex::Regex;
use std::collections::{HashMap, HashSet};

const OPERATIONS: &[&str] = &["read", "create"];
/// Segments taken by fixed routes under the API prefix.
const RESERVED_SEGMENTS: &[&str] = &["test"];

pub fn validate(config: &FullConfig) -> Result<(), ConfigError> {
    // identifiers are interpolated into SQL text, so only plain names pass
    let ident = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").map_err(|e| ConfigError::Validation(e.to_string()))?;
    let segment = Regex::new(r"^[a-z0-9][a-z0-9_-]*$").map_err(|e| ConfigError::Validation(e.to_string()))?;
    let check = |kind: &'static str, value: &str| {
        if ident.is_match(value) {
            Ok(())
        } else {
            Err(ConfigError::InvalidIdentifier {
                kind,
                value: value.to_string(),
            })
        }
    };

    if config.entities.is_empty() {
        return Err(ConfigError::Validation("at least one entity required".into()));
    }

    let mut path_segments = HashSet::new();
    for e in &config.entities {
        if !segment.is_match(&e.path_segment) || RESERVED_SEGMENTS.contains(&e.path_segment.as_str()) {
            return Err(ConfigError::InvalidIdentifier {
                kind: "path segment",
                value: e.path_segment.clone(),
            });
        }
        if !path_segments.insert(e.path_segment.as_str()) {
            return Err(ConfigError::DuplicatePathSegment(e.path_segment.clone()));
        }
        check("table", &e.table)?;

        if e.key_candidates.is_empty() {
            return Err(ConfigError::NoKeyCandidates(e.path_segment.clone()));
        }
        for k in &e.key_candidates {
            check("key candidate", k)?;
        }
        for op in &e.operations {
            if !OPERATIONS.contains(&op.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "entity '{}': unknown operation '{}'",
                    e.path_segment, op
                )));
            }
        }

        let mut claimed: HashMap<String, usize> = HashMap::new();
        for (i, f) in e.fields.iter().enumerate() {
            if f.synonyms.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "entity '{}': field {} has no synonyms",
                    e.path_segment, i
                )));
            }
            if f.generated.is_none() && f.input_keys.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "entity '{}': field '{}' accepts no input keys",
                    e.path_segment, f.synonyms[0]
                )));
            }
            for s in &f.synonyms {
                check("column", s)?;
                // two fields writing one column has no defined resolution order
                if let Some(&owner) = claimed.get(&s.to_lowercase()) {
                    if owner != i {
                        return Err(ConfigError::OverlappingSynonym {
                            entity: e.path_segment.clone(),
                            synonym: s.clone(),
                        });
                    }
                }
                claimed.insert(s.to_lowercase(), i);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{builtin, AbsentPolicy, EntityConfig, FieldConfig};

    fn field(keys: &[&str], synonyms: &[&str]) -> FieldConfig {
        FieldConfig {
            input_keys: keys.iter().map(|s| s.to_string()).collect(),
            synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
            required: false,
            generated: None,
            when_absent: AbsentPolicy::Omit,
        }
    }

    fn entity(fields: Vec<FieldConfig>) -> EntityConfig {
        EntityConfig {
            path_segment: "categories".into(),
            table: "categories".into(),
            key_candidates: vec!["id".into()],
            operations: vec!["read".into(), "create".into()],
            fields,
        }
    }

    #[test]
    fn builtin_config_is_valid() {
        assert!(validate(&builtin()).is_ok());
    }

    #[test]
    fn rejects_overlapping_synonyms() {
        let cfg = FullConfig {
            entities: vec![entity(vec![field(&["name"], &["name"]), field(&["title"], &["title", "NAME"])])],
        };
        assert!(matches!(validate(&cfg), Err(ConfigError::OverlappingSynonym { .. })));
    }

    #[test]
    fn rejects_sql_in_identifiers() {
        let cfg = FullConfig {
            entities: vec![entity(vec![field(&["name"], &["name; DROP TABLE x"])])],
        };
        assert!(matches!(validate(&cfg), Err(ConfigError::InvalidIdentifier { kind: "column", .. })));
    }

    #[test]
    fn rejects_missing_keys_and_duplicate_paths() {
        let mut e = entity(vec![field(&["name"], &["name"])]);
        e.key_candidates.clear();
        let cfg = FullConfig { entities: vec![e] };
        assert!(matches!(validate(&cfg), Err(ConfigError::NoKeyCandidates(_))));

        let cfg = FullConfig {
            entities: vec![entity(vec![]), entity(vec![])],
        };
        assert!(matches!(validate(&cfg), Err(ConfigError::DuplicatePathSegment(_))));
    }

    #[test]
    fn rejects_reserved_segment() {
        let mut e = entity(vec![]);
        e.path_segment = "test".into();
        assert!(validate(&FullConfig { entities: vec![e] }).is_err());
    }
}
