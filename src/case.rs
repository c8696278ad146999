//! Case handling for request keys: clients may send camelCase (`categoryName`)
//! for snake_case names (`category_name`), in any letter case.

/// Convert a single identifier from camelCase to snake_case.
/// e.g. "userId" -> "user_id", "createdAt" -> "created_at"
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// True when a request key names `accepted`, ignoring case or via its camelCase spelling.
pub fn key_matches(request_key: &str, accepted: &str) -> bool {
    request_key.eq_ignore_ascii_case(accepted) || to_snake_case(request_key).eq_ignore_ascii_case(accepted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case_conversion() {
        assert_eq!(to_snake_case("categoryName"), "category_name");
        assert_eq!(to_snake_case("imageUrl"), "image_url");
        assert_eq!(to_snake_case("status"), "status");
    }

    #[test]
    fn matches_case_and_camel_variants() {
        assert!(key_matches("category_name", "category_name"));
        assert!(key_matches("CATEGORY_NAME", "category_name"));
        assert!(key_matches("categoryName", "category_name"));
        assert!(!key_matches("name", "category_name"));
    }
}
