//! Process settings from the environment (`.env` is loaded by the binary).

use crate::error::ConfigError;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: String,
    pub max_connections: u32,
    /// JSON entity config replacing the built-in entities.
    pub entity_config: Option<PathBuf>,
    /// `None` allows any origin.
    pub cors_origins: Option<Vec<String>>,
    pub body_limit_bytes: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let parse_num = |key: &str, default: usize| -> Result<usize, ConfigError> {
            match get(key) {
                Some(v) => v
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::Load(format!("{} must be a positive integer, got '{}'", key, v))),
                None => Ok(default),
            }
        };

        let cors_origins = match get("CORS_ORIGINS") {
            None => None,
            Some(v) if v.trim() == "*" => None,
            Some(v) => Some(
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            ),
        };

        Ok(Settings {
            database_url: get("DATABASE_URL").unwrap_or_else(|| "postgres://localhost/restaurant".into()),
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".into()),
            max_connections: parse_num("DB_MAX_CONNECTIONS", 5)? as u32,
            entity_config: get("ENTITY_CONFIG").filter(|s| !s.trim().is_empty()).map(PathBuf::from),
            cors_origins,
            body_limit_bytes: parse_num("BODY_LIMIT_BYTES", 1024 * 1024)?,
        })
    }
}
