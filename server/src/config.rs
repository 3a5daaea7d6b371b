//! Runtime settings, read from the environment once at start-up.

use std::num::ParseIntError;

use thiserror::Error;
use todo_core::{SqliteStore, StoreResult};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DATABASE_PATH: &str = "todos.db";
const DEFAULT_LOG_FILTER: &str = "info";

/// `DATABASE_PATH` value that selects a throwaway in-memory store.
pub const IN_MEMORY: &str = ":memory:";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORT must be a number between 0 and 65535, got `{value}`")]
    InvalidPort {
        value: String,
        #[source]
        source: ParseIntError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub log_filter: String,
}

impl Config {
    /// Reads `HOST`, `PORT`, `DATABASE_PATH` and `RUST_LOG`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` with a caller-supplied variable source. Empty
    /// values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|source| ConfigError::InvalidPort { value, source })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            database_path: get("DATABASE_PATH")
                .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string()),
            log_filter: get("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn open_store(&self) -> StoreResult<SqliteStore> {
        if self.database_path == IN_MEMORY {
            SqliteStore::open_in_memory()
        } else {
            SqliteStore::open(&self.database_path)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
        assert_eq!(config.database_path, "todos.db");
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn explicit_values_win() {
        let config = config_from(&[
            ("HOST", "0.0.0.0"),
            ("PORT", "8080"),
            ("DATABASE_PATH", ":memory:"),
            ("RUST_LOG", "todo_server=debug"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.database_path, IN_MEMORY);
        assert_eq!(config.log_filter, "todo_server=debug");
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = config_from(&[("PORT", " "), ("HOST", "")]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.host, "127.0.0.1");
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = config_from(&[("PORT", "70000")]).unwrap_err();
        assert!(err.to_string().contains("`70000`"));
    }

    #[test]
    fn in_memory_path_opens_a_usable_store() {
        use todo_core::TodoStore;

        let config = config_from(&[("DATABASE_PATH", IN_MEMORY)]).unwrap();
        let store = config.open_store().unwrap();
        assert!(store.list_todos().unwrap().is_empty());
    }
}
