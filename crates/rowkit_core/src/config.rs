//! Database configuration entries.
//!
//! # Responsibility
//! - Describe one named database setup (connection pragmas, SQL logging).
//! - Stay deserializable so applications can embed it in their own config.
//!
//! # Invariants
//! - A config is immutable once handed to a `ConfigRegistry`; it is shared as
//!   `Arc<Config>` and compared by identity where routing matters.

use serde::{Deserialize, Serialize};

/// Name of the configuration that always becomes the registry default.
pub const MAIN_CONFIG_NAME: &str = "main";

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// One named database setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Registry key. Trimmed on registration.
    pub name: String,
    /// Emits every executed statement as an `event=sql` info line.
    pub show_sql: bool,
    pub dev_mode: bool,
    /// Applied as `PRAGMA foreign_keys` when a connection is opened.
    pub foreign_keys: bool,
    pub busy_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::new(MAIN_CONFIG_NAME)
    }
}

impl Config {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            show_sql: false,
            dev_mode: false,
            foreign_keys: true,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }

    pub fn with_show_sql(mut self, show_sql: bool) -> Self {
        self.show_sql = show_sql;
        self
    }

    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }

    pub fn with_foreign_keys(mut self, foreign_keys: bool) -> Self {
        self.foreign_keys = foreign_keys;
        self
    }

    pub fn with_busy_timeout_ms(mut self, busy_timeout_ms: u64) -> Self {
        self.busy_timeout_ms = busy_timeout_ms;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_main(&self) -> bool {
        self.name == MAIN_CONFIG_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, MAIN_CONFIG_NAME};

    #[test]
    fn default_config_is_main() {
        let config = Config::default();
        assert_eq!(config.name(), MAIN_CONFIG_NAME);
        assert!(config.is_main());
        assert!(config.foreign_keys);
        assert!(!config.show_sql);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"name":"reporting","show_sql":true}"#).unwrap();
        assert_eq!(config.name(), "reporting");
        assert!(config.show_sql);
        assert!(config.foreign_keys);
        assert_eq!(config.busy_timeout_ms, 5_000);
    }
}
