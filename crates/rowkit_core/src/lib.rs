//! Active-record style data access over SQLite.
//!
//! Models and records map rows onto typed or schema-less values; `db` runs
//! SQL against connections the caller owns; `ConfigRegistry` resolves which
//! `Config` applies. Restricted internals are reachable through
//! `extension::access`.

pub mod config;
pub mod db;
pub mod extension;
pub mod logging;
pub mod model;
pub mod page;
pub mod plugin;
pub mod record;
pub mod registry;
pub mod table;

pub use config::{Config, MAIN_CONFIG_NAME};
pub use db::{DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LogSettings, LoggingError};
pub use model::{Model, ModelClass, ModelType};
pub use page::Page;
pub use plugin::ActiveRecordPlugin;
pub use record::Record;
pub use registry::{ConfigRegistry, RegistryError};
pub use rusqlite::types::Value;
pub use table::Table;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
