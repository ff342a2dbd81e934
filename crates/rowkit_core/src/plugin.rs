//! Startup wiring: one config plus its model-to-table mappings.
//!
//! # Responsibility
//! - Register a config in a `ConfigRegistry`.
//! - Build table metadata from the live schema for every mapped model.
//!
//! # Invariants
//! - `start` registers nothing when any mapped table is missing.

use crate::config::Config;
use crate::db::{build_table, DbResult};
use crate::model::{ModelClass, ModelType};
use crate::registry::ConfigRegistry;
use log::{error, info};
use rusqlite::Connection;
use std::sync::Arc;
use std::time::Instant;

struct TableMapping {
    model: ModelClass,
    table_name: String,
    primary_key: Option<String>,
}

/// Collects mappings for one config and applies them on `start`.
pub struct ActiveRecordPlugin {
    config: Config,
    mappings: Vec<TableMapping>,
}

impl ActiveRecordPlugin {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            mappings: Vec::new(),
        }
    }

    /// Maps `M` onto `table_name`. `primary_key` overrides the key declared in
    /// the schema (`"a,b"` for composite keys).
    pub fn add_mapping<M: ModelType>(
        mut self,
        table_name: impl Into<String>,
        primary_key: Option<&str>,
    ) -> Self {
        self.mappings.push(TableMapping {
            model: ModelClass::of::<M>(),
            table_name: table_name.into(),
            primary_key: primary_key.map(str::to_string),
        });
        self
    }

    /// Builds every mapped table from `conn`, then registers the config,
    /// tables and model mappings.
    pub fn start(self, conn: &Connection, registry: &mut ConfigRegistry) -> DbResult<Arc<Config>> {
        let started_at = Instant::now();
        let config_name = self.config.name.trim().to_string();

        let mut tables = Vec::with_capacity(self.mappings.len());
        for mapping in &self.mappings {
            match build_table(conn, &mapping.table_name, mapping.primary_key.as_deref()) {
                Ok(table) => tables.push((mapping.model, table)),
                Err(err) => {
                    error!(
                        "event=plugin_start module=plugin status=error config={config_name} model={} error={err}",
                        mapping.model.name()
                    );
                    return Err(err);
                }
            }
        }

        let config = registry.add_config(self.config)?;
        for (model, table) in tables {
            registry.add_table(model, table);
            registry.add_model_to_config_mapping(model, Arc::clone(&config));
        }

        info!(
            "event=plugin_start module=plugin status=ok config={} mappings={} duration_ms={}",
            config.name(),
            self.mappings.len(),
            started_at.elapsed().as_millis()
        );
        Ok(config)
    }
}
