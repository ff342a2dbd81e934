//! Explicit configuration resolver.
//!
//! # Responsibility
//! - Own named `Config` entries and the default one.
//! - Map model types to their config and table metadata.
//!
//! # Invariants
//! - A config named `main` is always the default; otherwise the first
//!   registered config is.
//! - Config names are unique after trimming.
//! - Lookups hand back the exact `Arc` that was registered.

use crate::config::Config;
use crate::model::ModelClass;
use crate::table::Table;
use log::info;
use std::collections::{BTreeMap, HashMap};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Config registration and lookup errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    InvalidConfigName(String),
    DuplicateConfigName(String),
    ConfigNotFound(String),
    NoDefaultConfig,
    TableNotMapped(&'static str),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidConfigName(value) => write!(f, "config name is invalid: `{value}`"),
            Self::DuplicateConfigName(value) => {
                write!(f, "config name already registered: {value}")
            }
            Self::ConfigNotFound(value) => write!(f, "config not found: {value}"),
            Self::NoDefaultConfig => write!(f, "no default config registered"),
            Self::TableNotMapped(model) => write!(f, "no table mapped for model {model}"),
        }
    }
}

impl Error for RegistryError {}

/// Registry of configs, model mappings and table metadata.
///
/// Build one per application (or per test) and pass it to whatever needs to
/// resolve configs.
#[derive(Debug, Default)]
pub struct ConfigRegistry {
    configs: BTreeMap<String, Arc<Config>>,
    default_name: Option<String>,
    model_configs: HashMap<ModelClass, Arc<Config>>,
    tables: HashMap<ModelClass, Arc<Table>>,
}

impl ConfigRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one config and returns the shared handle.
    pub fn add_config(&mut self, mut config: Config) -> Result<Arc<Config>, RegistryError> {
        let name = config.name.trim().to_string();
        if !is_valid_config_name(&name) {
            return Err(RegistryError::InvalidConfigName(name));
        }
        if self.configs.contains_key(&name) {
            return Err(RegistryError::DuplicateConfigName(name));
        }

        config.name = name.clone();
        let config = Arc::new(config);
        if config.is_main() || self.default_name.is_none() {
            self.default_name = Some(name.clone());
        }
        info!(
            "event=config_add module=registry status=ok config={} default={}",
            name,
            self.default_name.as_deref() == Some(name.as_str())
        );
        self.configs.insert(name, Arc::clone(&config));
        Ok(config)
    }

    /// Removes a config, its default status and every model mapped to it.
    pub fn remove_config(&mut self, name: &str) -> Option<Arc<Config>> {
        let name = name.trim();
        let removed = self.configs.remove(name)?;
        if self.default_name.as_deref() == Some(name) {
            self.default_name = None;
        }
        self.model_configs
            .retain(|_, config| !Arc::ptr_eq(config, &removed));
        Some(removed)
    }

    pub fn config(&self, name: &str) -> Result<Arc<Config>, RegistryError> {
        let name = name.trim();
        self.configs
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::ConfigNotFound(name.to_string()))
    }

    pub fn default_config(&self) -> Result<Arc<Config>, RegistryError> {
        let name = self
            .default_name
            .as_deref()
            .ok_or(RegistryError::NoDefaultConfig)?;
        self.config(name)
    }

    /// Returns sorted config names.
    pub fn config_names(&self) -> Vec<String> {
        self.configs.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Routes one model type to `config`, replacing any previous mapping.
    pub fn add_model_to_config_mapping(&mut self, model: ModelClass, config: Arc<Config>) {
        self.model_configs.insert(model, config);
    }

    pub fn config_for_model(&self, model: ModelClass) -> Option<Arc<Config>> {
        self.model_configs.get(&model).cloned()
    }

    /// Mapped config for `model`, else the default config.
    pub fn resolve_model_config(&self, model: ModelClass) -> Result<Arc<Config>, RegistryError> {
        match self.config_for_model(model) {
            Some(config) => Ok(config),
            None => self.default_config(),
        }
    }

    pub fn add_table(&mut self, model: ModelClass, table: Table) {
        self.tables.insert(model, Arc::new(table));
    }

    pub fn table(&self, model: ModelClass) -> Option<Arc<Table>> {
        self.tables.get(&model).cloned()
    }

    /// Mutable table metadata for `model`.
    ///
    /// Models created earlier keep the snapshot they were built with.
    pub fn table_mut(&mut self, model: ModelClass) -> Option<&mut Table> {
        self.tables.get_mut(&model).map(Arc::make_mut)
    }
}

fn is_valid_config_name(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
