//! Typed active-record models.
//!
//! # Responsibility
//! - Bind a user type `M` to table metadata and a config resolved through a
//!   `ConfigRegistry`.
//! - Track attribute changes so `update` writes only modified columns.
//!
//! # Invariants
//! - `set` only accepts attributes the mapped table declares; `put` does not
//!   check.
//! - Models loaded from the database start with an empty modify flag.
//! - A model keeps the `Table` and `Config` snapshot it was created with.

use crate::config::Config;
use crate::db::{self, sql, DbError, DbResult};
use crate::page::Page;
use crate::record::serialize_columns;
use crate::registry::{ConfigRegistry, RegistryError};
use crate::table::Table;
use rusqlite::types::Value;
use rusqlite::Connection;
use serde::{Serialize, Serializer};
use std::any::TypeId;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::sync::Arc;

/// Marker for types that can be mapped onto a table.
///
/// ```ignore
/// struct User;
/// impl ModelType for User {}
/// ```
pub trait ModelType: 'static {}

/// Runtime identity of a model type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelClass {
    type_id: TypeId,
    name: &'static str,
}

impl ModelClass {
    pub fn of<M: ModelType>() -> Self {
        Self {
            type_id: TypeId::of::<M>(),
            name: std::any::type_name::<M>(),
        }
    }

    /// Fully qualified type name, for diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// One row of a mapped table, typed by `M`.
pub struct Model<M: ModelType> {
    attrs: BTreeMap<String, Value>,
    modify_flag: BTreeSet<String>,
    table: Arc<Table>,
    config: Arc<Config>,
    _marker: PhantomData<fn() -> M>,
}

impl<M: ModelType> Model<M> {
    /// Creates an empty model bound to the table and config registered for `M`.
    ///
    /// # Errors
    /// - `RegistryError::TableNotMapped` when no table is registered for `M`.
    /// - `RegistryError::NoDefaultConfig` when `M` has no mapping and no
    ///   default config exists.
    pub fn new(registry: &ConfigRegistry) -> Result<Self, RegistryError> {
        let class = ModelClass::of::<M>();
        let table = registry
            .table(class)
            .ok_or(RegistryError::TableNotMapped(class.name()))?;
        let config = registry.resolve_model_config(class)?;
        Ok(Self::with_parts(table, config, BTreeMap::new()))
    }

    fn with_parts(table: Arc<Table>, config: Arc<Config>, attrs: BTreeMap<String, Value>) -> Self {
        Self {
            attrs,
            modify_flag: BTreeSet::new(),
            table,
            config,
            _marker: PhantomData,
        }
    }

    /// Sets a declared attribute and marks it modified.
    pub fn set(&mut self, attr: &str, value: impl Into<Value>) -> DbResult<&mut Self> {
        if !self.table.has_column(attr) {
            return Err(DbError::UnknownAttribute {
                table: self.table.name().to_string(),
                attr: attr.to_string(),
            });
        }
        self.attrs.insert(attr.to_string(), value.into());
        self.modify_flag.insert(attr.to_string());
        Ok(self)
    }

    /// Stores any attribute (computed columns, joins) without marking it.
    pub fn put(&mut self, attr: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.attrs.insert(attr.into(), value.into());
        self
    }

    pub fn get(&self, attr: &str) -> Option<&Value> {
        self.attrs.get(attr)
    }

    pub fn get_str(&self, attr: &str) -> Option<&str> {
        match self.attrs.get(attr) {
            Some(Value::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn get_i64(&self, attr: &str) -> Option<i64> {
        match self.attrs.get(attr) {
            Some(Value::Integer(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn remove(&mut self, attr: &str) -> Option<Value> {
        self.modify_flag.remove(attr);
        self.attrs.remove(attr)
    }

    pub fn attr_names(&self) -> impl Iterator<Item = &str> {
        self.attrs.keys().map(String::as_str)
    }

    /// Inserts the attributes the table declares; computed or joined
    /// attributes stay on the model only. Fills a missing single-column key
    /// from `last_insert_rowid`.
    pub fn save(&mut self, conn: &Connection) -> DbResult<bool> {
        let columns: BTreeMap<String, Value> = self
            .attrs
            .iter()
            .filter(|(name, _)| self.table.has_column(name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        let changed = db::insert_columns(&self.config, conn, self.table.name(), &columns)?;
        if let [key] = self.table.primary_key() {
            if !self.attrs.contains_key(key) {
                self.attrs
                    .insert(key.clone(), Value::Integer(conn.last_insert_rowid()));
            }
        }
        self.modify_flag.clear();
        Ok(changed >= 1)
    }

    /// Writes modified non-key attributes.
    ///
    /// Returns `Ok(false)` when nothing is modified.
    pub fn update(&mut self, conn: &Connection) -> DbResult<bool> {
        let changed = db::update_columns(
            &self.config,
            conn,
            self.table.name(),
            self.table.primary_key(),
            &self.attrs,
            &self.modify_flag,
        )?;
        match changed {
            Some(changed) if changed >= 1 => {
                self.modify_flag.clear();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Deletes the row identified by this model's primary key attributes.
    pub fn delete(&self, conn: &Connection) -> DbResult<bool> {
        let ids = db::primary_key_values(self.table.name(), self.table.primary_key(), &self.attrs)?;
        let sql = sql::delete_by_id(self.table.name(), self.table.primary_key());
        Ok(db::update(&self.config, conn, &sql, &ids)? >= 1)
    }

    /// Loads one row by primary key into a new model sharing this one's
    /// table and config.
    pub fn find_by_id(&self, conn: &Connection, ids: &[Value]) -> DbResult<Option<Self>> {
        let keys = self.table.primary_key();
        if keys.is_empty() || keys.len() != ids.len() {
            return Err(DbError::InvalidArgument(format!(
                "table `{}` expects {} id value(s), got {}",
                self.table.name(),
                keys.len(),
                ids.len()
            )));
        }
        let sql = sql::find_by_id(self.table.name(), keys);
        self.find_first(conn, &sql, ids)
    }

    pub fn find(&self, conn: &Connection, sql: &str, params: &[Value]) -> DbResult<Vec<Self>> {
        let rows = db::fetch_maps(&self.config, conn, sql, params)?;
        Ok(rows.into_iter().map(|attrs| self.sibling(attrs)).collect())
    }

    pub fn find_first(&self, conn: &Connection, sql: &str, params: &[Value]) -> DbResult<Option<Self>> {
        Ok(self.find(conn, sql, params)?.into_iter().next())
    }

    pub fn paginate(
        &self,
        conn: &Connection,
        page_number: u32,
        page_size: u32,
        select: &str,
        sql_except_select: &str,
        params: &[Value],
    ) -> DbResult<Page<Self>> {
        let page = db::paginate_maps(
            &self.config,
            conn,
            page_number,
            page_size,
            select,
            sql_except_select,
            params,
        )?;
        Ok(page.map(|attrs| self.sibling(attrs)))
    }

    fn sibling(&self, attrs: BTreeMap<String, Value>) -> Self {
        Self::with_parts(Arc::clone(&self.table), Arc::clone(&self.config), attrs)
    }

    pub(crate) fn attrs(&self) -> &BTreeMap<String, Value> {
        &self.attrs
    }

    pub(crate) fn modify_flag(&self) -> &BTreeSet<String> {
        &self.modify_flag
    }

    pub(crate) fn table(&self) -> &Arc<Table> {
        &self.table
    }

    pub(crate) fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub(crate) fn class(&self) -> ModelClass {
        ModelClass::of::<M>()
    }
}

impl<M: ModelType> Clone for Model<M> {
    fn clone(&self) -> Self {
        Self {
            attrs: self.attrs.clone(),
            modify_flag: self.modify_flag.clone(),
            table: Arc::clone(&self.table),
            config: Arc::clone(&self.config),
            _marker: PhantomData,
        }
    }
}

impl<M: ModelType> Debug for Model<M> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("class", &std::any::type_name::<M>())
            .field("table", &self.table.name())
            .field("attrs", &self.attrs)
            .finish()
    }
}

impl<M: ModelType> Serialize for Model<M> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_columns(&self.attrs, serializer)
    }
}
