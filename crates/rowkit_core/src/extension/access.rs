//! Access to restricted model, record and table internals.
//!
//! # Responsibility
//! - Forward each call to exactly one crate-private operation.
//! - Resolve the default or a named config before delegating to `db`.
//!
//! # Invariants
//! - No argument or result is transformed beyond config resolution.
//! - SQLite failures come back as `DbError::Sqlite` untouched; config
//!   resolution failures as `DbError::Registry`.
//! - Only `set_table_primary_key` and `add_model_to_config_mapping` change
//!   shared state.
//!
//! ```ignore
//! let attrs = access::attrs(&user);
//! ```

use crate::config::Config;
use crate::db::{self, DbResult};
use crate::model::{Model, ModelClass, ModelType};
use crate::page::Page;
use crate::record::Record;
use crate::registry::ConfigRegistry;
use crate::table::Table;
use rusqlite::types::Value;
use rusqlite::Connection;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Attribute map of `model`.
pub fn attrs<M: ModelType>(model: &Model<M>) -> &BTreeMap<String, Value> {
    model.attrs()
}

pub fn model_modify_flag<M: ModelType>(model: &Model<M>) -> &BTreeSet<String> {
    model.modify_flag()
}

pub fn record_modify_flag(record: &Record) -> &BTreeSet<String> {
    record.modify_flag()
}

pub fn table<M: ModelType>(model: &Model<M>) -> &Arc<Table> {
    model.table()
}

pub fn config<M: ModelType>(model: &Model<M>) -> &Arc<Config> {
    model.config()
}

/// Runtime class of `model`.
pub fn model_class<M: ModelType>(model: &Model<M>) -> ModelClass {
    model.class()
}

/// Replaces the column map of `record` wholesale.
pub fn set_columns_map(record: &mut Record, columns: BTreeMap<String, Value>) {
    record.set_columns_map(columns);
}

/// `db::query` with the default config.
pub fn query(
    registry: &ConfigRegistry,
    conn: &Connection,
    sql: &str,
    params: &[Value],
) -> DbResult<Vec<Vec<Value>>> {
    let config = registry.default_config()?;
    db::query(&config, conn, sql, params)
}

/// `db::query` with the config registered as `config_name`.
pub fn query_named(
    registry: &ConfigRegistry,
    config_name: &str,
    conn: &Connection,
    sql: &str,
    params: &[Value],
) -> DbResult<Vec<Vec<Value>>> {
    let config = registry.config(config_name)?;
    db::query(&config, conn, sql, params)
}

pub fn query_with(
    config: &Config,
    conn: &Connection,
    sql: &str,
    params: &[Value],
) -> DbResult<Vec<Vec<Value>>> {
    db::query(config, conn, sql, params)
}

pub fn find(
    registry: &ConfigRegistry,
    conn: &Connection,
    sql: &str,
    params: &[Value],
) -> DbResult<Vec<Record>> {
    let config = registry.default_config()?;
    db::find(&config, conn, sql, params)
}

pub fn find_named(
    registry: &ConfigRegistry,
    config_name: &str,
    conn: &Connection,
    sql: &str,
    params: &[Value],
) -> DbResult<Vec<Record>> {
    let config = registry.config(config_name)?;
    db::find(&config, conn, sql, params)
}

pub fn paginate(
    registry: &ConfigRegistry,
    conn: &Connection,
    page_number: u32,
    page_size: u32,
    select: &str,
    sql_except_select: &str,
    params: &[Value],
) -> DbResult<Page<Record>> {
    let config = registry.default_config()?;
    db::paginate(
        &config,
        conn,
        page_number,
        page_size,
        select,
        sql_except_select,
        params,
    )
}

#[allow(clippy::too_many_arguments)]
pub fn paginate_named(
    registry: &ConfigRegistry,
    config_name: &str,
    conn: &Connection,
    page_number: u32,
    page_size: u32,
    select: &str,
    sql_except_select: &str,
    params: &[Value],
) -> DbResult<Page<Record>> {
    let config = registry.config(config_name)?;
    db::paginate(
        &config,
        conn,
        page_number,
        page_size,
        select,
        sql_except_select,
        params,
    )
}

pub fn update(
    registry: &ConfigRegistry,
    conn: &Connection,
    sql: &str,
    params: &[Value],
) -> DbResult<usize> {
    let config = registry.default_config()?;
    db::update(&config, conn, sql, params)
}

pub fn update_named(
    registry: &ConfigRegistry,
    config_name: &str,
    conn: &Connection,
    sql: &str,
    params: &[Value],
) -> DbResult<usize> {
    let config = registry.config(config_name)?;
    db::update(&config, conn, sql, params)
}

/// Replaces the primary key of `table` (`"a,b"` for composite keys).
pub fn set_table_primary_key(table: &mut Table, primary_key: &str) {
    table.set_primary_key(primary_key);
}

pub fn add_model_to_config_mapping(
    registry: &mut ConfigRegistry,
    model: ModelClass,
    config: Arc<Config>,
) {
    registry.add_model_to_config_mapping(model, config);
}
