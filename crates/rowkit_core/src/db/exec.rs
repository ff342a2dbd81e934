//! Statement execution against a caller-supplied connection.
//!
//! Every function takes the resolved `Config` explicitly. Resolution of the
//! default or a named config happens in callers (`extension::access`, models).

use super::{sql, DbError, DbResult};
use crate::config::Config;
use crate::page::Page;
use crate::record::Record;
use crate::table::split_primary_key;
use log::info;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::collections::{BTreeMap, BTreeSet};

/// Runs a query and returns each row as its column values in select order.
pub fn query(
    config: &Config,
    conn: &Connection,
    sql: &str,
    params: &[Value],
) -> DbResult<Vec<Vec<Value>>> {
    log_sql(config, sql);
    let mut stmt = conn.prepare(sql)?;
    let column_count = stmt.column_count();
    let mut rows = stmt.query(params_from_iter(params.iter()))?;

    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(column_count);
        for index in 0..column_count {
            values.push(row.get::<_, Value>(index)?);
        }
        result.push(values);
    }
    Ok(result)
}

/// Runs a query and maps every row to a `Record`.
pub fn find(
    config: &Config,
    conn: &Connection,
    sql: &str,
    params: &[Value],
) -> DbResult<Vec<Record>> {
    let rows = fetch_maps(config, conn, sql, params)?;
    Ok(rows.into_iter().map(Record::from_columns).collect())
}

/// First row of `find`, if any.
pub fn find_first(
    config: &Config,
    conn: &Connection,
    sql: &str,
    params: &[Value],
) -> DbResult<Option<Record>> {
    Ok(find(config, conn, sql, params)?.into_iter().next())
}

/// Paginates `select sql_except_select`.
///
/// `sql_except_select` starts at `FROM`. Page numbers are 1-based.
///
/// # Errors
/// - `DbError::InvalidPagination` when `page_number` or `page_size` is 0.
pub fn paginate(
    config: &Config,
    conn: &Connection,
    page_number: u32,
    page_size: u32,
    select: &str,
    sql_except_select: &str,
    params: &[Value],
) -> DbResult<Page<Record>> {
    let page = paginate_maps(
        config,
        conn,
        page_number,
        page_size,
        select,
        sql_except_select,
        params,
    )?;
    Ok(page.map(Record::from_columns))
}

/// Executes an INSERT/UPDATE/DELETE (or DDL) and returns affected rows.
pub fn update(config: &Config, conn: &Connection, sql: &str, params: &[Value]) -> DbResult<usize> {
    log_sql(config, sql);
    Ok(conn.execute(sql, params_from_iter(params.iter()))?)
}

/// Inserts every column of `record` into `table_name`.
///
/// A single-column primary key missing from the record is filled from
/// `last_insert_rowid`. The modify flag is cleared on success.
pub fn save_record(
    config: &Config,
    conn: &Connection,
    table_name: &str,
    primary_key: &str,
    record: &mut Record,
) -> DbResult<bool> {
    let keys = split_primary_key(primary_key);
    let changed = insert_columns(config, conn, table_name, record.columns())?;
    if let [key] = keys.as_slice() {
        if record.get(key).is_none() {
            record.put(key.as_str(), Value::Integer(conn.last_insert_rowid()));
        }
    }
    record.clear_modify_flag();
    Ok(changed >= 1)
}

/// Writes the modified non-key columns of `record`.
///
/// Returns `Ok(false)` without touching the database when nothing is flagged.
pub fn update_record(
    config: &Config,
    conn: &Connection,
    table_name: &str,
    primary_key: &str,
    record: &mut Record,
) -> DbResult<bool> {
    let keys = split_primary_key(primary_key);
    let changed = update_columns(
        config,
        conn,
        table_name,
        &keys,
        record.columns(),
        record.modify_flag(),
    )?;
    match changed {
        Some(changed) if changed >= 1 => {
            record.clear_modify_flag();
            Ok(true)
        }
        _ => Ok(false),
    }
}

pub fn delete_record_by_id(
    config: &Config,
    conn: &Connection,
    table_name: &str,
    primary_key: &str,
    ids: &[Value],
) -> DbResult<bool> {
    let keys = checked_keys(primary_key, ids)?;
    let changed = update(config, conn, &sql::delete_by_id(table_name, &keys), ids)?;
    Ok(changed >= 1)
}

pub fn find_record_by_id(
    config: &Config,
    conn: &Connection,
    table_name: &str,
    primary_key: &str,
    ids: &[Value],
) -> DbResult<Option<Record>> {
    let keys = checked_keys(primary_key, ids)?;
    find_first(config, conn, &sql::find_by_id(table_name, &keys), ids)
}

pub(crate) fn fetch_maps(
    config: &Config,
    conn: &Connection,
    sql: &str,
    params: &[Value],
) -> DbResult<Vec<BTreeMap<String, Value>>> {
    log_sql(config, sql);
    let mut stmt = conn.prepare(sql)?;
    let names: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    let mut rows = stmt.query(params_from_iter(params.iter()))?;

    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        let mut columns = BTreeMap::new();
        for (index, name) in names.iter().enumerate() {
            columns.insert(name.clone(), row.get::<_, Value>(index)?);
        }
        result.push(columns);
    }
    Ok(result)
}

pub(crate) fn paginate_maps(
    config: &Config,
    conn: &Connection,
    page_number: u32,
    page_size: u32,
    select: &str,
    sql_except_select: &str,
    params: &[Value],
) -> DbResult<Page<BTreeMap<String, Value>>> {
    if page_number < 1 || page_size < 1 {
        return Err(DbError::InvalidPagination {
            page_number,
            page_size,
        });
    }

    let total_sql = sql::total_row(select, sql_except_select);
    log_sql(config, &total_sql);
    let count: i64 = conn.query_row(&total_sql, params_from_iter(params.iter()), |row| {
        row.get(0)
    })?;
    let total_row = u64::try_from(count).unwrap_or(0);
    let total_page = total_row.div_ceil(u64::from(page_size));

    if total_row == 0 || u64::from(page_number) > total_page {
        return Ok(Page::new(
            Vec::new(),
            page_number,
            page_size,
            total_page,
            total_row,
        ));
    }

    let page_sql = sql::page(select, sql_except_select, page_number, page_size);
    let list = fetch_maps(config, conn, &page_sql, params)?;
    Ok(Page::new(list, page_number, page_size, total_page, total_row))
}

pub(crate) fn insert_columns(
    config: &Config,
    conn: &Connection,
    table_name: &str,
    columns: &BTreeMap<String, Value>,
) -> DbResult<usize> {
    if columns.is_empty() {
        return Err(DbError::InvalidArgument(format!(
            "nothing to insert into `{table_name}`"
        )));
    }
    let names: Vec<&str> = columns.keys().map(String::as_str).collect();
    let values: Vec<Value> = columns.values().cloned().collect();
    update(config, conn, &sql::insert(table_name, &names), &values)
}

/// Returns `None` when no non-key column is flagged.
pub(crate) fn update_columns(
    config: &Config,
    conn: &Connection,
    table_name: &str,
    keys: &[String],
    columns: &BTreeMap<String, Value>,
    modify_flag: &BTreeSet<String>,
) -> DbResult<Option<usize>> {
    let key_values = primary_key_values(table_name, keys, columns)?;

    let mut set_columns = Vec::new();
    let mut values = Vec::new();
    for name in modify_flag {
        if keys.contains(name) {
            continue;
        }
        if let Some(value) = columns.get(name) {
            set_columns.push(name.as_str());
            values.push(value.clone());
        }
    }
    if set_columns.is_empty() {
        return Ok(None);
    }

    values.extend(key_values);
    let changed = update(
        config,
        conn,
        &sql::update_by_id(table_name, &set_columns, keys),
        &values,
    )?;
    Ok(Some(changed))
}

pub(crate) fn primary_key_values(
    table_name: &str,
    keys: &[String],
    columns: &BTreeMap<String, Value>,
) -> DbResult<Vec<Value>> {
    if keys.is_empty() {
        return Err(DbError::InvalidArgument(format!(
            "table `{table_name}` has no primary key"
        )));
    }
    keys.iter()
        .map(|key| match columns.get(key) {
            Some(Value::Null) | None => Err(DbError::MissingPrimaryKey {
                table: table_name.to_string(),
                column: key.clone(),
            }),
            Some(value) => Ok(value.clone()),
        })
        .collect()
}

fn checked_keys(primary_key: &str, ids: &[Value]) -> DbResult<Vec<String>> {
    let keys = split_primary_key(primary_key);
    if keys.is_empty() || keys.len() != ids.len() {
        return Err(DbError::InvalidArgument(format!(
            "primary key `{primary_key}` expects {} id value(s), got {}",
            keys.len(),
            ids.len()
        )));
    }
    Ok(keys)
}

fn log_sql(config: &Config, sql: &str) {
    if config.show_sql {
        info!(
            "event=sql module=db config={} sql={}",
            config.name(),
            sql.replace(['\n', '\r'], " ")
        );
    }
}
