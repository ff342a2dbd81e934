//! Builds `Table` metadata from the live SQLite schema.

use super::{DbError, DbResult};
use crate::table::Table;
use log::{debug, error};
use rusqlite::Connection;

const FALLBACK_PRIMARY_KEY: &str = "id";

/// Reads column names and declared types of `table_name`.
///
/// The primary key is, in order of preference: `primary_key` when given, the
/// columns SQLite declares as primary key, then `id`.
///
/// # Errors
/// - `DbError::TableNotFound` when the table has no columns (does not exist).
pub fn build_table(
    conn: &Connection,
    table_name: &str,
    primary_key: Option<&str>,
) -> DbResult<Table> {
    let mut stmt =
        conn.prepare("SELECT name, type, pk FROM pragma_table_info(?1) ORDER BY cid")?;
    let columns = stmt
        .query_map([table_name], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    if columns.is_empty() {
        error!(
            "event=table_build module=db status=error table={table_name} error_code=table_not_found"
        );
        return Err(DbError::TableNotFound(table_name.to_string()));
    }

    let mut declared_key: Vec<(i64, &str)> = columns
        .iter()
        .filter(|(_, _, pk)| *pk > 0)
        .map(|(name, _, pk)| (*pk, name.as_str()))
        .collect();
    declared_key.sort_unstable();
    let declared_key = declared_key
        .into_iter()
        .map(|(_, name)| name)
        .collect::<Vec<_>>()
        .join(",");

    let key = match primary_key.map(str::trim) {
        Some(key) if !key.is_empty() => key.to_string(),
        _ if !declared_key.is_empty() => declared_key,
        _ => FALLBACK_PRIMARY_KEY.to_string(),
    };

    let mut table = Table::new(table_name, &key);
    for (name, sql_type, _) in columns {
        table.set_column_type(name, sql_type);
    }
    debug!(
        "event=table_build module=db status=ok table={table_name} primary_key={key} columns={}",
        table.column_names().count()
    );
    Ok(table)
}
