//! SQLite statement builders.
//!
//! Placeholders are always positional `?`; callers bind values in the same
//! order the builder lists columns.

use once_cell::sync::Lazy;
use regex::Regex;

static ORDER_BY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\border\s+by\s+[^,\s]+(\s+asc|\s+desc)?(\s*,\s*[^,\s]+(\s+asc|\s+desc)?)*")
        .expect("ORDER BY pattern is valid")
});

static GROUP_BY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bgroup\s+by\b")
        .expect("GROUP BY pattern is valid")
});

pub(crate) fn insert(table: &str, columns: &[&str]) -> String {
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!(
        "INSERT INTO {table}({}) VALUES({placeholders})",
        columns.join(", ")
    )
}

pub(crate) fn update_by_id(table: &str, set_columns: &[&str], primary_key: &[String]) -> String {
    let assignments = set_columns
        .iter()
        .map(|column| format!("{column} = ?"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "UPDATE {table} SET {assignments} WHERE {}",
        key_condition(primary_key)
    )
}

pub(crate) fn delete_by_id(table: &str, primary_key: &[String]) -> String {
    format!("DELETE FROM {table} WHERE {}", key_condition(primary_key))
}

pub(crate) fn find_by_id(table: &str, primary_key: &[String]) -> String {
    format!("SELECT * FROM {table} WHERE {}", key_condition(primary_key))
}

/// Count statement for a paginated query.
///
/// Grouped queries count their groups through a sub-select.
pub(crate) fn total_row(select: &str, sql_except_select: &str) -> String {
    let without_order = ORDER_BY.replace_all(sql_except_select, "");
    let without_order = without_order.trim();
    if GROUP_BY.is_match(without_order) {
        format!("SELECT count(*) FROM ({select} {without_order}) AS paginate_total")
    } else {
        format!("SELECT count(*) {without_order}")
    }
}

pub(crate) fn page(select: &str, sql_except_select: &str, page_number: u32, page_size: u32) -> String {
    let offset = u64::from(page_size) * u64::from(page_number - 1);
    format!("{select} {sql_except_select} LIMIT {offset}, {page_size}")
}

fn key_condition(primary_key: &[String]) -> String {
    primary_key
        .iter()
        .map(|column| format!("{column} = ?"))
        .collect::<Vec<_>>()
        .join(" AND ")
}
