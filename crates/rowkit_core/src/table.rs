//! Table metadata shared by models mapped onto one database table.
//!
//! # Invariants
//! - `primary_key` keeps declaration order; composite keys are written `"a,b"`.
//! - Column names are stored exactly as SQLite reports them.

use std::collections::BTreeMap;

/// Shape of one mapped table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: String,
    primary_key: Vec<String>,
    column_types: BTreeMap<String, String>,
}

impl Table {
    /// Creates table metadata with no known columns.
    pub fn new(name: impl Into<String>, primary_key: &str) -> Self {
        Self {
            name: name.into(),
            primary_key: split_primary_key(primary_key),
            column_types: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn primary_key(&self) -> &[String] {
        &self.primary_key
    }

    pub fn is_primary_key(&self, column: &str) -> bool {
        self.primary_key.iter().any(|key| key == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_types.contains_key(column)
    }

    /// Declared SQL type, empty when the column was declared without one.
    pub fn column_type(&self, column: &str) -> Option<&str> {
        self.column_types.get(column).map(String::as_str)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.column_types.keys().map(String::as_str)
    }

    pub(crate) fn set_primary_key(&mut self, primary_key: &str) {
        self.primary_key = split_primary_key(primary_key);
    }

    pub(crate) fn set_column_type(&mut self, column: impl Into<String>, sql_type: impl Into<String>) {
        self.column_types.insert(column.into(), sql_type.into());
    }
}

pub(crate) fn split_primary_key(primary_key: &str) -> Vec<String> {
    primary_key
        .split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::Table;

    #[test]
    fn composite_primary_key_is_split_and_trimmed() {
        let table = Table::new("user_role", " user_id , role_id ,");
        assert_eq!(table.primary_key(), ["user_id", "role_id"]);
        assert!(table.is_primary_key("role_id"));
        assert!(!table.is_primary_key("name"));
    }

    #[test]
    fn set_primary_key_replaces_previous_key() {
        let mut table = Table::new("user", "id");
        table.set_primary_key("uuid");
        assert_eq!(table.primary_key(), ["uuid"]);
    }

    #[test]
    fn column_types_are_tracked() {
        let mut table = Table::new("user", "id");
        table.set_column_type("id", "INTEGER");
        table.set_column_type("note", "");
        assert!(table.has_column("id"));
        assert_eq!(table.column_type("note"), Some(""));
        assert_eq!(table.column_names().collect::<Vec<_>>(), ["id", "note"]);
    }
}
