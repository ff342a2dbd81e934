//! Schema-less column bag returned by `db::find` and friends.
//!
//! # Responsibility
//! - Hold column values in stable (sorted) order.
//! - Track which columns changed since load, so updates write only those.
//!
//! # Invariants
//! - Rows loaded from the database start with an empty modify flag.
//! - `set_columns_map` replaces the column map wholesale and leaves the modify
//!   flag as it was.

use rusqlite::types::Value;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// One row of arbitrary columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    columns: BTreeMap<String, Value>,
    modify_flag: BTreeSet<String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one column and marks it modified.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let column = column.into();
        self.modify_flag.insert(column.clone());
        self.columns.insert(column, value.into());
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    pub fn get_str(&self, column: &str) -> Option<&str> {
        match self.columns.get(column) {
            Some(Value::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn get_i64(&self, column: &str) -> Option<i64> {
        match self.columns.get(column) {
            Some(Value::Integer(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn get_f64(&self, column: &str) -> Option<f64> {
        match self.columns.get(column) {
            Some(Value::Real(value)) => Some(*value),
            Some(Value::Integer(value)) => Some(*value as f64),
            _ => None,
        }
    }

    /// Removes one column and its modify flag.
    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.modify_flag.remove(column);
        self.columns.remove(column)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn clear(&mut self) {
        self.columns.clear();
        self.modify_flag.clear();
    }

    pub(crate) fn from_columns(columns: BTreeMap<String, Value>) -> Self {
        Self {
            columns,
            modify_flag: BTreeSet::new(),
        }
    }

    /// Stores a column without marking it modified.
    pub(crate) fn put(&mut self, column: impl Into<String>, value: Value) {
        self.columns.insert(column.into(), value);
    }

    pub(crate) fn columns(&self) -> &BTreeMap<String, Value> {
        &self.columns
    }

    pub(crate) fn modify_flag(&self) -> &BTreeSet<String> {
        &self.modify_flag
    }

    pub(crate) fn set_columns_map(&mut self, columns: BTreeMap<String, Value>) {
        self.columns = columns;
    }

    pub(crate) fn clear_modify_flag(&mut self) {
        self.modify_flag.clear();
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_columns(&self.columns, serializer)
    }
}

/// Serializes a column map with SQLite values mapped onto serde primitives.
pub(crate) fn serialize_columns<S: Serializer>(
    columns: &BTreeMap<String, Value>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(columns.len()))?;
    for (name, value) in columns {
        map.serialize_entry(name, &SqlValue(value))?;
    }
    map.end()
}

struct SqlValue<'a>(&'a Value);

impl Serialize for SqlValue<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Value::Null => serializer.serialize_none(),
            Value::Integer(value) => serializer.serialize_i64(*value),
            Value::Real(value) => serializer.serialize_f64(*value),
            Value::Text(value) => serializer.serialize_str(value),
            Value::Blob(value) => value.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Record;
    use rusqlite::types::Value;
    use std::collections::BTreeMap;

    #[test]
    fn set_marks_modify_flag_and_remove_clears_it() {
        let mut record = Record::new();
        record.set("name", "ada".to_string()).set("age", 36_i64);
        assert_eq!(
            record.modify_flag().iter().collect::<Vec<_>>(),
            ["age", "name"]
        );

        record.remove("age");
        assert_eq!(record.modify_flag().iter().collect::<Vec<_>>(), ["name"]);
        assert_eq!(record.get_i64("age"), None);
        assert_eq!(record.get_str("name"), Some("ada"));
    }

    #[test]
    fn set_columns_map_replaces_without_merging() {
        let mut record = Record::new();
        record.set("old", 1_i64);

        let mut columns = BTreeMap::new();
        columns.insert("fresh".to_string(), Value::Text("x".to_string()));
        record.set_columns_map(columns.clone());

        assert_eq!(record.columns(), &columns);
        assert!(record.get("old").is_none());
        assert!(record.modify_flag().contains("old"));
    }

    #[test]
    fn serializes_values_as_json_primitives() {
        let mut record = Record::new();
        record
            .set("id", 7_i64)
            .set("score", 1.5_f64)
            .set("name", "ada".to_string())
            .set("note", Value::Null)
            .set("raw", vec![1_u8, 2]);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 7,
                "name": "ada",
                "note": null,
                "raw": [1, 2],
                "score": 1.5
            })
        );
    }
}
