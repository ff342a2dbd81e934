//! SQLite execution helpers and connection bootstrap.
//!
//! # Responsibility
//! - Open SQLite connections configured from a `Config`.
//! - Execute raw SQL, record CRUD and pagination against a caller-supplied
//!   connection.
//!
//! # Invariants
//! - Nothing in this module pools, caches or closes connections.
//! - SQLite failures surface as `DbError::Sqlite` with the original error.

use crate::registry::RegistryError;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod exec;
mod open;
pub(crate) mod sql;
mod table_builder;

pub use exec::{
    delete_record_by_id, find, find_first, find_record_by_id, paginate, query, save_record,
    update, update_record,
};
pub(crate) use exec::{
    fetch_maps, insert_columns, paginate_maps, primary_key_values, update_columns,
};
pub use open::{open_db, open_db_in_memory};
pub use table_builder::build_table;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    Registry(RegistryError),
    InvalidPagination {
        page_number: u32,
        page_size: u32,
    },
    UnknownAttribute {
        table: String,
        attr: String,
    },
    MissingPrimaryKey {
        table: String,
        column: String,
    },
    TableNotFound(String),
    InvalidArgument(String),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Registry(err) => write!(f, "{err}"),
            Self::InvalidPagination {
                page_number,
                page_size,
            } => write!(
                f,
                "page number and page size must be at least 1, got page {page_number} size {page_size}"
            ),
            Self::UnknownAttribute { table, attr } => {
                write!(f, "attribute `{attr}` does not exist in table `{table}`")
            }
            Self::MissingPrimaryKey { table, column } => {
                write!(f, "primary key `{column}` of table `{table}` has no value")
            }
            Self::TableNotFound(name) => write!(f, "table not found: {name}"),
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Registry(err) => Some(err),
            Self::InvalidPagination { .. }
            | Self::UnknownAttribute { .. }
            | Self::MissingPrimaryKey { .. }
            | Self::TableNotFound(_)
            | Self::InvalidArgument(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<RegistryError> for DbError {
    fn from(value: RegistryError) -> Self {
        Self::Registry(value)
    }
}
