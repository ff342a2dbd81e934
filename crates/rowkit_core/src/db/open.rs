//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Apply the pragmas a `Config` asks for before handing the connection out.
//!
//! # Invariants
//! - Returned connections honor `Config::foreign_keys` and
//!   `Config::busy_timeout_ms`.

use super::DbResult;
use crate::config::Config;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens a SQLite database file configured from `config`.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>, config: &Config) -> DbResult<Connection> {
    open_with(config, "file", || Connection::open(path))
}

/// Opens an in-memory SQLite database configured from `config`.
pub fn open_db_in_memory(config: &Config) -> DbResult<Connection> {
    open_with(config, "memory", Connection::open_in_memory)
}

fn open_with(
    config: &Config,
    mode: &str,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!(
        "event=db_open module=db status=start mode={mode} config={}",
        config.name()
    );

    let result = open()
        .map_err(|err| ("db_open_failed", err))
        .and_then(|conn| {
            apply_pragmas(&conn, config)
                .map(|()| conn)
                .map_err(|err| ("db_bootstrap_failed", err))
        });

    match result {
        Ok(conn) => {
            info!(
                "event=db_open module=db status=ok mode={mode} config={} duration_ms={}",
                config.name(),
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err((error_code, err)) => {
            error!(
                "event=db_open module=db status=error mode={mode} config={} duration_ms={} error_code={error_code} error={err}",
                config.name(),
                started_at.elapsed().as_millis()
            );
            Err(err.into())
        }
    }
}

fn apply_pragmas(conn: &Connection, config: &Config) -> rusqlite::Result<()> {
    let foreign_keys = if config.foreign_keys { "ON" } else { "OFF" };
    conn.execute_batch(&format!("PRAGMA foreign_keys = {foreign_keys};"))?;
    conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
    Ok(())
}
