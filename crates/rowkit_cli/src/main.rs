//! CLI entry point.
//!
//! # Responsibility
//! - Run one query against a SQLite file and print each row as a JSON line.
//! - Keep output deterministic for quick local checks.

use clap::Parser;
use rowkit_core::db::{find, open_db};
use rowkit_core::{core_version, Config, Value};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "rowkit_cli", version = core_version(), about = "Run a query and print rows as JSON lines")]
struct Cli {
    /// SQLite database file
    db_path: String,
    /// Statement to run
    sql: String,
    /// Positional parameters, bound as text
    params: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let conn = open_db(&cli.db_path, &config)?;
    let params: Vec<Value> = cli.params.iter().cloned().map(Value::Text).collect();

    for record in find(&config, &conn, &cli.sql, &params)? {
        println!("{}", serde_json::to_string(&record)?);
    }
    Ok(())
}
