use log::{Level, LevelFilter, Log, Metadata, Record as LogRecord};
use rowkit_core::db::{find, open_db_in_memory, paginate, update};
use rowkit_core::{Config, Value};
use std::sync::Mutex;

struct CapturingLogger {
    lines: Mutex<Vec<String>>,
}

impl Log for CapturingLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= Level::Info
    }

    fn log(&self, record: &LogRecord<'_>) {
        if self.enabled(record.metadata()) {
            self.lines.lock().unwrap().push(record.args().to_string());
        }
    }

    fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger {
    lines: Mutex::new(Vec::new()),
};

fn sql_lines(config_name: &str) -> Vec<String> {
    let marker = format!("event=sql module=db config={config_name} ");
    LOGGER
        .lines
        .lock()
        .unwrap()
        .iter()
        .filter(|line| line.starts_with(&marker))
        .cloned()
        .collect()
}

#[test]
fn show_sql_emits_one_event_per_statement() {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(LevelFilter::Info);

    let verbose = Config::new("verbose").with_show_sql(true);
    let quiet = Config::new("quiet");
    let conn = open_db_in_memory(&verbose).unwrap();
    conn.execute_batch("CREATE TABLE tag (id INTEGER PRIMARY KEY, label TEXT);")
        .unwrap();

    update(
        &verbose,
        &conn,
        "INSERT INTO tag (label)\nVALUES (?)",
        &[Value::Text("rust".to_string())],
    )
    .unwrap();
    find(&quiet, &conn, "SELECT * FROM tag", &[]).unwrap();
    paginate(&verbose, &conn, 1, 10, "SELECT *", "FROM tag ORDER BY id", &[]).unwrap();

    let lines = sql_lines("verbose");
    assert_eq!(
        lines,
        [
            "event=sql module=db config=verbose sql=INSERT INTO tag (label) VALUES (?)",
            "event=sql module=db config=verbose sql=SELECT count(*) FROM tag",
            "event=sql module=db config=verbose sql=SELECT * FROM tag ORDER BY id LIMIT 0, 10",
        ]
    );
    assert!(sql_lines("quiet").is_empty());
}
