use rowkit_core::db::{
    delete_record_by_id, find, find_first, find_record_by_id, open_db, open_db_in_memory,
    paginate, query, save_record, update, update_record,
};
use rowkit_core::{Config, DbError, Record, Value};
use rusqlite::Connection;

fn seeded(config: &Config) -> Connection {
    let conn = open_db_in_memory(config).unwrap();
    conn.execute_batch(
        "CREATE TABLE user (id INTEGER PRIMARY KEY, name TEXT NOT NULL, city TEXT, age INTEGER);
         INSERT INTO user (name, city, age) VALUES
            ('ada', 'london', 36),
            ('grace', 'new york', 45),
            ('alan', 'london', 41),
            ('edsger', 'austin', 72),
            ('barbara', 'boston', 50);",
    )
    .unwrap();
    conn
}

fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

#[test]
fn open_db_applies_config_pragmas() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::new("main").with_foreign_keys(false);
    let conn = open_db(dir.path().join("rowkit.db"), &config).unwrap();

    let foreign_keys: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(foreign_keys, 0);

    let conn = open_db_in_memory(&Config::default()).unwrap();
    let foreign_keys: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(foreign_keys, 1);
}

#[test]
fn query_returns_column_values_in_select_order() {
    let config = Config::default();
    let conn = seeded(&config);

    let rows = query(
        &config,
        &conn,
        "SELECT name, age FROM user WHERE city = ? ORDER BY age",
        &[text("london")],
    )
    .unwrap();

    assert_eq!(
        rows,
        vec![
            vec![text("ada"), Value::Integer(36)],
            vec![text("alan"), Value::Integer(41)],
        ]
    );
}

#[test]
fn find_maps_rows_to_unflagged_records() {
    let config = Config::default().with_show_sql(true);
    let conn = seeded(&config);

    let records = find(&config, &conn, "SELECT * FROM user ORDER BY id", &[]).unwrap();
    assert_eq!(records.len(), 5);
    assert_eq!(records[0].get_str("name"), Some("ada"));
    assert_eq!(
        records[0].column_names().collect::<Vec<_>>(),
        ["age", "city", "id", "name"]
    );

    let first = find_first(&config, &conn, "SELECT * FROM user WHERE age > ?", &[Value::Integer(70)])
        .unwrap()
        .unwrap();
    assert_eq!(first.get_str("name"), Some("edsger"));
}

#[test]
fn paginate_computes_totals_and_slices_rows() {
    let config = Config::default();
    let conn = seeded(&config);

    let page = paginate(
        &config,
        &conn,
        2,
        2,
        "SELECT name",
        "FROM user WHERE age > ? ORDER BY age",
        &[Value::Integer(30)],
    )
    .unwrap();

    assert_eq!(page.total_row, 5);
    assert_eq!(page.total_page, 3);
    assert_eq!(page.page_number, 2);
    let names: Vec<_> = page.list.iter().filter_map(|r| r.get_str("name")).collect();
    assert_eq!(names, ["grace", "barbara"]);
    assert!(!page.is_first_page());
    assert!(!page.is_last_page());
}

#[test]
fn paginate_past_the_end_returns_empty_list_with_totals() {
    let config = Config::default();
    let conn = seeded(&config);

    let page = paginate(&config, &conn, 9, 2, "SELECT *", "FROM user", &[]).unwrap();
    assert!(page.list.is_empty());
    assert_eq!((page.total_row, page.total_page), (5, 3));

    let empty = paginate(&config, &conn, 1, 10, "SELECT *", "FROM user WHERE age > 100", &[]).unwrap();
    assert!(empty.list.is_empty());
    assert_eq!((empty.total_row, empty.total_page), (0, 0));
}

#[test]
fn paginate_counts_groups_for_group_by_queries() {
    let config = Config::default();
    let conn = seeded(&config);

    let page = paginate(
        &config,
        &conn,
        1,
        10,
        "SELECT city, count(*) AS people",
        "FROM user GROUP BY city ORDER BY city",
        &[],
    )
    .unwrap();

    assert_eq!(page.total_row, 4);
    assert_eq!(page.list[2].get_str("city"), Some("london"));
    assert_eq!(page.list[2].get_i64("people"), Some(2));
}

#[test]
fn paginate_rejects_zero_page_arguments() {
    let config = Config::default();
    let conn = seeded(&config);

    let err = paginate(&config, &conn, 0, 10, "SELECT *", "FROM user", &[]).unwrap_err();
    assert!(matches!(
        err,
        DbError::InvalidPagination {
            page_number: 0,
            page_size: 10
        }
    ));
}

#[test]
fn update_returns_affected_rows_and_sqlite_errors_pass_through() {
    let config = Config::default();
    let conn = seeded(&config);

    let changed = update(
        &config,
        &conn,
        "UPDATE user SET city = ? WHERE city = ?",
        &[text("cambridge"), text("london")],
    )
    .unwrap();
    assert_eq!(changed, 2);

    let err = update(&config, &conn, "UPDATE missing SET x = 1", &[]).unwrap_err();
    assert!(matches!(err, DbError::Sqlite(_)));
}

#[test]
fn record_crud_round_trip() {
    let config = Config::default();
    let conn = seeded(&config);

    let mut record = Record::new();
    record.set("name", "linus".to_string()).set("age", 54_i64);
    assert!(save_record(&config, &conn, "user", "id", &mut record).unwrap());
    let id = record.get_i64("id").unwrap();
    assert_eq!(id, 6);

    let mut loaded = find_record_by_id(&config, &conn, "user", "id", &[Value::Integer(id)])
        .unwrap()
        .unwrap();
    assert!(!update_record(&config, &conn, "user", "id", &mut loaded).unwrap());

    loaded.set("city", "portland".to_string());
    assert!(update_record(&config, &conn, "user", "id", &mut loaded).unwrap());
    let reloaded = find_record_by_id(&config, &conn, "user", "id", &[Value::Integer(id)])
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.get_str("city"), Some("portland"));

    assert!(delete_record_by_id(&config, &conn, "user", "id", &[Value::Integer(id)]).unwrap());
    assert!(find_record_by_id(&config, &conn, "user", "id", &[Value::Integer(id)])
        .unwrap()
        .is_none());
}

#[test]
fn update_record_requires_primary_key_value() {
    let config = Config::default();
    let conn = seeded(&config);

    let mut record = Record::new();
    record.set("name", "nobody".to_string());
    let err = update_record(&config, &conn, "user", "id", &mut record).unwrap_err();
    assert!(matches!(err, DbError::MissingPrimaryKey { ref column, .. } if column == "id"));
}

#[test]
fn id_lookups_check_key_arity() {
    let config = Config::default();
    let conn = seeded(&config);

    let err = find_record_by_id(&config, &conn, "user", "id", &[]).unwrap_err();
    assert!(matches!(err, DbError::InvalidArgument(_)));
}
