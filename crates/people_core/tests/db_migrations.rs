use people_core::db::migrations::{apply_migrations, current_version, latest_version};
use people_core::db::{open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(current_version(&conn).unwrap(), latest_version());
    assert_eq!(
        column_names(&conn, "persons"),
        ["id", "firstName", "lastName", "email", "birthday"]
    );
}

#[test]
fn every_persons_column_is_not_null_text() {
    let conn = open_db_in_memory().unwrap();
    let mut stmt = conn.prepare("PRAGMA table_info(persons);").unwrap();
    let columns = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>("type")?, row.get::<_, i64>("notnull")?))
        })
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    assert_eq!(columns.len(), 5);
    for (kind, not_null) in columns {
        assert_eq!(kind, "TEXT");
        assert_eq!(not_null, 1);
    }
}

#[test]
fn applying_migrations_twice_is_idempotent() {
    let mut conn = open_db_in_memory().unwrap();
    apply_migrations(&mut conn).unwrap();
    assert_eq!(current_version(&conn).unwrap(), latest_version());
}

#[test]
fn newer_schema_version_is_rejected() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();

    match apply_migrations(&mut conn).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn column_names(conn: &Connection, table: &str) -> Vec<String> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table});"))
        .unwrap();
    let names = stmt
        .query_map([], |row| row.get::<_, String>("name"))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    names
}
