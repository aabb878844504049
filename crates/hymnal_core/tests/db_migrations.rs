use hymnal_core::db::migrations::latest_version;
use hymnal_core::db::{open_db, open_db_in_memory, DbError};
use hymnal_core::{Slot, SlotRepository, SqliteSlotRepository};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_eq!(
        slot_columns(&conn),
        vec!["slot_key", "slot_value", "updated_at"]
    );
}

#[test]
fn slots_survive_reopening_the_same_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hymnal.db");

    {
        let repo = SqliteSlotRepository::new(open_db(&path).unwrap());
        repo.write_slot(Slot::Favorites, "[1,2]").unwrap();
        repo.write_slot(Slot::Favorites, "[2]").unwrap();
    }

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    let repo = SqliteSlotRepository::new(conn);
    assert_eq!(
        repo.read_slot(Slot::Favorites).unwrap().as_deref(),
        Some("[2]")
    );
    assert_eq!(repo.read_slot(Slot::Notes).unwrap(), None);
}

#[test]
fn database_from_newer_build_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    assert!(matches!(
        open_db(&path),
        Err(DbError::UnsupportedSchemaVersion {
            db_version: 999,
            latest_supported,
        }) if latest_supported == latest_version()
    ));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .unwrap()
}

fn slot_columns(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM pragma_table_info('storage_slots') ORDER BY cid;")
        .unwrap();
    let columns = stmt
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap();
    columns
}
