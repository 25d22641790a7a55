//! Test fixtures shared by the unit tests

use crate::config::StoreConfig;
use crate::record::{RecordId, SyncableRecord};
use crate::store::{Database, Migration, StoreResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

pub const TEST_MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Create test notes",
        up_sql: "CREATE TABLE test_notes (id TEXT PRIMARY KEY NOT NULL, value INTEGER NOT NULL);",
    },
    Migration {
        version: 2,
        description: "Index note values",
        up_sql: "CREATE INDEX idx_test_notes_value ON test_notes(value);",
    },
];

/// Minimal syncable record backed by the `test_notes` table
#[derive(Debug, Clone, PartialEq)]
pub struct TestNote {
    pub id: String,
    pub value: i64,
}

impl TestNote {
    pub fn new(id: impl Into<String>, value: i64) -> Self {
        Self { id: id.into(), value }
    }
}

impl SyncableRecord for TestNote {
    const ZONE: &'static str = "TestNotes";

    fn record_name(&self) -> String {
        self.id.clone()
    }

    fn insert(&self, conn: &Connection) -> rusqlite::Result<()> {
        conn.execute(
            "INSERT INTO test_notes (id, value) VALUES (?1, ?2)",
            params![self.id, self.value],
        )?;
        Ok(())
    }

    fn save(&self, conn: &Connection) -> rusqlite::Result<()> {
        conn.execute(
            "INSERT INTO test_notes (id, value) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET value = excluded.value",
            params![self.id, self.value],
        )?;
        Ok(())
    }

    fn delete(&self, conn: &Connection) -> rusqlite::Result<bool> {
        Ok(conn.execute("DELETE FROM test_notes WHERE id = ?1", params![self.id])? > 0)
    }

    fn delete_fetched(conn: &Connection, id: &RecordId) -> rusqlite::Result<bool> {
        Ok(conn.execute("DELETE FROM test_notes WHERE id = ?1", params![id.record_name()])? > 0)
    }
}

pub fn test_store_config(dir: &Path) -> StoreConfig {
    StoreConfig {
        path: dir.join("test.db"),
        max_readers: 4,
        busy_timeout: Duration::from_secs(5),
        checkout_timeout: Duration::from_secs(10),
    }
}

pub fn open_unmigrated_database() -> (Database, TempDir) {
    let dir = TempDir::new().unwrap();
    let db = Database::open(&test_store_config(dir.path())).unwrap();
    (db, dir)
}

pub fn open_test_database() -> (Database, TempDir) {
    let (db, dir) = open_unmigrated_database();
    db.migrate(TEST_MIGRATIONS).unwrap();
    (db, dir)
}

pub fn note_value(conn: &Connection, id: &str) -> StoreResult<Option<i64>> {
    Ok(conn
        .query_row("SELECT value FROM test_notes WHERE id = ?1", params![id], |row| row.get(0))
        .optional()?)
}

pub fn count_notes(conn: &Connection) -> StoreResult<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM test_notes", [], |row| row.get(0))?)
}
