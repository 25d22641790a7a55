#![allow(dead_code)]

//! Fixtures shared by the integration tests

use localsync_core::config::StoreConfig;
use localsync_core::store::Migration;
use localsync_core::{Database, RecordId, StoreResult, SyncableRecord};
use rusqlite::{params, Connection, OptionalExtension};
use std::time::Duration;
use tempfile::TempDir;

pub const NOTE_ZONE: &str = "Notes";

pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "Create notes",
    up_sql: "CREATE TABLE notes (
        id TEXT PRIMARY KEY NOT NULL,
        title TEXT NOT NULL
    );",
}];

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: String,
    pub title: String,
}

impl Note {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self { id: id.into(), title: title.into() }
    }

    /// Note with a random identity
    pub fn random(title: impl Into<String>) -> Self {
        Self::new(uuid::Uuid::new_v4().to_string(), title)
    }
}

impl SyncableRecord for Note {
    const ZONE: &'static str = NOTE_ZONE;

    fn record_name(&self) -> String {
        self.id.clone()
    }

    fn insert(&self, conn: &Connection) -> rusqlite::Result<()> {
        conn.execute("INSERT INTO notes (id, title) VALUES (?1, ?2)", params![self.id, self.title])?;
        Ok(())
    }

    fn save(&self, conn: &Connection) -> rusqlite::Result<()> {
        conn.execute(
            "INSERT INTO notes (id, title) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET title = excluded.title",
            params![self.id, self.title],
        )?;
        Ok(())
    }

    fn delete(&self, conn: &Connection) -> rusqlite::Result<bool> {
        Ok(conn.execute("DELETE FROM notes WHERE id = ?1", params![self.id])? > 0)
    }

    fn delete_fetched(conn: &Connection, id: &RecordId) -> rusqlite::Result<bool> {
        Ok(conn.execute("DELETE FROM notes WHERE id = ?1", params![id.record_name()])? > 0)
    }
}

pub fn store_config(dir: &TempDir) -> StoreConfig {
    StoreConfig {
        path: dir.path().join("notes.db"),
        max_readers: 4,
        busy_timeout: Duration::from_secs(5),
        checkout_timeout: Duration::from_secs(10),
    }
}

/// Fresh migrated database in a temporary directory
pub fn open_database() -> (Database, TempDir) {
    let dir = TempDir::new().unwrap();
    let db = Database::open(&store_config(&dir)).unwrap();
    db.migrate(MIGRATIONS).unwrap();
    (db, dir)
}

pub fn title_of(conn: &Connection, id: &str) -> StoreResult<Option<String>> {
    Ok(conn
        .query_row("SELECT title FROM notes WHERE id = ?1", params![id], |row| row.get(0))
        .optional()?)
}

pub fn count_notes(conn: &Connection) -> StoreResult<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))?)
}
