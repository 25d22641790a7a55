//! Versioned schema migrations
//!
//! Applications describe their tables as an ordered list of [`Migration`]s.
//! Each one is applied in its own write transaction and recorded in the
//! `localsync_schema_version` table, so running the same list again is a
//! no-op.

use super::database::Database;
use super::errors::{StoreError, StoreResult};
use crate::logging::DATABASE_TARGET;
use rusqlite::params;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

const SCHEMA_VERSION_TABLE: &str = "localsync_schema_version";

/// Migration descriptor
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: i64,
    pub description: &'static str,
    pub up_sql: &'static str,
}

impl Database {
    /// Apply every migration newer than the current schema version.
    ///
    /// Returns the number of migrations applied.
    pub fn migrate(&self, migrations: &[Migration]) -> StoreResult<usize> {
        check_order(migrations)?;

        let current = self.write(|conn| -> StoreResult<i64> {
            conn.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {SCHEMA_VERSION_TABLE} (
                    version INTEGER PRIMARY KEY,
                    description TEXT NOT NULL,
                    applied_at INTEGER NOT NULL
                );"
            ))?;
            let version: Option<i64> = conn.query_row(
                &format!("SELECT MAX(version) FROM {SCHEMA_VERSION_TABLE}"),
                [],
                |row| row.get(0),
            )?;
            Ok(version.unwrap_or(0))
        })?;

        let mut applied = 0;
        for migration in migrations.iter().filter(|m| m.version > current) {
            self.write(|conn| -> StoreResult<()> {
                conn.execute_batch(migration.up_sql).map_err(|e| StoreError::Migration {
                    version: migration.version,
                    reason: e.to_string(),
                })?;
                conn.execute(
                    &format!(
                        "INSERT INTO {SCHEMA_VERSION_TABLE} (version, description, applied_at)
                         VALUES (?1, ?2, ?3)"
                    ),
                    params![migration.version, migration.description, current_timestamp()],
                )?;
                Ok(())
            })?;

            info!(
                target: DATABASE_TARGET,
                version = migration.version,
                description = migration.description,
                "Applied migration"
            );
            applied += 1;
        }

        Ok(applied)
    }

    /// Highest applied migration version, or 0 when none has run
    pub fn schema_version(&self) -> StoreResult<i64> {
        self.read(|conn| -> StoreResult<i64> {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
                params![SCHEMA_VERSION_TABLE],
                |row| row.get(0),
            )?;
            if !exists {
                return Ok(0);
            }

            let version: Option<i64> = conn.query_row(
                &format!("SELECT MAX(version) FROM {SCHEMA_VERSION_TABLE}"),
                [],
                |row| row.get(0),
            )?;
            Ok(version.unwrap_or(0))
        })
    }
}

fn check_order(migrations: &[Migration]) -> StoreResult<()> {
    let mut previous = 0;
    for migration in migrations {
        if migration.version <= previous {
            return Err(StoreError::Migration {
                version: migration.version,
                reason: format!(
                    "versions must be positive and strictly increasing (previous {})",
                    previous
                ),
            });
        }
        previous = migration.version;
    }
    Ok(())
}

fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
