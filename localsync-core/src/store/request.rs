//! Raw SQL requests
//!
//! A [`SqlRequest`] bundles a statement with its bound arguments so that
//! queries can be built in one place and executed later inside a `read`
//! or `write` block.

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};

/// SQL statement plus positional arguments
#[derive(Debug, Clone, PartialEq)]
pub struct SqlRequest {
    sql: String,
    arguments: Vec<Value>,
}

impl SqlRequest {
    pub fn new(sql: impl Into<String>) -> Self {
        Self { sql: sql.into(), arguments: Vec::new() }
    }

    /// Append the next positional argument
    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.arguments.push(value.into());
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    /// Map every returned row
    pub fn fetch_all<T, F>(&self, conn: &Connection, map: F) -> rusqlite::Result<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = conn.prepare(&self.sql)?;
        let rows = stmt.query_map(params_from_iter(self.arguments.iter()), map)?;
        rows.collect()
    }

    /// Map the first returned row, if any
    pub fn fetch_optional<T, F>(&self, conn: &Connection, map: F) -> rusqlite::Result<Option<T>>
    where
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        conn.query_row(&self.sql, params_from_iter(self.arguments.iter()), map)
            .optional()
    }

    /// Execute a statement, returning the number of changed rows
    pub fn execute(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.execute(&self.sql, params_from_iter(self.arguments.iter()))
    }
}
