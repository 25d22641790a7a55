//! Record identity contract
//!
//! A [`SyncableRecord`] is any type that knows how to insert, upsert and
//! delete its own row and that maps to a stable [`RecordId`] in a remote
//! zone. The remote identity is derived from the local identity only, so
//! insert, save and delete of the same record always address the same
//! remote record.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the zone records live in unless they pick their own.
pub const DEFAULT_ZONE: &str = "_defaultZone";

/// Remote partition a record belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ZoneId(String);

impl ZoneId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ZoneId {
    fn default() -> Self {
        Self::new(DEFAULT_ZONE)
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Remote identity of a record: its name within a zone
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId {
    zone: ZoneId,
    record_name: String,
}

impl RecordId {
    pub fn new(zone: ZoneId, record_name: impl Into<String>) -> Self {
        Self { zone, record_name: record_name.into() }
    }

    /// Identity in [`DEFAULT_ZONE`]
    pub fn in_default_zone(record_name: impl Into<String>) -> Self {
        Self::new(ZoneId::default(), record_name)
    }

    pub fn zone(&self) -> &ZoneId {
        &self.zone
    }

    pub fn record_name(&self) -> &str {
        &self.record_name
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.zone, self.record_name)
    }
}

/// A record type that can be persisted locally and mirrored remotely.
///
/// The row-level methods receive the connection of the enclosing
/// transaction; they must not commit or roll back themselves.
pub trait SyncableRecord {
    /// Zone every record of this type is stored in
    const ZONE: &'static str = DEFAULT_ZONE;

    /// Local identity, unique per record type
    fn record_name(&self) -> String;

    /// Remote identity, derived from [`Self::ZONE`] and [`Self::record_name`]
    fn record_id(&self) -> RecordId {
        RecordId::new(ZoneId::new(Self::ZONE), self.record_name())
    }

    /// Insert a new row. Must fail if the identity already exists.
    fn insert(&self, conn: &Connection) -> rusqlite::Result<()>;

    /// Insert or update the row for this identity
    fn save(&self, conn: &Connection) -> rusqlite::Result<()>;

    /// Remove the row for this identity, returning whether one existed
    fn delete(&self, conn: &Connection) -> rusqlite::Result<bool>;

    /// Remove the row addressed by a remote identity.
    ///
    /// Used when a fetch reports a deletion and no local value exists.
    fn delete_fetched(conn: &Connection, id: &RecordId) -> rusqlite::Result<bool>
    where
        Self: Sized;
}
