//! SQLite-backed store for QA data
//!
//! This module owns the relational schema and every query against it:
//! - Reference data: projects, users, test case files, defect files
//! - Records: test cases and defects, unique by (project, external code)
//! - Audit log of import runs and manual changes
//!
//! The import reconciler only sees the store through the traits in
//! [`ReferenceSource`] and [`TargetRepository`].

mod audit;
mod records;
mod repository;
mod schema;
mod targets;

pub use audit::AuditEntry;
pub use repository::{ReferenceSource, TargetRepository};
pub use targets::TargetFilter;

use std::fs;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::Connection;
use thiserror::Error;

/// Current schema version, recorded in `schema_version`
const SCHEMA_VERSION: i32 = 1;

/// The QA database backed by SQLite
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create the database at `path`
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        tracing::debug!(path = %path.display(), "opened database");

        Self::from_connection(conn)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }
}

/// Errors raised by the store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Raw database error; its message is surfaced verbatim in row failures
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database schema version {found} is newer than this build supports ({supported})")]
    UnsupportedSchema { found: i32, supported: i32 },
}

/// Format a timestamp the way it is stored: RFC 3339, milliseconds, `Z`
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current time at the precision timestamps are stored with
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Read a required timestamp column; unparseable text is a conversion error
fn parse_datetime(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    parse_stored(idx, &text)
}

/// Read an optional timestamp column
fn parse_optional_datetime(
    row: &rusqlite::Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let text: Option<String> = row.get(idx)?;
    text.map(|text| parse_stored(idx, &text)).transpose()
}

fn parse_stored(idx: usize, text: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

#[cfg(test)]
mod tests;
