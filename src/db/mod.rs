pub mod cards;
pub mod daily;
pub mod reviews;
pub mod schema;
pub mod stats;
pub mod subjects;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{types::Type, Connection, Result, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::{Difficulty, ScheduleViolation, UnknownDifficulty};

// Re-export all public items from submodules
pub use cards::*;
pub use daily::*;
pub use reviews::*;
pub use schema::run_migrations;
pub use stats::*;
pub use subjects::*;

pub type DbPool = Arc<Mutex<Connection>>;

/// Extension trait for logging errors before discarding them
pub trait LogOnError<T> {
    /// Log the error at warn level and return None
    fn log_warn(self, context: &str) -> Option<T>;
    /// Log the error at warn level and return the default
    fn log_warn_default(self, context: &str) -> T
    where
        T: Default;
}

impl<T, E: std::fmt::Display> LogOnError<T> for std::result::Result<T, E> {
    fn log_warn(self, context: &str) -> Option<T> {
        match self {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("{}: {}", context, e);
                None
            }
        }
    }

    fn log_warn_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("{}: {}", context, e);
                T::default()
            }
        }
    }
}

/// Failures surfaced by the storage layer
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Absent, or owned by a different user
    #[error("record not found")]
    NotFound,
    /// The row changed between load and save
    #[error("record was modified concurrently")]
    Conflict,
    #[error("refusing to store invalid schedule: {0}")]
    InvalidSchedule(#[from] ScheduleViolation),
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

/// Error returned when database lock cannot be acquired
#[derive(Debug)]
pub struct DbLockError;

impl std::fmt::Display for DbLockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Database unavailable")
    }
}

impl std::error::Error for DbLockError {}

/// Try to acquire the database lock, returning an error if poisoned
pub fn try_lock(pool: &DbPool) -> std::result::Result<MutexGuard<'_, Connection>, DbLockError> {
    pool.lock().map_err(|_: PoisonError<_>| {
        tracing::error!("Database mutex poisoned - a thread panicked while holding the lock");
        DbLockError
    })
}

pub fn init_db(path: &Path) -> Result<DbPool> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).log_warn("Could not create database directory");
    }

    // Create backup before migrations if database exists
    if path.exists() {
        let backup_path = path.with_extension("db.backup");
        std::fs::copy(path, &backup_path).log_warn("Could not create database backup");
    }

    let conn = Connection::open(path)?;
    prepare_connection(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// Fresh in-memory database with the full schema (tests and throwaway runs)
pub fn open_in_memory() -> Result<DbPool> {
    let conn = Connection::open_in_memory()?;
    prepare_connection(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

fn prepare_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    run_migrations(conn)
}

/// Fixed-width UTC timestamp, so string order matches time order in SQL
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(s: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

/// Read a stored timestamp column, failing the row on a malformed value
pub(crate) fn timestamp_column(row: &Row, idx: usize) -> Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_timestamp(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn optional_timestamp_column(row: &Row, idx: usize) -> Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        parse_timestamp(&s)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

/// Read a stored difficulty, failing the row on an unknown value
pub(crate) fn difficulty_column(row: &Row, idx: usize) -> Result<Difficulty> {
    let raw: String = row.get(idx)?;
    Difficulty::from_str(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(UnknownDifficulty(raw)))
    })
}
