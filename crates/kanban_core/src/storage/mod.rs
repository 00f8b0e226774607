//! Durable key-value slot storage.
//!
//! # Responsibility
//! - Define the byte-slot contract the persistence adapter writes through.
//! - Provide SQLite-backed and in-memory implementations.
//!
//! # Invariants
//! - A slot is either absent or holds the exact bytes of the last write.
//! - `remove` on an absent slot succeeds.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStorage;
pub use sqlite::SqliteSlotStorage;

pub type StorageResult<T> = Result<T, StorageError>;

/// Failure raised by a slot storage backend.
#[derive(Debug)]
pub enum StorageError {
    /// SQLite failed while opening, migrating or touching a slot.
    Sqlite(rusqlite::Error),
    /// The board database was written by a newer build.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// The write would exceed the storage's byte quota.
    QuotaExceeded {
        key: String,
        requested: usize,
        quota: usize,
    },
}

impl StorageError {
    /// Stable code used in `error_code=` log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "storage_failed",
            Self::UnsupportedSchemaVersion { .. } => "schema_unsupported",
            Self::QuotaExceeded { .. } => "quota_exceeded",
        }
    }
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "board storage error: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "board database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::QuotaExceeded {
                key,
                requested,
                quota,
            } => write!(
                f,
                "storage quota exceeded writing `{key}`: {requested} bytes requested, {quota} allowed"
            ),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::QuotaExceeded { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Named byte slots in a durable store.
pub trait SlotStorage {
    /// Returns the slot contents, or `None` when the slot was never written.
    fn read(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;
    /// Replaces the slot contents.
    fn write(&mut self, key: &str, value: &[u8]) -> StorageResult<()>;
    /// Deletes the slot.
    fn remove(&mut self, key: &str) -> StorageResult<()>;
}

