//! Kanban board state core.
//!
//! Columns, tasks and the selection set live in a `BoardStore`; every
//! mutation is an `Intent` applied by the reducer, and the durable part of the
//! board is written to a `SlotStorage` after each structural change.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod ordering;
pub mod persistence;
pub mod storage;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{resolve_db_path, StoreConfig, DEFAULT_STORAGE_KEY};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::column::{Column, ColumnId, ColumnPatch, DEFAULT_BOARD_ID};
pub use model::task::{Task, TaskId, TaskPatch};
pub use ordering::{next_order, reorder, IndexOutOfRange};
pub use persistence::{BoardPersistence, BoardSnapshot, PersistError, PersistResult};
pub use storage::{MemoryStorage, SlotStorage, SqliteSlotStorage, StorageError, StorageResult};
pub use store::intent::{Intent, Outcome, StoreError, StoreResult};
pub use store::selectors::{ColumnSummary, StatusFilter, TaskFilter};
pub use store::state::BoardState;
pub use store::BoardStore;

/// Liveness check for host bindings.
pub fn ping() -> &'static str {
    "pong"
}

pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
