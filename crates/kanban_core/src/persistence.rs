//! Board snapshot persistence adapter.
//!
//! # Responsibility
//! - Serialize `{columns, tasks}` into one named storage slot.
//! - Load the slot back, tolerating absence, corruption and older shapes.
//!
//! # Invariants
//! - Selection and transient flags are never persisted.
//! - `load`/`save`/`clear` never return errors; failures become log events.
//! - Task timestamps that fail to parse are replaced by the load time.
//! - Tasks written before `completed` existed load as incomplete.
//! - Columns written without `boardId` join the default board.

use crate::model::column::{Column, ColumnId, DEFAULT_BOARD_ID};
use crate::model::task::{Task, TaskId};
use crate::storage::{SlotStorage, StorageError};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type PersistResult<T> = Result<T, PersistError>;

/// Failure while moving a snapshot between memory and storage.
#[derive(Debug)]
pub enum PersistError {
    Storage(StorageError),
    Serialize(serde_json::Error),
    Deserialize(serde_json::Error),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "failed to serialize board snapshot: {err}"),
            Self::Deserialize(err) => write!(f, "malformed board snapshot: {err}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Serialize(err) | Self::Deserialize(err) => Some(err),
        }
    }
}

impl From<StorageError> for PersistError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl PersistError {
    fn code(&self) -> &'static str {
        match self {
            Self::Storage(err) => err.code(),
            Self::Serialize(_) => "serialize_failed",
            Self::Deserialize(_) => "snapshot_malformed",
        }
    }
}

/// Durable part of the board state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardSnapshot {
    pub columns: Vec<Column>,
    pub tasks: Vec<Task>,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    columns: &'a [Column],
    tasks: &'a [Task],
}

#[derive(Deserialize)]
struct StoredSnapshot {
    #[serde(default)]
    columns: Option<Vec<StoredColumn>>,
    #[serde(default)]
    tasks: Option<Vec<StoredTask>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredColumn {
    id: ColumnId,
    title: String,
    order: usize,
    #[serde(default)]
    board_id: Option<String>,
}

impl StoredColumn {
    fn into_column(self) -> Column {
        Column {
            id: self.id,
            title: self.title,
            order: self.order,
            board_id: self
                .board_id
                .unwrap_or_else(|| DEFAULT_BOARD_ID.to_string()),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredTask {
    id: TaskId,
    title: String,
    #[serde(default)]
    description: Option<String>,
    column_id: ColumnId,
    order: usize,
    #[serde(default)]
    completed: Option<bool>,
    #[serde(default)]
    created_at: Option<Value>,
    #[serde(default)]
    updated_at: Option<Value>,
}

impl StoredTask {
    fn into_task(self, loaded_at: DateTime<Utc>) -> Task {
        Task {
            id: self.id,
            title: self.title,
            description: self.description,
            column_id: self.column_id,
            order: self.order,
            completed: self.completed.unwrap_or(false),
            created_at: parse_timestamp(self.created_at.as_ref()).unwrap_or(loaded_at),
            updated_at: parse_timestamp(self.updated_at.as_ref()).unwrap_or(loaded_at),
        }
    }
}

/// Accepts ISO-8601 strings and integer epoch milliseconds.
///
/// Zone-less date-times are read as UTC and bare dates as UTC midnight.
fn parse_timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    let parsed = match value? {
        Value::String(text) => parse_iso_text(text.trim()),
        Value::Number(number) => number
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    };
    parsed.map(|date| date.trunc_subsecs(3))
}

fn parse_iso_text(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

/// Encodes the durable part of a board into slot bytes.
pub fn encode_snapshot(columns: &[Column], tasks: &[Task]) -> PersistResult<Vec<u8>> {
    serde_json::to_vec(&SnapshotRef { columns, tasks }).map_err(PersistError::Serialize)
}

/// Decodes slot bytes, applying the schema-evolution fallbacks.
pub fn decode_snapshot(bytes: &[u8], loaded_at: DateTime<Utc>) -> PersistResult<BoardSnapshot> {
    let stored: StoredSnapshot =
        serde_json::from_slice(bytes).map_err(PersistError::Deserialize)?;
    Ok(BoardSnapshot {
        columns: stored
            .columns
            .unwrap_or_default()
            .into_iter()
            .map(StoredColumn::into_column)
            .collect(),
        tasks: stored
            .tasks
            .unwrap_or_default()
            .into_iter()
            .map(|task| task.into_task(loaded_at))
            .collect(),
    })
}

/// Reads and writes the board snapshot slot on a storage backend.
pub struct BoardPersistence<S> {
    storage: S,
    key: String,
}

impl<S: SlotStorage> BoardPersistence<S> {
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Serializes and writes the snapshot, reporting failures to the caller.
    pub fn try_save(&mut self, columns: &[Column], tasks: &[Task]) -> PersistResult<usize> {
        let bytes = encode_snapshot(columns, tasks)?;
        self.storage.write(&self.key, &bytes)?;
        Ok(bytes.len())
    }

    /// Best-effort save. Returns whether the slot now matches memory.
    pub fn save(&mut self, columns: &[Column], tasks: &[Task]) -> bool {
        match self.try_save(columns, tasks) {
            Ok(bytes) => {
                debug!(
                    "event=board_persist module=persistence status=ok columns={} tasks={} bytes={}",
                    columns.len(),
                    tasks.len(),
                    bytes
                );
                true
            }
            Err(err) => {
                error!(
                    "event=board_persist module=persistence status=error error_code={} error={}",
                    err.code(),
                    err
                );
                false
            }
        }
    }

    /// Reads the slot. `Ok(None)` means the slot was never written.
    pub fn try_load(&self, loaded_at: DateTime<Utc>) -> PersistResult<Option<BoardSnapshot>> {
        match self.storage.read(&self.key)? {
            Some(bytes) => decode_snapshot(&bytes, loaded_at).map(Some),
            None => Ok(None),
        }
    }

    /// Loads the snapshot, falling back to an empty board on any failure.
    pub fn load(&self, loaded_at: DateTime<Utc>) -> BoardSnapshot {
        match self.try_load(loaded_at) {
            Ok(Some(snapshot)) => {
                info!(
                    "event=board_load module=persistence status=ok columns={} tasks={}",
                    snapshot.columns.len(),
                    snapshot.tasks.len()
                );
                snapshot
            }
            Ok(None) => {
                info!("event=board_load module=persistence status=empty");
                BoardSnapshot::default()
            }
            Err(err) => {
                warn!(
                    "event=board_load module=persistence status=fallback error_code={} error={}",
                    err.code(),
                    err
                );
                BoardSnapshot::default()
            }
        }
    }

    /// Removes the slot. Returns whether removal succeeded.
    pub fn clear(&mut self) -> bool {
        match self.storage.remove(&self.key) {
            Ok(()) => {
                info!("event=board_clear module=persistence status=ok");
                true
            }
            Err(err) => {
                error!(
                    "event=board_clear module=persistence status=error error={}",
                    err
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_snapshot, encode_snapshot, BoardPersistence, PersistError};
    use crate::model::column::{Column, DEFAULT_BOARD_ID};
    use crate::model::task::Task;
    use crate::storage::{MemoryStorage, SlotStorage};
    use chrono::{DateTime, TimeZone, Utc};
    use serde_json::json;
    use uuid::Uuid;

    fn at(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).single().expect("valid timestamp")
    }

    #[test]
    fn snapshot_uses_camel_case_and_iso_dates() {
        let column = Column::new("To Do", DEFAULT_BOARD_ID, 0);
        let task = Task::new("Write release notes", None, column.id, 0, at(1_700_000_000_123));

        let bytes = encode_snapshot(&[column], &[task]).expect("encode");
        let value: serde_json::Value = serde_json::from_slice(&bytes).expect("valid json");

        let stored_task = &value["tasks"][0];
        assert!(stored_task.get("columnId").is_some());
        assert!(stored_task.get("description").is_none());
        let created = stored_task["createdAt"].as_str().expect("date string");
        assert!(created.starts_with("2023-11-14T22:13:20.123"));
        assert!(value.get("selectedTaskIds").is_none());
    }

    #[test]
    fn decode_backfills_completed_and_bad_dates() {
        let column_id = Uuid::new_v4();
        let task_id = Uuid::new_v4();
        let raw = json!({
            "columns": [],
            "tasks": [{
                "id": task_id,
                "title": "legacy",
                "columnId": column_id,
                "order": 0,
                "createdAt": "not a date",
                "updatedAt": 1_700_000_000_000i64
            }]
        });
        let loaded_at = at(42);

        let snapshot =
            decode_snapshot(raw.to_string().as_bytes(), loaded_at).expect("decode legacy");
        let task = &snapshot.tasks[0];
        assert!(!task.completed);
        assert_eq!(task.created_at, loaded_at);
        assert_eq!(task.updated_at, at(1_700_000_000_000));
    }

    #[test]
    fn decode_reads_date_only_and_zoneless_dates_as_utc() {
        let column_id = Uuid::new_v4();
        let raw = json!({
            "columns": [],
            "tasks": [{
                "id": Uuid::new_v4(),
                "title": "imported",
                "columnId": column_id,
                "order": 0,
                "completed": true,
                "createdAt": "2023-01-02",
                "updatedAt": "2023-01-02T03:04:05"
            }]
        });
        let loaded_at = at(1_700_000_000_000);

        let snapshot = decode_snapshot(raw.to_string().as_bytes(), loaded_at).expect("decode");
        let task = &snapshot.tasks[0];
        assert_eq!(
            task.created_at,
            Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap()
        );
        assert_eq!(
            task.updated_at,
            Utc.with_ymd_and_hms(2023, 1, 2, 3, 4, 5).unwrap()
        );
        assert_ne!(task.created_at, loaded_at);
    }

    #[test]
    fn decode_keeps_zoneless_fraction_and_space_separator() {
        let raw = json!({
            "tasks": [{
                "id": Uuid::new_v4(),
                "title": "imported",
                "columnId": Uuid::new_v4(),
                "order": 0,
                "createdAt": "2023-01-02 03:04:05.678",
                "updatedAt": "2023-01-02T03:04:05.678901"
            }]
        });

        let snapshot = decode_snapshot(raw.to_string().as_bytes(), at(0)).expect("decode");
        let task = &snapshot.tasks[0];
        assert_eq!(task.created_at.to_rfc3339(), "2023-01-02T03:04:05.678+00:00");
        assert_eq!(task.updated_at, task.created_at);
    }

    #[test]
    fn decode_defaults_missing_board_id() {
        let column_id = Uuid::new_v4();
        let raw = json!({
            "columns": [{ "id": column_id, "title": "Legacy", "order": 0 }],
            "tasks": [{
                "id": Uuid::new_v4(),
                "title": "kept",
                "columnId": column_id,
                "order": 0
            }]
        });

        let snapshot = decode_snapshot(raw.to_string().as_bytes(), at(0)).expect("decode");
        assert_eq!(snapshot.columns.len(), 1);
        assert_eq!(snapshot.columns[0].board_id, DEFAULT_BOARD_ID);
        assert_eq!(snapshot.columns[0].title, "Legacy");
        assert_eq!(snapshot.tasks.len(), 1);
        assert_eq!(snapshot.tasks[0].column_id, column_id);
    }

    #[test]
    fn decode_treats_null_collections_as_empty() {
        let snapshot =
            decode_snapshot(br#"{"columns":null}"#, at(0)).expect("null columns decode");
        assert!(snapshot.columns.is_empty());
        assert!(snapshot.tasks.is_empty());
    }

    #[test]
    fn decode_rejects_non_json() {
        let err = decode_snapshot(b"{not json", at(0)).expect_err("garbage must fail");
        assert!(matches!(err, PersistError::Deserialize(_)));
    }

    #[test]
    fn load_falls_back_to_empty_on_corruption() {
        let storage = MemoryStorage::new().with_slot("board", b"\xff\xfe".to_vec());
        let persistence = BoardPersistence::new(storage, "board");

        assert!(persistence.try_load(at(0)).is_err());
        assert_eq!(persistence.load(at(0)), Default::default());
    }

    #[test]
    fn save_failure_is_reported_as_false() {
        let mut persistence = BoardPersistence::new(MemoryStorage::with_quota(8), "board");
        let column = Column::new("To Do", DEFAULT_BOARD_ID, 0);

        assert!(!persistence.save(&[column], &[]));
        assert!(!persistence.storage().contains("board"));
    }

    #[test]
    fn clear_removes_slot() {
        let mut persistence = BoardPersistence::new(MemoryStorage::new(), "board");
        assert!(persistence.save(&[], &[]));
        assert!(persistence.clear());
        assert_eq!(persistence.storage().read("board").unwrap(), None);
    }
}
