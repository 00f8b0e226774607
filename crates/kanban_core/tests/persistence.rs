use chrono::{DateTime, Duration, TimeZone, Utc};
use kanban_core::db::migrations::latest_version;
use kanban_core::db::{open_db, open_db_in_memory};
use kanban_core::store::selectors;
use kanban_core::{
    BoardPersistence, BoardStore, ManualClock, MemoryStorage, SlotStorage, SqliteSlotStorage,
    StorageError, StoreConfig, TaskPatch, DEFAULT_BOARD_ID, DEFAULT_STORAGE_KEY,
};
use serde_json::json;
use uuid::Uuid;

fn start() -> DateTime<Utc> {
    Utc.timestamp_millis_opt(1_700_000_000_123).single().unwrap()
}

#[test]
fn file_backed_store_rehydrates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.sqlite3");

    let (todo, task) = {
        let mut store = BoardStore::open(SqliteSlotStorage::open(&path).unwrap());
        let todo = store.add_column("To Do").unwrap();
        store.add_column("Done").unwrap();
        let task = store
            .add_task("Write docs", Some("README".to_string()), todo)
            .unwrap();
        store.toggle_task_completed(task).unwrap();
        store.select_task(task).unwrap();
        (todo, task)
    };

    let store = BoardStore::open(SqliteSlotStorage::open(&path).unwrap());
    let columns = selectors::columns(store.state());
    assert_eq!(columns.len(), 2);
    assert_eq!(columns[0].id, todo);

    let loaded = selectors::task_by_id(store.state(), task).unwrap();
    assert!(loaded.completed);
    assert_eq!(loaded.description.as_deref(), Some("README"));
    assert!(store.state().selected_task_ids().is_empty());
    assert!(!store.state().is_loading());
}

#[test]
fn save_then_load_preserves_millisecond_dates() {
    let clock = ManualClock::new(start());
    let mut store =
        BoardStore::with_clock(MemoryStorage::new(), StoreConfig::default(), clock.clone());
    let column = store.add_column("To Do").unwrap();
    let task = store.add_task("a", None, column).unwrap();
    clock.advance(Duration::milliseconds(1_501));
    store.update_task(task, TaskPatch::completed(true)).unwrap();
    let expected = store.state().snapshot();

    let persistence = BoardPersistence::new(store.into_storage(), DEFAULT_STORAGE_KEY);
    let loaded = persistence.try_load(Utc::now()).unwrap().unwrap();
    assert_eq!(loaded, expected);
    assert_eq!(
        loaded.tasks[0].updated_at,
        start() + Duration::milliseconds(1_501)
    );
}

#[test]
fn legacy_snapshot_is_backfilled() {
    let column_id = Uuid::new_v4();
    let legacy = json!({
        "columns": [{
            "id": column_id,
            "title": "To Do",
            "order": 0,
            "boardId": "board_1"
        }],
        "tasks": [{
            "id": Uuid::new_v4(),
            "title": "old task",
            "columnId": column_id,
            "order": 0,
            "createdAt": "2023-01-02T03:04:05.678Z",
            "updatedAt": "garbage"
        }]
    });
    let storage =
        MemoryStorage::new().with_slot(DEFAULT_STORAGE_KEY, legacy.to_string().into_bytes());
    let clock = ManualClock::new(start());

    let store = BoardStore::with_clock(storage, StoreConfig::default(), clock);
    let task = &store.state().tasks()[0];
    assert!(!task.completed);
    assert_eq!(task.created_at.to_rfc3339(), "2023-01-02T03:04:05.678+00:00");
    assert_eq!(task.updated_at, start());
}

#[test]
fn column_without_board_id_survives_next_save() {
    let column_id = Uuid::new_v4();
    let task_id = Uuid::new_v4();
    let legacy = json!({
        "columns": [{ "id": column_id, "title": "Backlog", "order": 0 }],
        "tasks": [{
            "id": task_id,
            "title": "carried over",
            "columnId": column_id,
            "order": 0,
            "createdAt": "2023-01-02"
        }]
    });
    let storage =
        MemoryStorage::new().with_slot(DEFAULT_STORAGE_KEY, legacy.to_string().into_bytes());

    let mut store = BoardStore::open(storage);
    assert_eq!(store.state().columns().len(), 1);
    assert_eq!(store.state().columns()[0].board_id, DEFAULT_BOARD_ID);
    assert_eq!(store.state().tasks()[0].created_at.to_rfc3339(), "2023-01-02T00:00:00+00:00");

    store.add_task("fresh", None, column_id).unwrap();
    let bytes = store
        .persistence()
        .storage()
        .read(DEFAULT_STORAGE_KEY)
        .unwrap()
        .unwrap();
    let saved: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(saved["columns"][0]["boardId"], DEFAULT_BOARD_ID);
    assert_eq!(saved["tasks"].as_array().unwrap().len(), 2);
    assert_eq!(saved["tasks"][0]["id"], json!(task_id));
}

#[test]
fn malformed_slot_starts_empty_and_is_overwritten() {
    let storage = MemoryStorage::new().with_slot(DEFAULT_STORAGE_KEY, b"[1,2,".to_vec());
    let mut store = BoardStore::open(storage);
    assert!(store.state().columns().is_empty());

    store.add_column("Fresh").unwrap();
    let bytes = store
        .persistence()
        .storage()
        .read(DEFAULT_STORAGE_KEY)
        .unwrap()
        .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value["columns"][0]["title"], "Fresh");
}

#[test]
fn quota_failure_keeps_memory_state() {
    let mut store = BoardStore::open(MemoryStorage::new());
    let column = store.add_column("To Do").unwrap();
    let persisted = store
        .persistence()
        .storage()
        .read(DEFAULT_STORAGE_KEY)
        .unwrap();

    let mut storage = store.into_storage();
    storage.set_quota(Some(persisted.as_ref().map_or(0, Vec::len)));
    let mut store = BoardStore::open(storage);

    let task = store.add_task("too big to persist", None, column);
    assert!(task.is_some());
    assert_eq!(store.state().tasks().len(), 1);
    assert_eq!(
        store
            .persistence()
            .storage()
            .read(DEFAULT_STORAGE_KEY)
            .unwrap(),
        persisted
    );
}

#[test]
fn sqlite_slots_round_trip_and_remove() {
    let mut storage = SqliteSlotStorage::open_in_memory().unwrap();
    assert_eq!(storage.read("missing").unwrap(), None);

    storage.write("slot", b"one").unwrap();
    storage.write("slot", b"two").unwrap();
    assert_eq!(storage.read("slot").unwrap().as_deref(), Some(&b"two"[..]));

    storage.remove("slot").unwrap();
    storage.remove("slot").unwrap();
    assert_eq!(storage.read("slot").unwrap(), None);
}

#[test]
fn migrations_set_user_version() {
    let conn = open_db_in_memory().unwrap();
    let version: u32 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());
}

#[test]
fn newer_schema_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");
    {
        let conn = open_db(&path).unwrap();
        conn.pragma_update(None, "user_version", latest_version() + 1)
            .unwrap();
    }

    let err = open_db(&path).unwrap_err();
    assert!(matches!(err, StorageError::UnsupportedSchemaVersion { .. }));
    assert_eq!(err.code(), "schema_unsupported");
}
