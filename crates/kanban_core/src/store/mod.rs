//! Board store: owns the state, applies intents and persists the result.
//!
//! # Responsibility
//! - Hydrate `BoardState` from the persistence adapter on construction.
//! - Route every intent through the reducer, then write `{columns, tasks}`
//!   back whenever persisted data changed.
//!
//! # Invariants
//! - A rejected intent leaves both memory and storage untouched.
//! - Storage failures never roll back the in-memory state.
//! - Selection and transient flags never trigger a write.

pub mod intent;
pub mod reducer;
pub mod selectors;
pub mod state;

use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::model::column::{ColumnId, ColumnPatch, DEFAULT_BOARD_ID};
use crate::model::task::{TaskId, TaskPatch};
use crate::persistence::BoardPersistence;
use crate::storage::SlotStorage;
use intent::{Intent, Outcome, StoreResult};
use log::{debug, info, warn};
use state::BoardState;

/// Explicitly constructed board store over an injected slot storage.
pub struct BoardStore<S: SlotStorage, C: Clock = SystemClock> {
    state: BoardState,
    persistence: BoardPersistence<S>,
    clock: C,
}

impl<S: SlotStorage> BoardStore<S> {
    /// Opens a store on `storage` with the default slot key and wall clock.
    pub fn open(storage: S) -> Self {
        Self::with_config(storage, StoreConfig::default())
    }

    pub fn with_config(storage: S, config: StoreConfig) -> Self {
        Self::with_clock(storage, config, SystemClock)
    }
}

impl<S: SlotStorage, C: Clock> BoardStore<S, C> {
    /// Opens a store with an explicit time source.
    pub fn with_clock(storage: S, config: StoreConfig, clock: C) -> Self {
        let persistence = BoardPersistence::new(storage, config.storage_key);
        let snapshot = persistence.load(clock.now());
        info!(
            "event=board_hydrate module=store status=ok key={} columns={} tasks={}",
            persistence.key(),
            snapshot.columns.len(),
            snapshot.tasks.len()
        );
        Self {
            state: BoardState::from_snapshot(snapshot),
            persistence,
            clock,
        }
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    pub fn persistence(&self) -> &BoardPersistence<S> {
        &self.persistence
    }

    pub fn into_storage(self) -> S {
        self.persistence.into_storage()
    }

    /// Applies one intent and persists when durable data changed.
    pub fn dispatch(&mut self, intent: Intent) -> StoreResult<Outcome> {
        let name = intent.name();
        let outcome = match reducer::reduce(&mut self.state, intent, self.clock.now()) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(
                    "event=intent_rejected module=store status=error intent={} error={}",
                    name, err
                );
                return Err(err);
            }
        };

        match outcome {
            Outcome::Created(_) | Outcome::Changed => {
                self.persistence
                    .save(self.state.columns(), self.state.tasks());
            }
            Outcome::Reset => {
                self.persistence.clear();
            }
            Outcome::Transient | Outcome::Unchanged => {}
        }
        debug!(
            "event=intent_applied module=store status=ok intent={} outcome={}",
            name,
            outcome.label()
        );
        Ok(outcome)
    }

    /// Adds a column on the default board. Returns its id.
    pub fn add_column(&mut self, title: impl Into<String>) -> Option<ColumnId> {
        self.add_column_to_board(title, DEFAULT_BOARD_ID)
    }

    pub fn add_column_to_board(
        &mut self,
        title: impl Into<String>,
        board_id: impl Into<String>,
    ) -> Option<ColumnId> {
        self.dispatch(Intent::AddColumn {
            title: title.into(),
            board_id: board_id.into(),
        })
        .ok()
        .and_then(Outcome::created_id)
    }

    pub fn update_column(&mut self, id: ColumnId, patch: ColumnPatch) -> StoreResult<Outcome> {
        self.dispatch(Intent::UpdateColumn { id, patch })
    }

    pub fn delete_column(&mut self, id: ColumnId) -> StoreResult<Outcome> {
        self.dispatch(Intent::DeleteColumn { id })
    }

    pub fn reorder_columns(
        &mut self,
        start_index: usize,
        end_index: usize,
    ) -> StoreResult<Outcome> {
        self.dispatch(Intent::ReorderColumns {
            start_index,
            end_index,
        })
    }

    /// Appends a task to `column_id`. Returns `None` when the column is unknown.
    pub fn add_task(
        &mut self,
        title: impl Into<String>,
        description: Option<String>,
        column_id: ColumnId,
    ) -> Option<TaskId> {
        self.dispatch(Intent::AddTask {
            title: title.into(),
            description,
            column_id,
        })
        .ok()
        .and_then(Outcome::created_id)
    }

    pub fn update_task(&mut self, id: TaskId, patch: TaskPatch) -> StoreResult<Outcome> {
        self.dispatch(Intent::UpdateTask { id, patch })
    }

    pub fn delete_task(&mut self, id: TaskId) -> StoreResult<Outcome> {
        self.dispatch(Intent::DeleteTask { id })
    }

    pub fn toggle_task_completed(&mut self, id: TaskId) -> StoreResult<Outcome> {
        self.dispatch(Intent::ToggleTaskCompleted { id })
    }

    pub fn move_task(
        &mut self,
        task_id: TaskId,
        dest_column_id: ColumnId,
        dest_index: usize,
    ) -> StoreResult<Outcome> {
        self.dispatch(Intent::MoveTask {
            task_id,
            dest_column_id,
            dest_index,
        })
    }

    pub fn select_task(&mut self, id: TaskId) -> StoreResult<Outcome> {
        self.dispatch(Intent::SelectTask { id })
    }

    pub fn deselect_task(&mut self, id: TaskId) -> StoreResult<Outcome> {
        self.dispatch(Intent::DeselectTask { id })
    }

    pub fn select_all_tasks(&mut self) -> StoreResult<Outcome> {
        self.dispatch(Intent::SelectAllTasks)
    }

    pub fn select_all_tasks_in_column(&mut self, column_id: ColumnId) -> StoreResult<Outcome> {
        self.dispatch(Intent::SelectAllTasksInColumn { column_id })
    }

    pub fn deselect_all_tasks(&mut self) -> StoreResult<Outcome> {
        self.dispatch(Intent::DeselectAllTasks)
    }

    pub fn deselect_all_tasks_in_column(&mut self, column_id: ColumnId) -> StoreResult<Outcome> {
        self.dispatch(Intent::DeselectAllTasksInColumn { column_id })
    }

    pub fn bulk_delete_tasks(&mut self, task_ids: Vec<TaskId>) -> StoreResult<Outcome> {
        self.dispatch(Intent::BulkDeleteTasks { task_ids })
    }

    pub fn bulk_move_tasks(
        &mut self,
        task_ids: Vec<TaskId>,
        dest_column_id: ColumnId,
    ) -> StoreResult<Outcome> {
        self.dispatch(Intent::BulkMoveTasks {
            task_ids,
            dest_column_id,
        })
    }

    pub fn bulk_toggle_tasks_completed(
        &mut self,
        task_ids: Vec<TaskId>,
        completed: bool,
    ) -> StoreResult<Outcome> {
        self.dispatch(Intent::BulkToggleTasksCompleted {
            task_ids,
            completed,
        })
    }

    pub fn set_loading(&mut self, loading: bool) -> StoreResult<Outcome> {
        self.dispatch(Intent::SetLoading { loading })
    }

    pub fn set_error(&mut self, message: Option<String>) -> StoreResult<Outcome> {
        self.dispatch(Intent::SetError { message })
    }

    pub fn clear_error(&mut self) -> StoreResult<Outcome> {
        self.dispatch(Intent::ClearError)
    }

    /// Empties the board and purges the persisted slot.
    pub fn reset_board(&mut self) -> StoreResult<Outcome> {
        self.dispatch(Intent::ResetBoard)
    }
}

#[cfg(test)]
mod tests {
    use super::BoardStore;
    use crate::clock::ManualClock;
    use crate::config::StoreConfig;
    use crate::model::task::TaskPatch;
    use crate::storage::{MemoryStorage, SlotStorage};
    use chrono::{Duration, TimeZone, Utc};

    const KEY: &str = "mytrello_board_state";

    fn clock() -> ManualClock {
        ManualClock::new(
            Utc.timestamp_opt(1_700_000_000, 0)
                .single()
                .expect("valid timestamp"),
        )
    }

    #[test]
    fn transient_intents_do_not_write() {
        let mut store = BoardStore::open(MemoryStorage::new());
        let column = store.add_column("To Do").expect("column created");
        let task = store.add_task("a", None, column).expect("task created");
        let writes = store.persistence().storage().write_count();

        store.select_task(task).expect("select");
        store.set_loading(true).expect("loading");
        store.set_error(Some("boom".to_string())).expect("error");
        store.deselect_all_tasks().expect("deselect");

        assert_eq!(store.persistence().storage().write_count(), writes);
    }

    #[test]
    fn unchanged_intents_do_not_write() {
        let mut store = BoardStore::open(MemoryStorage::new());
        let column = store.add_column("To Do").expect("column created");
        let writes = store.persistence().storage().write_count();

        store
            .update_column(column, Default::default())
            .expect("empty patch");
        store.delete_task(uuid::Uuid::new_v4()).expect("stale id");

        assert_eq!(store.persistence().storage().write_count(), writes);
    }

    #[test]
    fn rejected_intent_leaves_storage_untouched() {
        let mut store = BoardStore::open(MemoryStorage::new());
        store.add_column("To Do").expect("column created");
        let before = store.persistence().storage().read(KEY).expect("read");

        assert!(store.reorder_columns(0, 5).is_err());
        assert_eq!(store.persistence().storage().read(KEY).expect("read"), before);
    }

    #[test]
    fn update_stamps_time_from_clock() {
        let clock = clock();
        let mut store =
            BoardStore::with_clock(MemoryStorage::new(), StoreConfig::default(), clock.clone());
        let column = store.add_column("To Do").expect("column created");
        let task = store.add_task("a", None, column).expect("task created");

        clock.advance(Duration::seconds(5));
        store
            .update_task(task, TaskPatch::title("b"))
            .expect("update");

        let stored = &store.state().tasks()[0];
        assert_eq!(stored.updated_at - stored.created_at, Duration::seconds(5));
    }

    #[test]
    fn reset_purges_slot() {
        let mut store = BoardStore::open(MemoryStorage::new());
        store.add_column("To Do").expect("column created");
        assert!(store.persistence().storage().contains(KEY));

        store.reset_board().expect("reset");
        assert!(!store.persistence().storage().contains(KEY));
        assert!(store.state().columns().is_empty());
    }

    #[test]
    fn custom_key_is_used() {
        let mut store = BoardStore::with_config(
            MemoryStorage::new(),
            StoreConfig::with_storage_key("other_board"),
        );
        store.add_column("To Do").expect("column created");

        let storage = store.into_storage();
        assert!(storage.contains("other_board"));
        assert!(!storage.contains(KEY));
    }
}
