//! Board state snapshot owned by the store.
//!
//! # Invariants
//! - `selected_task_ids` only contains ids of existing tasks.
//! - Fields are only mutated by the reducer; readers get shared references.

use crate::model::column::Column;
use crate::model::task::{Task, TaskId};
use crate::persistence::BoardSnapshot;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardState {
    pub(crate) columns: Vec<Column>,
    pub(crate) tasks: Vec<Task>,
    pub(crate) selected_task_ids: BTreeSet<TaskId>,
    pub(crate) is_loading: bool,
    pub(crate) error: Option<String>,
}

impl BoardState {
    /// Empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Board hydrated from a persisted snapshot, with nothing selected.
    pub fn from_snapshot(snapshot: BoardSnapshot) -> Self {
        Self {
            columns: snapshot.columns,
            tasks: snapshot.tasks,
            ..Self::default()
        }
    }

    /// Columns in storage order. Use `selectors::columns` for display order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Tasks in storage order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn selected_task_ids(&self) -> &BTreeSet<TaskId> {
        &self.selected_task_ids
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Copies the durable part of the state.
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            columns: self.columns.clone(),
            tasks: self.tasks.clone(),
        }
    }
}
