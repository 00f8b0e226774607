//! Intents accepted by the board store and their outcomes.

use crate::model::column::{ColumnId, ColumnPatch};
use crate::model::task::{TaskId, TaskPatch};
use crate::ordering::IndexOutOfRange;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

/// Intent rejected before any state was touched.
///
/// Stale ids are not errors; they produce `Outcome::Unchanged`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    IndexOutOfRange { index: usize, len: usize },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} is out of range for {len} item(s)")
            }
        }
    }
}

impl Error for StoreError {}

impl From<IndexOutOfRange> for StoreError {
    fn from(value: IndexOutOfRange) -> Self {
        Self::IndexOutOfRange {
            index: value.index,
            len: value.len,
        }
    }
}

/// Named, parameterized request to mutate board state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    AddColumn {
        title: String,
        board_id: String,
    },
    UpdateColumn {
        id: ColumnId,
        patch: ColumnPatch,
    },
    DeleteColumn {
        id: ColumnId,
    },
    /// Indices address the column sequence sorted by `order`.
    ReorderColumns {
        start_index: usize,
        end_index: usize,
    },
    AddTask {
        title: String,
        description: Option<String>,
        column_id: ColumnId,
    },
    UpdateTask {
        id: TaskId,
        patch: TaskPatch,
    },
    DeleteTask {
        id: TaskId,
    },
    ToggleTaskCompleted {
        id: TaskId,
    },
    /// The source column and position are resolved from `task_id`.
    MoveTask {
        task_id: TaskId,
        dest_column_id: ColumnId,
        dest_index: usize,
    },
    SelectTask {
        id: TaskId,
    },
    DeselectTask {
        id: TaskId,
    },
    SelectAllTasks,
    SelectAllTasksInColumn {
        column_id: ColumnId,
    },
    DeselectAllTasks,
    DeselectAllTasksInColumn {
        column_id: ColumnId,
    },
    BulkDeleteTasks {
        task_ids: Vec<TaskId>,
    },
    /// Moved tasks are appended to the destination in `task_ids` order.
    BulkMoveTasks {
        task_ids: Vec<TaskId>,
        dest_column_id: ColumnId,
    },
    BulkToggleTasksCompleted {
        task_ids: Vec<TaskId>,
        completed: bool,
    },
    SetLoading {
        loading: bool,
    },
    SetError {
        message: Option<String>,
    },
    ClearError,
    ResetBoard,
}

impl Intent {
    /// Stable name used in log events.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddColumn { .. } => "add_column",
            Self::UpdateColumn { .. } => "update_column",
            Self::DeleteColumn { .. } => "delete_column",
            Self::ReorderColumns { .. } => "reorder_columns",
            Self::AddTask { .. } => "add_task",
            Self::UpdateTask { .. } => "update_task",
            Self::DeleteTask { .. } => "delete_task",
            Self::ToggleTaskCompleted { .. } => "toggle_task_completed",
            Self::MoveTask { .. } => "move_task",
            Self::SelectTask { .. } => "select_task",
            Self::DeselectTask { .. } => "deselect_task",
            Self::SelectAllTasks => "select_all_tasks",
            Self::SelectAllTasksInColumn { .. } => "select_all_tasks_in_column",
            Self::DeselectAllTasks => "deselect_all_tasks",
            Self::DeselectAllTasksInColumn { .. } => "deselect_all_tasks_in_column",
            Self::BulkDeleteTasks { .. } => "bulk_delete_tasks",
            Self::BulkMoveTasks { .. } => "bulk_move_tasks",
            Self::BulkToggleTasksCompleted { .. } => "bulk_toggle_tasks_completed",
            Self::SetLoading { .. } => "set_loading",
            Self::SetError { .. } => "set_error",
            Self::ClearError => "clear_error",
            Self::ResetBoard => "reset_board",
        }
    }
}

/// What an applied intent did to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A column or task was created; persisted data changed.
    Created(Uuid),
    /// Persisted data changed.
    Changed,
    /// Only the selection set or transient flags changed.
    Transient,
    /// Board cleared and persisted slot purged.
    Reset,
    /// Nothing changed (stale id, empty patch, idempotent request).
    Unchanged,
}

impl Outcome {
    /// Whether `{columns, tasks}` must be written to storage.
    pub fn requires_persist(self) -> bool {
        matches!(self, Self::Created(_) | Self::Changed)
    }

    pub fn created_id(self) -> Option<Uuid> {
        match self {
            Self::Created(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_unchanged(self) -> bool {
        self == Self::Unchanged
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Created(_) => "created",
            Self::Changed => "changed",
            Self::Transient => "transient",
            Self::Reset => "reset",
            Self::Unchanged => "unchanged",
        }
    }
}
