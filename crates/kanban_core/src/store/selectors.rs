//! Pure read projections over a `BoardState` snapshot.
//!
//! Every selector takes the state explicitly and allocates its own result, so
//! views can call them between intents without holding the store.

use super::state::BoardState;
use crate::model::column::{Column, ColumnId};
use crate::model::task::{Task, TaskId};
use crate::ordering::sort_by_order;
use std::collections::BTreeSet;

/// Completion filter offered by the board header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Incomplete,
}

impl StatusFilter {
    fn accepts(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Completed => task.completed,
            Self::Incomplete => !task.completed,
        }
    }
}

/// Status filter plus free-text search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: StatusFilter,
    /// Case-insensitive substring over title and description. Blank matches all.
    pub query: String,
}

impl TaskFilter {
    pub fn new(status: StatusFilter, query: impl Into<String>) -> Self {
        Self {
            status,
            query: query.into(),
        }
    }

    fn matcher(&self) -> impl Fn(&Task) -> bool + '_ {
        let needle = self.query.trim().to_lowercase();
        move |task| {
            self.status.accepts(task) && (needle.is_empty() || task.matches_lowercase(&needle))
        }
    }
}

/// Per-column counters for headers and bulk panels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSummary {
    pub column_id: ColumnId,
    pub title: String,
    pub order: usize,
    pub total: usize,
    pub completed: usize,
    pub selected: usize,
}

/// Columns sorted by `order`.
pub fn columns(state: &BoardState) -> Vec<Column> {
    let mut columns = state.columns().to_vec();
    sort_by_order(&mut columns);
    columns
}

/// All tasks sorted by `order` (ranks repeat across columns).
pub fn tasks(state: &BoardState) -> Vec<Task> {
    let mut tasks = state.tasks().to_vec();
    sort_by_order(&mut tasks);
    tasks
}

/// One column's tasks sorted by `order`.
pub fn tasks_by_column(state: &BoardState, column_id: ColumnId) -> Vec<Task> {
    let mut tasks: Vec<Task> = state
        .tasks()
        .iter()
        .filter(|task| task.column_id == column_id)
        .cloned()
        .collect();
    sort_by_order(&mut tasks);
    tasks
}

pub fn column_by_id(state: &BoardState, column_id: ColumnId) -> Option<&Column> {
    state.columns().iter().find(|column| column.id == column_id)
}

pub fn task_by_id(state: &BoardState, task_id: TaskId) -> Option<&Task> {
    state.tasks().iter().find(|task| task.id == task_id)
}

pub fn is_loading(state: &BoardState) -> bool {
    state.is_loading()
}

pub fn error(state: &BoardState) -> Option<&str> {
    state.error()
}

pub fn selected_task_ids(state: &BoardState) -> &BTreeSet<TaskId> {
    state.selected_task_ids()
}

/// Selected tasks in storage order.
pub fn selected_tasks(state: &BoardState) -> Vec<&Task> {
    state
        .tasks()
        .iter()
        .filter(|task| state.selected_task_ids().contains(&task.id))
        .collect()
}

pub fn has_selected_tasks(state: &BoardState) -> bool {
    !state.selected_task_ids().is_empty()
}

pub fn selected_tasks_count(state: &BoardState) -> usize {
    state.selected_task_ids().len()
}

/// True iff the column has at least one task and every one is selected.
pub fn all_tasks_in_column_selected(state: &BoardState, column_id: ColumnId) -> bool {
    let mut in_column = state
        .tasks()
        .iter()
        .filter(|task| task.column_id == column_id)
        .peekable();
    if in_column.peek().is_none() {
        return false;
    }
    in_column.all(|task| state.selected_task_ids().contains(&task.id))
}

pub fn selected_tasks_in_column_count(state: &BoardState, column_id: ColumnId) -> usize {
    state
        .tasks()
        .iter()
        .filter(|task| {
            task.column_id == column_id && state.selected_task_ids().contains(&task.id)
        })
        .count()
}

/// Tasks matching `filter`, sorted by `order`.
pub fn filter_tasks(state: &BoardState, filter: &TaskFilter) -> Vec<Task> {
    let matches = filter.matcher();
    let mut tasks: Vec<Task> = state
        .tasks()
        .iter()
        .filter(|task| matches(task))
        .cloned()
        .collect();
    sort_by_order(&mut tasks);
    tasks
}

/// One column's tasks matching `filter`, sorted by `order`.
pub fn filter_tasks_in_column(
    state: &BoardState,
    column_id: ColumnId,
    filter: &TaskFilter,
) -> Vec<Task> {
    let matches = filter.matcher();
    let mut tasks: Vec<Task> = state
        .tasks()
        .iter()
        .filter(|task| task.column_id == column_id && matches(task))
        .cloned()
        .collect();
    sort_by_order(&mut tasks);
    tasks
}

/// Counters for every column, in column order.
pub fn board_summary(state: &BoardState) -> Vec<ColumnSummary> {
    columns(state)
        .into_iter()
        .map(|column| {
            let mut summary = ColumnSummary {
                column_id: column.id,
                title: column.title,
                order: column.order,
                total: 0,
                completed: 0,
                selected: 0,
            };
            for task in state.tasks().iter().filter(|task| task.column_id == column.id) {
                summary.total += 1;
                summary.completed += usize::from(task.completed);
                summary.selected += usize::from(state.selected_task_ids().contains(&task.id));
            }
            summary
        })
        .collect()
}
