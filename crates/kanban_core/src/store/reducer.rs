//! Board reducer: `(state, intent) -> state`.
//!
//! # Responsibility
//! - Apply one intent atomically to a `BoardState`.
//! - Keep column and task ranks dense after every structural change.
//!
//! # Invariants
//! - Validation happens before the first write, so an `Err` leaves the state
//!   untouched.
//! - No task ever references a column that does not exist.
//! - Deleting or bulk-deleting tasks prunes them from the selection set.

use super::intent::{Intent, Outcome, StoreResult};
use super::state::BoardState;
use crate::model::column::{Column, ColumnId, ColumnPatch};
use crate::model::task::{Task, TaskId, TaskPatch};
use crate::ordering::{move_index, next_order, renumber, sort_by_order, IndexOutOfRange};
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Applies `intent` to `state`, stamping any timestamps with `now`.
pub fn reduce(state: &mut BoardState, intent: Intent, now: DateTime<Utc>) -> StoreResult<Outcome> {
    let outcome = match intent {
        Intent::AddColumn { title, board_id } => add_column(state, title, board_id),
        Intent::UpdateColumn { id, patch } => update_column(state, id, &patch),
        Intent::DeleteColumn { id } => delete_column(state, id),
        Intent::ReorderColumns {
            start_index,
            end_index,
        } => reorder_columns(state, start_index, end_index)?,
        Intent::AddTask {
            title,
            description,
            column_id,
        } => add_task(state, title, description, column_id, now),
        Intent::UpdateTask { id, patch } => update_task(state, id, &patch, now),
        Intent::DeleteTask { id } => delete_task(state, id),
        Intent::ToggleTaskCompleted { id } => toggle_task_completed(state, id, now),
        Intent::MoveTask {
            task_id,
            dest_column_id,
            dest_index,
        } => move_task(state, task_id, dest_column_id, dest_index)?,
        Intent::SelectTask { id } => {
            let exists = state.tasks.iter().any(|task| task.id == id);
            transient(exists && state.selected_task_ids.insert(id))
        }
        Intent::DeselectTask { id } => transient(state.selected_task_ids.remove(&id)),
        Intent::SelectAllTasks => {
            let all = state.tasks.iter().map(|task| task.id).collect();
            replace_selection(state, all)
        }
        Intent::SelectAllTasksInColumn { column_id } => {
            let mut selection = state.selected_task_ids.clone();
            selection.extend(column_task_ids(&state.tasks, column_id));
            replace_selection(state, selection)
        }
        Intent::DeselectAllTasks => replace_selection(state, BTreeSet::new()),
        Intent::DeselectAllTasksInColumn { column_id } => {
            let in_column: HashSet<TaskId> =
                column_task_ids(&state.tasks, column_id).into_iter().collect();
            let selection = state
                .selected_task_ids
                .iter()
                .filter(|id| !in_column.contains(*id))
                .copied()
                .collect();
            replace_selection(state, selection)
        }
        Intent::BulkDeleteTasks { task_ids } => bulk_delete_tasks(state, &task_ids),
        Intent::BulkMoveTasks {
            task_ids,
            dest_column_id,
        } => bulk_move_tasks(state, &task_ids, dest_column_id, now),
        Intent::BulkToggleTasksCompleted {
            task_ids,
            completed,
        } => bulk_toggle_tasks_completed(state, &task_ids, completed, now),
        Intent::SetLoading { loading } => {
            let changed = state.is_loading != loading;
            state.is_loading = loading;
            transient(changed)
        }
        Intent::SetError { message } => {
            let changed = state.error != message;
            state.error = message;
            transient(changed)
        }
        Intent::ClearError => transient(state.error.take().is_some()),
        Intent::ResetBoard => {
            state.columns.clear();
            state.tasks.clear();
            state.selected_task_ids.clear();
            state.error = None;
            Outcome::Reset
        }
    };
    Ok(outcome)
}

fn transient(changed: bool) -> Outcome {
    if changed {
        Outcome::Transient
    } else {
        Outcome::Unchanged
    }
}

fn changed(changed: bool) -> Outcome {
    if changed {
        Outcome::Changed
    } else {
        Outcome::Unchanged
    }
}

fn replace_selection(state: &mut BoardState, selection: BTreeSet<TaskId>) -> Outcome {
    if state.selected_task_ids == selection {
        return Outcome::Unchanged;
    }
    state.selected_task_ids = selection;
    Outcome::Transient
}

fn column_exists(state: &BoardState, id: ColumnId) -> bool {
    state.columns.iter().any(|column| column.id == id)
}

/// Ids of one column's tasks sorted by rank; ties keep storage order.
fn column_task_ids(tasks: &[Task], column_id: ColumnId) -> Vec<TaskId> {
    let mut ranked: Vec<(usize, TaskId)> = tasks
        .iter()
        .filter(|task| task.column_id == column_id)
        .map(|task| (task.order, task.id))
        .collect();
    ranked.sort_by_key(|(order, _)| *order);
    ranked.into_iter().map(|(_, id)| id).collect()
}

/// Sets each listed task's rank to its position in `ids`.
///
/// Returns whether any rank actually changed.
fn assign_orders(tasks: &mut [Task], ids: &[TaskId]) -> bool {
    let ranks: HashMap<TaskId, usize> = ids
        .iter()
        .enumerate()
        .map(|(rank, id)| (*id, rank))
        .collect();
    let mut changed = false;
    for task in tasks.iter_mut() {
        if let Some(&rank) = ranks.get(&task.id) {
            if task.order != rank {
                task.order = rank;
                changed = true;
            }
        }
    }
    changed
}

fn renumber_column_tasks(tasks: &mut [Task], column_id: ColumnId) -> bool {
    let ids = column_task_ids(tasks, column_id);
    assign_orders(tasks, &ids)
}

fn sorted_columns(columns: &[Column]) -> Vec<Column> {
    let mut sorted = columns.to_vec();
    sort_by_order(&mut sorted);
    sorted
}

fn add_column(state: &mut BoardState, title: String, board_id: String) -> Outcome {
    let column = Column::new(title, board_id, next_order(&state.columns));
    let id = column.id;
    state.columns.push(column);
    Outcome::Created(id)
}

fn update_column(state: &mut BoardState, id: ColumnId, patch: &ColumnPatch) -> Outcome {
    if patch.is_empty() {
        return Outcome::Unchanged;
    }
    match state.columns.iter_mut().find(|column| column.id == id) {
        Some(column) => {
            patch.apply_to(column);
            Outcome::Changed
        }
        None => Outcome::Unchanged,
    }
}

fn delete_column(state: &mut BoardState, id: ColumnId) -> Outcome {
    if !column_exists(state, id) {
        return Outcome::Unchanged;
    }

    state.columns.retain(|column| column.id != id);
    let selected = &mut state.selected_task_ids;
    state.tasks.retain(|task| {
        if task.column_id == id {
            selected.remove(&task.id);
            false
        } else {
            true
        }
    });

    let mut columns = sorted_columns(&state.columns);
    renumber(&mut columns);
    state.columns = columns;

    let remaining: Vec<ColumnId> = state.columns.iter().map(|column| column.id).collect();
    for column_id in remaining {
        renumber_column_tasks(&mut state.tasks, column_id);
    }
    Outcome::Changed
}

fn reorder_columns(
    state: &mut BoardState,
    start_index: usize,
    end_index: usize,
) -> StoreResult<Outcome> {
    let mut columns = sorted_columns(&state.columns);
    move_index(&mut columns, start_index, end_index)?;
    renumber(&mut columns);

    if columns == state.columns {
        return Ok(Outcome::Unchanged);
    }
    state.columns = columns;
    Ok(Outcome::Changed)
}

fn add_task(
    state: &mut BoardState,
    title: String,
    description: Option<String>,
    column_id: ColumnId,
    now: DateTime<Utc>,
) -> Outcome {
    if !column_exists(state, column_id) {
        return Outcome::Unchanged;
    }
    let order = next_order(state.tasks.iter().filter(|task| task.column_id == column_id));
    let task = Task::new(title, description, column_id, order, now);
    let id = task.id;
    state.tasks.push(task);
    Outcome::Created(id)
}

fn update_task(
    state: &mut BoardState,
    id: TaskId,
    patch: &TaskPatch,
    now: DateTime<Utc>,
) -> Outcome {
    if patch.is_empty() {
        return Outcome::Unchanged;
    }
    match state.tasks.iter_mut().find(|task| task.id == id) {
        Some(task) => {
            patch.apply_to(task, now);
            Outcome::Changed
        }
        None => Outcome::Unchanged,
    }
}

fn delete_task(state: &mut BoardState, id: TaskId) -> Outcome {
    let Some(position) = state.tasks.iter().position(|task| task.id == id) else {
        return Outcome::Unchanged;
    };
    let removed = state.tasks.remove(position);
    state.selected_task_ids.remove(&id);
    renumber_column_tasks(&mut state.tasks, removed.column_id);
    Outcome::Changed
}

fn toggle_task_completed(state: &mut BoardState, id: TaskId, now: DateTime<Utc>) -> Outcome {
    match state.tasks.iter_mut().find(|task| task.id == id) {
        Some(task) => {
            task.completed = !task.completed;
            task.touch(now);
            Outcome::Changed
        }
        None => Outcome::Unchanged,
    }
}

fn move_task(
    state: &mut BoardState,
    task_id: TaskId,
    dest_column_id: ColumnId,
    dest_index: usize,
) -> StoreResult<Outcome> {
    let Some(source_column_id) = state
        .tasks
        .iter()
        .find(|task| task.id == task_id)
        .map(|task| task.column_id)
    else {
        return Ok(Outcome::Unchanged);
    };
    if !column_exists(state, dest_column_id) {
        return Ok(Outcome::Unchanged);
    }

    let mut source_ids = column_task_ids(&state.tasks, source_column_id);
    let Some(source_index) = source_ids.iter().position(|id| *id == task_id) else {
        return Ok(Outcome::Unchanged);
    };

    if source_column_id == dest_column_id {
        move_index(&mut source_ids, source_index, dest_index)?;
        return Ok(changed(assign_orders(&mut state.tasks, &source_ids)));
    }

    let mut dest_ids = column_task_ids(&state.tasks, dest_column_id);
    if dest_index > dest_ids.len() {
        return Err(IndexOutOfRange {
            index: dest_index,
            len: dest_ids.len(),
        }
        .into());
    }

    source_ids.remove(source_index);
    dest_ids.insert(dest_index, task_id);
    if let Some(task) = state.tasks.iter_mut().find(|task| task.id == task_id) {
        task.column_id = dest_column_id;
    }
    assign_orders(&mut state.tasks, &source_ids);
    assign_orders(&mut state.tasks, &dest_ids);
    Ok(Outcome::Changed)
}

fn bulk_delete_tasks(state: &mut BoardState, task_ids: &[TaskId]) -> Outcome {
    let doomed: HashSet<TaskId> = task_ids.iter().copied().collect();
    let mut affected_columns = BTreeSet::new();
    state.tasks.retain(|task| {
        if doomed.contains(&task.id) {
            affected_columns.insert(task.column_id);
            false
        } else {
            true
        }
    });
    if affected_columns.is_empty() {
        return Outcome::Unchanged;
    }

    state.selected_task_ids.retain(|id| !doomed.contains(id));
    for column_id in affected_columns {
        renumber_column_tasks(&mut state.tasks, column_id);
    }
    Outcome::Changed
}

fn bulk_move_tasks(
    state: &mut BoardState,
    task_ids: &[TaskId],
    dest_column_id: ColumnId,
    now: DateTime<Utc>,
) -> Outcome {
    if !column_exists(state, dest_column_id) {
        return Outcome::Unchanged;
    }

    let existing: HashMap<TaskId, ColumnId> = state
        .tasks
        .iter()
        .map(|task| (task.id, task.column_id))
        .collect();
    let mut seen = HashSet::new();
    let moving: Vec<TaskId> = task_ids
        .iter()
        .copied()
        .filter(|id| existing.contains_key(id) && seen.insert(*id))
        .collect();
    if moving.is_empty() {
        return Outcome::Unchanged;
    }

    let source_columns: BTreeSet<ColumnId> = moving
        .iter()
        .filter_map(|id| existing.get(id).copied())
        .filter(|column_id| *column_id != dest_column_id)
        .collect();

    let mut dest_ids: Vec<TaskId> = column_task_ids(&state.tasks, dest_column_id)
        .into_iter()
        .filter(|id| !seen.contains(id))
        .collect();
    dest_ids.extend(moving.iter().copied());

    for task in state.tasks.iter_mut().filter(|task| seen.contains(&task.id)) {
        task.column_id = dest_column_id;
        task.touch(now);
    }
    assign_orders(&mut state.tasks, &dest_ids);
    for column_id in source_columns {
        renumber_column_tasks(&mut state.tasks, column_id);
    }

    state.selected_task_ids.retain(|id| !seen.contains(id));
    Outcome::Changed
}

fn bulk_toggle_tasks_completed(
    state: &mut BoardState,
    task_ids: &[TaskId],
    completed: bool,
    now: DateTime<Utc>,
) -> Outcome {
    let targets: HashSet<TaskId> = task_ids.iter().copied().collect();
    let mut touched = false;
    for task in state.tasks.iter_mut().filter(|task| targets.contains(&task.id)) {
        task.completed = completed;
        task.touch(now);
        touched = true;
    }
    changed(touched)
}
