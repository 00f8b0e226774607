//! FFI intent and selector API for the board view layer.
//!
//! # Responsibility
//! - Own the process-wide board store opened on the SQLite slot file.
//! - Expose every board intent and selector as a sync FRB function.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Ids cross the boundary as hyphenated UUID strings.
//! - Timestamps cross the boundary as epoch milliseconds.

use kanban_core::store::selectors;
use kanban_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    BoardState, BoardStore, Column, ColumnPatch, ColumnSummary, Outcome,
    SqliteSlotStorage, StatusFilter, StoreResult, Task, TaskFilter, TaskPatch,
};
use log::error;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

type SharedStore = BoardStore<SqliteSlotStorage>;

static STORE: Mutex<Option<SharedStore>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes rolling file logs once per process.
///
/// # FFI contract
/// - Idempotent for the same `level + log_dir`.
/// - Returns an empty string on success and the error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Column projection for the view layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnView {
    pub id: String,
    pub title: String,
    pub order: u32,
    pub board_id: String,
}

/// Task projection for the view layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskView {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub column_id: String,
    pub order: u32,
    pub completed: bool,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

/// Full board state, columns and tasks sorted by `order`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    pub columns: Vec<ColumnView>,
    pub tasks: Vec<TaskView>,
    pub selected_task_ids: Vec<String>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Per-column counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSummaryView {
    pub column_id: String,
    pub title: String,
    pub order: u32,
    pub total: u32,
    pub completed: u32,
    pub selected: u32,
}

/// Result envelope shared by every intent call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardActionResponse {
    /// Whether the intent was accepted.
    pub ok: bool,
    /// Whether board state changed.
    pub changed: bool,
    /// Id of the created column or task.
    pub id: Option<String>,
    /// Human-readable diagnostics.
    pub message: String,
}

impl BoardActionResponse {
    fn from_outcome(op: &str, outcome: Outcome) -> Self {
        let (changed, message) = match outcome {
            Outcome::Created(_) => (true, format!("{op}: created.")),
            Outcome::Changed | Outcome::Transient => (true, format!("{op}: applied.")),
            Outcome::Reset => (true, format!("{op}: board reset.")),
            Outcome::Unchanged => (false, format!("{op}: nothing to change.")),
        };
        Self {
            ok: true,
            changed,
            id: outcome.created_id().map(|id| id.to_string()),
            message,
        }
    }

    fn failure(op: &str, reason: impl std::fmt::Display) -> Self {
        Self {
            ok: false,
            changed: false,
            id: None,
            message: format!("{op} failed: {reason}"),
        }
    }
}

/// Full board snapshot. Returns an empty board when the store cannot open.
#[flutter_rust_bridge::frb(sync)]
pub fn board_state() -> BoardView {
    read_board(|state| BoardView {
        columns: selectors::columns(state).iter().map(to_column_view).collect(),
        tasks: selectors::tasks(state).iter().map(to_task_view).collect(),
        selected_task_ids: state
            .selected_task_ids()
            .iter()
            .map(Uuid::to_string)
            .collect(),
        is_loading: state.is_loading(),
        error: state.error().map(str::to_owned),
    })
    .unwrap_or_else(|err| BoardView {
        columns: Vec::new(),
        tasks: Vec::new(),
        selected_task_ids: Vec::new(),
        is_loading: false,
        error: Some(err),
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_add_column(title: String) -> BoardActionResponse {
    act("board_add_column", |store| {
        Ok(store
            .add_column(title.trim())
            .map_or(Outcome::Unchanged, Outcome::Created))
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_rename_column(column_id: String, title: String) -> BoardActionResponse {
    act_with_ids("board_rename_column", &[column_id.as_str()], |store, ids| {
        store.update_column(ids[0], ColumnPatch::title(title.trim()))
    })
}

/// Deletes a column and every task in it.
#[flutter_rust_bridge::frb(sync)]
pub fn board_delete_column(column_id: String) -> BoardActionResponse {
    act_with_ids("board_delete_column", &[column_id.as_str()], |store, ids| {
        store.delete_column(ids[0])
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_reorder_columns(start_index: u32, end_index: u32) -> BoardActionResponse {
    act("board_reorder_columns", |store| {
        store.reorder_columns(start_index as usize, end_index as usize)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_add_task(
    title: String,
    description: Option<String>,
    column_id: String,
) -> BoardActionResponse {
    act_with_ids("board_add_task", &[column_id.as_str()], |store, ids| {
        let description = description
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());
        Ok(store
            .add_task(title.trim(), description, ids[0])
            .map_or(Outcome::Unchanged, Outcome::Created))
    })
}

/// Patches a task. `None` fields are left untouched; `clear_description`
/// removes the description.
#[flutter_rust_bridge::frb(sync)]
pub fn board_update_task(
    task_id: String,
    title: Option<String>,
    description: Option<String>,
    clear_description: bool,
    completed: Option<bool>,
) -> BoardActionResponse {
    let patch = TaskPatch {
        title: title.map(|text| text.trim().to_string()),
        description: if clear_description {
            Some(None)
        } else {
            description.map(Some)
        },
        completed,
    };
    act_with_ids("board_update_task", &[task_id.as_str()], |store, ids| {
        store.update_task(ids[0], patch)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_delete_task(task_id: String) -> BoardActionResponse {
    act_with_ids("board_delete_task", &[task_id.as_str()], |store, ids| {
        store.delete_task(ids[0])
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_toggle_task_completed(task_id: String) -> BoardActionResponse {
    act_with_ids("board_toggle_task_completed", &[task_id.as_str()], |store, ids| {
        store.toggle_task_completed(ids[0])
    })
}

/// Moves a task to `dest_index` of `dest_column_id`.
///
/// The source column and position are resolved from `task_id`.
#[flutter_rust_bridge::frb(sync)]
pub fn board_move_task(
    task_id: String,
    dest_column_id: String,
    dest_index: u32,
) -> BoardActionResponse {
    act_with_ids(
        "board_move_task",
        &[task_id.as_str(), dest_column_id.as_str()],
        |store, ids| store.move_task(ids[0], ids[1], dest_index as usize),
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_select_task(task_id: String) -> BoardActionResponse {
    act_with_ids("board_select_task", &[task_id.as_str()], |store, ids| {
        store.select_task(ids[0])
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_deselect_task(task_id: String) -> BoardActionResponse {
    act_with_ids("board_deselect_task", &[task_id.as_str()], |store, ids| {
        store.deselect_task(ids[0])
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_select_all_tasks() -> BoardActionResponse {
    act("board_select_all_tasks", |store| store.select_all_tasks())
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_select_all_tasks_in_column(column_id: String) -> BoardActionResponse {
    act_with_ids(
        "board_select_all_tasks_in_column",
        &[column_id.as_str()],
        |store, ids| store.select_all_tasks_in_column(ids[0]),
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_deselect_all_tasks() -> BoardActionResponse {
    act("board_deselect_all_tasks", |store| store.deselect_all_tasks())
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_deselect_all_tasks_in_column(column_id: String) -> BoardActionResponse {
    act_with_ids(
        "board_deselect_all_tasks_in_column",
        &[column_id.as_str()],
        |store, ids| store.deselect_all_tasks_in_column(ids[0]),
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_bulk_delete_tasks(task_ids: Vec<String>) -> BoardActionResponse {
    let refs: Vec<&str> = task_ids.iter().map(String::as_str).collect();
    act_with_ids("board_bulk_delete_tasks", &refs, |store, ids| {
        store.bulk_delete_tasks(ids)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_bulk_move_tasks(task_ids: Vec<String>, dest_column_id: String) -> BoardActionResponse {
    let mut refs: Vec<&str> = vec![dest_column_id.as_str()];
    refs.extend(task_ids.iter().map(String::as_str));
    act_with_ids("board_bulk_move_tasks", &refs, |store, mut ids| {
        let dest = ids.remove(0);
        store.bulk_move_tasks(ids, dest)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_bulk_set_completed(task_ids: Vec<String>, completed: bool) -> BoardActionResponse {
    let refs: Vec<&str> = task_ids.iter().map(String::as_str).collect();
    act_with_ids("board_bulk_set_completed", &refs, |store, ids| {
        store.bulk_toggle_tasks_completed(ids, completed)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_set_loading(loading: bool) -> BoardActionResponse {
    act("board_set_loading", |store| store.set_loading(loading))
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_set_error(message: Option<String>) -> BoardActionResponse {
    act("board_set_error", |store| store.set_error(message))
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_clear_error() -> BoardActionResponse {
    act("board_clear_error", |store| store.clear_error())
}

/// Empties the board and purges the persisted slot.
#[flutter_rust_bridge::frb(sync)]
pub fn board_reset() -> BoardActionResponse {
    act("board_reset", |store| store.reset_board())
}

/// Tasks of one column sorted by `order`, filtered by status and search text.
///
/// `status` is `all|completed|incomplete`; anything else means `all`.
#[flutter_rust_bridge::frb(sync)]
pub fn board_filter_tasks(
    status: String,
    query: String,
    column_id: Option<String>,
) -> Vec<TaskView> {
    let filter = TaskFilter::new(parse_status(&status), query);
    let column = match column_id.as_deref().map(parse_id).transpose() {
        Ok(column) => column,
        Err(_) => return Vec::new(),
    };
    read_board(|state| {
        let tasks = match column {
            Some(column_id) => selectors::filter_tasks_in_column(state, column_id, &filter),
            None => selectors::filter_tasks(state, &filter),
        };
        tasks.iter().map(to_task_view).collect()
    })
    .unwrap_or_default()
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_selected_tasks() -> Vec<TaskView> {
    read_board(|state| {
        selectors::selected_tasks(state)
            .into_iter()
            .map(to_task_view)
            .collect()
    })
    .unwrap_or_default()
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_has_selected_tasks() -> bool {
    read_board(selectors::has_selected_tasks).unwrap_or(false)
}

/// False for empty columns and unknown ids.
#[flutter_rust_bridge::frb(sync)]
pub fn board_all_tasks_in_column_selected(column_id: String) -> bool {
    let Ok(column_id) = parse_id(&column_id) else {
        return false;
    };
    read_board(|state| selectors::all_tasks_in_column_selected(state, column_id)).unwrap_or(false)
}

#[flutter_rust_bridge::frb(sync)]
pub fn board_summary() -> Vec<ColumnSummaryView> {
    read_board(|state| {
        selectors::board_summary(state)
            .iter()
            .map(to_summary_view)
            .collect()
    })
    .unwrap_or_default()
}

fn with_store<T>(f: impl FnOnce(&mut SharedStore) -> T) -> Result<T, String> {
    let mut guard = STORE.lock().unwrap_or_else(PoisonError::into_inner);
    if guard.is_none() {
        let path = board_db_path();
        let storage = SqliteSlotStorage::open(&path).map_err(|err| {
            error!(
                "event=ffi_store_open module=ffi status=error path={} error={}",
                path.display(),
                err
            );
            format!("board store open failed: {err}")
        })?;
        *guard = Some(BoardStore::open(storage));
    }
    match guard.as_mut() {
        Some(store) => Ok(f(store)),
        None => Err("board store unavailable".to_string()),
    }
}

#[cfg(not(test))]
fn board_db_path() -> PathBuf {
    kanban_core::resolve_db_path(None)
}

#[cfg(test)]
fn board_db_path() -> PathBuf {
    tests::scratch_db_path()
}

fn read_board<T>(f: impl FnOnce(&BoardState) -> T) -> Result<T, String> {
    with_store(|store| f(store.state()))
}

fn act(op: &str, f: impl FnOnce(&mut SharedStore) -> StoreResult<Outcome>) -> BoardActionResponse {
    match with_store(f) {
        Ok(Ok(outcome)) => BoardActionResponse::from_outcome(op, outcome),
        Ok(Err(err)) => BoardActionResponse::failure(op, err),
        Err(err) => BoardActionResponse::failure(op, err),
    }
}

fn act_with_ids(
    op: &str,
    raw_ids: &[&str],
    f: impl FnOnce(&mut SharedStore, Vec<Uuid>) -> StoreResult<Outcome>,
) -> BoardActionResponse {
    let ids = match raw_ids
        .iter()
        .map(|raw| parse_id(raw))
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(ids) => ids,
        Err(err) => return BoardActionResponse::failure(op, err),
    };
    act(op, |store| f(store, ids))
}

fn parse_id(raw: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid id `{}`", raw.trim()))
}

fn parse_status(raw: &str) -> StatusFilter {
    match raw.trim().to_ascii_lowercase().as_str() {
        "completed" | "done" => StatusFilter::Completed,
        "incomplete" | "open" => StatusFilter::Incomplete,
        _ => StatusFilter::All,
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn to_column_view(column: &Column) -> ColumnView {
    ColumnView {
        id: column.id.to_string(),
        title: column.title.clone(),
        order: to_u32(column.order),
        board_id: column.board_id.clone(),
    }
}

fn to_task_view(task: &Task) -> TaskView {
    TaskView {
        id: task.id.to_string(),
        title: task.title.clone(),
        description: task.description.clone(),
        column_id: task.column_id.to_string(),
        order: to_u32(task.order),
        completed: task.completed,
        created_at_ms: task.created_at.timestamp_millis(),
        updated_at_ms: task.updated_at.timestamp_millis(),
    }
}

fn to_summary_view(summary: &ColumnSummary) -> ColumnSummaryView {
    ColumnSummaryView {
        column_id: summary.column_id.to_string(),
        title: summary.title.clone(),
        order: to_u32(summary.order),
        total: to_u32(summary.total),
        completed: to_u32(summary.completed),
        selected: to_u32(summary.selected),
    }
}
