//! Column domain model.
//!
//! # Invariants
//! - `id` never changes after creation.
//! - `order` is dense across the board's column set.

use super::Ordered;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a board column.
pub type ColumnId = Uuid;

/// Board id used when callers do not manage boards themselves.
pub const DEFAULT_BOARD_ID: &str = "board_1";

/// Ordered container of tasks within the single board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
    /// Dense rank among all columns.
    pub order: usize,
    /// Owning board. Only one board exists; kept for the storage shape.
    pub board_id: String,
}

impl Column {
    /// Creates a column with a freshly generated id.
    pub fn new(title: impl Into<String>, board_id: impl Into<String>, order: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            order,
            board_id: board_id.into(),
        }
    }
}

impl Ordered for Column {
    fn order(&self) -> usize {
        self.order
    }

    fn set_order(&mut self, order: usize) {
        self.order = order;
    }
}

/// Fields a caller may change on an existing column.
///
/// `id`, `order` and `board_id` are owned by the store and cannot be patched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnPatch {
    pub title: Option<String>,
}

impl ColumnPatch {
    /// Patch that renames a column.
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
        }
    }

    /// Returns whether the patch carries no field at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
    }

    /// Shallow-merges the patch into `column`.
    pub fn apply_to(&self, column: &mut Column) {
        if let Some(title) = &self.title {
            column.title = title.clone();
        }
    }
}
