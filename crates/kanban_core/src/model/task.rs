//! Task domain model.
//!
//! # Responsibility
//! - Define the task record and its patch shape.
//!
//! # Invariants
//! - A task belongs to exactly one column through `column_id`.
//! - `order` is dense within the owning column's task set.
//! - `updated_at` is never earlier than `created_at` for store-created tasks.

use super::column::ColumnId;
use super::Ordered;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a task.
pub type TaskId = Uuid;

/// Unit of work belonging to one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub column_id: ColumnId,
    /// Dense rank inside `column_id`.
    pub order: usize,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates an incomplete task with a freshly generated id.
    pub fn new(
        title: impl Into<String>,
        description: Option<String>,
        column_id: ColumnId,
        order: usize,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description,
            column_id,
            order,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets `updated_at` to `now`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    /// Case-insensitive match of `needle` against title and description.
    ///
    /// `needle` must already be lowercase.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        if self.title.to_lowercase().contains(needle) {
            return true;
        }
        self.description
            .as_deref()
            .is_some_and(|description| description.to_lowercase().contains(needle))
    }
}

impl Ordered for Task {
    fn order(&self) -> usize {
        self.order
    }

    fn set_order(&mut self, order: usize) {
        self.order = order;
    }
}

/// Fields a caller may change on an existing task.
///
/// Column membership and rank only change through move intents.
/// `description: Some(None)` clears the description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn description(description: Option<String>) -> Self {
        Self {
            description: Some(description),
            ..Self::default()
        }
    }

    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    /// Returns whether the patch carries no field at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }

    /// Shallow-merges the patch into `task` and stamps `updated_at`.
    pub fn apply_to(&self, task: &mut Task, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        task.touch(now);
    }
}

#[cfg(test)]
mod tests {
    use super::{Task, TaskPatch};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn at(seconds: i64) -> chrono::DateTime<Utc> {
        Utc.timestamp_opt(seconds, 0).single().expect("valid timestamp")
    }

    #[test]
    fn new_task_starts_incomplete_with_equal_timestamps() {
        let task = Task::new("Write release notes", None, Uuid::new_v4(), 0, at(10));
        assert!(!task.completed);
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn patch_merges_fields_and_stamps_updated_at() {
        let column = Uuid::new_v4();
        let mut task = Task::new("draft", Some("body".to_string()), column, 2, at(10));

        let patch = TaskPatch {
            title: Some("final".to_string()),
            description: Some(None),
            completed: Some(true),
        };
        patch.apply_to(&mut task, at(20));

        assert_eq!(task.title, "final");
        assert_eq!(task.description, None);
        assert!(task.completed);
        assert_eq!(task.column_id, column);
        assert_eq!(task.order, 2);
        assert_eq!(task.created_at, at(10));
        assert_eq!(task.updated_at, at(20));
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(TaskPatch::default().is_empty());
        assert!(!TaskPatch::completed(false).is_empty());
    }

    #[test]
    fn lowercase_match_covers_description() {
        let task = Task::new(
            "Setup",
            Some("Configure TypeScript".to_string()),
            Uuid::new_v4(),
            0,
            at(0),
        );
        assert!(task.matches_lowercase("setup"));
        assert!(task.matches_lowercase("typescript"));
        assert!(!task.matches_lowercase("redux"));
    }
}
