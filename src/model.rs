use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::error::AppError;
use crate::id::new_uuid_v7;
use crate::time::now_ms;

/// A persisted todo task. Copies handed to the UI are snapshots; every
/// mutation goes back through the store, keyed by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl Task {
    /// A fresh pending task with a newly generated id.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        let now = now_ms();
        Task {
            id: new_uuid_v7(),
            title: title.into(),
            description: description.into(),
            completed: false,
            favorite: false,
            created_at: now,
            updated_at: now,
        }
    }
}

impl TryFrom<&SqliteRow> for Task {
    type Error = AppError;

    fn try_from(row: &SqliteRow) -> Result<Self, Self::Error> {
        Ok(Task {
            id: row.try_get("id").map_err(AppError::from)?,
            title: row.try_get("title").map_err(AppError::from)?,
            description: row.try_get("description").map_err(AppError::from)?,
            completed: row
                .try_get::<i64, _>("completed")
                .map(|value| value != 0)
                .map_err(AppError::from)?,
            favorite: row
                .try_get::<i64, _>("favorite")
                .map(|value| value != 0)
                .map_err(AppError::from)?,
            created_at: row.try_get("created_at").map_err(AppError::from)?,
            updated_at: row.try_get("updated_at").map_err(AppError::from)?,
        })
    }
}

/// User intent produced by the UI and consumed exactly once by a view-model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskAction {
    Add(Task),
    Update(Task),
    Delete(Task),
    SetCompleted(Task, bool),
    SetFavorite(Task, bool),
}

impl TaskAction {
    pub fn name(&self) -> &'static str {
        match self {
            TaskAction::Add(_) => "add",
            TaskAction::Update(_) => "update",
            TaskAction::Delete(_) => "delete",
            TaskAction::SetCompleted(..) => "set_completed",
            TaskAction::SetFavorite(..) => "set_favorite",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_task_defaults_to_pending() {
        let task = Task::new("Workout", "30 minutes");
        assert!(!task.completed);
        assert!(!task.favorite);
        assert_eq!(task.title, "Workout");
        assert_eq!(task.description, "30 minutes");
        assert_eq!(task.created_at, task.updated_at);
        assert!(task.created_at > 0);
    }

    #[test]
    fn new_tasks_get_distinct_ids() {
        let a = Task::new("a", "");
        let b = Task::new("b", "");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn action_names_cover_every_variant() {
        let task = Task::new("t", "");
        assert_eq!(TaskAction::Add(task.clone()).name(), "add");
        assert_eq!(TaskAction::Update(task.clone()).name(), "update");
        assert_eq!(TaskAction::Delete(task.clone()).name(), "delete");
        assert_eq!(TaskAction::SetCompleted(task.clone(), true).name(), "set_completed");
        assert_eq!(TaskAction::SetFavorite(task, false).name(), "set_favorite");
    }

    #[test]
    fn task_round_trips_through_json() {
        let task = Task::new("Workout", "gym");
        let json = serde_json::to_string(&task).expect("serialize");
        let back: Task = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, task);
    }
}
