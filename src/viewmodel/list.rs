use std::time::Duration;

use futures::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::model::TaskAction;
use crate::store::TaskStore;
use crate::viewmodel::{spawn_mutation, TaskListState};

/// Cosmetic settle delay before the live queries start feeding the screen.
const STARTUP_DELAY: Duration = Duration::from_millis(500);

/// View-model for the two-section task list screen.
///
/// Holds one latest-value observable per section, both starting out
/// `Loading`. Watch semantics mean a new emission always supersedes an
/// unconsumed one. Dropping the view-model cancels both subscriptions.
pub struct TaskListViewModel {
    store: TaskStore,
    active: watch::Receiver<TaskListState>,
    completed: watch::Receiver<TaskListState>,
    pumps: Vec<JoinHandle<()>>,
}

impl TaskListViewModel {
    pub fn new(store: TaskStore) -> Self {
        let (active_tx, active_rx) = watch::channel(TaskListState::Loading);
        let (completed_tx, completed_rx) = watch::channel(TaskListState::Loading);

        let pump_store = store.clone();
        let active_pump = tokio::spawn(async move {
            tokio::time::sleep(STARTUP_DELAY).await;
            let mut feed = pump_store.subscribe_pending();
            while let Some(state) = feed.next().await {
                if active_tx.send(state).is_err() {
                    break;
                }
            }
        });

        let pump_store = store.clone();
        let completed_pump = tokio::spawn(async move {
            tokio::time::sleep(STARTUP_DELAY).await;
            let mut feed = pump_store.subscribe_completed();
            while let Some(state) = feed.next().await {
                if completed_tx.send(state).is_err() {
                    break;
                }
            }
        });

        TaskListViewModel {
            store,
            active: active_rx,
            completed: completed_rx,
            pumps: vec![active_pump, completed_pump],
        }
    }

    /// Pending tasks, favorites first. Starts at `Loading`.
    pub fn active_tasks(&self) -> watch::Receiver<TaskListState> {
        self.active.clone()
    }

    /// Completed tasks in insertion order. Starts at `Loading`.
    pub fn completed_tasks(&self) -> watch::Receiver<TaskListState> {
        self.completed.clone()
    }

    /// Route a user action to the store. Add and Update belong to the
    /// editor screen; this view-model drops them on purpose.
    pub fn dispatch(&self, action: TaskAction) {
        let store = self.store.clone();
        match action {
            TaskAction::Delete(task) => {
                spawn_mutation("delete", async move { store.delete(&task).await });
            }
            TaskAction::SetCompleted(task, completed) => {
                spawn_mutation("set_completed", async move {
                    store.set_completed(&task, completed).await
                });
            }
            TaskAction::SetFavorite(task, favorite) => {
                spawn_mutation("set_favorite", async move {
                    store.set_favorite(&task, favorite).await
                });
            }
            other => {
                tracing::debug!(target: "taskdeck", event = "action_ignored", screen = "list", action = other.name());
            }
        }
    }
}

impl Drop for TaskListViewModel {
    fn drop(&mut self) {
        for pump in &self.pumps {
            pump.abort();
        }
    }
}
