//! View-models bridging the task store to a UI collaborator. Each screen
//! gets a `dispatch(action)` entry point; the list screen additionally gets
//! two latest-value observables fed by the store's live queries.

use std::future::Future;

use tokio::task::JoinHandle;

use crate::error::AppResult;
use crate::loadable::Loadable;
use crate::model::Task;

mod editor;
mod list;

pub use editor::TaskEditorViewModel;
pub use list::TaskListViewModel;

pub type TaskListState = Loadable<Vec<Task>>;

/// Run a store mutation off the caller's thread. Failures are logged and
/// swallowed here; a failed write must never take the UI down with it.
fn spawn_mutation<F>(op: &'static str, fut: F) -> JoinHandle<()>
where
    F: Future<Output = AppResult<()>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(err) = fut.await {
            tracing::error!(target: "taskdeck", event = "mutation_failed", op, error = %err);
        }
    })
}
