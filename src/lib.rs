//! Persistence and reactive-sync core for a cross-platform todo app: an
//! embedded SQLite task store with two live queries (pending, completed)
//! and the view-models that bridge them to a UI shell.

use std::sync::Once;

mod db;
mod error;
mod id;
pub mod loadable;
pub mod model;
pub mod store;
mod time;
pub mod viewmodel;

pub use error::{AppError, AppResult};
pub use loadable::Loadable;
pub use model::{Task, TaskAction};
pub use store::TaskStore;
pub use viewmodel::{TaskEditorViewModel, TaskListViewModel, TaskListState};

static LOG_INIT: Once = Once::new();

/// Install the global tracing subscriber. Idempotent; later calls are no-ops.
///
/// Filter resolution: `TASKDECK_LOG`, then `RUST_LOG`, then a built-in
/// default that keeps dependencies at `info` and this crate at `debug` in
/// debug builds. `TASKDECK_LOG_JSON=1` switches to JSON output.
pub fn init_logging() {
    LOG_INIT.call_once(|| {
        let default_spec = if cfg!(debug_assertions) {
            "info,taskdeck=debug"
        } else {
            "info,taskdeck=info"
        };
        let spec = std::env::var("TASKDECK_LOG")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .or_else(|| {
                std::env::var("RUST_LOG")
                    .ok()
                    .filter(|value| !value.trim().is_empty())
            })
            .unwrap_or_else(|| default_spec.to_string());

        let filter = tracing_subscriber::EnvFilter::new(spec);
        let json = std::env::var("TASKDECK_LOG_JSON").is_ok_and(|value| value == "1");
        if json {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .json()
                .try_init();
        } else {
            let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
        }
    });
}
