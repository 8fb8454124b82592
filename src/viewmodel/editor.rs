use crate::model::TaskAction;
use crate::store::TaskStore;
use crate::viewmodel::spawn_mutation;

/// View-model for the single-task editor screen: creates and edits tasks,
/// nothing else.
pub struct TaskEditorViewModel {
    store: TaskStore,
}

impl TaskEditorViewModel {
    pub fn new(store: TaskStore) -> Self {
        TaskEditorViewModel { store }
    }

    pub fn dispatch(&self, action: TaskAction) {
        let store = self.store.clone();
        match action {
            TaskAction::Add(task) => {
                spawn_mutation("add", async move { store.add(&task).await });
            }
            TaskAction::Update(task) => {
                spawn_mutation("update", async move { store.update(&task).await });
            }
            other => {
                tracing::debug!(target: "taskdeck", event = "action_ignored", screen = "editor", action = other.name());
            }
        }
    }
}
