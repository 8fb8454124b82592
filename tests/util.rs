#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use futures::{Stream, StreamExt};
use taskdeck::{Loadable, Task, TaskStore};
use tempfile::TempDir;

pub fn temp_store() -> (TempDir, TaskStore) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = TaskStore::new(dir.path().join("tasks.sqlite3"));
    (dir, store)
}

/// Next raw emission, bounded so a hung stream fails the test instead of
/// stalling the suite.
pub async fn next_emission<S>(feed: &mut S) -> Loadable<Vec<Task>>
where
    S: Stream<Item = Loadable<Vec<Task>>> + Unpin,
{
    tokio::time::timeout(Duration::from_secs(5), feed.next())
        .await
        .expect("timed out waiting for an emission")
        .expect("stream ended unexpectedly")
}

/// Skip forward until a Success emission satisfies `pred`. Content-based
/// waiting keeps tests immune to how many snapshots a mutation burst
/// coalesces into.
pub async fn wait_until<S, F>(feed: &mut S, pred: F) -> Vec<Task>
where
    S: Stream<Item = Loadable<Vec<Task>>> + Unpin,
    F: Fn(&[Task]) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match feed.next().await {
                Some(Loadable::Success(tasks)) if pred(&tasks) => return tasks,
                Some(_) => continue,
                None => panic!("stream ended unexpectedly"),
            }
        }
    })
    .await
    .expect("timed out waiting for a matching emission")
}

pub fn titles(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|task| task.title.as_str()).collect()
}

pub fn contains_id(tasks: &[Task], id: &str) -> bool {
    tasks.iter().any(|task| task.id == id)
}
