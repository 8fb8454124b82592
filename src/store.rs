use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use sqlx::{Pool, Sqlite};
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio_stream::wrappers::ReceiverStream;

use crate::db;
use crate::error::{AppError, AppResult};
use crate::loadable::Loadable;
use crate::model::Task;
use crate::time::now_ms;

const PENDING_SQL: &str = "SELECT id, title, description, completed, favorite, created_at, updated_at \
     FROM tasks WHERE completed = 0 ORDER BY favorite DESC, created_at, id";

const COMPLETED_SQL: &str = "SELECT id, title, description, completed, favorite, created_at, updated_at \
     FROM tasks WHERE completed = 1 ORDER BY created_at, id";

/// Capacity of the change fan-out. A lagged subscriber re-queries the
/// current snapshot, so dropped notifications only ever coalesce emissions.
const CHANGE_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    Added,
    Updated,
    CompletedSet,
    FavoriteSet,
    Removed,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskFilter {
    Pending,
    Completed,
}

/// Sole gateway to task persistence.
///
/// Cheap to clone; all clones share one lazily-opened database connection.
/// The raw pool is never handed out, and every mutation is a single write
/// transaction keyed by task id. Targeted mutations against an id that no
/// longer exists are swallowed as no-ops so stale UI references can never
/// crash anything.
#[derive(Clone)]
pub struct TaskStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    db_path: PathBuf,
    pool: Mutex<Option<Pool<Sqlite>>>,
    closed: AtomicBool,
    changes: broadcast::Sender<Change>,
}

impl TaskStore {
    /// A store over the database at `db_path`. The database is not touched
    /// until the first operation needs it.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        TaskStore {
            inner: Arc::new(StoreInner {
                db_path: db_path.into(),
                pool: Mutex::new(None),
                closed: AtomicBool::new(false),
                changes,
            }),
        }
    }

    /// Close the store permanently. Running subscriptions are woken so they
    /// emit an error instead of hanging; later mutations fail with
    /// `STORE/CLOSED`.
    pub async fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        let mut slot = self.inner.pool.lock().await;
        if let Some(pool) = slot.take() {
            pool.close().await;
        }
        drop(slot);
        tracing::info!(target: "taskdeck", event = "store_closed", db_path = %self.inner.db_path.display());
        let _ = self.inner.changes.send(Change::Closed);
    }

    async fn pool(&self) -> AppResult<Pool<Sqlite>> {
        if self.inner.closed.load(Ordering::SeqCst) {
            return Err(AppError::new("STORE/CLOSED", "Task store is closed")
                .with_context("db_path", self.inner.db_path.display().to_string()));
        }
        let mut slot = self.inner.pool.lock().await;
        if let Some(pool) = slot.as_ref() {
            if !pool.is_closed() {
                return Ok(pool.clone());
            }
        }
        let pool = db::open_pool(&self.inner.db_path)
            .await
            .map_err(AppError::from)?;
        *slot = Some(pool.clone());
        Ok(pool)
    }

    fn notify(&self, change: Change) {
        tracing::trace!(target: "taskdeck", event = "store_change", change = ?change);
        let _ = self.inner.changes.send(change);
    }

    /// Live view of all pending tasks, favorites first, then insertion
    /// order. Emits a full snapshot immediately and after every change;
    /// never ends on its own. An unavailable store yields a real
    /// `Loadable::Error` emission.
    pub fn subscribe_pending(&self) -> ReceiverStream<Loadable<Vec<Task>>> {
        self.subscribe(TaskFilter::Pending)
    }

    /// Live view of all completed tasks in insertion order. Same contract
    /// as `subscribe_pending`.
    pub fn subscribe_completed(&self) -> ReceiverStream<Loadable<Vec<Task>>> {
        self.subscribe(TaskFilter::Completed)
    }

    fn subscribe(&self, filter: TaskFilter) -> ReceiverStream<Loadable<Vec<Task>>> {
        let (tx, rx) = mpsc::channel(8);
        let store = self.clone();
        tokio::spawn(async move {
            // Register for changes before the first snapshot so no commit
            // can slip between query and subscription.
            let mut changes = store.inner.changes.subscribe();
            loop {
                let state = store.snapshot(filter).await;
                if tx.send(state).await.is_err() {
                    break;
                }
                tokio::select! {
                    _ = tx.closed() => break,
                    received = changes.recv() => match received {
                        Ok(change) => {
                            tracing::trace!(target: "taskdeck", event = "requery", filter = ?filter, change = ?change);
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::debug!(target: "taskdeck", event = "subscription_lagged", filter = ?filter, skipped);
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
        });
        ReceiverStream::new(rx)
    }

    async fn snapshot(&self, filter: TaskFilter) -> Loadable<Vec<Task>> {
        match self.tasks_matching(filter).await {
            Ok(tasks) => Loadable::Success(tasks),
            Err(err) => {
                tracing::warn!(target: "taskdeck", event = "snapshot_failed", filter = ?filter, error = %err);
                Loadable::Error(err.message().to_string())
            }
        }
    }

    async fn tasks_matching(&self, filter: TaskFilter) -> AppResult<Vec<Task>> {
        let pool = self.pool().await?;
        let sql = match filter {
            TaskFilter::Pending => PENDING_SQL,
            TaskFilter::Completed => COMPLETED_SQL,
        };
        let rows = sqlx::query(sql)
            .fetch_all(&pool)
            .await
            .map_err(AppError::from)?;
        rows.iter().map(Task::try_from).collect()
    }

    /// Insert a new task exactly as given. Fails only on storage faults.
    pub async fn add(&self, task: &Task) -> AppResult<()> {
        let pool = self.pool().await?;
        let mut tx = pool.begin().await.map_err(AppError::from)?;
        sqlx::query(
            "INSERT INTO tasks (id, title, description, completed, favorite, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.completed)
        .bind(task.favorite)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|err| {
            AppError::from(err)
                .with_context("operation", "add")
                .with_context("id", task.id.clone())
        })?;
        tx.commit().await.map_err(AppError::from)?;
        tracing::debug!(target: "taskdeck", event = "db_tx_commit", op = "add", id = %task.id);
        self.notify(Change::Added);
        Ok(())
    }

    /// Overwrite title and description of the task with this id; completed
    /// and favorite are left untouched. Missing id: no-op.
    pub async fn update(&self, task: &Task) -> AppResult<()> {
        let query =
            sqlx::query("UPDATE tasks SET title = ?, description = ?, updated_at = ? WHERE id = ?")
                .bind(&task.title)
                .bind(&task.description)
                .bind(now_ms())
                .bind(&task.id);
        if self.execute_targeted("update", &task.id, query).await? {
            self.notify(Change::Updated);
        }
        Ok(())
    }

    /// Set the completed flag of the task with this id. Missing id: no-op.
    pub async fn set_completed(&self, task: &Task, completed: bool) -> AppResult<()> {
        let query = sqlx::query("UPDATE tasks SET completed = ?, updated_at = ? WHERE id = ?")
            .bind(completed)
            .bind(now_ms())
            .bind(&task.id);
        if self
            .execute_targeted("set_completed", &task.id, query)
            .await?
        {
            self.notify(Change::CompletedSet);
        }
        Ok(())
    }

    /// Set the favorite flag of the task with this id. Missing id: no-op.
    pub async fn set_favorite(&self, task: &Task, favorite: bool) -> AppResult<()> {
        let query = sqlx::query("UPDATE tasks SET favorite = ?, updated_at = ? WHERE id = ?")
            .bind(favorite)
            .bind(now_ms())
            .bind(&task.id);
        if self
            .execute_targeted("set_favorite", &task.id, query)
            .await?
        {
            self.notify(Change::FavoriteSet);
        }
        Ok(())
    }

    /// Remove the task with this id. Missing id: no-op.
    pub async fn delete(&self, task: &Task) -> AppResult<()> {
        let query = sqlx::query("DELETE FROM tasks WHERE id = ?").bind(&task.id);
        if self.execute_targeted("delete", &task.id, query).await? {
            self.notify(Change::Removed);
        }
        Ok(())
    }

    /// Run one targeted write in its own transaction. Returns whether a row
    /// was hit; zero rows means the caller held a stale reference and the
    /// mutation is deliberately swallowed.
    async fn execute_targeted<'q>(
        &self,
        op: &'static str,
        id: &str,
        query: sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    ) -> AppResult<bool> {
        let pool = self.pool().await?;
        let mut tx = pool.begin().await.map_err(AppError::from)?;
        let result = query.execute(&mut *tx).await.map_err(|err| {
            AppError::from(err)
                .with_context("operation", op)
                .with_context("id", id.to_string())
        })?;
        tx.commit().await.map_err(AppError::from)?;
        if result.rows_affected() == 0 {
            tracing::debug!(target: "taskdeck", event = "stale_reference", op, id = %id);
            return Ok(false);
        }
        tracing::debug!(target: "taskdeck", event = "db_tx_commit", op, id = %id);
        Ok(true)
    }
}
