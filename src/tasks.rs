//! Task repository: the canonical in-memory view of the user's tasks.
//!
//! Consistency model is full refetch after every successful write — the
//! replica is only ever replaced wholesale, never patched in place, so a
//! failed mutation leaves it exactly as it was.

use std::sync::{Arc, PoisonError, RwLock};

use uuid::Uuid;

use crate::auth::{Session, SessionHandle};
use crate::error::{EngineError, Result, StoreError};
use crate::model::{NewTask, Priority, Status, Task};
use crate::store::Store;

pub struct TaskRepository {
    store: Arc<dyn Store>,
    auth: SessionHandle,
    replica: RwLock<Vec<Task>>,
}

impl TaskRepository {
    pub fn new(store: Arc<dyn Store>, auth: SessionHandle) -> Self {
        Self {
            store,
            auth,
            replica: RwLock::new(Vec::new()),
        }
    }

    fn session(&self) -> Result<Session> {
        self.auth
            .current_session()
            .ok_or(EngineError::Store(StoreError::Unauthenticated))
    }

    /// Current replica, newest-created first. No I/O.
    pub fn snapshot(&self) -> Vec<Task> {
        self.replica
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn get(&self, id: Uuid) -> Option<Task> {
        self.replica
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|t| t.id == id)
            .cloned()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.get(id).is_some()
    }

    /// Fetch all of the user's tasks and replace the replica.
    pub async fn list(&self) -> Result<Vec<Task>> {
        let session = self.session()?;
        let mut tasks = self.store.list_tasks(&session).await?;
        // The gateway already requests newest-first; re-assert it so the
        // invariant doesn't depend on the backend honoring the order param.
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        *self.replica.write().unwrap_or_else(PoisonError::into_inner) = tasks.clone();
        tracing::debug!(count = tasks.len(), "task replica refreshed");
        Ok(tasks)
    }

    /// Insert a pending task and resynchronize.
    pub async fn create(&self, title: &str, priority: Priority) -> Result<Task> {
        let title = title.trim();
        if title.is_empty() {
            return Err(EngineError::Validation(
                "task title must not be empty".to_string(),
            ));
        }
        let session = self.session()?;

        let new = NewTask {
            title: title.to_string(),
            priority,
            status: Status::Pending,
            user_id: session.user_id,
        };
        let task = self.store.insert_task(&session, &new).await?;
        tracing::info!(task_id = %task.id, "task created");

        self.list().await?;
        Ok(task)
    }

    pub async fn update_status(&self, id: Uuid, status: Status) -> Result<()> {
        let session = self.session()?;
        self.store.update_task_status(&session, id, status).await?;
        tracing::info!(task_id = %id, status = status.as_str(), "task status updated");

        self.list().await?;
        Ok(())
    }

    /// Delete a task and resynchronize this repository. The store cascades
    /// the delete to subtasks; `SyncEngine::delete_task` is the path that
    /// also refreshes the subtask repository and prunes view state.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let session = self.session()?;
        self.store.delete_task(&session, id).await?;
        tracing::info!(task_id = %id, "task deleted");

        self.list().await?;
        Ok(())
    }
}
