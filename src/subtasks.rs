//! Subtask repository: the user's subtasks grouped by owning task.
//!
//! Same consistency model as the task repository — every successful write
//! is followed by a full refetch, and the grouped replica is replaced
//! wholesale.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use uuid::Uuid;

use crate::auth::{Session, SessionHandle};
use crate::error::{EngineError, Result, StoreError};
use crate::model::{NewSubtask, Subtask};
use crate::store::Store;

pub struct SubtaskRepository {
    store: Arc<dyn Store>,
    auth: SessionHandle,
    replica: RwLock<HashMap<Uuid, Vec<Subtask>>>,
}

impl SubtaskRepository {
    pub fn new(store: Arc<dyn Store>, auth: SessionHandle) -> Self {
        Self {
            store,
            auth,
            replica: RwLock::new(HashMap::new()),
        }
    }

    fn session(&self) -> Result<Session> {
        self.auth
            .current_session()
            .ok_or(EngineError::Store(StoreError::Unauthenticated))
    }

    /// Current grouped replica. No I/O.
    pub fn snapshot(&self) -> HashMap<Uuid, Vec<Subtask>> {
        self.replica
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Subtasks of one task, oldest-created first. Empty vec for a task
    /// with no subtasks (or an unknown id).
    pub fn for_task(&self, task_id: Uuid) -> Vec<Subtask> {
        self.replica
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&task_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn get(&self, id: Uuid) -> Option<Subtask> {
        self.replica
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .flatten()
            .find(|s| s.id == id)
            .cloned()
    }

    /// Fetch every subtask owned by the user, group by owning task id, and
    /// replace the replica.
    pub async fn list_all(&self) -> Result<HashMap<Uuid, Vec<Subtask>>> {
        let session = self.session()?;
        let mut rows = self.store.list_subtasks(&session).await?;
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        let mut grouped: HashMap<Uuid, Vec<Subtask>> = HashMap::new();
        for subtask in rows {
            grouped.entry(subtask.task_id).or_default().push(subtask);
        }

        *self.replica.write().unwrap_or_else(PoisonError::into_inner) = grouped.clone();
        tracing::debug!(groups = grouped.len(), "subtask replica refreshed");
        Ok(grouped)
    }

    /// Insert an uncompleted subtask under `task_id` and resynchronize.
    pub async fn create(&self, task_id: Uuid, title: &str) -> Result<Subtask> {
        let title = title.trim();
        if title.is_empty() {
            return Err(EngineError::Validation(
                "subtask title must not be empty".to_string(),
            ));
        }
        let session = self.session()?;

        let new = NewSubtask {
            task_id,
            title: title.to_string(),
            completed: false,
            user_id: session.user_id,
        };
        let subtask = self.store.insert_subtask(&session, &new).await?;
        tracing::info!(subtask_id = %subtask.id, task_id = %task_id, "subtask created");

        self.list_all().await?;
        Ok(subtask)
    }

    /// Flip the completed flag and resynchronize.
    pub async fn toggle(&self, id: Uuid, current_completed: bool) -> Result<()> {
        let session = self.session()?;
        self.store
            .set_subtask_completed(&session, id, !current_completed)
            .await?;
        tracing::info!(subtask_id = %id, completed = !current_completed, "subtask toggled");

        self.list_all().await?;
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let session = self.session()?;
        self.store.delete_subtask(&session, id).await?;
        tracing::info!(subtask_id = %id, "subtask deleted");

        self.list_all().await?;
        Ok(())
    }
}
