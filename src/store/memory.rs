//! In-process store backend.
//!
//! Implements the same `Store` contract as the HTTP gateway against plain
//! vectors, including the user scoping and the task→subtask delete cascade
//! the remote store enforces. Used by the test suite and handy for offline
//! development; it is not a persistence layer.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::auth::Session;
use crate::error::StoreError;
use crate::model::{NewSubtask, NewTask, Status, Subtask, Task};
use crate::store::{Store, StoreResult};

#[derive(Default)]
struct Tables {
    // Sequence numbers break created_at ties so ordering stays deterministic
    // even when two inserts land in the same clock tick.
    next_seq: u64,
    tasks: Vec<(u64, Task)>,
    subtasks: Vec<(u64, Subtask)>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_requests: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` store calls fail with a rejection, for exercising
    /// the no-partial-update guarantee.
    pub fn inject_failures(&self, n: u32) {
        self.fail_requests.store(n, Ordering::SeqCst);
    }

    fn check_injected_failure(&self) -> StoreResult<()> {
        let remaining = self.fail_requests.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_requests.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::Rejected {
                status: 500,
                body: "injected failure".to_string(),
            });
        }
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count of subtask rows across all users, regardless of session.
    pub fn subtask_row_count(&self) -> usize {
        self.lock().subtasks.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_tasks(&self, session: &Session) -> StoreResult<Vec<Task>> {
        self.check_injected_failure()?;
        let tables = self.lock();
        let mut rows: Vec<(u64, Task)> = tables
            .tasks
            .iter()
            .filter(|(_, t)| t.user_id == session.user_id)
            .cloned()
            .collect();
        rows.sort_by(|(sa, a), (sb, b)| b.created_at.cmp(&a.created_at).then(sb.cmp(sa)));
        Ok(rows.into_iter().map(|(_, t)| t).collect())
    }

    async fn insert_task(&self, session: &Session, new: &NewTask) -> StoreResult<Task> {
        self.check_injected_failure()?;
        let mut tables = self.lock();
        let task = Task {
            id: Uuid::new_v4(),
            title: new.title.clone(),
            priority: new.priority,
            status: new.status,
            user_id: session.user_id,
            created_at: Utc::now(),
        };
        let seq = tables.next_seq;
        tables.next_seq += 1;
        tables.tasks.push((seq, task.clone()));
        Ok(task)
    }

    async fn update_task_status(
        &self,
        session: &Session,
        id: Uuid,
        status: Status,
    ) -> StoreResult<()> {
        self.check_injected_failure()?;
        let mut tables = self.lock();
        for (_, task) in tables.tasks.iter_mut() {
            if task.id == id && task.user_id == session.user_id {
                task.status = status;
                return Ok(());
            }
        }
        Err(StoreError::Rejected {
            status: 404,
            body: format!("no task row with id {}", id),
        })
    }

    async fn delete_task(&self, session: &Session, id: Uuid) -> StoreResult<()> {
        self.check_injected_failure()?;
        let mut tables = self.lock();
        tables
            .tasks
            .retain(|(_, t)| !(t.id == id && t.user_id == session.user_id));
        // FK cascade, as the remote store would do
        tables.subtasks.retain(|(_, s)| s.task_id != id);
        Ok(())
    }

    async fn list_subtasks(&self, session: &Session) -> StoreResult<Vec<Subtask>> {
        self.check_injected_failure()?;
        let tables = self.lock();
        let mut rows: Vec<(u64, Subtask)> = tables
            .subtasks
            .iter()
            .filter(|(_, s)| s.user_id == session.user_id)
            .cloned()
            .collect();
        rows.sort_by(|(sa, a), (sb, b)| a.created_at.cmp(&b.created_at).then(sa.cmp(sb)));
        Ok(rows.into_iter().map(|(_, s)| s).collect())
    }

    async fn insert_subtask(&self, session: &Session, new: &NewSubtask) -> StoreResult<Subtask> {
        self.check_injected_failure()?;
        let mut tables = self.lock();
        // FK constraint: the owning task must exist
        if !tables
            .tasks
            .iter()
            .any(|(_, t)| t.id == new.task_id && t.user_id == session.user_id)
        {
            return Err(StoreError::Rejected {
                status: 409,
                body: format!("no task row with id {}", new.task_id),
            });
        }
        let subtask = Subtask {
            id: Uuid::new_v4(),
            task_id: new.task_id,
            title: new.title.clone(),
            completed: new.completed,
            user_id: session.user_id,
            created_at: Utc::now(),
        };
        let seq = tables.next_seq;
        tables.next_seq += 1;
        tables.subtasks.push((seq, subtask.clone()));
        Ok(subtask)
    }

    async fn set_subtask_completed(
        &self,
        session: &Session,
        id: Uuid,
        completed: bool,
    ) -> StoreResult<()> {
        self.check_injected_failure()?;
        let mut tables = self.lock();
        for (_, subtask) in tables.subtasks.iter_mut() {
            if subtask.id == id && subtask.user_id == session.user_id {
                subtask.completed = completed;
                return Ok(());
            }
        }
        Err(StoreError::Rejected {
            status: 404,
            body: format!("no subtask row with id {}", id),
        })
    }

    async fn delete_subtask(&self, session: &Session, id: Uuid) -> StoreResult<()> {
        self.check_injected_failure()?;
        let mut tables = self.lock();
        tables
            .subtasks
            .retain(|(_, s)| !(s.id == id && s.user_id == session.user_id));
        Ok(())
    }
}
