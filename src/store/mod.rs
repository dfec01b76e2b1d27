pub mod http;
pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::Session;
use crate::error::StoreError;
use crate::model::{NewSubtask, NewTask, Status, Subtask, Task};

pub use http::{HttpStore, StoreConfig};
pub use memory::MemoryStore;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Row-level CRUD against the persistent store, scoped to the calling
/// session's user. Every call is a network suspension point; implementations
/// must not cache — the repositories above own the read replica.
#[async_trait]
pub trait Store: Send + Sync {
    /// All of the user's tasks, newest-created first.
    async fn list_tasks(&self, session: &Session) -> StoreResult<Vec<Task>>;

    /// Insert a task and return the stored row (with assigned id/timestamp).
    async fn insert_task(&self, session: &Session, new: &NewTask) -> StoreResult<Task>;

    async fn update_task_status(
        &self,
        session: &Session,
        id: Uuid,
        status: Status,
    ) -> StoreResult<()>;

    /// Delete a task. The store cascades the delete to its subtasks.
    async fn delete_task(&self, session: &Session, id: Uuid) -> StoreResult<()>;

    /// All of the user's subtasks across every task, oldest-created first.
    async fn list_subtasks(&self, session: &Session) -> StoreResult<Vec<Subtask>>;

    async fn insert_subtask(&self, session: &Session, new: &NewSubtask) -> StoreResult<Subtask>;

    async fn set_subtask_completed(
        &self,
        session: &Session,
        id: Uuid,
        completed: bool,
    ) -> StoreResult<()>;

    async fn delete_subtask(&self, session: &Session, id: Uuid) -> StoreResult<()>;
}
