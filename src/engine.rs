//! The state-synchronization engine: wires the repositories, the suggestion
//! workflow and the view state together, and owns the cross-component
//! transitions — the dual refresh after a task delete, pruning of view and
//! suggestion state for deleted tasks, and the accept path from a
//! suggestion to a persisted subtask.

use std::sync::Arc;

use uuid::Uuid;

use crate::auth::SessionHandle;
use crate::error::{EngineError, Result, SuggestionError};
use crate::model::Subtask;
use crate::store::Store;
use crate::subtasks::SubtaskRepository;
use crate::suggest::Suggest;
use crate::tasks::TaskRepository;
use crate::view::ViewState;
use crate::workflow::SuggestionWorkflow;

pub struct SyncEngine {
    auth: SessionHandle,
    tasks: TaskRepository,
    subtasks: SubtaskRepository,
    suggestions: SuggestionWorkflow,
    view: ViewState,
}

impl SyncEngine {
    pub fn new(store: Arc<dyn Store>, suggest: Arc<dyn Suggest>, auth: SessionHandle) -> Self {
        Self {
            tasks: TaskRepository::new(Arc::clone(&store), auth.clone()),
            subtasks: SubtaskRepository::new(store, auth.clone()),
            suggestions: SuggestionWorkflow::new(suggest, auth.clone()),
            view: ViewState::new(),
            auth,
        }
    }

    pub fn auth(&self) -> &SessionHandle {
        &self.auth
    }

    pub fn tasks(&self) -> &TaskRepository {
        &self.tasks
    }

    pub fn subtasks(&self) -> &SubtaskRepository {
        &self.subtasks
    }

    pub fn suggestions(&self) -> &SuggestionWorkflow {
        &self.suggestions
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Refresh both replicas. The two fetches are independent and may
    /// complete in either order; each wholly replaces its own collection.
    pub async fn refresh(&self) -> Result<()> {
        let (tasks, subtasks) = tokio::join!(self.tasks.list(), self.subtasks.list_all());
        tasks?;
        subtasks?;
        Ok(())
    }

    /// Delete a task, resynchronize both repositories (the store cascades
    /// the subtask delete), and prune client-only state referencing it.
    pub async fn delete_task(&self, id: Uuid) -> Result<()> {
        self.tasks.delete(id).await?;
        self.subtasks.list_all().await?;
        self.view.prune(id);
        self.suggestions.prune(id);
        Ok(())
    }

    /// Run the suggestion workflow for a task in the current replica.
    /// If the task was deleted while the request was in flight, the late
    /// result is discarded instead of being shown for a nonexistent task.
    pub async fn generate_suggestions(&self, task_id: Uuid) -> Result<Vec<String>> {
        let task = self
            .tasks
            .get(task_id)
            .ok_or(EngineError::UnknownTask(task_id))?;

        let titles = self.suggestions.generate(task_id, &task.title).await?;

        if !self.tasks.contains(task_id) {
            self.suggestions.prune(task_id);
            return Err(EngineError::UnknownTask(task_id));
        }
        Ok(titles)
    }

    /// Promote a suggested title into a persisted subtask. Only on success
    /// is the title removed from the candidate list, so a failed insert
    /// leaves the suggestion available for retry.
    pub async fn accept_suggestion(&self, task_id: Uuid, title: &str) -> Result<Subtask> {
        if !self.suggestions.contains(task_id, title) {
            return Err(SuggestionError::UnknownSuggestion(title.to_string()).into());
        }

        let subtask = self.subtasks.create(task_id, title).await?;
        self.suggestions.remove(task_id, title);
        Ok(subtask)
    }

    /// Drop a suggested title without persisting it.
    pub fn discard_suggestion(&self, task_id: Uuid, title: &str) -> Result<()> {
        if !self.suggestions.remove(task_id, title) {
            return Err(SuggestionError::UnknownSuggestion(title.to_string()).into());
        }
        Ok(())
    }
}
