//! Per-task suggestion workflow.
//!
//! Each task moves independently through Idle → Generating → Suggested and
//! back to Idle once every candidate title has been accepted or discarded.
//! State is a keyed map so tasks never interfere with each other, with
//! at-most-one-in-flight enforced per key. A generation token stamps every
//! request; a result whose token no longer matches the slot (the task was
//! deleted, or the slot pruned) is discarded instead of resurrecting state.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use uuid::Uuid;

use crate::auth::SessionHandle;
use crate::error::SuggestionError;
use crate::suggest::{Suggest, SuggestResult};

/// Externally visible workflow state for one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionState {
    Idle,
    Generating,
    Suggested(Vec<String>),
}

enum Slot {
    Generating { token: u64 },
    Suggested(Vec<String>),
}

pub struct SuggestionWorkflow {
    service: Arc<dyn Suggest>,
    auth: SessionHandle,
    slots: Mutex<HashMap<Uuid, Slot>>,
    next_token: AtomicU64,
}

impl SuggestionWorkflow {
    pub fn new(service: Arc<dyn Suggest>, auth: SessionHandle) -> Self {
        Self {
            service,
            auth,
            slots: Mutex::new(HashMap::new()),
            next_token: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self, task_id: Uuid) -> SuggestionState {
        match self.lock().get(&task_id) {
            None => SuggestionState::Idle,
            Some(Slot::Generating { .. }) => SuggestionState::Generating,
            Some(Slot::Suggested(titles)) => SuggestionState::Suggested(titles.clone()),
        }
    }

    /// Un-accepted candidate titles for a task; empty while Idle/Generating.
    pub fn suggestions(&self, task_id: Uuid) -> Vec<String> {
        match self.lock().get(&task_id) {
            Some(Slot::Suggested(titles)) => titles.clone(),
            _ => Vec::new(),
        }
    }

    /// Request suggestions for one task. Rejected while a request for the
    /// same task is in flight; regenerating from Suggested replaces the
    /// previous list. Returns the fetched titles; the stored state is only
    /// updated if this request is still the current one when it resolves.
    pub async fn generate(&self, task_id: Uuid, task_title: &str) -> SuggestResult<Vec<String>> {
        let session = self
            .auth
            .current_session()
            .ok_or(SuggestionError::NoSession)?;

        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        {
            let mut slots = self.lock();
            if matches!(slots.get(&task_id), Some(Slot::Generating { .. })) {
                return Err(SuggestionError::AlreadyGenerating(task_id));
            }
            slots.insert(task_id, Slot::Generating { token });
        }

        let result = self
            .service
            .suggest_subtasks(&session.access_token, task_title)
            .await;

        let mut slots = self.lock();
        let still_current =
            matches!(slots.get(&task_id), Some(Slot::Generating { token: t }) if *t == token);

        match result {
            Ok(titles) => {
                if !still_current {
                    tracing::debug!(task_id = %task_id, "discarding stale suggestion result");
                } else if titles.is_empty() {
                    // Nothing to offer; straight back to Idle.
                    slots.remove(&task_id);
                } else {
                    slots.insert(task_id, Slot::Suggested(titles.clone()));
                }
                Ok(titles)
            },
            Err(e) => {
                if still_current {
                    slots.remove(&task_id);
                }
                tracing::warn!(task_id = %task_id, error = %e, "suggestion generation failed");
                Err(e)
            },
        }
    }

    /// Whether `title` is currently offered for `task_id`.
    pub fn contains(&self, task_id: Uuid, title: &str) -> bool {
        matches!(
            self.lock().get(&task_id),
            Some(Slot::Suggested(titles)) if titles.iter().any(|t| t == title)
        )
    }

    /// Remove one title (accepted or discarded). Returns false if the task
    /// is not in Suggested or the title is not offered. An emptied list
    /// transitions the task back to Idle.
    pub fn remove(&self, task_id: Uuid, title: &str) -> bool {
        let mut slots = self.lock();
        let Some(Slot::Suggested(titles)) = slots.get_mut(&task_id) else {
            return false;
        };
        let Some(pos) = titles.iter().position(|t| t == title) else {
            return false;
        };
        titles.remove(pos);
        if titles.is_empty() {
            slots.remove(&task_id);
        }
        true
    }

    /// Drop the whole candidate list for a task.
    pub fn discard_all(&self, task_id: Uuid) {
        self.lock().remove(&task_id);
    }

    /// Forget everything about a (deleted) task. A generation still in
    /// flight for it will fail the token check on resolution.
    pub fn prune(&self, task_id: Uuid) {
        self.lock().remove(&task_id);
    }
}
