//! UI-only view state: which tasks are expanded.
//!
//! Never persisted and independent of data freshness — expanding a task
//! with zero subtasks is fine and simply shows an empty list.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use uuid::Uuid;

#[derive(Default)]
pub struct ViewState {
    expanded: RwLock<HashSet<Uuid>>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip expansion for a task; returns the new state (true = expanded).
    pub fn toggle_expansion(&self, task_id: Uuid) -> bool {
        let mut expanded = self
            .expanded
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if expanded.remove(&task_id) {
            false
        } else {
            expanded.insert(task_id);
            true
        }
    }

    pub fn is_expanded(&self, task_id: Uuid) -> bool {
        self.expanded
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&task_id)
    }

    pub fn expanded(&self) -> HashSet<Uuid> {
        self.expanded
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drop the entry for a deleted task.
    pub fn prune(&self, task_id: Uuid) {
        self.expanded
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&task_id);
    }
}
