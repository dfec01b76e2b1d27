use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, Result};

/// Task priority as stored in the `tasks.priority` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(EngineError::Validation(format!(
                "Invalid priority '{}'. Valid values: low, medium, high",
                s
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Task status as stored in the `tasks.status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Pending,
    InProgress,
    Done,
}

impl Status {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "in-progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            _ => Err(EngineError::Validation(format!(
                "Invalid status '{}'. Valid values: pending, in-progress, done",
                s
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Done => "done",
        }
    }
}

/// A user-owned unit of work. Rows live in the remote `tasks` table; the
/// client only ever holds a read replica refreshed after each mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub priority: Priority,
    pub status: Status,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A checklist item belonging to exactly one task. Deleting the owning
/// task cascades in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: Uuid,
    pub task_id: Uuid,
    pub title: String,
    pub completed: bool,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for `tasks`. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, Serialize)]
pub struct NewTask {
    pub title: String,
    pub priority: Priority,
    pub status: Status,
    pub user_id: Uuid,
}

/// Insert payload for `subtasks`.
#[derive(Debug, Clone, Serialize)]
pub struct NewSubtask {
    pub task_id: Uuid,
    pub title: String,
    pub completed: bool,
    pub user_id: Uuid,
}
