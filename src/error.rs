use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Failures from the persistent store: transport, auth, or row-level
/// rejection. The caller's in-memory replica is never touched on error.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("store rejected request (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("malformed store response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("store returned no representation for inserted row")]
    EmptyInsert,

    #[error("no authenticated user")]
    Unauthenticated,
}

/// Failures from the suggestion service or the per-task workflow around it.
/// Any of these resets the affected task's workflow back to idle.
#[derive(Error, Debug)]
pub enum SuggestionError {
    #[error("no active session")]
    NoSession,

    #[error("suggestion service error (HTTP {status}): {body}")]
    Service { status: u16, body: String },

    #[error("suggestion request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed suggestion payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("suggestion generation already in flight for task {0}")]
    AlreadyGenerating(Uuid),

    #[error("'{0}' is not in the current suggestion list")]
    UnknownSuggestion(String),
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Suggestion(#[from] SuggestionError),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("task not found: {0}")]
    UnknownTask(Uuid),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl EngineError {
    pub fn to_error_code(&self) -> &'static str {
        match self {
            EngineError::Store(StoreError::Unauthenticated) => "UNAUTHENTICATED",
            EngineError::Store(_) => "STORE_ERROR",
            EngineError::Suggestion(SuggestionError::NoSession) => "NO_SESSION",
            EngineError::Suggestion(SuggestionError::AlreadyGenerating(_)) => "ALREADY_GENERATING",
            EngineError::Suggestion(SuggestionError::UnknownSuggestion(_)) => "UNKNOWN_SUGGESTION",
            EngineError::Suggestion(_) => "SUGGESTION_ERROR",
            EngineError::Validation(_) => "INVALID_INPUT",
            EngineError::UnknownTask(_) => "TASK_NOT_FOUND",
            EngineError::Json(_) => "INTERNAL_ERROR",
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
            code: self.to_error_code().to_string(),
        }
    }
}
