//! Environment-based configuration for the remote endpoints and the CLI
//! session. All variables share the `TASKSYNC_` prefix.

use uuid::Uuid;

use crate::auth::Session;
use crate::error::{EngineError, Result};
use crate::store::StoreConfig;

/// Endpoints the engine talks to.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base URL of the table store, e.g. `https://abc.example.co`.
    pub store_url: String,
    /// Project API key for the table store.
    pub store_api_key: String,
    /// Full URL of the subtask-suggestion endpoint.
    pub suggest_url: String,
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            store_url: required("TASKSYNC_STORE_URL")?,
            store_api_key: required("TASKSYNC_STORE_API_KEY")?,
            suggest_url: required("TASKSYNC_SUGGEST_URL")?,
        })
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            base_url: self.store_url.clone(),
            api_key: self.store_api_key.clone(),
        }
    }
}

/// Session for the CLI: `TASKSYNC_USER_ID` + `TASKSYNC_ACCESS_TOKEN`.
/// Returns None when either is unset, i.e. nobody is signed in.
pub fn session_from_env() -> Result<Option<Session>> {
    let user_id = match optional("TASKSYNC_USER_ID") {
        Some(raw) => Uuid::parse_str(&raw).map_err(|_| {
            EngineError::Validation(format!("TASKSYNC_USER_ID is not a valid UUID: '{}'", raw))
        })?,
        None => return Ok(None),
    };
    let access_token = match optional("TASKSYNC_ACCESS_TOKEN") {
        Some(token) => token,
        None => return Ok(None),
    };

    Ok(Some(Session {
        user_id,
        access_token,
    }))
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn required(name: &str) -> Result<String> {
    optional(name).ok_or_else(|| {
        EngineError::Validation(format!("environment variable {} is not set", name))
    })
}
