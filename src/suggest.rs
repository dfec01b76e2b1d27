//! Client for the external subtask-suggestion service.
//!
//! The service takes a task title and a bearer token and answers with a
//! list of candidate subtask titles. The wire format is a single POST:
//! request `{"taskTitle": "..."}`, response `{"subtasks": ["...", ...]}`.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SuggestionError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub type SuggestResult<T> = std::result::Result<T, SuggestionError>;

/// Seam over the suggestion service so the workflow can be driven by a
/// scripted implementation in tests.
#[async_trait]
pub trait Suggest: Send + Sync {
    async fn suggest_subtasks(&self, token: &str, task_title: &str)
        -> SuggestResult<Vec<String>>;
}

#[derive(Debug, Serialize)]
struct SuggestionRequest<'a> {
    #[serde(rename = "taskTitle")]
    task_title: &'a str,
}

#[derive(Debug, Deserialize)]
struct SuggestionResponse {
    subtasks: Vec<String>,
}

pub struct HttpSuggestionClient {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpSuggestionClient {
    pub fn new(endpoint: impl Into<String>) -> SuggestResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }
}

#[async_trait]
impl Suggest for HttpSuggestionClient {
    async fn suggest_subtasks(
        &self,
        token: &str,
        task_title: &str,
    ) -> SuggestResult<Vec<String>> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(&SuggestionRequest { task_title })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "(no body)".to_string());
            return Err(SuggestionError::Service { status, body });
        }

        let body = response.text().await?;
        let parsed: SuggestionResponse = serde_json::from_str(&body)?;
        tracing::debug!(count = parsed.subtasks.len(), "suggestion service responded");
        Ok(parsed.subtasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_uses_camel_case_field() {
        let json = serde_json::to_value(SuggestionRequest {
            task_title: "Finish report",
        })
        .unwrap();
        assert_eq!(json["taskTitle"], "Finish report");
    }

    #[test]
    fn test_response_parses_subtasks() {
        let parsed: SuggestionResponse =
            serde_json::from_str(r#"{"subtasks": ["Outline", "Draft", "Review"]}"#).unwrap();
        assert_eq!(parsed.subtasks, vec!["Outline", "Draft", "Review"]);
    }

    #[test]
    fn test_response_rejects_missing_field() {
        assert!(serde_json::from_str::<SuggestionResponse>(r#"{"items": []}"#).is_err());
    }
}
