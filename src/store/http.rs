//! HTTP gateway to the remote table store.
//!
//! Speaks the PostgREST-style dialect: `{base}/rest/v1/{table}` with
//! `?column=eq.value&order=column.direction` filters, an `apikey` header for
//! the project key and a per-request bearer token from the active session.
//! Row-level security on the server is the real enforcement; the explicit
//! `user_id` filter keeps responses scoped even against misconfigured
//! policies.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::json;
use uuid::Uuid;

use crate::auth::Session;
use crate::error::StoreError;
use crate::model::{NewSubtask, NewTask, Status, Subtask, Task};
use crate::store::{Store, StoreResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Project base URL, e.g. `https://abc.example.co`.
    pub base_url: String,
    /// Project API key sent in the `apikey` header.
    pub api_key: String,
}

pub struct HttpStore {
    config: StoreConfig,
    client: reqwest::Client,
}

impl HttpStore {
    pub fn new(config: StoreConfig) -> StoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { config, client })
    }

    fn table_url(&self, table: &str) -> String {
        format!(
            "{}/rest/v1/{}",
            self.config.base_url.trim_end_matches('/'),
            table
        )
    }

    fn authed(&self, request: reqwest::RequestBuilder, session: &Session) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.config.api_key)
            .bearer_auth(&session.access_token)
    }

    /// Map a non-2xx response to `StoreError::Rejected`, keeping the body
    /// for diagnostics.
    async fn check(response: reqwest::Response) -> StoreResult<reqwest::Response> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "(no body)".to_string());
            return Err(StoreError::Rejected { status, body });
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> StoreResult<T> {
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        session: &Session,
        table: &str,
        order: &str,
    ) -> StoreResult<Vec<T>> {
        let request = self
            .client
            .get(self.table_url(table))
            .query(&[
                ("select", "*".to_string()),
                ("user_id", format!("eq.{}", session.user_id)),
                ("order", order.to_string()),
            ]);
        let response = self.authed(request, session).send().await?;
        Self::decode(Self::check(response).await?).await
    }

    async fn insert<T, B>(&self, session: &Session, table: &str, body: &B) -> StoreResult<T>
    where
        T: DeserializeOwned,
        B: serde::Serialize + Sync,
    {
        let request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(body);
        let response = self.authed(request, session).send().await?;
        let mut rows: Vec<T> = Self::decode(Self::check(response).await?).await?;
        if rows.is_empty() {
            return Err(StoreError::EmptyInsert);
        }
        Ok(rows.swap_remove(0))
    }

    async fn patch_by_id(
        &self,
        session: &Session,
        table: &str,
        id: Uuid,
        body: serde_json::Value,
    ) -> StoreResult<()> {
        let request = self
            .client
            .patch(self.table_url(table))
            .query(&[
                ("id", format!("eq.{}", id)),
                ("user_id", format!("eq.{}", session.user_id)),
            ])
            .json(&body);
        let response = self.authed(request, session).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete_by_id(&self, session: &Session, table: &str, id: Uuid) -> StoreResult<()> {
        let request = self.client.delete(self.table_url(table)).query(&[
            ("id", format!("eq.{}", id)),
            ("user_id", format!("eq.{}", session.user_id)),
        ]);
        let response = self.authed(request, session).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl Store for HttpStore {
    async fn list_tasks(&self, session: &Session) -> StoreResult<Vec<Task>> {
        self.select(session, "tasks", "created_at.desc").await
    }

    async fn insert_task(&self, session: &Session, new: &NewTask) -> StoreResult<Task> {
        self.insert(session, "tasks", new).await
    }

    async fn update_task_status(
        &self,
        session: &Session,
        id: Uuid,
        status: Status,
    ) -> StoreResult<()> {
        self.patch_by_id(session, "tasks", id, json!({ "status": status }))
            .await
    }

    async fn delete_task(&self, session: &Session, id: Uuid) -> StoreResult<()> {
        self.delete_by_id(session, "tasks", id).await
    }

    async fn list_subtasks(&self, session: &Session) -> StoreResult<Vec<Subtask>> {
        self.select(session, "subtasks", "created_at.asc").await
    }

    async fn insert_subtask(&self, session: &Session, new: &NewSubtask) -> StoreResult<Subtask> {
        self.insert(session, "subtasks", new).await
    }

    async fn set_subtask_completed(
        &self,
        session: &Session,
        id: Uuid,
        completed: bool,
    ) -> StoreResult<()> {
        self.patch_by_id(session, "subtasks", id, json!({ "completed": completed }))
            .await
    }

    async fn delete_subtask(&self, session: &Session, id: Uuid) -> StoreResult<()> {
        self.delete_by_id(session, "subtasks", id).await
    }
}
