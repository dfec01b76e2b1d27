//! Shared fixtures for the integration tests: an engine wired to the
//! in-process store backend and a scripted suggestion service.
#![allow(dead_code)] // not every test binary uses every helper

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use tasksync::auth::{Session, SessionHandle};
use tasksync::engine::SyncEngine;
use tasksync::error::SuggestionError;
use tasksync::store::MemoryStore;
use tasksync::suggest::{Suggest, SuggestResult};

/// Suggestion service double: answers with pre-scripted responses in
/// order, optionally delaying each response to widen race windows.
#[derive(Default)]
pub struct ScriptedSuggester {
    responses: Mutex<VecDeque<SuggestResult<Vec<String>>>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedSuggester {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn push_titles(&self, titles: &[&str]) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Ok(titles.iter().map(|t| t.to_string()).collect()));
    }

    pub fn push_error(&self, error: SuggestionError) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Err(error));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Suggest for ScriptedSuggester {
    async fn suggest_subtasks(&self, _token: &str, _task_title: &str) -> SuggestResult<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

pub struct TestContext {
    pub engine: Arc<SyncEngine>,
    pub store: Arc<MemoryStore>,
    pub suggester: Arc<ScriptedSuggester>,
    pub auth: SessionHandle,
    pub session: Session,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_suggester(ScriptedSuggester::new())
    }

    pub fn with_suggester(suggester: ScriptedSuggester) -> Self {
        let store = Arc::new(MemoryStore::new());
        let suggester = Arc::new(suggester);
        let session = Session {
            user_id: Uuid::new_v4(),
            access_token: "test-token".to_string(),
        };
        let auth = SessionHandle::signed_in(session.clone());
        let engine = Arc::new(SyncEngine::new(
            Arc::clone(&store) as Arc<dyn tasksync::store::Store>,
            Arc::clone(&suggester) as Arc<dyn Suggest>,
            auth.clone(),
        ));

        Self {
            engine,
            store,
            suggester,
            auth,
            session,
        }
    }
}
