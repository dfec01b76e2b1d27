use std::sync::{Arc, PoisonError, RwLock};

use uuid::Uuid;

/// An authenticated session as issued by the identity provider: the user's
/// id plus a bearer token accepted by both the store and the suggestion
/// service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
    pub access_token: String,
}

/// Explicitly-passed session capability. Repositories and the suggestion
/// workflow hold a clone of this handle instead of reading ambient global
/// state, so each can be tested with its own identity.
#[derive(Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionHandle {
    /// A handle with nobody signed in.
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle pre-populated with an active session.
    pub fn signed_in(session: Session) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(session))),
        }
    }

    pub fn current_session(&self) -> Option<Session> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn current_user(&self) -> Option<Uuid> {
        self.current_session().map(|s| s.user_id)
    }

    pub fn sign_in(&self, session: Session) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    pub fn sign_out(&self) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
