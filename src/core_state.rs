//! Transport-agnostic application state.
//!
//! `CoreState` owns the collaborators every request needs: the credential
//! check, the turn pipeline, and the live chat sessions. It is built once at
//! startup and shared behind an `Arc`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use thiserror::Error;
use uuid::Uuid;

use crate::auth::{AuthError, Authenticator, Identity};
use crate::pipeline::chat::ChatPipeline;
use crate::session::ChatSession;
use crate::transcript::TranscriptStore;

/// One logged-in session. The mutex is held for a whole turn.
pub type SessionHandle = Arc<Mutex<ChatSession>>;

pub struct CoreState {
    authenticator: Arc<dyn Authenticator>,
    pipeline: ChatPipeline,
    /// Bearer token → session.
    sessions: RwLock<HashMap<Uuid, SessionHandle>>,
}

impl CoreState {
    pub fn new(authenticator: Arc<dyn Authenticator>, pipeline: ChatPipeline) -> Self {
        Self {
            authenticator,
            pipeline,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn pipeline(&self) -> &ChatPipeline {
        &self.pipeline
    }

    pub fn store(&self) -> &Arc<TranscriptStore> {
        self.pipeline.store()
    }

    // ── Session lifecycle ───────────────────────────────────

    /// Check credentials and open a fresh session. Returns its bearer token.
    pub fn login(&self, username: &str, password: &str) -> Result<(Uuid, Identity), CoreError> {
        let identity = self.authenticator.authenticate(username, password)?;
        let token = Uuid::new_v4();
        let session = ChatSession::new(identity.clone());
        tracing::info!(username = %identity.username, session = %session.id, "Session opened");

        self.sessions
            .write()
            .map_err(|_| CoreError::LockPoisoned)?
            .insert(token, Arc::new(Mutex::new(session)));
        Ok((token, identity))
    }

    /// Drop the session and its in-memory history. Returns whether it existed.
    pub fn logout(&self, token: &Uuid) -> Result<bool, CoreError> {
        let removed = self
            .sessions
            .write()
            .map_err(|_| CoreError::LockPoisoned)?
            .remove(token);
        if removed.is_some() {
            tracing::info!("Session closed");
        }
        Ok(removed.is_some())
    }

    pub fn session(&self, token: &Uuid) -> Result<Option<SessionHandle>, CoreError> {
        Ok(self
            .sessions
            .read()
            .map_err(|_| CoreError::LockPoisoned)?
            .get(token)
            .cloned())
    }

    pub fn session_count(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Internal lock error")]
    LockPoisoned,
    #[error(transparent)]
    Auth(#[from] AuthError),
}
