//! Shared types for the API layer.

use std::sync::Arc;

use uuid::Uuid;

use crate::api::error::ApiError;
use crate::core_state::{CoreState, SessionHandle};
use crate::session::ChatSession;

/// Longest chat message accepted, in characters.
pub const MAX_MESSAGE_CHARS: usize = 4000;

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

/// Authenticated session, injected into request extensions by the auth
/// middleware after the bearer token resolves.
#[derive(Clone)]
pub struct SessionContext {
    pub token: Uuid,
    pub handle: SessionHandle,
}

impl SessionContext {
    /// Run `f` with the session locked, on the blocking pool.
    ///
    /// The session mutex can be held for a whole model round-trip by a
    /// running turn, so it is never taken on an async worker.
    pub async fn with_session<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&mut ChatSession) -> T + Send + 'static,
    {
        let handle = Arc::clone(&self.handle);
        tokio::task::spawn_blocking(move || -> Result<T, ApiError> {
            let mut session = handle
                .lock()
                .map_err(|_| ApiError::Internal("session lock poisoned".into()))?;
            Ok(f(&mut *session))
        })
        .await?
    }
}
