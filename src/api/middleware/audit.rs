//! Access logging middleware.
//!
//! Logs every API request with method, path, response status, and, when
//! auth has injected SessionContext, username and session id. Runs innermost.

use std::time::Instant;

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::types::SessionContext;

pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let session = req.extensions().get::<SessionContext>().cloned();
    let started = Instant::now();

    let response = next.run(req).await;

    // The handler may still hold the session for a turn; never block on it here.
    let (username, session_id) = session
        .as_ref()
        .and_then(|s| {
            s.handle
                .try_lock()
                .ok()
                .map(|g| (g.username().to_string(), g.id.to_string()))
        })
        .unwrap_or_else(|| ("-".to_string(), "-".to_string()));

    tracing::info!(
        %method,
        path = %path,
        username = %username,
        session = %session_id,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "API access"
    );
    response
}
