//! Chat endpoints.
//!
//! - `POST /api/chat/send`: run one turn and return the reply
//! - `GET /api/chat/history`: the session's messages, replies highlighted
//! - `GET /api/chat/export`: download the history as `chat_history.json`

use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionContext, MAX_MESSAGE_CHARS};
use crate::models::Sender;
use crate::pipeline::chat::TurnState;
use crate::transcript::{export_history, EXPORT_FILE_NAME, EXPORT_MIME};

#[derive(Deserialize)]
pub struct ChatSendRequest {
    pub message: String,
}

#[derive(Serialize)]
pub struct ChatSendResponse {
    pub reply: String,
    pub is_health: bool,
    pub route: &'static str,
    pub final_state: TurnState,
    pub persisted: bool,
}

#[derive(Serialize)]
pub struct HistoryMessage {
    pub sender: Sender,
    pub text: String,
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub messages: Vec<HistoryMessage>,
}

/// `POST /api/chat/send`: run a full turn for the caller's session.
///
/// The session stays locked until the transcript is written, so a second
/// send on the same session waits for this one.
pub async fn send(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Json(req): Json<ChatSendRequest>,
) -> Result<Json<ChatSendResponse>, ApiError> {
    if req.message.trim().is_empty() {
        return Err(ApiError::BadRequest("Message cannot be empty".into()));
    }
    if req.message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Message too long (max {MAX_MESSAGE_CHARS} chars)"
        )));
    }

    let core = Arc::clone(&ctx.core);
    let message = req.message;
    let outcome = session
        .with_session(move |s| core.pipeline().run_turn(s, &message))
        .await?;

    Ok(Json(ChatSendResponse {
        reply: outcome.reply,
        is_health: outcome.is_health,
        route: outcome.route.as_str(),
        final_state: outcome.final_state,
        persisted: outcome.persisted,
    }))
}

/// `GET /api/chat/history`: user text verbatim, assistant text highlighted.
pub async fn history(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let history = session.with_session(|s| s.history.clone()).await?;

    let core = Arc::clone(&ctx.core);
    let messages = tokio::task::spawn_blocking(move || {
        let annotator = core.pipeline().annotator();
        history
            .iter()
            .map(|m| HistoryMessage {
                sender: m.sender,
                text: annotator.highlight_message(m),
            })
            .collect::<Vec<_>>()
    })
    .await?;

    Ok(Json(HistoryResponse { messages }))
}

/// `GET /api/chat/export`: the raw history as a JSON attachment.
pub async fn export(Extension(session): Extension<SessionContext>) -> Result<Response, ApiError> {
    let history = session.with_session(|s| s.history.clone()).await?;
    if history.is_empty() {
        return Err(ApiError::NotFound("No messages to export".into()));
    }

    let bytes = export_history(&history)?;
    Ok((
        [
            (header::CONTENT_TYPE, EXPORT_MIME.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::api::test_support::TestApp;
    use crate::pipeline::chat::generation::FALLBACK_REPLY;
    use crate::pipeline::chat::validate::INVALID_AGE_WARNING;
    use crate::transcript::parse_export;

    #[tokio::test]
    async fn send_runs_general_turn() {
        let app = TestApp::new("Happy to help!", &[]);
        let token = app.login().await;

        let (status, body) = app
            .post(&token, "/api/chat/send", json!({"message": "Hello, how are you?"}))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reply"], "Happy to help!");
        assert_eq!(body["is_health"], false);
        assert_eq!(body["route"], "general");
        assert_eq!(body["final_state"], "persisted");
        assert_eq!(body["persisted"], true);
        assert_eq!(app.generator.call_count(), 1);
    }

    #[tokio::test]
    async fn send_health_question_with_bad_age_skips_model() {
        let app = TestApp::new("unused", &[]);
        let token = app.login().await;
        app.put(
            &token,
            "/api/session/profile",
            json!({"name": "Sam", "age": "abc", "gender": "Male"}),
        )
        .await;

        let (status, body) = app
            .post(&token, "/api/chat/send", json!({"message": "I have a fever"}))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reply"], INVALID_AGE_WARNING);
        assert_eq!(body["route"], "validation_rejected");
        assert_eq!(app.generator.call_count(), 0);
    }

    #[tokio::test]
    async fn send_rejects_empty_and_oversized_messages() {
        let app = TestApp::new("unused", &[]);
        let token = app.login().await;

        let (status, body) = app
            .post(&token, "/api/chat/send", json!({"message": "   "}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");

        let long = "a".repeat(4001);
        let (status, _) = app
            .post(&token, "/api/chat/send", json!({"message": long}))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(app.generator.call_count(), 0);
    }

    #[tokio::test]
    async fn message_at_limit_is_accepted() {
        let app = TestApp::new("ok", &[]);
        let token = app.login().await;
        let exact = "é".repeat(4000);
        let (status, _) = app
            .post(&token, "/api/chat/send", json!({"message": exact}))
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn send_requires_auth() {
        let app = TestApp::new("unused", &[]);
        let (status, body) = app
            .post("not-a-token", "/api/chat/send", json!({"message": "hi"}))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "AUTH_REQUIRED");
    }

    #[tokio::test]
    async fn history_highlights_assistant_only() {
        let app = TestApp::new("Asthma can be controlled.", &[("Asthma", "Disease")]);
        let token = app.login().await;
        app.post(&token, "/api/chat/send", json!({"message": "tell me something"}))
            .await;

        let (status, body) = app.get(&token, "/api/chat/history").await;
        assert_eq!(status, StatusCode::OK);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["sender"], "You");
        assert_eq!(messages[0]["text"], "tell me something");
        assert_eq!(messages[1]["sender"], "Assistant");
        assert_eq!(messages[1]["text"], "<mark>Asthma</mark> can be controlled.");
    }

    #[tokio::test]
    async fn export_returns_attachment_that_parses_back() {
        let app = TestApp::failing_generator();
        let token = app.login().await;
        app.post(&token, "/api/chat/send", json!({"message": "hello"}))
            .await;

        let response = app.raw_get(&token, "/api/chat/export").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "application/json");
        assert!(response.headers()["content-disposition"]
            .to_str()
            .unwrap()
            .contains("chat_history.json"));

        let bytes = crate::api::test_support::body_bytes(response).await;
        let history = parse_export(&bytes).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].text, "hello");
        assert_eq!(history[1].text, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn export_of_empty_history_is_not_found() {
        let app = TestApp::new("unused", &[]);
        let token = app.login().await;
        let (status, _) = app.get(&token, "/api/chat/export").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
