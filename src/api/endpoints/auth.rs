//! Login and logout.

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionContext};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub logged_out: bool,
}

/// `POST /api/auth/login`: exchange credentials for a bearer token bound
/// to a new, empty chat session.
pub async fn login(
    State(ctx): State<ApiContext>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (token, identity) = ctx.core.login(&req.username, &req.password)?;
    Ok(Json(LoginResponse {
        token: token.to_string(),
        username: identity.username,
    }))
}

/// `POST /api/auth/logout`: drop the session and its in-memory history.
pub async fn logout(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<LogoutResponse>, ApiError> {
    let logged_out = ctx.core.logout(&session.token)?;
    Ok(Json(LogoutResponse { logged_out }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::api::test_support::{TestApp, TEST_USER};

    #[tokio::test]
    async fn login_issues_token_for_valid_credentials() {
        let app = TestApp::new("ok", &[]);
        let token = app.login().await;
        assert!(uuid::Uuid::parse_str(&token).is_ok());

        let (status, body) = app.get(&token, "/api/session").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], TEST_USER);
    }

    #[tokio::test]
    async fn login_rejects_wrong_password() {
        let app = TestApp::new("ok", &[]);
        let (status, body) = app
            .send(
                None,
                "POST",
                "/api/auth/login",
                Some(json!({"username": TEST_USER, "password": "wrong"})),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
        assert_eq!(app.core.session_count(), 0);
    }

    #[tokio::test]
    async fn logout_invalidates_token_and_history() {
        let app = TestApp::new("ok", &[]);
        let token = app.login().await;
        app.post(&token, "/api/chat/send", json!({"message": "hello"}))
            .await;

        let (status, body) = app.post(&token, "/api/auth/logout", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["logged_out"], true);

        let (status, _) = app.get(&token, "/api/chat/history").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let fresh = app.login().await;
        let (_, body) = app.get(&fresh, "/api/chat/history").await;
        assert_eq!(body["messages"], json!([]));
    }
}
