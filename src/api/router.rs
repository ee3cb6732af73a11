//! API router.
//!
//! Returns a composable `Router` with every route under `/api/`.
//!
//! Middleware stack on protected routes (outermost → innermost):
//! 1. Auth validator → 2. Audit logger
//!
//! Unprotected routes carry the audit logger only.

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the API router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn api_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext::new(core);

    // Layers apply bottom (innermost) to top (outermost). Extension must be
    // outermost so the auth middleware can reach ApiContext.
    let protected = Router::new()
        .route("/auth/logout", post(endpoints::auth::logout))
        .route("/session", get(endpoints::session::get))
        .route("/session/profile", put(endpoints::session::update_profile))
        .route("/session/topic", put(endpoints::session::update_topic))
        .route("/chat/send", post(endpoints::chat::send))
        .route("/chat/history", get(endpoints::chat::history))
        .route("/chat/export", get(endpoints::chat::export))
        .route("/records", get(endpoints::records::list))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        .layer(axum::Extension(ctx.clone()));

    let unprotected = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/auth/login", post(endpoints::auth::login))
        .with_state(ctx)
        .layer(axum::middleware::from_fn(middleware::audit::log_access));

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Router::new()
        .nest("/api", protected)
        .nest("/api", unprotected)
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::api::test_support::TestApp;

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let app = TestApp::new("ok", &[]);
        let (status, _) = app.send(None, "GET", "/api/nonexistent", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn protected_routes_reject_missing_token() {
        let app = TestApp::new("ok", &[]);
        for (method, uri) in [
            ("GET", "/api/session"),
            ("GET", "/api/chat/history"),
            ("GET", "/api/chat/export"),
            ("GET", "/api/records"),
            ("POST", "/api/auth/logout"),
        ] {
            let (status, body) = app.send(None, method, uri, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
            assert_eq!(body["error"]["code"], "AUTH_REQUIRED");
        }
    }

    #[tokio::test]
    async fn well_formed_but_unknown_token_is_rejected() {
        let app = TestApp::new("ok", &[]);
        let stranger = uuid::Uuid::new_v4().to_string();
        let (status, _) = app.get(&stranger, "/api/session").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn responses_are_not_cacheable() {
        let app = TestApp::new("ok", &[]);
        let token = app.login().await;
        let response = app.raw_get(&token, "/api/session").await;
        assert_eq!(response.headers()["cache-control"], "no-store");
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let app = TestApp::new("ok", &[]);
        let a = app.login().await;
        let b = app.login().await;

        app.post(&a, "/api/chat/send", json!({"message": "hello"}))
            .await;

        let (_, body_a) = app.get(&a, "/api/session").await;
        let (_, body_b) = app.get(&b, "/api/session").await;
        assert_eq!(body_a["history_len"], 2);
        assert_eq!(body_b["history_len"], 0);
    }

    #[tokio::test]
    async fn full_health_flow_end_to_end() {
        let app = TestApp::new("Rest and stay hydrated.", &[]);
        let token = app.login().await;
        app.put(
            &token,
            "/api/session/profile",
            json!({"name": "Sam", "age": "30", "gender": "Male"}),
        )
        .await;

        let question = "What should I do for my headache?";
        let (status, body) = app
            .post(&token, "/api/chat/send", json!({"message": question}))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["route"], "health");

        let prompt = &app.generator.prompts()[0];
        for needle in ["Sam", "30", "Male", "General", question] {
            assert!(prompt.contains(needle));
        }

        let (_, records) = app.get(&token, "/api/records").await;
        assert_eq!(records["records"].as_array().unwrap().len(), 1);
    }
}
