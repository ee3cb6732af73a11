//! In-process router harness for endpoint tests.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use crate::api::router::api_router;
use crate::auth::StaticCredentials;
use crate::core_state::CoreState;
use crate::pipeline::chat::generation::{GenerationError, MockGenerator};
use crate::pipeline::chat::ChatPipeline;
use crate::pipeline::ner::highlight::Annotator;
use crate::pipeline::ner::types::MockRecognizer;
use crate::transcript::TranscriptStore;

pub const TEST_USER: &str = "doctor";
pub const TEST_PASSWORD: &str = "health123";

pub struct TestApp {
    dir: tempfile::TempDir,
    pub generator: Arc<MockGenerator>,
    pub core: Arc<CoreState>,
    router: Router,
}

impl TestApp {
    /// Generator always answers `reply`; recognizer knows `entities`.
    pub fn new(reply: &str, entities: &[(&str, &str)]) -> Self {
        Self::build(MockGenerator::replying(reply), entities)
    }

    pub fn failing_generator() -> Self {
        Self::build(
            MockGenerator::failing(GenerationError::Connection("offline".into())),
            &[],
        )
    }

    fn build(generator: MockGenerator, entities: &[(&str, &str)]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let generator = Arc::new(generator);
        let pipeline = ChatPipeline::new(
            generator.clone(),
            Annotator::new(Arc::new(MockRecognizer::with_entities(entities))),
            Arc::new(TranscriptStore::new(dir.path().join("chat_records.json"))),
        );
        let credentials = StaticCredentials::new(HashMap::from([(
            TEST_USER.to_string(),
            TEST_PASSWORD.to_string(),
        )]));
        let core = Arc::new(CoreState::new(Arc::new(credentials), pipeline));
        let router = api_router(core.clone());
        Self {
            dir,
            generator,
            core,
            router,
        }
    }

    pub fn transcript_path(&self) -> PathBuf {
        self.dir.path().join("chat_records.json")
    }

    /// Log in as the test user and return the bearer token.
    pub async fn login(&self) -> String {
        let (status, body) = self
            .send(
                None,
                "POST",
                "/api/auth/login",
                Some(serde_json::json!({"username": TEST_USER, "password": TEST_PASSWORD})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn get(&self, token: &str, uri: &str) -> (StatusCode, serde_json::Value) {
        self.send(Some(token), "GET", uri, None).await
    }

    pub async fn post(
        &self,
        token: &str,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        self.send(Some(token), "POST", uri, Some(body)).await
    }

    pub async fn put(
        &self,
        token: &str,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        self.send(Some(token), "PUT", uri, Some(body)).await
    }

    pub async fn raw_get(&self, token: &str, uri: &str) -> Response {
        self.request(Some(token), "GET", uri, None).await
    }

    pub async fn send(
        &self,
        token: Option<&str>,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let response = self.request(token, method, uri, body).await;
        let status = response.status();
        let bytes = body_bytes(response).await;
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        (status, json)
    }

    async fn request(
        &self,
        token: Option<&str>,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub async fn body_bytes(response: Response) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}
