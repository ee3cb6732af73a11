pub mod api;
pub mod auth;
pub mod config;
pub mod core_state;
pub mod models;
pub mod pipeline;
pub mod session;
pub mod transcript;

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::api::server::ServerError;
use crate::auth::StaticCredentials;
use crate::config::{AppConfig, ConfigError, NerBackend};
use crate::core_state::CoreState;
use crate::pipeline::chat::gemini::GeminiClient;
use crate::pipeline::chat::generation::GenerationError;
use crate::pipeline::chat::ChatPipeline;
use crate::pipeline::ner::highlight::Annotator;
use crate::pipeline::ner::inference_api::InferenceApiRecognizer;
use crate::pipeline::ner::types::EntityRecognizer;
use crate::pipeline::ner::NerError;
use crate::transcript::TranscriptStore;

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Entity recognizer unavailable: {0}")]
    Ner(#[from] NerError),
    #[error("Generation client unavailable: {0}")]
    Generation(#[from] GenerationError),
    #[error("Cannot start async runtime: {0}")]
    Runtime(std::io::Error),
    #[error(transparent)]
    Server(#[from] ServerError),
}

pub fn run() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    if let Err(e) = start() {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn start() -> Result<(), StartupError> {
    let config = AppConfig::from_env()?;

    // The HTTP clients are blocking and must be built, and dropped, outside
    // the async runtime. `core` outlives the runtime for that reason.
    let core = build_core(&config)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(StartupError::Runtime)?;
    let result = runtime.block_on(serve(Arc::clone(&core), config.bind_addr));
    drop(runtime);
    drop(core);
    result
}

/// Wire every collaborator from configuration.
pub fn build_core(config: &AppConfig) -> Result<Arc<CoreState>, StartupError> {
    let recognizer = build_recognizer(&config.ner)?;
    let generator = GeminiClient::new(
        &config.gemini_base_url,
        &config.gemini_model,
        &config.gemini_api_key,
        config.generation_timeout_secs,
    )?;
    tracing::info!(
        model = generator.model(),
        timeout_secs = config.generation_timeout_secs,
        "Generation client ready"
    );

    let store = Arc::new(TranscriptStore::new(&config.transcript_path));
    tracing::info!(path = %store.path().display(), "Transcript store");

    let credentials = StaticCredentials::new(config.users.clone());
    tracing::info!(users = credentials.len(), "Credentials loaded");

    let pipeline = ChatPipeline::new(Arc::new(generator), Annotator::new(recognizer), store);
    Ok(Arc::new(CoreState::new(Arc::new(credentials), pipeline)))
}

fn build_recognizer(backend: &NerBackend) -> Result<Arc<dyn EntityRecognizer>, StartupError> {
    match backend {
        NerBackend::InferenceApi { url, token } => {
            let recognizer = InferenceApiRecognizer::new(url, token.clone())?;
            tracing::info!(url = recognizer.url(), "NER backend: inference API");
            Ok(Arc::new(recognizer))
        }
        #[cfg(feature = "onnx-ner")]
        NerBackend::Onnx { model_dir } => {
            let recognizer = pipeline::ner::onnx::OnnxRecognizer::load(model_dir)?;
            tracing::info!(dir = %model_dir.display(), "NER backend: local ONNX model");
            Ok(Arc::new(recognizer))
        }
        #[cfg(not(feature = "onnx-ner"))]
        NerBackend::Onnx { .. } => Err(ConfigError::InvalidConfiguration(
            "HEALTHMATE_NER_BACKEND=onnx requires building with the onnx-ner feature".into(),
        )
        .into()),
    }
}

async fn serve(core: Arc<CoreState>, addr: SocketAddr) -> Result<(), StartupError> {
    let server = api::start_api_server(core, addr).await?;
    tracing::info!(addr = %server.addr, "Listening");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for shutdown signal: {e}");
    }
    tracing::info!("Shutting down");
    server.stop().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn test_config(dir: &tempfile::TempDir, ner: NerBackend) -> AppConfig {
        AppConfig {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            gemini_api_key: "test-key".into(),
            gemini_model: config::DEFAULT_GEMINI_MODEL.into(),
            gemini_base_url: "http://127.0.0.1:9".into(),
            generation_timeout_secs: 5,
            ner,
            transcript_path: dir.path().join("records.json"),
            users: HashMap::from([("doctor".to_string(), "health123".to_string())]),
        }
    }

    #[test]
    fn build_core_wires_inference_backend() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(
            &dir,
            NerBackend::InferenceApi {
                url: "http://127.0.0.1:9/ner".into(),
                token: None,
            },
        );
        let core = build_core(&config).unwrap();
        assert_eq!(core.store().path(), dir.path().join("records.json"));
        assert!(core.login("doctor", "health123").is_ok());
    }

    #[cfg(not(feature = "onnx-ner"))]
    #[test]
    fn onnx_backend_needs_feature() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(
            &dir,
            NerBackend::Onnx {
                model_dir: PathBuf::from("/nonexistent"),
            },
        );
        assert!(matches!(
            build_core(&config),
            Err(StartupError::Config(ConfigError::InvalidConfiguration(_)))
        ));
    }

    #[cfg(feature = "onnx-ner")]
    #[test]
    fn onnx_backend_reports_missing_model() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(
            &dir,
            NerBackend::Onnx {
                model_dir: PathBuf::from("/nonexistent"),
            },
        );
        assert!(matches!(build_core(&config), Err(StartupError::Ner(_))));
    }
}
