use std::collections::HashMap;
use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "HealthMate";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_NER_URL: &str =
    "https://api-inference.huggingface.co/models/raynardj/ner-disease-ncbi-bionlp-bc5cdr-pubmed";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),
    #[error("Environment variable {0} is not a valid integer")]
    ParseInt(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "info,healthmate_lib=debug"
    } else {
        "warn,healthmate_lib=info"
    }
}

/// Get the application data directory
/// ~/HealthMate/ on all platforms. Falls back to the working directory when
/// no home directory can be determined (containers, service accounts).
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Get the models directory (for the local ONNX NER model)
pub fn models_dir() -> PathBuf {
    app_data_dir().join("models")
}

/// Which entity-recognition backend to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NerBackend {
    InferenceApi { url: String, token: Option<String> },
    Onnx { model_dir: PathBuf },
}

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub generation_timeout_secs: u64,
    pub ner: NerBackend,
    pub transcript_path: PathBuf,
    pub users: HashMap<String, String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_raw = optional_trimmed_env("HEALTHMATE_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse::<SocketAddr>().map_err(|_| {
            ConfigError::InvalidConfiguration(format!(
                "HEALTHMATE_BIND_ADDR '{bind_raw}' is not a socket address"
            ))
        })?;

        let ner = match optional_trimmed_env("HEALTHMATE_NER_BACKEND").as_deref() {
            None | Some("inference-api") => NerBackend::InferenceApi {
                url: optional_trimmed_env("HEALTHMATE_NER_URL")
                    .unwrap_or_else(|| DEFAULT_NER_URL.to_string()),
                token: optional_trimmed_env("HF_API_TOKEN"),
            },
            Some("onnx") => NerBackend::Onnx {
                model_dir: optional_trimmed_env("HEALTHMATE_NER_MODEL_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| models_dir().join("ner-disease")),
            },
            Some(other) => {
                return Err(ConfigError::InvalidConfiguration(format!(
                    "HEALTHMATE_NER_BACKEND must be 'inference-api' or 'onnx', got '{other}'"
                )))
            }
        };

        let users = match optional_trimmed_env("HEALTHMATE_USERS_FILE") {
            Some(path) => load_users_file(Path::new(&path))?,
            None => parse_users(&require_env("HEALTHMATE_USERS")?)?,
        };

        Ok(Self {
            bind_addr,
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_model: optional_trimmed_env("HEALTHMATE_GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: optional_trimmed_env("HEALTHMATE_GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            generation_timeout_secs: parse_u64_env(
                "HEALTHMATE_GENERATION_TIMEOUT_SECS",
                DEFAULT_GENERATION_TIMEOUT_SECS,
            )?,
            ner,
            transcript_path: optional_trimmed_env("HEALTHMATE_TRANSCRIPT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| app_data_dir().join("chat_records.json")),
            users,
        })
    }
}

/// Parse `user:pass,user2:pass2`. Passwords may contain `:`; the username
/// ends at the first one.
pub fn parse_users(raw: &str) -> Result<HashMap<String, String>, ConfigError> {
    let mut users = HashMap::new();
    for item in raw.split(',').map(str::trim).filter(|i| !i.is_empty()) {
        let (user, pass) = item.split_once(':').ok_or_else(|| {
            ConfigError::InvalidConfiguration(format!(
                "HEALTHMATE_USERS entry '{item}' is not user:password"
            ))
        })?;
        if user.trim().is_empty() {
            return Err(ConfigError::InvalidConfiguration(
                "HEALTHMATE_USERS contains an empty username".into(),
            ));
        }
        users.insert(user.trim().to_string(), pass.to_string());
    }
    if users.is_empty() {
        return Err(ConfigError::InvalidConfiguration(
            "no credentials configured".into(),
        ));
    }
    Ok(users)
}

/// Load credentials from a JSON object `{ "user": "password" }`.
pub fn load_users_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let users: HashMap<String, String> = serde_json::from_str(&data).map_err(|e| {
        ConfigError::InvalidConfiguration(format!("{}: {e}", path.display()))
    })?;
    if users.is_empty() {
        return Err(ConfigError::InvalidConfiguration(format!(
            "{} defines no users",
            path.display()
        )));
    }
    Ok(users)
}

fn require_env(key: &str) -> Result<String, ConfigError> {
    optional_trimmed_env(key).ok_or_else(|| ConfigError::MissingVar(key.to_string()))
}

fn parse_u64_env(key: &str, default: u64) -> Result<u64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::ParseInt(key.to_string())),
        Err(_) => Ok(default),
    }
}

fn optional_trimmed_env(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
