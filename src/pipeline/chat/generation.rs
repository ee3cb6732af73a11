use std::sync::Mutex;

use thiserror::Error;

/// Reply shown when the generation service could not produce text.
pub const FALLBACK_REPLY: &str = "⚠️ An unexpected error occurred. Please try again.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Generation service unreachable: {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Generation service returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Generation service returned no text")]
    EmptyResponse,

    #[error("Prompt blocked by the generation service: {0}")]
    Blocked(String),
}

/// One prompt in, one completion out. A single attempt per call.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Map a generation result to the text shown to the user.
///
/// Success yields the trimmed completion. Any failure is logged with full
/// detail and replaced by `FALLBACK_REPLY`; callers never see the error.
pub fn ask_model(generator: &dyn TextGenerator, prompt: &str) -> String {
    match generator.generate(prompt) {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            tracing::error!(error = %e, "Generation failed, using fallback reply");
            FALLBACK_REPLY.to_string()
        }
    }
}

/// Mock generator for testing: returns a configurable result and records
/// every prompt it receives.
pub struct MockGenerator {
    result: Result<String, GenerationError>,
    prompts: Mutex<Vec<String>>,
}

impl MockGenerator {
    pub fn replying(text: &str) -> Self {
        Self {
            result: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: GenerationError) -> Self {
        Self {
            result: Err(error),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl TextGenerator for MockGenerator {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.result.clone()
    }
}
