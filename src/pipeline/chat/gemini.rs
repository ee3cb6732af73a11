//! Hosted Gemini backend for `TextGenerator`.
//!
//! Calls `models/{model}:generateContent` once per prompt with a blocking
//! client; callers run it off the async executor.

use serde::{Deserialize, Serialize};

use super::generation::{GenerationError, TextGenerator};

/// Gemini REST client for single-prompt completions.
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl GeminiClient {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: &str,
        timeout_secs: u64,
    ) -> Result<Self, GenerationError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| GenerationError::Connection(format!("HTTP client init: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.trim_start_matches("models/").to_string(),
            api_key: api_key.to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

/// Pull the completion text out of a `generateContent` response body.
fn extract_text(body: &str) -> Result<String, GenerationError> {
    let parsed: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::ResponseParsing(e.to_string()))?;

    if let Some(reason) = parsed
        .prompt_feedback
        .and_then(|f| f.block_reason)
        .filter(|r| !r.is_empty())
    {
        return Err(GenerationError::Blocked(reason));
    }

    let text: String = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    Ok(trimmed.to_string())
}

impl TextGenerator for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let body = GenerateContentRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout(self.timeout_secs)
                } else if e.is_connect() {
                    GenerationError::Connection(self.base_url.clone())
                } else {
                    GenerationError::Connection(e.to_string())
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|e| GenerationError::ResponseParsing(e.to_string()))?;

        if !status.is_success() {
            return Err(GenerationError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        let reply = extract_text(&text)?;
        tracing::debug!(model = %self.model, chars = reply.len(), "Gemini reply received");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GeminiClient {
        GeminiClient::new(
            "https://generativelanguage.googleapis.com/",
            "models/gemini-2.0-flash",
            "test-key",
            30,
        )
        .unwrap()
    }

    #[test]
    fn constructor_normalizes_url_and_model() {
        let c = client();
        assert_eq!(c.base_url, "https://generativelanguage.googleapis.com");
        assert_eq!(c.model(), "gemini-2.0-flash");
        assert_eq!(c.timeout_secs, 30);
    }

    #[test]
    fn endpoint_targets_generate_content() {
        assert_eq!(
            client().endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn request_body_shape() {
        let body = GenerateContentRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: "hi" }],
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
    }

    #[test]
    fn extract_text_joins_parts_and_trims() {
        let body = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Rest "},{"text":"and hydrate.\n"}]},"finishReason":"STOP"}]}"#;
        assert_eq!(extract_text(body).unwrap(), "Rest and hydrate.");
    }

    #[test]
    fn extract_text_reports_block_reason() {
        let body = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        assert_eq!(
            extract_text(body),
            Err(GenerationError::Blocked("SAFETY".into()))
        );
    }

    #[test]
    fn extract_text_empty_candidates() {
        assert_eq!(
            extract_text(r#"{"candidates":[]}"#),
            Err(GenerationError::EmptyResponse)
        );
        assert_eq!(
            extract_text(r#"{"candidates":[{"content":{"parts":[{"text":"   "}]}}]}"#),
            Err(GenerationError::EmptyResponse)
        );
    }

    #[test]
    fn extract_text_malformed_json() {
        assert!(matches!(
            extract_text("<html>"),
            Err(GenerationError::ResponseParsing(_))
        ));
    }
}
