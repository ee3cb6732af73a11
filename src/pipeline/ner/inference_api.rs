//! Remote token-classification backend.
//!
//! Speaks the Hugging Face inference format: POST `{"inputs": text}` and
//! receive a JSON array of `{entity_group | entity, word, score, start, end}`.
//! Aggregation is requested server-side so multi-token entities arrive merged.

use serde::{Deserialize, Serialize};

use super::types::{strip_iob_prefix, EntityRecognizer, EntitySpan};
use super::NerError;

/// Default timeout for one NER call.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub struct InferenceApiRecognizer {
    url: String,
    token: Option<String>,
    client: reqwest::blocking::Client,
}

impl InferenceApiRecognizer {
    pub fn new(url: &str, token: Option<String>) -> Result<Self, NerError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| NerError::Connection(format!("HTTP client init: {e}")))?;

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            token,
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Serialize)]
struct TokenClassificationRequest<'a> {
    inputs: &'a str,
    parameters: RequestParameters,
}

#[derive(Serialize)]
struct RequestParameters {
    aggregation_strategy: &'static str,
}

#[derive(Deserialize)]
struct RawEntity {
    #[serde(default)]
    entity_group: Option<String>,
    #[serde(default)]
    entity: Option<String>,
    word: String,
    #[serde(default)]
    score: Option<f32>,
    #[serde(default)]
    start: Option<usize>,
    #[serde(default)]
    end: Option<usize>,
}

/// Convert the endpoint's JSON array into spans.
///
/// `start`/`end` are character offsets; when they are present and in range
/// the surface form is sliced from the input, since uncased tokenizers
/// report `word` lower-cased.
fn parse_entities(input: &str, body: &str) -> Result<Vec<EntitySpan>, NerError> {
    let raw: Vec<RawEntity> =
        serde_json::from_str(body).map_err(|e| NerError::ResponseParsing(e.to_string()))?;

    Ok(raw
        .into_iter()
        .filter_map(|r| {
            let label = r.entity_group.or(r.entity)?;
            let surface = match (r.start, r.end) {
                (Some(start), Some(end)) if start < end => {
                    let sliced: String = input.chars().skip(start).take(end - start).collect();
                    if sliced.chars().count() == end - start {
                        sliced
                    } else {
                        r.word.clone()
                    }
                }
                _ => r.word.clone(),
            };
            Some(EntitySpan {
                text: surface,
                label: strip_iob_prefix(&label).to_string(),
                score: r.score,
                start: r.start,
                end: r.end,
            })
        })
        .collect())
}

impl EntityRecognizer for InferenceApiRecognizer {
    fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>, NerError> {
        let body = TokenClassificationRequest {
            inputs: text,
            parameters: RequestParameters {
                aggregation_strategy: "simple",
            },
        };

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().map_err(|e| {
            if e.is_connect() {
                NerError::Connection(self.url.clone())
            } else {
                NerError::Connection(e.to_string())
            }
        })?;

        let status = response.status();
        let payload = response
            .text()
            .map_err(|e| NerError::ResponseParsing(e.to_string()))?;

        if !status.is_success() {
            return Err(NerError::Http {
                status: status.as_u16(),
                body: payload,
            });
        }

        parse_entities(text, &payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_trims_trailing_slash() {
        let recognizer = InferenceApiRecognizer::new("http://localhost:9000/ner/", None).unwrap();
        assert_eq!(recognizer.url(), "http://localhost:9000/ner");
    }

    #[test]
    fn parses_aggregated_output() {
        let input = "Type 2 Diabetes and asthma";
        let body = r#"[
            {"entity_group": "Disease", "score": 0.99, "word": "type 2 diabetes", "start": 0, "end": 15},
            {"entity_group": "Disease", "score": 0.97, "word": "asthma", "start": 20, "end": 26}
        ]"#;
        let spans = parse_entities(input, body).unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "Type 2 Diabetes");
        assert_eq!(spans[0].label, "Disease");
        assert_eq!(spans[1].text, "asthma");
        assert_eq!(spans[1].score, Some(0.97));
    }

    #[test]
    fn parses_per_token_output_and_strips_prefix() {
        let body = r#"[{"entity": "B-Disease", "word": "flu"}]"#;
        let spans = parse_entities("flu", body).unwrap();
        assert_eq!(spans[0].label, "Disease");
        assert_eq!(spans[0].text, "flu");
    }

    #[test]
    fn out_of_range_offsets_fall_back_to_word() {
        let body = r#"[{"entity_group": "Disease", "word": "gout", "start": 10, "end": 14}]"#;
        let spans = parse_entities("gout", body).unwrap();
        assert_eq!(spans[0].text, "gout");
    }

    #[test]
    fn offsets_count_characters_not_bytes() {
        let input = "Fièvre et grippe";
        let body = r#"[{"entity_group": "Disease", "word": "grippe", "start": 10, "end": 16}]"#;
        let spans = parse_entities(input, body).unwrap();
        assert_eq!(spans[0].text, "grippe");
    }

    #[test]
    fn entries_without_label_are_skipped() {
        let body = r#"[{"word": "something"}]"#;
        assert!(parse_entities("something", body).unwrap().is_empty());
    }

    #[test]
    fn error_object_is_parse_error() {
        let body = r#"{"error": "Model is currently loading", "estimated_time": 20.0}"#;
        assert!(matches!(
            parse_entities("x", body),
            Err(NerError::ResponseParsing(_))
        ));
    }
}
