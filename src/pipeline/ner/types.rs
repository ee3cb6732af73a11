use serde::{Deserialize, Serialize};

use super::NerError;

/// One labeled span from the sequence-labeling model.
///
/// `label` is the model's entity tag with any `B-`/`I-` prefix removed
/// (e.g. `Disease`, `Chemical`). Offsets are whatever the backend reports:
/// character offsets from the inference endpoint, byte offsets from the
/// local ONNX model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySpan {
    pub text: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<usize>,
}

impl EntitySpan {
    pub fn new(text: &str, label: &str) -> Self {
        Self {
            text: text.to_string(),
            label: label.to_string(),
            score: None,
            start: None,
            end: None,
        }
    }

    pub fn is_disease(&self) -> bool {
        self.label.to_lowercase().contains("disease")
    }
}

/// Token-classification model boundary: arbitrary text in, spans out.
/// Implementations are stateless across calls.
pub trait EntityRecognizer: Send + Sync {
    fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>, NerError>;
}

/// Strip a `B-`/`I-`/`E-`/`S-` tagging prefix from a model label.
pub fn strip_iob_prefix(label: &str) -> &str {
    match label.split_once('-') {
        Some((prefix, rest)) if matches!(prefix, "B" | "I" | "E" | "S" | "L" | "U") => rest,
        _ => label,
    }
}

/// Mock recognizer for testing: finds fixed terms by substring search, or fails.
pub struct MockRecognizer {
    entities: Vec<EntitySpan>,
    fail: bool,
}

impl MockRecognizer {
    /// Recognize each `(surface, label)` wherever it occurs in the input.
    pub fn with_entities(entities: &[(&str, &str)]) -> Self {
        Self {
            entities: entities
                .iter()
                .map(|(text, label)| EntitySpan::new(text, label))
                .collect(),
            fail: false,
        }
    }

    pub fn empty() -> Self {
        Self::with_entities(&[])
    }

    pub fn failing() -> Self {
        Self {
            entities: Vec::new(),
            fail: true,
        }
    }
}

impl EntityRecognizer for MockRecognizer {
    fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>, NerError> {
        if self.fail {
            return Err(NerError::Inference("mock backend down".into()));
        }
        Ok(self
            .entities
            .iter()
            .filter(|e| text.contains(&e.text))
            .cloned()
            .collect())
    }
}
