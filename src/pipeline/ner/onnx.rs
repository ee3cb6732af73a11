//! Local token-classification model via ONNX Runtime.
//!
//! The model directory holds a Hugging Face export:
//! - `model.onnx`: the token-classification graph
//! - `tokenizer.json`: HuggingFace tokenizer definition
//! - `config.json`: only `id2label` is read

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use serde::Deserialize;

use super::aggregate::{aggregate_tokens, TokenPrediction};
use super::types::{EntityRecognizer, EntitySpan};
use super::NerError;

#[derive(Deserialize)]
struct ModelConfig {
    id2label: HashMap<String, String>,
}

/// Disease NER running in-process.
///
/// Uses interior mutability (Mutex) because ort::Session::run requires `&mut self`
/// but `EntityRecognizer` exposes `&self` for shared usage.
pub struct OnnxRecognizer {
    session: Mutex<Session>,
    tokenizer: tokenizers::Tokenizer,
    id2label: Vec<String>,
}

impl OnnxRecognizer {
    /// Load the exported model from `model_dir`.
    pub fn load(model_dir: &Path) -> Result<Self, NerError> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");
        let config_path = model_dir.join("config.json");

        for path in [&model_path, &tokenizer_path, &config_path] {
            if !path.exists() {
                return Err(NerError::ModelNotFound(path.clone()));
            }
        }

        let config_raw = std::fs::read_to_string(&config_path)
            .map_err(|e| NerError::ModelInit(format!("config.json: {e}")))?;
        let id2label = parse_id2label(&config_raw)?;

        let session = Session::builder()
            .map_err(|e: ort::Error| NerError::ModelInit(e.to_string()))?
            .with_intra_threads(2)
            .map_err(|e: ort::Error| NerError::ModelInit(e.to_string()))?
            .commit_from_file(&model_path)
            .map_err(|e: ort::Error| NerError::ModelInit(format!("ONNX load failed: {e}")))?;

        let tokenizer = tokenizers::Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| NerError::ModelInit(format!("Tokenizer load failed: {e}")))?;

        tracing::info!(
            labels = id2label.len(),
            "ONNX NER model loaded from {}",
            model_dir.display()
        );

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            id2label,
        })
    }

    fn infer(&self, text: &str) -> Result<Vec<EntitySpan>, NerError> {
        use ort::value::TensorRef;

        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| NerError::Tokenization(e.to_string()))?;

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();
        let token_type_ids: Vec<i64> = encoding
            .get_type_ids()
            .iter()
            .map(|&t| t as i64)
            .collect();

        let seq_len = input_ids.len();

        let ids_array = ndarray::Array2::from_shape_vec((1, seq_len), input_ids)
            .map_err(|e| NerError::Inference(e.to_string()))?;
        let mask_array = ndarray::Array2::from_shape_vec((1, seq_len), attention_mask)
            .map_err(|e| NerError::Inference(e.to_string()))?;
        let type_array = ndarray::Array2::from_shape_vec((1, seq_len), token_type_ids)
            .map_err(|e| NerError::Inference(e.to_string()))?;

        let ids_tensor = TensorRef::from_array_view(&ids_array)
            .map_err(|e| NerError::Inference(e.to_string()))?;
        let mask_tensor = TensorRef::from_array_view(&mask_array)
            .map_err(|e| NerError::Inference(e.to_string()))?;
        let type_tensor = TensorRef::from_array_view(&type_array)
            .map_err(|e| NerError::Inference(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| NerError::Inference("Session lock poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs![ids_tensor, mask_tensor, type_tensor])
            .map_err(|e| NerError::Inference(format!("ONNX inference failed: {e}")))?;

        // Output shape: [1, seq_len, num_labels]
        let (shape, logits) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| NerError::Inference(format!("Output extraction: {e}")))?;

        let num_labels = self.id2label.len();
        if shape.len() != 3 || shape[1] as usize != seq_len || shape[2] as usize != num_labels {
            return Err(NerError::Inference(format!(
                "Unexpected output shape: {shape:?}, expected [1, {seq_len}, {num_labels}]"
            )));
        }

        let special = encoding.get_special_tokens_mask();
        let offsets = encoding.get_offsets();

        let predictions: Vec<TokenPrediction> = (0..seq_len)
            .filter(|&i| special.get(i).copied().unwrap_or(0) == 0)
            .map(|i| {
                let row = &logits[i * num_labels..(i + 1) * num_labels];
                let (best, score) = softmax_argmax(row);
                let (start, end) = offsets[i];
                TokenPrediction {
                    label: self.id2label[best].clone(),
                    score,
                    start,
                    end,
                }
            })
            .collect();

        Ok(aggregate_tokens(text, &predictions))
    }
}

impl EntityRecognizer for OnnxRecognizer {
    fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>, NerError> {
        self.infer(text)
    }
}

/// Turn `{"0": "O", "1": "B-Disease"}` into a dense index → label table.
fn parse_id2label(config_raw: &str) -> Result<Vec<String>, NerError> {
    let config: ModelConfig = serde_json::from_str(config_raw)
        .map_err(|e| NerError::ModelInit(format!("config.json: {e}")))?;

    let mut labels = vec![String::new(); config.id2label.len()];
    for (id, label) in config.id2label {
        let idx: usize = id
            .parse()
            .map_err(|_| NerError::ModelInit(format!("id2label key '{id}' is not an index")))?;
        let slot = labels
            .get_mut(idx)
            .ok_or_else(|| NerError::ModelInit(format!("id2label index {idx} out of range")))?;
        *slot = label;
    }
    Ok(labels)
}

/// Index of the largest logit and its softmax probability.
fn softmax_argmax(row: &[f32]) -> (usize, f32) {
    let (best, max) = row
        .iter()
        .copied()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |acc, (i, v)| if v > acc.1 { (i, v) } else { acc });
    let denom: f32 = row.iter().map(|v| (v - max).exp()).sum();
    (best, if denom > 0.0 { 1.0 / denom } else { 0.0 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id2label_is_dense_and_ordered() {
        let labels =
            parse_id2label(r#"{"id2label": {"1": "B-Disease", "0": "O", "2": "I-Disease"}}"#)
                .unwrap();
        assert_eq!(labels, vec!["O", "B-Disease", "I-Disease"]);
    }

    #[test]
    fn id2label_rejects_gaps() {
        assert!(parse_id2label(r#"{"id2label": {"0": "O", "5": "Disease"}}"#).is_err());
    }

    #[test]
    fn softmax_argmax_picks_largest() {
        let (idx, p) = softmax_argmax(&[0.1, 3.0, -1.0]);
        assert_eq!(idx, 1);
        assert!(p > 0.5 && p <= 1.0);
    }

    #[test]
    fn load_missing_dir_reports_model_path() {
        let dir = tempfile::tempdir().unwrap();
        match OnnxRecognizer::load(dir.path()) {
            Err(NerError::ModelNotFound(p)) => assert!(p.ends_with("model.onnx")),
            _ => panic!("expected ModelNotFound"),
        }
    }
}
