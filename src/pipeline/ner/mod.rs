//! Disease-entity recognition and reply highlighting.
//!
//! `EntityRecognizer` is the model boundary (remote inference endpoint or a
//! local ONNX export); `extract` narrows its spans to disease surface forms
//! and `highlight` rewrites reply text around them.

pub mod types;
pub mod aggregate;
pub mod extract;
pub mod highlight;
pub mod inference_api;
#[cfg(feature = "onnx-ner")]
pub mod onnx;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NerError {
    #[error("NER endpoint unreachable: {0}")]
    Connection(String),

    #[error("NER endpoint returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("NER response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Model file not found: {}", .0.display())]
    ModelNotFound(PathBuf),

    #[error("Model initialization failed: {0}")]
    ModelInit(String),

    #[error("Tokenization failed: {0}")]
    Tokenization(String),

    #[error("Inference failed: {0}")]
    Inference(String),
}
