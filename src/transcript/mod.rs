//! Transcript persistence and export.
//!
//! The store is a single JSON document shared by every session. Each session
//! owns one record keyed by its id; a save rewrites that record in place.

pub mod export;
pub mod store;

use std::path::PathBuf;

use thiserror::Error;

pub use export::{export_history, parse_export, EXPORT_FILE_NAME, EXPORT_MIME};
pub use store::TranscriptStore;

#[derive(Error, Debug)]
pub enum TranscriptError {
    #[error("Transcript I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Transcript document is malformed: {0}")]
    Malformed(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Transcript writer lock poisoned")]
    LockPoisoned,
}
