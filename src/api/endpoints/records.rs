//! Stored transcript records, for the "past conversations" view.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::{Message, RecordEntry};

/// Shown in place of a record that could not be parsed.
pub const INVALID_RECORD_WARNING: &str = "⚠️ Invalid chat format.";

#[derive(Serialize)]
pub struct RecordView {
    /// 1-based, newest first.
    pub number: usize,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<Message>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<&'static str>,
}

#[derive(Serialize)]
pub struct RecordsResponse {
    pub records: Vec<RecordView>,
}

impl RecordView {
    fn from_entry(number: usize, entry: RecordEntry) -> Self {
        match entry {
            RecordEntry::Ok(record) => Self {
                number,
                valid: true,
                timestamp: Some(record.timestamp),
                history: Some(record.history),
                warning: None,
            },
            RecordEntry::Corrupt(raw) => Self {
                number,
                valid: false,
                timestamp: raw
                    .get("timestamp")
                    .and_then(|t| t.as_str())
                    .map(str::to_string),
                history: None,
                warning: Some(INVALID_RECORD_WARNING),
            },
        }
    }
}

/// `GET /api/records`: every stored record, newest first.
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<RecordsResponse>, ApiError> {
    let store = Arc::clone(ctx.core.store());
    let entries = tokio::task::spawn_blocking(move || store.records_newest_first()).await??;

    let records = entries
        .into_iter()
        .enumerate()
        .map(|(idx, entry)| RecordView::from_entry(idx + 1, entry))
        .collect();
    Ok(Json(RecordsResponse { records }))
}
