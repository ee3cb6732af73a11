use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::message::Message;

/// Timestamp layout used for every stored record.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One persisted unit of conversation history.
///
/// `session_id` is absent in files written before sessions carried
/// identifiers; such records are never rewritten, only preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
    pub timestamp: String,
    pub history: Vec<Message>,
}

/// Result of parsing one element of the transcript document.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordEntry {
    Ok(ExchangeRecord),
    Corrupt(serde_json::Value),
}

impl RecordEntry {
    /// Tag a raw JSON element as a valid record or corrupt data.
    pub fn from_value(value: serde_json::Value) -> Self {
        match serde_json::from_value::<ExchangeRecord>(value.clone()) {
            Ok(record) => Self::Ok(record),
            Err(e) => {
                tracing::warn!(error = %e, "Corrupt transcript record skipped");
                Self::Corrupt(value)
            }
        }
    }

    pub fn as_record(&self) -> Option<&ExchangeRecord> {
        match self {
            Self::Ok(record) => Some(record),
            Self::Corrupt(_) => None,
        }
    }

    /// Serialize back to JSON, preserving corrupt elements byte-for-byte in
    /// meaning so a rewrite never drops data it could not understand.
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            Self::Ok(record) => serde_json::to_value(record),
            Self::Corrupt(value) => Ok(value.clone()),
        }
    }
}
