use super::TranscriptError;
use crate::models::Message;

pub const EXPORT_FILE_NAME: &str = "chat_history.json";
pub const EXPORT_MIME: &str = "application/json";

/// Serialize the in-memory history as a downloadable `[[sender, text], ...]` document.
pub fn export_history(history: &[Message]) -> Result<Vec<u8>, TranscriptError> {
    Ok(serde_json::to_vec_pretty(history)?)
}

/// Parse an export back into messages, preserving order.
pub fn parse_export(bytes: &[u8]) -> Result<Vec<Message>, TranscriptError> {
    serde_json::from_slice(bytes).map_err(|e| TranscriptError::Malformed(e.to_string()))
}
