use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Local;
use uuid::Uuid;

use super::TranscriptError;
use crate::models::transcript::TIMESTAMP_FORMAT;
use crate::models::{ExchangeRecord, Message, RecordEntry};

/// File-backed transcript store.
///
/// Writers are serialized in-process by `writer`; each write goes to a temp
/// file in the same directory and is renamed over the target, so readers
/// never observe a half-written document.
pub struct TranscriptStore {
    path: PathBuf,
    writer: Mutex<()>,
}

impl TranscriptStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every element of the document, tagged valid or corrupt, in file order.
    /// A missing or empty file is an empty store.
    pub fn load_records(&self) -> Result<Vec<RecordEntry>, TranscriptError> {
        read_document(&self.path)
    }

    /// Records for the history view: newest first.
    pub fn records_newest_first(&self) -> Result<Vec<RecordEntry>, TranscriptError> {
        let mut entries = self.load_records()?;
        entries.reverse();
        Ok(entries)
    }

    /// Store the session's full history under its id. The previous snapshot
    /// of the same session is dropped and the new one goes last, so the most
    /// recently saved conversation is always at the end of the file.
    pub fn save_session(
        &self,
        session_id: Uuid,
        history: &[Message],
    ) -> Result<ExchangeRecord, TranscriptError> {
        let _guard = self
            .writer
            .lock()
            .map_err(|_| TranscriptError::LockPoisoned)?;

        let mut entries = read_document(&self.path)?;
        let record = ExchangeRecord {
            session_id: Some(session_id),
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            history: history.to_vec(),
        };

        // File order is save order: a re-saved session moves to the end.
        entries.retain(|e| {
            !e.as_record()
                .is_some_and(|r| r.session_id == Some(session_id))
        });
        entries.push(RecordEntry::Ok(record.clone()));

        write_document(&self.path, &entries)?;
        tracing::debug!(
            %session_id,
            messages = record.history.len(),
            records = entries.len(),
            "Transcript saved"
        );
        Ok(record)
    }
}

fn read_document(path: &Path) -> Result<Vec<RecordEntry>, TranscriptError> {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(TranscriptError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if data.trim().is_empty() {
        return Ok(Vec::new());
    }

    let document: serde_json::Value = serde_json::from_str(&data).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Transcript file is not valid JSON");
        TranscriptError::Malformed(e.to_string())
    })?;

    match document {
        serde_json::Value::Array(items) => Ok(items.into_iter().map(RecordEntry::from_value).collect()),
        other => {
            tracing::error!(path = %path.display(), "Transcript file is not a JSON array");
            Err(TranscriptError::Malformed(format!(
                "expected an array of records, found {}",
                json_kind(&other)
            )))
        }
    }
}

fn write_document(path: &Path, entries: &[RecordEntry]) -> Result<(), TranscriptError> {
    let values = entries
        .iter()
        .map(RecordEntry::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    let body = serde_json::to_string_pretty(&values)?;

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let io_err = |source| TranscriptError::Io {
        path: path.to_path_buf(),
        source,
    };

    std::fs::create_dir_all(&dir).map_err(io_err)?;
    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(io_err)?;
    tmp.write_all(body.as_bytes()).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
