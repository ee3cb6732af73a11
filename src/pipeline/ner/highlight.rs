use std::collections::BTreeSet;
use std::sync::Arc;

use regex::RegexBuilder;

use super::extract::extract_diseases;
use super::types::EntityRecognizer;
use crate::models::Message;

pub const MARK_OPEN: &str = "<mark>";
pub const MARK_CLOSE: &str = "</mark>";

/// Rewrites assistant replies, wrapping disease mentions in `<mark>` tags.
#[derive(Clone)]
pub struct Annotator {
    recognizer: Arc<dyn EntityRecognizer>,
}

impl Annotator {
    pub fn new(recognizer: Arc<dyn EntityRecognizer>) -> Self {
        Self { recognizer }
    }

    /// Highlight every disease the model finds in `text`.
    ///
    /// If extraction fails the text comes back unannotated; the failure is
    /// logged here and goes no further.
    pub fn highlight_diseases(&self, text: &str) -> String {
        match extract_diseases(self.recognizer.as_ref(), text) {
            Ok(diseases) => highlight_terms(text, &diseases),
            Err(e) => {
                tracing::error!(error = %e, "Disease extraction failed, reply left unannotated");
                text.to_string()
            }
        }
    }

    /// Display form of a stored message. User text is never rewritten.
    pub fn highlight_message(&self, message: &Message) -> String {
        if message.is_user() {
            message.text.clone()
        } else {
            self.highlight_diseases(&message.text)
        }
    }
}

/// Wrap each case-insensitive whole-word occurrence of any term.
///
/// Longest match first: terms are tried longest to shortest in one
/// left-to-right pass, so a term contained in another ("diabetes" inside
/// "type 2 diabetes") never wraps a region twice, and the output does not
/// depend on set order. Matched text keeps its original casing.
pub fn highlight_terms(text: &str, terms: &BTreeSet<String>) -> String {
    if text.is_empty() || terms.is_empty() {
        return text.to_string();
    }

    let mut ordered: Vec<&str> = terms
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();
    ordered.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
    ordered.dedup();
    if ordered.is_empty() {
        return text.to_string();
    }

    let alternation = ordered
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");

    let pattern = match RegexBuilder::new(&format!(r"\b(?:{alternation})\b"))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => re,
        Err(e) => {
            tracing::error!(error = %e, terms = ordered.len(), "Highlight pattern rejected");
            return text.to_string();
        }
    };

    pattern
        .replace_all(text, format!("{MARK_OPEN}${{0}}{MARK_CLOSE}").as_str())
        .into_owned()
}
