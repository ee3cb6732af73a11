use std::collections::BTreeSet;

use super::types::EntityRecognizer;
use super::NerError;

/// Distinct disease surface forms found in `text`.
///
/// Blank input never reaches the model. Sub-word fragments (`##…`) that a
/// backend failed to merge are dropped rather than highlighted piecemeal.
pub fn extract_diseases(
    recognizer: &dyn EntityRecognizer,
    text: &str,
) -> Result<BTreeSet<String>, NerError> {
    if text.trim().is_empty() {
        return Ok(BTreeSet::new());
    }

    let spans = recognizer.recognize(text)?;
    let diseases: BTreeSet<String> = spans
        .iter()
        .filter(|s| s.is_disease())
        .map(|s| s.text.trim())
        .filter(|t| !t.is_empty() && !t.starts_with("##"))
        .map(str::to_string)
        .collect();

    tracing::debug!(
        spans = spans.len(),
        diseases = diseases.len(),
        "Disease entities extracted"
    );
    Ok(diseases)
}
