//! Merge per-token predictions into entity spans ("simple" aggregation).

use super::types::{strip_iob_prefix, EntitySpan};

/// One token's prediction with its byte span in the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenPrediction {
    pub label: String,
    pub score: f32,
    pub start: usize,
    pub end: usize,
}

/// Group consecutive tokens of the same entity type.
///
/// A `B-` tag always opens a new group; `O` closes the current one. The
/// surface form is the source slice from the first token's start to the
/// last token's end, so sub-word pieces come back as whole words. Scores
/// are averaged over the group.
pub fn aggregate_tokens(text: &str, tokens: &[TokenPrediction]) -> Vec<EntitySpan> {
    let mut spans = Vec::new();
    let mut current: Option<(String, usize, usize, Vec<f32>)> = None;

    for token in tokens {
        if token.label == "O" || token.start >= token.end {
            flush(text, current.take(), &mut spans);
            continue;
        }

        let entity = strip_iob_prefix(&token.label);
        let begins = token.label.starts_with("B-");

        match current.as_mut() {
            Some((kind, _, end, scores)) if kind.as_str() == entity && !begins => {
                *end = token.end;
                scores.push(token.score);
            }
            _ => {
                flush(text, current.take(), &mut spans);
                current = Some((entity.to_string(), token.start, token.end, vec![token.score]));
            }
        }
    }
    flush(text, current, &mut spans);
    spans
}

fn flush(
    text: &str,
    group: Option<(String, usize, usize, Vec<f32>)>,
    spans: &mut Vec<EntitySpan>,
) {
    let Some((label, start, end, scores)) = group else {
        return;
    };
    let Some(surface) = text.get(start..end) else {
        tracing::debug!(start, end, "Token offsets outside input, span dropped");
        return;
    };
    let score = scores.iter().sum::<f32>() / scores.len().max(1) as f32;
    spans.push(EntitySpan {
        text: surface.to_string(),
        label,
        score: Some(score),
        start: Some(start),
        end: Some(end),
    });
}
