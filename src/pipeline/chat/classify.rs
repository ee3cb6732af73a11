use std::sync::LazyLock;

use regex::Regex;

/// Fixed health-domain vocabulary. Multi-word entries match as phrases.
pub const HEALTH_KEYWORDS: &[&str] = &[
    "fever",
    "cold",
    "headache",
    "pain",
    "diabetes",
    "pressure",
    "bp",
    "covid",
    "infection",
    "symptom",
    "cancer",
    "flu",
    "aids",
    "allergy",
    "disease",
    "vomit",
    "asthma",
    "medicine",
    "tablet",
    "ill",
    "sick",
    "nausea",
    "health",
    "injury",
    "cough",
    "treatment",
    "doctor",
    "hospital",
    "clinic",
    "vaccine",
    "antibiotic",
    "therapy",
    "mental health",
    "stress",
    "anxiety",
    "depression",
    "diet",
    "nutrition",
    "fitness",
    "exercise",
    "weight loss",
    "cholesterol",
    "thyroid",
    "migraine",
    "burn",
    "fracture",
    "wound",
    "emergency",
    "blood sugar",
    "sugar",
    "heart",
    "lungs",
];

/// One alternation over the whole vocabulary, word-boundary delimited.
static HEALTH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = HEALTH_KEYWORDS
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{alternation})\b")).expect("vocabulary pattern is valid")
});

/// Per-term patterns, for reporting which terms fired.
static TERM_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    HEALTH_KEYWORDS
        .iter()
        .map(|k| {
            let re = Regex::new(&format!(r"\b{}\b", regex::escape(k)))
                .expect("keyword pattern is valid");
            (*k, re)
        })
        .collect()
});

/// True iff some vocabulary term appears as a whole word, ignoring case.
pub fn is_health_related(text: &str) -> bool {
    HEALTH_PATTERN.is_match(&text.to_lowercase())
}

/// Vocabulary terms present in `text`, in vocabulary order.
pub fn matched_keywords(text: &str) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    TERM_PATTERNS
        .iter()
        .filter(|(_, re)| re.is_match(&lower))
        .map(|(k, _)| *k)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_has_expected_size() {
        assert_eq!(HEALTH_KEYWORDS.len(), 52);
    }

    #[test]
    fn standalone_keyword_is_health_related() {
        assert!(is_health_related("I have a fever"));
        assert!(is_health_related("What should I do for my headache?"));
        assert!(is_health_related("my BP is high"));
    }

    #[test]
    fn keyword_inside_longer_word_does_not_match() {
        assert!(!is_health_related("I feel feverish"));
        assert!(!is_health_related("That was a painting class"));
        assert!(!is_health_related("Billing questions only"));
        assert!(!is_health_related("coldplay tickets"));
    }

    #[test]
    fn matching_ignores_case() {
        assert!(is_health_related("COVID test results"));
        assert!(is_health_related("Seeing the Doctor tomorrow"));
    }

    #[test]
    fn punctuation_counts_as_boundary() {
        assert!(is_health_related("flu?"));
        assert!(is_health_related("(asthma)"));
        assert!(is_health_related("cough, cold"));
    }

    #[test]
    fn phrases_match_as_phrases() {
        assert!(is_health_related("tips for weight loss"));
        assert!(is_health_related("my blood sugar is low"));
        assert_eq!(matched_keywords("mental health day"), vec!["health", "mental health"]);
    }

    #[test]
    fn general_chat_is_not_health_related() {
        assert!(!is_health_related("Hello, how are you?"));
        assert!(!is_health_related(""));
        assert!(!is_health_related("Tell me a joke about cats"));
    }

    #[test]
    fn matched_keywords_lists_every_hit() {
        let hits = matched_keywords("Fever and cough since Monday, saw a doctor");
        assert_eq!(hits, vec!["fever", "cough", "doctor"]);
        assert!(matched_keywords("nothing here").is_empty());
    }
}
