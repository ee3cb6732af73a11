use crate::models::{Topic, UserProfile};

pub const HEALTH_PREAMBLE: &str = "You are a helpful AI healthcare assistant. Provide simple, safe, general health-related answers without diagnoses or prescriptions.";

pub const GENERAL_PREAMBLE: &str =
    "You are a friendly, polite assistant.\nRespond naturally and supportively.";

/// Which template a prompt was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptTemplate {
    Health,
    General,
}

/// Pick the template: the health template needs both the health flag and a
/// validated profile. Validation itself is the caller's job.
pub fn select_template(is_health: bool, profile: Option<&UserProfile>) -> PromptTemplate {
    match (is_health, profile) {
        (true, Some(_)) => PromptTemplate::Health,
        _ => PromptTemplate::General,
    }
}

/// Build the single prompt string sent to the generation service.
pub fn build_prompt(
    message: &str,
    topic: Topic,
    profile: Option<&UserProfile>,
    is_health: bool,
) -> String {
    match (select_template(is_health, profile), profile) {
        (PromptTemplate::Health, Some(p)) => build_health_prompt(message, topic, p),
        _ => build_general_prompt(message, topic),
    }
}

fn build_health_prompt(message: &str, topic: Topic, profile: &UserProfile) -> String {
    format!(
        "{HEALTH_PREAMBLE}\n\n\
         User Info:\n\
         Name: {name}\n\
         Age: {age}\n\
         Gender: {gender}\n\n\
         Topic: {topic}\n\n\
         User's Question: {message}\n",
        name = profile.name,
        age = profile.age_text,
        gender = profile.gender,
    )
}

fn build_general_prompt(message: &str, topic: Topic) -> String {
    format!("{GENERAL_PREAMBLE}\n\nTopic: {topic}\n\nUser's Message: {message}\n")
}
