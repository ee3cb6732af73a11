use serde::{Deserialize, Serialize};

use super::enums::Gender;

/// Raw sidebar fields as the user typed them. Nothing is validated here;
/// see `pipeline::chat::validate` for the health-path checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub gender: String,
}

impl ProfileInput {
    pub fn new(name: &str, age: &str, gender: &str) -> Self {
        Self {
            name: name.to_string(),
            age: age.to_string(),
            gender: gender.to_string(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty() && self.age.trim().is_empty() && self.gender.trim().is_empty()
    }
}

/// A complete, validated profile. Session-scoped, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub name: String,
    pub age: u8,
    /// The age exactly as entered (trimmed), e.g. "007". Embedded in prompts.
    #[serde(skip)]
    pub age_text: String,
    pub gender: Gender,
}
