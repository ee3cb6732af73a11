use std::str::FromStr;

use thiserror::Error;

use crate::models::{Gender, ProfileInput, UserProfile};

pub const MAX_AGE: u8 = 120;

pub const INCOMPLETE_PROFILE_WARNING: &str =
    "⚠️ Please complete your user info for health-related questions.";
pub const INVALID_AGE_WARNING: &str = "⚠️ Please enter a valid age between 0 and 120.";

/// Why a health-path profile was rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileError {
    #[error("profile incomplete")]
    Incomplete,
    #[error("age outside 0-120")]
    InvalidAge,
}

impl ProfileError {
    /// The fixed advisory shown in place of a model reply.
    pub fn advisory(&self) -> &'static str {
        match self {
            Self::Incomplete => INCOMPLETE_PROFILE_WARNING,
            Self::InvalidAge => INVALID_AGE_WARNING,
        }
    }
}

/// Check the raw sidebar fields for the health path.
///
/// Completeness is checked before the age range, so an empty gender with a
/// bad age reports `Incomplete`.
pub fn validate_profile(input: &ProfileInput) -> Result<UserProfile, ProfileError> {
    let name = input.name.trim();
    let age = input.age.trim();
    let gender = input.gender.trim();

    if name.is_empty() || age.is_empty() || gender.is_empty() {
        return Err(ProfileError::Incomplete);
    }

    if !age.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ProfileError::InvalidAge);
    }
    let age_text = age.to_string();
    // All digits, so the only parse failure left is overflow.
    let age = age
        .parse::<u32>()
        .ok()
        .filter(|a| *a <= u32::from(MAX_AGE))
        .ok_or(ProfileError::InvalidAge)? as u8;

    let gender = Gender::from_str(gender).map_err(|_| ProfileError::Incomplete)?;

    Ok(UserProfile {
        name: name.to_string(),
        age,
        age_text,
        gender,
    })
}
