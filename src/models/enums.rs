use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr pattern.
///
/// Labels are the user-facing strings; parsing accepts any ASCII casing.
/// Serde goes through the label so the wire format matches what the UI shows.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "&'static str")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(trimmed))
                    .ok_or_else(|| ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    })
            }
        }

        impl TryFrom<String> for $name {
            type Error = ModelError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for &'static str {
            fn from(value: $name) -> Self {
                value.as_str()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(Sender {
    User => "You",
    Assistant => "Assistant",
});

str_enum!(Gender {
    Male => "Male",
    Female => "Female",
    Other => "Other",
});

str_enum!(Topic {
    General => "General",
    MentalHealth => "Mental Health",
    Diet => "Diet",
    Fitness => "Fitness",
    Stress => "Stress",
});

impl Sender {
    /// Parse a sender label, accepting the assistant name used by older
    /// transcript files.
    pub fn from_label(label: &str) -> Result<Self, ModelError> {
        if label.trim().eq_ignore_ascii_case("gemini") {
            return Ok(Self::Assistant);
        }
        label.parse()
    }
}

impl Default for Topic {
    fn default() -> Self {
        Self::General
    }
}
