use serde::{Deserialize, Serialize};

use super::enums::Sender;
use super::ModelError;

/// One chat bubble. Serialized as a two-element `[sender, text]` array,
/// which is the shape of both the transcript file and the export artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "(String, String)", into = "(Sender, String)")]
pub struct Message {
    pub sender: Sender,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Assistant,
            text: text.into(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}

impl TryFrom<(String, String)> for Message {
    type Error = ModelError;

    fn try_from((sender, text): (String, String)) -> Result<Self, Self::Error> {
        Ok(Self {
            sender: Sender::from_label(&sender)?,
            text,
        })
    }
}

impl From<Message> for (Sender, String) {
    fn from(message: Message) -> Self {
        (message.sender, message.text)
    }
}
