pub mod enums;
pub mod message;
pub mod profile;
pub mod transcript;

pub use enums::{Gender, Sender, Topic};
pub use message::Message;
pub use profile::{ProfileInput, UserProfile};
pub use transcript::{ExchangeRecord, RecordEntry};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Invalid {field} value: '{value}'")]
    InvalidEnum { field: String, value: String },
}
