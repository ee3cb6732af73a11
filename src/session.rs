//! Per-login chat context.
//!
//! Everything a turn needs travels in `ChatSession`; there is no global
//! session state. The API layer keeps one `ChatSession` behind a mutex per
//! bearer token, which is what serializes turns within a session.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::Identity;
use crate::models::{Message, ProfileInput, Topic};

#[derive(Debug, Clone)]
pub struct ChatSession {
    pub id: Uuid,
    pub identity: Identity,
    pub history: Vec<Message>,
    pub topic: Topic,
    pub profile: ProfileInput,
    pub created_at: DateTime<Utc>,
}

impl ChatSession {
    pub fn new(identity: Identity) -> Self {
        Self {
            id: Uuid::new_v4(),
            identity,
            history: Vec::new(),
            topic: Topic::default(),
            profile: ProfileInput::default(),
            created_at: Utc::now(),
        }
    }

    pub fn username(&self) -> &str {
        &self.identity.username
    }
}
