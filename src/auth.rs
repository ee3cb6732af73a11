//! Login collaborator.
//!
//! The chat core only ever sees an `Identity`; how it was established is
//! behind the `Authenticator` trait. The shipped implementation is a static
//! credential table supplied through configuration.

use std::collections::HashMap;

use serde::Serialize;
use subtle::ConstantTimeEq;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,
}

/// Post-authentication identity handed to the session layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub username: String,
}

pub trait Authenticator: Send + Sync {
    fn authenticate(&self, username: &str, password: &str) -> Result<Identity, AuthError>;
}

/// Username → password table. No hashing, no lockout.
pub struct StaticCredentials {
    users: HashMap<String, String>,
}

impl StaticCredentials {
    pub fn new(users: HashMap<String, String>) -> Self {
        Self { users }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl Authenticator for StaticCredentials {
    fn authenticate(&self, username: &str, password: &str) -> Result<Identity, AuthError> {
        let Some(expected) = self.users.get(username) else {
            tracing::warn!(username, "Login rejected: unknown user");
            return Err(AuthError::InvalidCredentials);
        };

        if expected.as_bytes().ct_eq(password.as_bytes()).unwrap_u8() == 0 {
            tracing::warn!(username, "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(username, "Login accepted");
        Ok(Identity {
            username: username.to_string(),
        })
    }
}
