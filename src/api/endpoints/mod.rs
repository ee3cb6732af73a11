//! Endpoint handlers, one module per resource.

pub mod auth;
pub mod chat;
pub mod health;
pub mod records;
pub mod session;
