//! HTTP API.
//!
//! Routes are nested under `/api/`. Everything except health and login sits
//! behind the bearer-token middleware, which resolves the caller's chat
//! session and hands it to the handler.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use router::api_router;
pub use server::{start_api_server, ApiServer};
pub use types::ApiContext;
