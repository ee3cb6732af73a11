//! Chat turn: classify, validate, prompt, generate, annotate, persist.

pub mod classify;
pub mod gemini;
pub mod generation;
pub mod orchestrator;
pub mod prompt;
pub mod validate;

pub use orchestrator::{ChatPipeline, TurnOutcome, TurnRoute, TurnState};
