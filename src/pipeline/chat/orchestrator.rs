//! Turn orchestrator.
//!
//! One call to `run_turn` takes a user message from `Received` to
//! `Persisted`. The caller holds the session exclusively for the duration,
//! which keeps turns within a session strictly sequential.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use super::classify::{is_health_related, matched_keywords};
use super::generation::{ask_model, TextGenerator};
use super::prompt::build_prompt;
use super::validate::{validate_profile, ProfileError};
use crate::models::Message;
use crate::pipeline::ner::highlight::Annotator;
use crate::session::ChatSession;
use crate::transcript::TranscriptStore;

/// Stages a turn passes through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    Received,
    Classified,
    Validated,
    Prompted,
    Generated,
    Annotated,
    Persisted,
}

/// Which branch produced the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRoute {
    Health,
    General,
    ValidationRejected(ProfileError),
}

impl TurnRoute {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::General => "general",
            Self::ValidationRejected(_) => "validation_rejected",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Reply as displayed: highlighted for model replies, verbatim for advisories.
    pub reply: String,
    pub is_health: bool,
    pub route: TurnRoute,
    /// Last stage reached. `Persisted` unless the transcript write failed.
    pub final_state: TurnState,
    pub persisted: bool,
}

pub struct ChatPipeline {
    generator: Arc<dyn TextGenerator>,
    annotator: Annotator,
    store: Arc<TranscriptStore>,
}

impl ChatPipeline {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        annotator: Annotator,
        store: Arc<TranscriptStore>,
    ) -> Self {
        Self {
            generator,
            annotator,
            store,
        }
    }

    pub fn annotator(&self) -> &Annotator {
        &self.annotator
    }

    pub fn store(&self) -> &Arc<TranscriptStore> {
        &self.store
    }

    /// Run one turn against `session`.
    ///
    /// The user message joins the history before anything else happens. The
    /// raw reply is what gets stored; the highlighted form is only returned.
    /// Blocking: calls the generation service and the entity recognizer.
    pub fn run_turn(&self, session: &mut ChatSession, text: &str) -> TurnOutcome {
        session.history.push(Message::user(text));
        let id = session.id;
        let mut state = TurnState::Received;
        tracing::debug!(session = %id, "Turn received");

        let is_health = is_health_related(text);
        if is_health && tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!(session = %id, keywords = ?matched_keywords(text), "Health keywords");
        }
        advance(&mut state, TurnState::Classified, id);

        let (raw_reply, display_reply, route) = if is_health {
            match validate_profile(&session.profile) {
                Ok(profile) => {
                    advance(&mut state, TurnState::Validated, id);
                    let prompt = build_prompt(text, session.topic, Some(&profile), true);
                    advance(&mut state, TurnState::Prompted, id);
                    let reply = ask_model(self.generator.as_ref(), &prompt);
                    advance(&mut state, TurnState::Generated, id);
                    let display = self.annotator.highlight_diseases(&reply);
                    advance(&mut state, TurnState::Annotated, id);
                    (reply, display, TurnRoute::Health)
                }
                Err(reason) => {
                    tracing::info!(session = %session.id, ?reason, "Health question rejected by profile check");
                    advance(&mut state, TurnState::Validated, id);
                    let advisory = reason.advisory().to_string();
                    (advisory.clone(), advisory, TurnRoute::ValidationRejected(reason))
                }
            }
        } else {
            let prompt = build_prompt(text, session.topic, None, false);
            advance(&mut state, TurnState::Prompted, id);
            let reply = ask_model(self.generator.as_ref(), &prompt);
            advance(&mut state, TurnState::Generated, id);
            let display = self.annotator.highlight_diseases(&reply);
            advance(&mut state, TurnState::Annotated, id);
            (reply, display, TurnRoute::General)
        };

        session.history.push(Message::assistant(raw_reply));

        let persisted = match self.store.save_session(id, &session.history) {
            Ok(_) => {
                advance(&mut state, TurnState::Persisted, id);
                true
            }
            Err(e) => {
                tracing::error!(session = %session.id, error = %e, "Transcript write failed");
                false
            }
        };

        tracing::info!(
            session = %session.id,
            route = route.as_str(),
            is_health,
            persisted,
            history = session.history.len(),
            "Turn complete"
        );

        TurnOutcome {
            reply: display_reply,
            is_health,
            route,
            final_state: state,
            persisted,
        }
    }
}

fn advance(state: &mut TurnState, next: TurnState, session: Uuid) {
    tracing::trace!(%session, from = ?*state, to = ?next, "Turn state");
    *state = next;
}
