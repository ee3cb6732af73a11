//! Session settings: the sidebar profile and the topic tag.
//!
//! Profile fields are stored raw; they are only validated when a health
//! question needs them.

use std::str::FromStr;

use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::SessionContext;
use crate::models::{Gender, ProfileInput, Topic};
use crate::session::ChatSession;

#[derive(Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub username: String,
    pub topic: Topic,
    pub profile: ProfileInput,
    pub history_len: usize,
    pub topics: Vec<&'static str>,
    pub genders: Vec<&'static str>,
}

impl SessionResponse {
    fn from_session(session: &ChatSession) -> Self {
        Self {
            session_id: session.id.to_string(),
            username: session.username().to_string(),
            topic: session.topic,
            profile: session.profile.clone(),
            history_len: session.history.len(),
            topics: Topic::ALL.iter().map(Topic::as_str).collect(),
            genders: Gender::ALL.iter().map(Gender::as_str).collect(),
        }
    }
}

#[derive(Deserialize)]
pub struct TopicRequest {
    pub topic: String,
}

/// `GET /api/session`
pub async fn get(
    Extension(session): Extension<SessionContext>,
) -> Result<Json<SessionResponse>, ApiError> {
    let body = session
        .with_session(|s| SessionResponse::from_session(s))
        .await?;
    Ok(Json(body))
}

/// `PUT /api/session/profile`: replace the profile fields as typed.
pub async fn update_profile(
    Extension(session): Extension<SessionContext>,
    Json(profile): Json<ProfileInput>,
) -> Result<Json<SessionResponse>, ApiError> {
    let body = session
        .with_session(move |s| {
            s.profile = profile;
            SessionResponse::from_session(s)
        })
        .await?;
    Ok(Json(body))
}

/// `PUT /api/session/topic`: select one of the fixed topic labels.
pub async fn update_topic(
    Extension(session): Extension<SessionContext>,
    Json(req): Json<TopicRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let topic = Topic::from_str(&req.topic)
        .map_err(|_| ApiError::BadRequest(format!("Unknown topic '{}'", req.topic)))?;
    let body = session
        .with_session(move |s| {
            s.topic = topic;
            SessionResponse::from_session(s)
        })
        .await?;
    Ok(Json(body))
}
