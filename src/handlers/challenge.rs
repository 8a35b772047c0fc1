use std::sync::Arc;

use axum::{
    extract::State,
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use crate::core::audio::to_transport_text;
use crate::core::types::{Challenge, Level, Mode};
use crate::errors::AppResult;
use crate::state::AppState;

/// Request body for the challenge endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRequest {
    pub level: Level,
    pub mode: Mode,
    /// Opaque handle of a previously uploaded reference document. When
    /// present, the passage is extracted from the document instead of
    /// generated.
    #[serde(default)]
    pub source_document: Option<String>,
    /// Drop the cache first so this request is guaranteed to hit the
    /// network.
    #[serde(default)]
    pub force: bool,
}

/// Response body for the challenge endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResponse {
    pub topic: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// WAV-framed reference audio as transport text.
    pub reference_audio_transport: String,
}

impl From<Challenge> for ChallengeResponse {
    fn from(challenge: Challenge) -> Self {
        Self {
            topic: challenge.topic,
            text: challenge.text,
            source_url: challenge.source_url,
            reference_audio_transport: to_transport_text(&challenge.reference_audio),
        }
    }
}

/// Handler for the /challenge endpoint
///
/// Document-grounded requests bypass the cache entirely: they are keyed
/// by document, not by (level, mode), so caching them under the practice
/// configuration would serve the wrong passage later.
pub async fn challenge_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChallengeRequest>,
) -> AppResult<Json<ChallengeResponse>> {
    info!(
        level = request.level.as_str(),
        mode = request.mode.as_str(),
        document = request.source_document.is_some(),
        force = request.force,
        "Challenge request received"
    );

    if let Some(document_ref) = &request.source_document {
        let challenge = state
            .engine
            .service
            .generate_challenge(request.level, request.mode, Some(document_ref))
            .await?;
        return Ok(Json(challenge.into()));
    }

    if request.force {
        state.engine.cache.clear();
    }

    let challenge = state
        .engine
        .cache
        .get_or_fetch(request.level, request.mode)
        .await?;

    Ok(Json(challenge.into()))
}

/// Request body for the prefetch endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrefetchRequest {
    pub level: Level,
    pub mode: Mode,
}

/// Handler for the /challenge/prefetch endpoint
///
/// Fire-and-forget: the load is speculative, so the response never waits
/// for it and errors are swallowed by the cache (logged, cache left
/// empty).
pub async fn prefetch_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PrefetchRequest>,
) -> Json<Value> {
    state.engine.cache.prefetch(request.level, request.mode);
    Json(json!({ "status": "accepted" }))
}
