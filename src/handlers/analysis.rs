use std::sync::Arc;

use axum::{extract::State, response::Json};
use serde::Deserialize;
use tracing::info;

use crate::core::analysis::AnalysisResult;
use crate::core::audio::from_transport_text;
use crate::errors::{AppError, AppResult};
use crate::state::AppState;

/// Request body for the analysis endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisApiRequest {
    /// The learner's finalized recording as transport text.
    pub user_audio_transport: String,
    pub user_mime: String,
    /// The challenge's reference audio as transport text.
    pub reference_audio_transport: String,
    pub reference_text: String,
}

/// Handler for the /analysis endpoint
pub async fn analysis_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalysisApiRequest>,
) -> AppResult<Json<AnalysisResult>> {
    if request.reference_text.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Reference text cannot be empty".to_string(),
        ));
    }

    // Client payload decode failures are bad requests, not provider
    // errors.
    let user_audio = from_transport_text(&request.user_audio_transport)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let ref_audio = from_transport_text(&request.reference_audio_transport)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    info!(
        user_bytes = user_audio.len(),
        ref_bytes = ref_audio.len(),
        "Analysis request received"
    );

    let result = state
        .engine
        .analyzer
        .analyze(
            &user_audio,
            &request.user_mime,
            &ref_audio,
            &request.reference_text,
        )
        .await?;

    Ok(Json(result))
}
