//! Axum route handlers for the Preset API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::role_track::RoleTrack;
use crate::presets::PresetMap;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SavePresetRequest {
    pub name: String,
    pub job_description: String,
    #[serde(default)]
    pub must_haves: String,
    /// Stable key (`PI_POSTDOC`) or display label.
    pub role_track: String,
}

/// GET /api/v1/presets
pub async fn handle_list_presets(State(state): State<AppState>) -> Json<PresetMap> {
    Json(state.presets.load().await)
}

/// POST /api/v1/presets
pub async fn handle_save_preset(
    State(state): State<AppState>,
    Json(req): Json<SavePresetRequest>,
) -> Result<Json<PresetMap>, AppError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Preset name is required".to_string()));
    }
    let role_track: RoleTrack = req.role_track.parse()?;

    state
        .presets
        .save(name, &req.job_description, &req.must_haves, role_track)
        .await?;

    Ok(Json(state.presets.load().await))
}

/// DELETE /api/v1/presets/:name
pub async fn handle_delete_preset(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, AppError> {
    let existed = state
        .presets
        .delete(&name)
        .await?;

    if existed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Preset '{name}' not found")))
    }
}
