//! Axum route handlers for the Outreach API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::outreach::drafter::{draft_recruitment_email, SenderProfile};
use crate::outreach::transport::{OutboundEmail, SendOutcome};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DraftRequest {
    pub candidate_id: Uuid,
    pub sender: SenderProfile,
}

#[derive(Debug, Serialize)]
pub struct DraftResponse {
    pub candidate_id: Uuid,
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// POST /api/v1/outreach/draft
///
/// Drafts an email for a candidate from the current batch. The body may be
/// the generation-error literal; callers should check before sending.
pub async fn handle_draft(
    State(state): State<AppState>,
    Json(req): Json<DraftRequest>,
) -> Result<Json<DraftResponse>, AppError> {
    // Clone out so the session lock is not held across model calls.
    let candidate = state
        .session
        .read()
        .await
        .find(req.candidate_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Candidate {} not found", req.candidate_id)))?;

    let track = candidate.role_track;
    let body =
        draft_recruitment_email(state.llm.as_ref(), &candidate.record, &req.sender, track).await;

    info!("Drafted outreach email for candidate {}", req.candidate_id);

    Ok(Json(DraftResponse {
        candidate_id: req.candidate_id,
        recipient: candidate.record.email.clone(),
        subject: format!("Opportunity at {}: {}", req.sender.organization, track.label()),
        body,
    }))
}

/// POST /api/v1/outreach/send
///
/// Transport failures come back as `success: false` with a 200 status; only
/// malformed requests are rejected.
pub async fn handle_send(
    State(state): State<AppState>,
    Json(email): Json<OutboundEmail>,
) -> Result<Json<SendOutcome>, AppError> {
    if email.sender_address.trim().is_empty() || email.sender_credential.is_empty() {
        return Err(AppError::Validation(
            "Sender address and credential are required".to_string(),
        ));
    }
    if !email.recipient_address.contains('@') {
        return Err(AppError::Validation(format!(
            "Invalid recipient address: '{}'",
            email.recipient_address
        )));
    }

    Ok(Json(state.mailer.send(&email).await))
}
