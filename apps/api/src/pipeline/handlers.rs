//! Axum route handlers for the Evaluation API.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::documents::extract_text;
use crate::errors::AppError;
use crate::models::evaluation::RiskStatus;
use crate::models::role_track::RoleTrack;
use crate::pipeline::evaluator::{
    evaluate_batch, BatchRequest, CandidateDocument, CandidateEvaluation, ProgressSnapshot,
};
use crate::session::SessionState;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CandidateView {
    #[serde(flatten)]
    pub evaluation: CandidateEvaluation,
    pub risk_status: RiskStatus,
}

impl From<CandidateEvaluation> for CandidateView {
    fn from(evaluation: CandidateEvaluation) -> Self {
        let risk_status = evaluation.record.risk_status();
        Self {
            evaluation,
            risk_status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub batch_id: Uuid,
    pub role_track: RoleTrack,
    pub jd_text: String,
    pub must_haves: String,
    pub started_at: DateTime<Utc>,
    /// Ranked by fit score, highest first.
    pub candidates: Vec<CandidateView>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/evaluations
///
/// Multipart form: `role_track`, `jd_text`, `must_haves`, and one or more
/// file parts. Replaces the session's previous batch, then evaluates every
/// uploaded CV and returns the ranked results.
pub async fn handle_evaluate(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<BatchResponse>, AppError> {
    let mut role_track: Option<String> = None;
    let mut jd_text = String::new();
    let mut must_haves = String::new();
    let mut uploads: Vec<(String, Vec<u8>)> = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();
        if let Some(file_name) = field.file_name().map(str::to_string) {
            let data = field.bytes().await?;
            uploads.push((file_name, data.to_vec()));
            continue;
        }
        let value = field.text().await?;
        match field_name.as_str() {
            "role_track" => role_track = Some(value),
            "jd_text" => jd_text = value,
            "must_haves" => must_haves = value,
            other => warn!("Ignoring unknown form field '{other}'"),
        }
    }

    let role_track: RoleTrack = role_track
        .ok_or_else(|| AppError::Validation("role_track is required".to_string()))?
        .parse()?;

    if uploads.is_empty() {
        return Err(AppError::Validation(
            "Upload at least one CV to evaluate".to_string(),
        ));
    }

    let mut documents = Vec::with_capacity(uploads.len());
    for (file_name, data) in uploads {
        let text = extract_text(&file_name, data).await;
        documents.push(CandidateDocument { file_name, text });
    }

    let batch_id = state
        .session
        .write()
        .await
        .start_batch(role_track, &jd_text, &must_haves);

    let request = BatchRequest {
        role_track,
        jd_text,
        must_haves,
        documents,
    };
    let results = evaluate_batch(state.llm.as_ref(), &request, state.options, &state.progress).await;

    let mut session = state.session.write().await;
    if !session.complete_batch(batch_id, results) {
        info!("Batch {batch_id} was superseded before it finished");
        return Err(AppError::Conflict(
            "A newer evaluation batch was started; these results were discarded".to_string(),
        ));
    }

    batch_response(&session).map(Json)
}

/// GET /api/v1/evaluations
pub async fn handle_list_evaluations(
    State(state): State<AppState>,
) -> Result<Json<BatchResponse>, AppError> {
    let session = state.session.read().await;
    batch_response(&session).map(Json)
}

fn batch_response(session: &SessionState) -> Result<BatchResponse, AppError> {
    let run = session.current().ok_or_else(|| {
        AppError::NotFound("No candidates found. Run an evaluation first.".to_string())
    })?;

    Ok(BatchResponse {
        batch_id: run.id,
        role_track: run.role_track,
        jd_text: run.jd_text.clone(),
        must_haves: run.must_haves.clone(),
        started_at: run.started_at,
        candidates: session.ranked().into_iter().map(CandidateView::from).collect(),
    })
}

/// GET /api/v1/evaluations/progress
pub async fn handle_progress(State(state): State<AppState>) -> Json<ProgressSnapshot> {
    Json(state.progress.snapshot())
}

/// GET /api/v1/evaluations/:id
pub async fn handle_get_candidate(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
) -> Result<Json<CandidateView>, AppError> {
    let session = state.session.read().await;
    let candidate = session
        .find(candidate_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Candidate {candidate_id} not found")))?;
    Ok(Json(candidate.into()))
}
