//! Session state — the evaluation records retained between requests.
//!
//! The pipeline itself is stateless; handlers hand it inputs and store what
//! comes back here. Starting a batch discards every prior record.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::role_track::RoleTrack;
use crate::pipeline::evaluator::CandidateEvaluation;

#[derive(Debug, Clone, Serialize)]
pub struct BatchRun {
    pub id: Uuid,
    pub role_track: RoleTrack,
    pub jd_text: String,
    pub must_haves: String,
    pub started_at: DateTime<Utc>,
    pub candidates: Vec<CandidateEvaluation>,
}

#[derive(Debug, Default)]
pub struct SessionState {
    current: Option<BatchRun>,
}

impl SessionState {
    /// Replaces the current batch with an empty one and returns its id.
    pub fn start_batch(&mut self, role_track: RoleTrack, jd_text: &str, must_haves: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.current = Some(BatchRun {
            id,
            role_track,
            jd_text: jd_text.to_string(),
            must_haves: must_haves.to_string(),
            started_at: Utc::now(),
            candidates: Vec::new(),
        });
        id
    }

    /// Stores results for `batch_id`. Returns false (and stores nothing) if a
    /// newer batch has started in the meantime.
    pub fn complete_batch(&mut self, batch_id: Uuid, candidates: Vec<CandidateEvaluation>) -> bool {
        match &mut self.current {
            Some(run) if run.id == batch_id => {
                run.candidates = candidates;
                true
            }
            _ => false,
        }
    }

    pub fn current(&self) -> Option<&BatchRun> {
        self.current.as_ref()
    }

    pub fn find(&self, candidate_id: Uuid) -> Option<&CandidateEvaluation> {
        self.current
            .as_ref()?
            .candidates
            .iter()
            .find(|c| c.id == candidate_id)
    }

    /// Candidates by fit score, highest first. Ties keep evaluation order.
    pub fn ranked(&self) -> Vec<CandidateEvaluation> {
        let mut candidates = self
            .current
            .as_ref()
            .map(|run| run.candidates.clone())
            .unwrap_or_default();
        candidates.sort_by_key(|c| Reverse(c.record.fit_score));
        candidates
    }
}
