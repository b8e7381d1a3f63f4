//! Candidate evaluation — orchestrates the three-stage pipeline.
//!
//! Flow per candidate: extract_facts → critique_candidate → decide.
//! Each stage consumes the previous stage's output, so one candidate's chain
//! is strictly sequential. Candidates are independent and may run with
//! bounded parallelism; results always come back in input order.

use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::llm_client::GenerationClient;
use crate::models::evaluation::EvaluationRecord;
use crate::models::role_track::RoleTrack;
use crate::pipeline::critique::critique_candidate;
use crate::pipeline::decision::decide;
use crate::pipeline::extraction::extract_facts;

/// A résumé after document normalization.
#[derive(Debug, Clone)]
pub struct CandidateDocument {
    pub file_name: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub role_track: RoleTrack,
    pub jd_text: String,
    pub must_haves: String,
    pub documents: Vec<CandidateDocument>,
}

#[derive(Debug, Clone, Copy)]
pub struct EvaluationOptions {
    pub max_resume_chars: usize,
    /// Candidates in flight at once. Values below 1 are treated as 1.
    pub concurrency: usize,
}

/// One evaluated candidate as retained by the session.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateEvaluation {
    pub id: Uuid,
    pub file_name: String,
    pub role_track: RoleTrack,
    pub evaluated_at: DateTime<Utc>,
    pub record: EvaluationRecord,
}

/// Completed/total counters shared with whoever displays batch progress.
#[derive(Debug, Default)]
pub struct BatchProgress {
    completed: AtomicUsize,
    total: AtomicUsize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub completed: usize,
    pub total: usize,
}

impl BatchProgress {
    pub fn reset(&self, total: usize) {
        self.completed.store(0, Ordering::SeqCst);
        self.total.store(total, Ordering::SeqCst);
    }

    fn advance(&self) -> usize {
        self.completed.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            completed: self.completed.load(Ordering::SeqCst),
            total: self.total.load(Ordering::SeqCst),
        }
    }
}

/// Runs the full chain for one résumé. Always yields a record: stage
/// failures degrade that stage's output, and only a failed decision turns
/// into the error-sentinel record.
pub async fn evaluate_candidate(
    llm: &dyn GenerationClient,
    resume_text: &str,
    jd_text: &str,
    must_haves: &str,
    track: RoleTrack,
    max_resume_chars: usize,
) -> EvaluationRecord {
    let facts = extract_facts(llm, resume_text, track, max_resume_chars).await;
    let critique = critique_candidate(llm, &facts, jd_text, must_haves).await;
    decide(llm, jd_text, &facts, &critique, track).await
}

/// Evaluates every document in the batch, one result per document, in
/// input order. Progress is advanced as each candidate finishes.
pub async fn evaluate_batch(
    llm: &dyn GenerationClient,
    request: &BatchRequest,
    options: EvaluationOptions,
    progress: &BatchProgress,
) -> Vec<CandidateEvaluation> {
    let total = request.documents.len();
    progress.reset(total);
    info!(
        "Evaluating {} candidates for {} (concurrency {})",
        total,
        request.role_track,
        options.concurrency.max(1)
    );

    // Owned documents and a boxed stream keep the batch future `Send` for
    // the multipart handler.
    let results: Vec<CandidateEvaluation> = stream::iter(request.documents.clone())
        .map(|doc| async move {
            let record = evaluate_candidate(
                llm,
                &doc.text,
                &request.jd_text,
                &request.must_haves,
                request.role_track,
                options.max_resume_chars,
            )
            .await;

            if record.is_error() {
                warn!("{} could not be evaluated: {}", doc.file_name, record.summary);
            }
            let done = progress.advance();
            info!(
                "[{done}/{total}] {} → {} (fit {})",
                doc.file_name, record.name, record.fit_score
            );

            CandidateEvaluation {
                id: Uuid::new_v4(),
                file_name: doc.file_name,
                role_track: request.role_track,
                evaluated_at: Utc::now(),
                record,
            }
        })
        .buffered(options.concurrency.max(1))
        .boxed()
        .collect()
        .await;

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::mock::MockGenerationClient;
    use crate::llm_client::{GenerationMode, LlmError};
    use crate::models::candidate::LanguagePreference;
    use crate::models::evaluation::{TrackProfile, NO_RISK_SENTINEL};

    const OPTIONS: EvaluationOptions = EvaluationOptions {
        max_resume_chars: 30_000,
        concurrency: 1,
    };

    fn doc(file_name: &str, text: &str) -> CandidateDocument {
        CandidateDocument {
            file_name: file_name.to_string(),
            text: text.to_string(),
        }
    }

    fn is_extraction(prompt: &str) -> bool {
        prompt.contains("CANDIDATE CV:")
    }

    /// Answers each stage from the candidate's name found in the prompt.
    fn scripted_pipeline() -> MockGenerationClient {
        MockGenerationClient::new(|prompt, mode| {
            if is_extraction(prompt) {
                if prompt.contains("CORRUPTED") {
                    return Err(LlmError::EmptyContent);
                }
                return Ok(match ["Alice", "Carol"].into_iter().find(|n| prompt.contains(n)) {
                    Some(name) => format!(r#"{{"name": "{name}", "language_preference": "English"}}"#),
                    None => "{}".to_string(),
                });
            }
            if mode == GenerationMode::FreeText {
                return Ok(NO_RISK_SENTINEL.to_string());
            }
            let score = if prompt.contains("\"Alice\"") {
                70
            } else if prompt.contains("\"Carol\"") {
                90
            } else {
                20
            };
            Ok(format!(r#"{{"fit_score": {score}, "summary": "ok"}}"#))
        })
    }

    #[tokio::test]
    async fn test_pi_postdoc_end_to_end_populates_bibliometrics_only() {
        let llm = MockGenerationClient::new(|prompt, mode| {
            if is_extraction(prompt) {
                Ok(r#"{"name": "Jane Li", "education": "PhD, Stanford University",
                       "top_works": [{"title": "Cardiac organoids", "venue": "Cell"}]}"#
                    .to_string())
            } else if mode == GenerationMode::FreeText {
                Ok(NO_RISK_SENTINEL.to_string())
            } else {
                Ok(r#"{"name": "Jane Li", "fit_score": 82, "summary": "Solid early-career PI",
                       "bibliometrics": {"h_index": 12, "total_citations": 40, "paper_count": 15},
                       "technical_skills": ["should be ignored"]}"#
                    .to_string())
            }
        });

        let record = evaluate_candidate(
            &llm,
            "Dr. Jane Li, PhD Stanford, h-index 12, 40 citations",
            "Principal Investigator, cardiovascular research",
            "",
            RoleTrack::PiPostdoc,
            30_000,
        )
        .await;

        assert_eq!(record.name, "Jane Li");
        assert_eq!(record.fit_score, 82);
        let TrackProfile::PiPostdoc(profile) = &record.profile else {
            panic!("expected a PI block");
        };
        assert_eq!(profile.bibliometrics.h_index, "12");
        assert!(record.technical_skills().is_empty());
        assert_eq!(record.critique_notes, NO_RISK_SENTINEL);
        assert_eq!(llm.call_count(), 3);
    }

    #[tokio::test]
    async fn test_every_call_failing_yields_error_record() {
        let llm = MockGenerationClient::failing();

        let record = evaluate_candidate(&llm, "cv", "jd", "", RoleTrack::PiPostdoc, 30_000).await;

        assert_eq!(record.name, "Error");
        assert_eq!(record.fit_score, 0);
        assert!(record.summary.contains("AI Error"));
        // All three stages were still attempted.
        assert_eq!(llm.call_count(), 3);
    }

    #[tokio::test]
    async fn test_batch_keeps_order_and_survives_extraction_failure() {
        let llm = scripted_pipeline();
        let request = BatchRequest {
            role_track: RoleTrack::Administrative,
            jd_text: "Office manager".to_string(),
            must_haves: "SAP".to_string(),
            documents: vec![
                doc("alice.pdf", "Alice, 5 years office management"),
                doc("broken.pdf", "CORRUPTED"),
                doc("carol.docx", "Carol, event planner"),
            ],
        };
        let progress = BatchProgress::default();

        let results = evaluate_batch(&llm, &request, OPTIONS, &progress).await;

        assert_eq!(results.len(), 3);
        let files: Vec<_> = results.iter().map(|r| r.file_name.as_str()).collect();
        assert_eq!(files, ["alice.pdf", "broken.pdf", "carol.docx"]);

        assert_eq!(results[0].record.name, "Alice");
        assert_eq!(results[0].record.fit_score, 70);
        assert_eq!(results[2].record.name, "Carol");
        assert_eq!(results[2].record.fit_score, 90);

        // Degraded facts, but the later stages still ran.
        let broken = &results[1].record;
        assert!(!broken.is_error());
        assert_eq!(broken.name, "N/A");
        assert_eq!(broken.language_preference, LanguagePreference::English);
        assert_eq!(broken.fit_score, 20);

        assert_eq!(
            progress.snapshot(),
            ProgressSnapshot {
                completed: 3,
                total: 3
            }
        );
        assert!(results
            .iter()
            .all(|r| r.role_track == RoleTrack::Administrative));
    }

    #[tokio::test]
    async fn test_parallel_batch_preserves_input_order() {
        let llm = scripted_pipeline();
        let request = BatchRequest {
            role_track: RoleTrack::ResearchAssistant,
            jd_text: "RA".to_string(),
            must_haves: String::new(),
            documents: vec![
                doc("1.txt", "Carol"),
                doc("2.txt", "Alice"),
                doc("3.txt", "Nobody"),
            ],
        };
        let options = EvaluationOptions {
            concurrency: 3,
            ..OPTIONS
        };

        let results = evaluate_batch(&llm, &request, options, &BatchProgress::default()).await;

        let names: Vec<_> = results.iter().map(|r| r.record.name.as_str()).collect();
        assert_eq!(names, ["Carol", "Alice", "N/A"]);
        assert_eq!(llm.call_count(), 9);
    }

    fn assert_send<T: Send>(_: T) {}

    #[test]
    fn test_batch_future_is_send() {
        let llm = MockGenerationClient::failing();
        let request = BatchRequest {
            role_track: RoleTrack::ResearchAssistant,
            jd_text: String::new(),
            must_haves: String::new(),
            documents: vec![doc("a.txt", "Alice")],
        };
        let progress = BatchProgress::default();
        assert_send(evaluate_batch(&llm, &request, OPTIONS, &progress));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let llm = MockGenerationClient::failing();
        let request = BatchRequest {
            role_track: RoleTrack::PiPostdoc,
            jd_text: String::new(),
            must_haves: String::new(),
            documents: vec![],
        };
        let progress = BatchProgress::default();
        assert!(evaluate_batch(&llm, &request, OPTIONS, &progress).await.is_empty());
        assert_eq!(progress.snapshot().total, 0);
        assert_eq!(llm.call_count(), 0);
    }
}
