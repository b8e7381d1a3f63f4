//! Decision — third stage. Merges facts, critique and requirements into the
//! final `EvaluationRecord` for the selected role track.

use serde_json::Value;
use tracing::warn;

use crate::llm_client::prompts::{
    fill_template, JSON_ONLY_INSTRUCTION, RECRUITER_PERSONA,
};
use crate::llm_client::{GenerationClient, LlmError};
use crate::models::candidate::{ExtractedFacts, LanguagePreference};
use crate::models::evaluation::{
    collapse_line_breaks, AdministrativeProfile, Bibliometrics, EvaluationRecord,
    PiPostdocProfile, RepresentativePaper, ResearchAssistantProfile, TrackProfile,
};
use crate::models::fields::{self, NOT_AVAILABLE};
use crate::models::role_track::RoleTrack;
use crate::pipeline::prompts::{decision_schema, decision_task, DECISION_TEMPLATE};

/// Issues the decision call and assembles the record.
///
/// Client errors, unparseable output, and a missing or non-numeric fit score
/// all produce the error-sentinel record.
pub async fn decide(
    llm: &dyn GenerationClient,
    jd_text: &str,
    facts: &ExtractedFacts,
    critique: &str,
    track: RoleTrack,
) -> EvaluationRecord {
    let critique_notes = collapse_line_breaks(critique);

    let result = match serde_json::to_string_pretty(facts) {
        Ok(facts_json) => {
            let prompt = build_decision_prompt(jd_text, &facts_json, &critique_notes, track);
            llm.complete_json(&prompt).await
        }
        Err(e) => Err(LlmError::Parse(e)),
    }
    .and_then(|value| build_record(&value, facts, &critique_notes, track));

    result.unwrap_or_else(|e| {
        warn!("Decision stage failed for {:?} track: {e}", track);
        EvaluationRecord::error(track, e)
    })
}

fn build_decision_prompt(
    jd_text: &str,
    facts_json: &str,
    critique_notes: &str,
    track: RoleTrack,
) -> String {
    fill_template(
        DECISION_TEMPLATE,
        &[
            ("persona", RECRUITER_PERSONA),
            ("json_only", JSON_ONLY_INSTRUCTION),
            ("track_label", track.label()),
            ("track_task", decision_task(track)),
            ("track_schema", decision_schema(track)),
            ("critique_notes", critique_notes),
            ("facts_json", facts_json),
            ("jd_text", jd_text),
        ],
    )
}

/// Assembles the record from model output. Only the block for `track` is
/// read; fields the model emitted for other tracks are ignored.
fn build_record(
    value: &Value,
    facts: &ExtractedFacts,
    critique_notes: &str,
    track: RoleTrack,
) -> Result<EvaluationRecord, LlmError> {
    let fit_score = value
        .get("fit_score")
        .and_then(parse_fit_score)
        .ok_or_else(|| {
            LlmError::UnexpectedShape(format!(
                "fit_score missing or non-numeric: {}",
                value.get("fit_score").unwrap_or(&Value::Null)
            ))
        })?;

    let language_preference = fields::text(value, "language_preference")
        .map(|l| LanguagePreference::from_label(&l))
        .unwrap_or(facts.language_preference);

    Ok(EvaluationRecord {
        name: fields::text(value, "name")
            .or_else(|| facts.name.clone())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        email: fields::text(value, "email")
            .or_else(|| facts.email.clone())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        language_preference,
        fit_score,
        summary: fields::text_or_na(value, "summary"),
        // Substituted from the critique report, never taken from the model.
        critique_notes: critique_notes.to_string(),
        strengths: fields::string_list(value, "strengths"),
        gaps: fields::string_list(value, "gaps"),
        profile: read_profile(value, track),
    })
}

fn read_profile(value: &Value, track: RoleTrack) -> TrackProfile {
    match track {
        RoleTrack::PiPostdoc => {
            let bibliometrics = value
                .get("bibliometrics")
                .filter(|b| b.is_object())
                .map(|b| Bibliometrics {
                    h_index: fields::text_or_na(b, "h_index"),
                    total_citations: fields::text_or_na(b, "total_citations"),
                    paper_count: fields::text(b, "paper_count")
                        .or_else(|| fields::text(b, "total_paper_count"))
                        .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                })
                .unwrap_or_default();

            let representative_papers = fields::object_list(value, "representative_papers")
                .into_iter()
                .filter_map(|paper| {
                    Some(RepresentativePaper {
                        title: fields::text(paper, "title")?,
                        venue: fields::text(paper, "venue")
                            .or_else(|| fields::text(paper, "journal"))
                            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                        role: fields::text_or_na(paper, "role"),
                        significance: fields::text_or_na(paper, "significance"),
                    })
                })
                .collect();

            TrackProfile::PiPostdoc(PiPostdocProfile {
                bibliometrics,
                representative_papers,
                grants_found: fields::string_list(value, "grants_found"),
            })
        }
        RoleTrack::ResearchAssistant => TrackProfile::ResearchAssistant(ResearchAssistantProfile {
            technical_skills: fields::string_list(value, "technical_skills"),
            lab_experience_years: fields::text_or_na(value, "lab_experience_years"),
            project_participation: fields::string_list(value, "project_participation"),
        }),
        RoleTrack::Administrative => TrackProfile::Administrative(AdministrativeProfile {
            core_competencies: fields::string_list(value, "core_competencies"),
            years_experience: fields::text_or_na(value, "years_experience"),
            software_tools: fields::string_list(value, "software_tools"),
        }),
    }
}

/// Reads a fit score, rounding fractions and clamping to 0..=100.
/// Returns `None` for anything that is not a number or numeric string.
pub fn parse_fit_score(value: &Value) -> Option<u8> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let s = s.trim();
            let s = s
                .strip_suffix("/100")
                .or_else(|| s.strip_suffix('%'))
                .unwrap_or(s)
                .trim();
            s.parse::<f64>().ok()?
        }
        _ => return None,
    };

    if !raw.is_finite() {
        return None;
    }
    Some(raw.round().clamp(0.0, 100.0) as u8)
}
