//! Fact Extraction — first stage. Turns raw résumé text into `ExtractedFacts`.

use tracing::{debug, warn};

use crate::llm_client::prompts::{
    fill_template, JSON_ONLY_INSTRUCTION, NORMALIZATION_INSTRUCTION, RECRUITER_PERSONA,
};
use crate::llm_client::GenerationClient;
use crate::models::candidate::ExtractedFacts;
use crate::models::role_track::RoleTrack;
use crate::pipeline::prompts::{extraction_focus, FACT_EXTRACTION_TEMPLATE};

/// Runs one structured generation call over the (truncated) résumé.
///
/// Never fails: on a client error or unparseable output the result is the
/// minimal record (English language preference, everything else unknown).
pub async fn extract_facts(
    llm: &dyn GenerationClient,
    resume_text: &str,
    track: RoleTrack,
    max_chars: usize,
) -> ExtractedFacts {
    let resume = truncate_chars(resume_text, max_chars);
    if resume.len() < resume_text.len() {
        debug!(
            "Résumé truncated from {} to {} bytes before extraction",
            resume_text.len(),
            resume.len()
        );
    }

    let prompt = build_extraction_prompt(resume, track);

    match llm.complete_json(&prompt).await {
        Ok(value) => ExtractedFacts::from_model_output(&value),
        Err(e) => {
            warn!("Fact extraction failed, continuing with partial facts: {e}");
            ExtractedFacts::default()
        }
    }
}

fn build_extraction_prompt(resume: &str, track: RoleTrack) -> String {
    fill_template(
        FACT_EXTRACTION_TEMPLATE,
        &[
            ("persona", RECRUITER_PERSONA),
            ("json_only", JSON_ONLY_INSTRUCTION),
            ("normalization", NORMALIZATION_INSTRUCTION),
            ("track_label", track.label()),
            ("track_focus", extraction_focus(track)),
            ("resume_text", resume),
        ],
    )
}

/// Keeps at most `max_chars` characters of `text`, cutting on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
