//! Risk Critique — second stage. Free-text list of at most three risks.

use tracing::warn;

use crate::llm_client::prompts::{
    fill_template, NORMALIZATION_INSTRUCTION, RECRUITER_PERSONA,
};
use crate::llm_client::{GenerationClient, GenerationMode};
use crate::models::candidate::ExtractedFacts;
use crate::models::evaluation::{CRITIQUE_FAILED_SENTINEL, NO_RISK_SENTINEL};
use crate::pipeline::prompts::RISK_CRITIQUE_TEMPLATE;

/// Compares facts against the requirements. On a client error the
/// failure sentinel is returned instead and the pipeline moves on.
pub async fn critique_candidate(
    llm: &dyn GenerationClient,
    facts: &ExtractedFacts,
    jd_text: &str,
    must_haves: &str,
) -> String {
    let facts_json = match serde_json::to_string_pretty(facts) {
        Ok(json) => json,
        Err(e) => {
            warn!("Could not serialize extracted facts for critique: {e}");
            return CRITIQUE_FAILED_SENTINEL.to_string();
        }
    };

    let prompt = build_critique_prompt(&facts_json, jd_text, must_haves);

    match llm.complete(&prompt, GenerationMode::FreeText).await {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            warn!("Risk critique failed: {e}");
            CRITIQUE_FAILED_SENTINEL.to_string()
        }
    }
}

fn build_critique_prompt(facts_json: &str, jd_text: &str, must_haves: &str) -> String {
    let must_haves = if must_haves.trim().is_empty() {
        "(none specified)"
    } else {
        must_haves
    };

    fill_template(
        RISK_CRITIQUE_TEMPLATE,
        &[
            ("persona", RECRUITER_PERSONA),
            ("normalization", NORMALIZATION_INSTRUCTION),
            ("no_risk_sentinel", NO_RISK_SENTINEL),
            ("must_haves", must_haves),
            ("facts_json", facts_json),
            ("jd_text", jd_text),
        ],
    )
}
