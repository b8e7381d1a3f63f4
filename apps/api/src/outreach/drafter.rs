//! Outreach email drafting — draft, then sanitize.
//!
//! Stage A writes the body around a deterministic hook sentence.
//! Stage B runs only when the draft still contains square brackets
//! (an unfilled placeholder) and asks the model to remove them.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::llm_client::prompts::fill_template;
use crate::llm_client::{GenerationClient, GenerationMode};
use crate::models::evaluation::EvaluationRecord;
use crate::models::role_track::RoleTrack;
use crate::outreach::hook::compose_hook;
use crate::outreach::prompts::{EMAIL_DRAFT_TEMPLATE, EMAIL_REFINE_TEMPLATE};

/// Returned in place of a body when the draft call fails.
pub const EMAIL_GENERATION_ERROR: &str = "error generating email";

/// Who the email is from. Passed through to the prompt untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenderProfile {
    pub name: String,
    pub title: String,
    pub organization: String,
}

/// Produces a send-ready plain-text email body.
///
/// Stage A failure returns [`EMAIL_GENERATION_ERROR`]; Stage B failure falls
/// back to the unsanitized Stage A draft.
pub async fn draft_recruitment_email(
    llm: &dyn GenerationClient,
    record: &EvaluationRecord,
    sender: &SenderProfile,
    track: RoleTrack,
) -> String {
    let hook = compose_hook(record);
    let prompt = build_draft_prompt(record, sender, track, &hook);

    let draft = match llm.complete(&prompt, GenerationMode::FreeText).await {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => {
            warn!("Email draft for {} came back empty", record.name);
            return EMAIL_GENERATION_ERROR.to_string();
        }
        Err(e) => {
            warn!("Email draft for {} failed: {e}", record.name);
            return EMAIL_GENERATION_ERROR.to_string();
        }
    };

    if !has_brackets(&draft) {
        return draft;
    }

    info!("Draft for {} contains bracketed placeholders, refining", record.name);
    let refine_prompt = fill_template(EMAIL_REFINE_TEMPLATE, &[("draft", draft.as_str())]);

    match llm.complete(&refine_prompt, GenerationMode::FreeText).await {
        Ok(refined) if !refined.trim().is_empty() => {
            if has_brackets(&refined) {
                warn!("Refined draft still contains brackets, stripping them");
                strip_bracketed_spans(&refined)
            } else {
                refined
            }
        }
        Ok(_) => {
            warn!("Email refinement returned nothing, keeping the draft");
            draft
        }
        Err(e) => {
            warn!("Email refinement failed, keeping the draft: {e}");
            draft
        }
    }
}

fn build_draft_prompt(
    record: &EvaluationRecord,
    sender: &SenderProfile,
    track: RoleTrack,
    hook: &str,
) -> String {
    let strengths = if record.strengths.is_empty() {
        "N/A".to_string()
    } else {
        record.strengths.join("; ")
    };

    fill_template(
        EMAIL_DRAFT_TEMPLATE,
        &[
            ("sender_name", sender.name.as_str()),
            ("sender_title", sender.title.as_str()),
            ("sender_org", sender.organization.as_str()),
            ("track_label", track.label()),
            ("language", record.language_preference.as_str()),
            ("candidate_name", record.name.as_str()),
            ("hook", hook),
            ("summary", record.summary.as_str()),
            ("strengths", strengths.as_str()),
        ],
    )
}

fn has_brackets(text: &str) -> bool {
    text.contains('[') || text.contains(']')
}

/// Removes every `[...]` span (nested spans included) and any stray bracket,
/// then tidies the spacing left behind.
pub fn strip_bracketed_spans(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth = 0usize;
    for c in text.chars() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }

    out.lines()
        .map(|line| {
            line.split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .replace(" .", ".")
                .replace(" ,", ",")
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
