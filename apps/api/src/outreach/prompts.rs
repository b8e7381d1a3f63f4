// Prompt templates for the outreach email sub-pipeline.

/// Stage A: draft (free-text mode).
/// Replace: {sender_name}, {sender_title}, {sender_org}, {candidate_name}, {track_label},
///          {language}, {hook}, {summary}, {strengths}
pub const EMAIL_DRAFT_TEMPLATE: &str = r#"You are {sender_name}, the {sender_title} at {sender_org}.
Write a recruiting email to {candidate_name} about a {track_label} role.

LANGUAGE: Write the entire email in {language}.

MANDATORY HOOK: Include this sentence exactly as written, word for word:
{hook}

GOAL: Invite the candidate to a short, 15-minute introductory call.

CONTEXT (for tone only, do not quote):
- Summary: {summary}
- Strengths: {strengths}

HARD RULES:
1. NEVER mention scores, ratings, rankings or any internal evaluation numbers.
2. NEVER use placeholders or bracketed text such as [Insert Lab Name]. If a detail is unknown,
   use a general phrase like "our research department".
3. No markdown, no editorial notes, no subject line. Tone: professional and personal.

Output: the email body only."#;

/// Stage B: strip bracketed placeholders (free-text mode).
/// Replace: {draft}
pub const EMAIL_REFINE_TEMPLATE: &str = r#"You are a strict editor. The email draft below contains bracketed placeholder text.

YOUR ONLY TASK: Remove every bracketed span, including the brackets and everything inside them,
then smooth the surrounding sentences so the email reads naturally. Keep everything else,
including the language of the email, unchanged. NEVER leave a "[" or "]" in the result.

Output: the clean email body only.

DRAFT:
{draft}"#;
