// All prompt templates for the evaluation pipeline.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::models::role_track::RoleTrack;

/// Fact extraction prompt (structured mode).
/// Replace: {persona}, {json_only}, {normalization}, {track_label}, {track_focus}, {resume_text}
pub const FACT_EXTRACTION_TEMPLATE: &str = r#"{persona}
You are screening for a {track_label} role. Extract the candidate's facts from the CV below.

{track_focus}

{normalization}

LANGUAGE PREFERENCE: If the CV does not state a preferred language, infer it from the
candidate's name and the language the CV is written in. Use exactly "Chinese" or "English".

Return a JSON object with this EXACT schema (omit nothing, use null when unknown):
{
  "name": "Full name",
  "email": "Email address",
  "language_preference": "Chinese" | "English",
  "education": "Highest degree, field, institution",
  "years_of_experience": "Number of relevant years",
  "skills": ["Skill or competency"],
  "top_works": [
    {"title": "Paper or project title", "venue": "Journal, conference or context", "significance": "Why it matters"}
  ]
}

RULES:
1. "top_works" holds at most 3 entries, strongest first.
2. Do NOT invent facts that are not in the CV.

{json_only}

CANDIDATE CV:
{resume_text}"#;

/// Risk critique prompt (free-text mode).
/// Replace: {persona}, {normalization}, {no_risk_sentinel}, {must_haves}, {jd_text}, {facts_json}
pub const RISK_CRITIQUE_TEMPLATE: &str = r#"{persona}
Act as a skeptical hiring committee member. Compare the candidate facts against the role requirements
and flag concrete hiring risks.

{normalization}
Normalized-equivalent terms are MATCHES, never mismatches.

Examples of risks: short tenure or frequent job changes, a missing must-have skill or qualification,
weak or unverifiable research impact, gaps in employment.

RULES:
1. List AT MOST 3 risks, one per line, each starting with "- ".
2. Each risk must cite the specific fact or missing requirement.
3. If you find no concrete risk, reply with exactly this sentence and nothing else:
{no_risk_sentinel}

MUST-HAVE FILTERS:
{must_haves}

ROLE REQUIREMENTS:
{jd_text}

CANDIDATE FACTS (JSON):
{facts_json}"#;

/// Decision prompt (structured mode).
/// Replace: {persona}, {json_only}, {track_label}, {track_task}, {track_schema},
///          {critique_notes}, {facts_json}, {jd_text}
pub const DECISION_TEMPLATE: &str = r#"{persona}
Make the final assessment of a candidate for a {track_label} role.

{track_task}

SCORING:
- "fit_score" is an integer from 0 to 100 measuring relevance to THIS role type.
- Lower the score in proportion to the severity of the risks in the critique below.

CRITIQUE NOTES: copy the following text into "critique_notes" VERBATIM, without paraphrasing:
{critique_notes}

Return a JSON object with this EXACT schema:
{
  "name": "Name",
  "email": "Email",
  "language_preference": "Chinese" | "English",
  "fit_score": 0,
  "summary": "Executive summary",
  "critique_notes": "Critique text as given above",
{track_schema}
  "strengths": ["Strength 1", "Strength 2"],
  "gaps": ["Gap 1"]
}

{json_only}

TARGET REQUIREMENTS:
{jd_text}

CANDIDATE FACTS (JSON):
{facts_json}"#;

/// What extraction should pay most attention to for each track.
pub fn extraction_focus(track: RoleTrack) -> &'static str {
    match track {
        RoleTrack::PiPostdoc => "\
FOCUS: Deep academic profiling.
- Skills: research areas and methods.
- top_works: the 3 highest-impact papers (journal, author position, contribution).
- Note any bibliometrics (H-Index, citations) and grants (NSFC, NIH) mentioned.",
        RoleTrack::ResearchAssistant => "\
FOCUS: Technical skill and execution profiling.
- Skills: specific wet/dry lab techniques (e.g. PCR, Cell Culture, Python).
- top_works: projects participated in; publications count even without first authorship.
- years_of_experience: hands-on lab years.",
        RoleTrack::Administrative => "\
FOCUS: Administrative and soft-skill profiling.
- Skills: project management, communication, office/SAP software, event planning.
- top_works: notable projects or events organized.
- years_of_experience: relevant work years, including hospital or university roles.",
    }
}

/// Track-specific assessment task for the decision stage.
pub fn decision_task(track: RoleTrack) -> &'static str {
    match track {
        RoleTrack::PiPostdoc => "\
TASK: Deep academic profiling.
1. Metrics: H-Index (estimate if needed), total citations, paper count.
2. Papers: the top 3 high-impact papers with the candidate's author role.
3. Grants: NSFC/NIH or equivalent funding found in the facts.",
        RoleTrack::ResearchAssistant => "\
TASK: Technical skill and execution profiling.
1. Lab skills: specific wet/dry lab techniques.
2. Experience: years of lab work, project participation and reliability.
3. Publications: participation counts; first authorship is not required.",
        RoleTrack::Administrative => "\
TASK: Administrative and soft-skill profiling.
1. Skills: project management, communication, office/SAP software, event planning.
2. Experience: years of relevant work, previous hospital/university experience.
3. Tone: professionalism and organizational ability.",
    }
}

/// JSON fields of the track-specific block, spliced into the decision schema.
pub fn decision_schema(track: RoleTrack) -> &'static str {
    match track {
        RoleTrack::PiPostdoc => r#"  "bibliometrics": {"h_index": "Value", "total_citations": "Value", "paper_count": "Value"},
  "representative_papers": [{"title": "", "venue": "", "role": "", "significance": ""}],
  "grants_found": ["Grant 1"],"#,
        RoleTrack::ResearchAssistant => r#"  "technical_skills": ["Skill 1", "Skill 2"],
  "lab_experience_years": "Value",
  "project_participation": ["Project 1", "Project 2"],"#,
        RoleTrack::Administrative => r#"  "core_competencies": ["Competency 1", "Competency 2"],
  "years_experience": "Value",
  "software_tools": ["Tool 1", "Tool 2"],"#,
    }
}
