//! Hook sentence — the one line of an outreach email the model is not
//! allowed to invent. Composed here from the evaluation record and passed
//! to the drafting prompt verbatim.

use crate::models::candidate::LanguagePreference;
use crate::models::evaluation::EvaluationRecord;

/// Skills or competencies named in a skill hook.
const HOOK_SKILL_COUNT: usize = 2;

/// Builds the hook in the candidate's language.
///
/// Research tracks lead with the top representative paper when one exists;
/// otherwise the top skills (RA) or competencies (administrative) are used.
/// A record with neither gets a generic background sentence.
pub fn compose_hook(record: &EvaluationRecord) -> String {
    let language = record.language_preference;

    if record.role_track().is_research_oriented() {
        if let Some(paper) = record.representative_papers().first() {
            return paper_hook(&paper.title, language);
        }
    }

    let skills: Vec<&str> = record
        .technical_skills()
        .iter()
        .chain(record.core_competencies())
        .take(HOOK_SKILL_COUNT)
        .map(String::as_str)
        .collect();

    if skills.is_empty() {
        generic_hook(language)
    } else {
        skill_hook(&skills, language)
    }
}

fn paper_hook(title: &str, language: LanguagePreference) -> String {
    match language {
        LanguagePreference::English => {
            format!("I was particularly impressed by your work on '{title}'.")
        }
        LanguagePreference::Chinese => format!("我们特别关注到您发表的《{title}》这项研究工作。"),
    }
}

fn skill_hook(skills: &[&str], language: LanguagePreference) -> String {
    match language {
        LanguagePreference::English => {
            format!("Your proficiency in {} caught our eye.", skills.join(" and "))
        }
        LanguagePreference::Chinese => {
            format!("您在{}方面的专业能力给我们留下了深刻印象。", skills.join("、"))
        }
    }
}

fn generic_hook(language: LanguagePreference) -> String {
    match language {
        LanguagePreference::English => "Your professional background caught our eye.".to_string(),
        LanguagePreference::Chinese => "您的专业背景给我们留下了深刻印象。".to_string(),
    }
}
