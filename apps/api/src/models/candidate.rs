use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::fields;

/// Language the candidate should be addressed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LanguagePreference {
    Chinese,
    #[default]
    English,
}

impl LanguagePreference {
    /// Lenient reading of a model-provided label. Anything that is not
    /// recognizably Chinese is treated as English.
    pub fn from_label(label: &str) -> Self {
        let lower = label.trim().to_lowercase();
        if lower.contains("chinese") || lower.contains("中文") || lower == "zh" || lower.starts_with("zh-")
        {
            LanguagePreference::Chinese
        } else {
            LanguagePreference::English
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LanguagePreference::Chinese => "Chinese",
            LanguagePreference::English => "English",
        }
    }
}

/// A standout paper or project surfaced during extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkHighlight {
    pub title: String,
    /// Journal, conference, or project context.
    pub venue: Option<String>,
    pub significance: Option<String>,
}

/// Facts pulled from a résumé by the first pipeline stage.
///
/// Every field is best-effort. A record with nothing but the default language
/// preference is valid and flows through the rest of the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFacts {
    pub name: Option<String>,
    pub email: Option<String>,
    pub language_preference: LanguagePreference,
    pub education: Option<String>,
    pub years_of_experience: Option<String>,
    pub skills: Vec<String>,
    /// At most [`ExtractedFacts::MAX_HIGHLIGHTS`] entries.
    pub top_works: Vec<WorkHighlight>,
}

impl ExtractedFacts {
    pub const MAX_HIGHLIGHTS: usize = 3;

    /// Builds facts from a structured model response, tolerating missing or
    /// oddly typed fields.
    pub fn from_model_output(value: &Value) -> Self {
        let language_preference = fields::text(value, "language_preference")
            .map(|l| LanguagePreference::from_label(&l))
            .unwrap_or_default();

        let top_works = fields::object_list(value, "top_works")
            .into_iter()
            .filter_map(|work| {
                Some(WorkHighlight {
                    title: fields::text(work, "title")?,
                    venue: fields::text(work, "venue").or_else(|| fields::text(work, "journal")),
                    significance: fields::text(work, "significance"),
                })
            })
            .take(Self::MAX_HIGHLIGHTS)
            .collect();

        ExtractedFacts {
            name: fields::text(value, "name"),
            email: fields::text(value, "email"),
            language_preference,
            education: fields::text(value, "education"),
            years_of_experience: fields::text(value, "years_of_experience"),
            skills: fields::string_list(value, "skills"),
            top_works,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_language_label_reading() {
        assert_eq!(LanguagePreference::from_label("Chinese"), LanguagePreference::Chinese);
        assert_eq!(LanguagePreference::from_label("中文"), LanguagePreference::Chinese);
        assert_eq!(LanguagePreference::from_label("zh-CN"), LanguagePreference::Chinese);
        assert_eq!(LanguagePreference::from_label("English"), LanguagePreference::English);
        assert_eq!(LanguagePreference::from_label("French"), LanguagePreference::English);
    }

    #[test]
    fn test_from_model_output_caps_highlights_and_reads_loose_types() {
        let value = json!({
            "name": "Li Wei",
            "language_preference": "Chinese",
            "years_of_experience": 6,
            "skills": ["CRISPR", "Flow cytometry"],
            "top_works": [
                {"title": "Paper A", "journal": "Nature"},
                {"title": "Paper B", "venue": "Cell"},
                {"venue": "untitled entries are skipped"},
                {"title": "Paper C"},
                {"title": "Paper D"}
            ]
        });

        let facts = ExtractedFacts::from_model_output(&value);
        assert_eq!(facts.name.as_deref(), Some("Li Wei"));
        assert_eq!(facts.email, None);
        assert_eq!(facts.language_preference, LanguagePreference::Chinese);
        assert_eq!(facts.years_of_experience.as_deref(), Some("6"));
        assert_eq!(facts.skills.len(), 2);
        assert_eq!(facts.top_works.len(), 3);
        assert_eq!(facts.top_works[0].venue.as_deref(), Some("Nature"));
        assert_eq!(facts.top_works[2].title, "Paper C");
    }

    #[test]
    fn test_from_empty_object_is_default() {
        let facts = ExtractedFacts::from_model_output(&json!({}));
        assert_eq!(facts, ExtractedFacts::default());
        assert_eq!(facts.language_preference, LanguagePreference::English);
    }
}
