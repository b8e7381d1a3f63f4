//! Evaluation record — the unit a batch run retains per candidate.
//!
//! Common fields live on [`EvaluationRecord`]; the track-specific block is a
//! [`TrackProfile`] variant, so a record can never carry another track's fields.
//! The list accessors the outreach hook relies on return empty slices for
//! other tracks.

use serde::{Deserialize, Serialize};

use crate::models::candidate::LanguagePreference;
use crate::models::fields::NOT_AVAILABLE;
use crate::models::role_track::RoleTrack;

/// Phrase the critique stage emits when it finds nothing to flag.
/// Matched by substring; changing it requires updating the critique prompt too.
pub const NO_RISK_SENTINEL: &str = "No significant risks identified.";

/// Critique text substituted when the critique call itself fails.
pub const CRITIQUE_FAILED_SENTINEL: &str = "Risk analysis unavailable: AI critique failed.";

/// Name carried by the error-sentinel record.
pub const ERROR_RECORD_NAME: &str = "Error";

/// Prefix of the error-sentinel summary.
pub const AI_ERROR_PREFIX: &str = "AI Error";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bibliometrics {
    pub h_index: String,
    pub total_citations: String,
    pub paper_count: String,
}

impl Default for Bibliometrics {
    fn default() -> Self {
        Self {
            h_index: NOT_AVAILABLE.to_string(),
            total_citations: NOT_AVAILABLE.to_string(),
            paper_count: NOT_AVAILABLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepresentativePaper {
    pub title: String,
    pub venue: String,
    /// Author role, e.g. "first author".
    pub role: String,
    pub significance: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PiPostdocProfile {
    pub bibliometrics: Bibliometrics,
    pub representative_papers: Vec<RepresentativePaper>,
    pub grants_found: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchAssistantProfile {
    pub technical_skills: Vec<String>,
    pub lab_experience_years: String,
    pub project_participation: Vec<String>,
}

impl Default for ResearchAssistantProfile {
    fn default() -> Self {
        Self {
            technical_skills: Vec::new(),
            lab_experience_years: NOT_AVAILABLE.to_string(),
            project_participation: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdministrativeProfile {
    pub core_competencies: Vec<String>,
    pub years_experience: String,
    pub software_tools: Vec<String>,
}

impl Default for AdministrativeProfile {
    fn default() -> Self {
        Self {
            core_competencies: Vec::new(),
            years_experience: NOT_AVAILABLE.to_string(),
            software_tools: Vec::new(),
        }
    }
}

/// Track-specific block, tagged by role track when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role_track", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackProfile {
    PiPostdoc(PiPostdocProfile),
    ResearchAssistant(ResearchAssistantProfile),
    Administrative(AdministrativeProfile),
}

impl TrackProfile {
    /// Block for `track` with every field at its "not available" default.
    pub fn empty(track: RoleTrack) -> Self {
        match track {
            RoleTrack::PiPostdoc => TrackProfile::PiPostdoc(PiPostdocProfile::default()),
            RoleTrack::ResearchAssistant => {
                TrackProfile::ResearchAssistant(ResearchAssistantProfile::default())
            }
            RoleTrack::Administrative => {
                TrackProfile::Administrative(AdministrativeProfile::default())
            }
        }
    }

    pub fn role_track(&self) -> RoleTrack {
        match self {
            TrackProfile::PiPostdoc(_) => RoleTrack::PiPostdoc,
            TrackProfile::ResearchAssistant(_) => RoleTrack::ResearchAssistant,
            TrackProfile::Administrative(_) => RoleTrack::Administrative,
        }
    }
}

/// Whether the reviewer should see the critique as a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskStatus {
    Clear,
    Flagged,
}

impl RiskStatus {
    pub fn from_critique(critique: &str) -> Self {
        if critique.contains(NO_RISK_SENTINEL) {
            RiskStatus::Clear
        } else {
            RiskStatus::Flagged
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub name: String,
    pub email: String,
    pub language_preference: LanguagePreference,
    /// Always within 0..=100.
    pub fit_score: u8,
    pub summary: String,
    /// The critique report with line breaks collapsed to spaces.
    pub critique_notes: String,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    #[serde(flatten)]
    pub profile: TrackProfile,
}

impl EvaluationRecord {
    /// The end-to-end failure record: name "Error", score 0, and a summary
    /// carrying the error text for the operator.
    pub fn error(track: RoleTrack, error: impl std::fmt::Display) -> Self {
        Self {
            name: ERROR_RECORD_NAME.to_string(),
            email: NOT_AVAILABLE.to_string(),
            language_preference: LanguagePreference::default(),
            fit_score: 0,
            summary: format!("{AI_ERROR_PREFIX}: {error}"),
            critique_notes: String::new(),
            strengths: Vec::new(),
            gaps: Vec::new(),
            profile: TrackProfile::empty(track),
        }
    }

    pub fn is_error(&self) -> bool {
        self.name == ERROR_RECORD_NAME && self.fit_score == 0
    }

    pub fn role_track(&self) -> RoleTrack {
        self.profile.role_track()
    }

    pub fn risk_status(&self) -> RiskStatus {
        RiskStatus::from_critique(&self.critique_notes)
    }

    pub fn representative_papers(&self) -> &[RepresentativePaper] {
        match &self.profile {
            TrackProfile::PiPostdoc(p) => &p.representative_papers,
            _ => &[],
        }
    }

    pub fn technical_skills(&self) -> &[String] {
        match &self.profile {
            TrackProfile::ResearchAssistant(p) => &p.technical_skills,
            _ => &[],
        }
    }

    pub fn core_competencies(&self) -> &[String] {
        match &self.profile {
            TrackProfile::Administrative(p) => &p.core_competencies,
            _ => &[],
        }
    }
}

/// Replaces every run of line-break characters with a single space.
pub fn collapse_line_breaks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_break = false;
    for c in text.chars() {
        if c == '\n' || c == '\r' {
            if !in_break {
                out.push(' ');
                in_break = true;
            }
        } else {
            out.push(c);
            in_break = false;
        }
    }
    out
}
