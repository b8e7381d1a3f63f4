use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hiring category. Selected once per batch; drives extraction emphasis and
/// the track-specific block of the evaluation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleTrack {
    PiPostdoc,
    ResearchAssistant,
    Administrative,
}

#[derive(Debug, Error, PartialEq)]
#[error("Unknown role track '{0}'. Expected one of: PI_POSTDOC, RESEARCH_ASSISTANT, ADMINISTRATIVE")]
pub struct UnknownRoleTrack(pub String);

impl RoleTrack {
    pub const ALL: [RoleTrack; 3] = [
        RoleTrack::PiPostdoc,
        RoleTrack::ResearchAssistant,
        RoleTrack::Administrative,
    ];

    /// Stable machine key.
    pub fn key(&self) -> &'static str {
        match self {
            RoleTrack::PiPostdoc => "PI_POSTDOC",
            RoleTrack::ResearchAssistant => "RESEARCH_ASSISTANT",
            RoleTrack::Administrative => "ADMINISTRATIVE",
        }
    }

    /// Human-facing label, also used inside prompts and email drafts.
    pub fn label(&self) -> &'static str {
        match self {
            RoleTrack::PiPostdoc => "PI / Postdoc",
            RoleTrack::ResearchAssistant => "Research Assistant (RA)",
            RoleTrack::Administrative => "Administrative / Support",
        }
    }

    /// Label written by the earlier dashboard into saved preset files.
    pub fn legacy_label(&self) -> &'static str {
        match self {
            RoleTrack::PiPostdoc => "🧪 PI / Postdoc",
            RoleTrack::ResearchAssistant => "🧬 Research Assistant (RA)",
            RoleTrack::Administrative => "💼 Administrative / Support",
        }
    }

    /// Research tracks lead outreach with publications rather than skills.
    pub fn is_research_oriented(&self) -> bool {
        matches!(self, RoleTrack::PiPostdoc | RoleTrack::ResearchAssistant)
    }
}

impl fmt::Display for RoleTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts the stable key (case-insensitive), the exact display label or the
/// exact legacy dashboard label.
/// Anything else is a configuration error; there is no fallback track.
impl FromStr for RoleTrack {
    type Err = UnknownRoleTrack;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        RoleTrack::ALL
            .into_iter()
            .find(|track| {
                track.key().eq_ignore_ascii_case(trimmed)
                    || track.label() == trimmed
                    || track.legacy_label() == trimmed
            })
            .ok_or_else(|| UnknownRoleTrack(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_stable_keys_case_insensitively() {
        assert_eq!("PI_POSTDOC".parse(), Ok(RoleTrack::PiPostdoc));
        assert_eq!("research_assistant".parse(), Ok(RoleTrack::ResearchAssistant));
        assert_eq!(" Administrative ".parse(), Ok(RoleTrack::Administrative));
    }

    #[test]
    fn test_parses_display_labels() {
        for track in RoleTrack::ALL {
            assert_eq!(track.label().parse(), Ok(track));
        }
    }

    #[test]
    fn test_parses_legacy_dashboard_labels() {
        assert_eq!("🧪 PI / Postdoc".parse(), Ok(RoleTrack::PiPostdoc));
        assert_eq!(
            "🧬 Research Assistant (RA)".parse(),
            Ok(RoleTrack::ResearchAssistant)
        );
        assert_eq!(
            "💼 Administrative / Support".parse(),
            Ok(RoleTrack::Administrative)
        );
        assert!("🧪 PI".parse::<RoleTrack>().is_err());
    }

    #[test]
    fn test_rejects_substring_matches_and_unknown_labels() {
        // "PI" appearing inside another label must not select a track.
        assert!("PI".parse::<RoleTrack>().is_err());
        assert!("Postdoc Fellow".parse::<RoleTrack>().is_err());
        assert!("Clinical Nurse".parse::<RoleTrack>().is_err());
        assert!("".parse::<RoleTrack>().is_err());
    }

    #[test]
    fn test_serde_uses_stable_keys() {
        let json = serde_json::to_string(&RoleTrack::ResearchAssistant).unwrap();
        assert_eq!(json, r#""RESEARCH_ASSISTANT""#);
        let track: RoleTrack = serde_json::from_str(r#""PI_POSTDOC""#).unwrap();
        assert_eq!(track, RoleTrack::PiPostdoc);
    }

    #[test]
    fn test_research_orientation() {
        assert!(RoleTrack::PiPostdoc.is_research_oriented());
        assert!(RoleTrack::ResearchAssistant.is_research_oriented());
        assert!(!RoleTrack::Administrative.is_research_oriented());
    }
}
