//! Candidate and resolved identity types

use serde::{Deserialize, Serialize};

/// A registry record that passed structural validation
///
/// Only built by [`crate::extract::extract`], so `identifier` is always an
/// 11 digit ABN whose status was `Active` when the record was read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// ABN, 11 digits
    pub identifier: String,
    /// State code of the main business address (e.g. "NSW")
    pub jurisdiction: String,
    /// Best available organisation name
    pub legal_name: String,
    /// Registry match score (0-100), if the register supplied a number
    pub match_score: Option<f64>,
    /// The score exactly as the register printed it (trimmed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_score_text: Option<String>,
}

/// The business identity a merchant name resolved to
///
/// "No match" is represented as `Option::<ResolvedIdentity>::None` throughout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedIdentity {
    pub identifier: String,
    pub jurisdiction: String,
    pub legal_name: String,
    pub match_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_score_text: Option<String>,
}

impl From<Candidate> for ResolvedIdentity {
    fn from(candidate: Candidate) -> Self {
        Self {
            identifier: candidate.identifier,
            jurisdiction: candidate.jurisdiction,
            legal_name: candidate.legal_name,
            match_score: candidate.match_score,
            match_score_text: candidate.match_score_text,
        }
    }
}

impl ResolvedIdentity {
    /// Match score as the register printed it ("095" stays "095"), empty when absent
    pub fn score_text(&self) -> String {
        match &self.match_score_text {
            Some(text) => text.clone(),
            None => self.match_score.map(|s| s.to_string()).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_from_candidate() {
        let candidate = Candidate {
            identifier: "50169260144".to_string(),
            jurisdiction: "NSW".to_string(),
            legal_name: "Apple Pty Ltd".to_string(),
            match_score: Some(95.5),
            match_score_text: Some("95.50".to_string()),
        };
        let identity = ResolvedIdentity::from(candidate);
        assert_eq!(identity.identifier, "50169260144");
        assert_eq!(identity.match_score, Some(95.5));
        assert_eq!(identity.score_text(), "95.50");
    }

    #[test]
    fn test_score_text_absent() {
        let identity = ResolvedIdentity {
            identifier: "50169260144".to_string(),
            jurisdiction: "VIC".to_string(),
            legal_name: "Apple Pty Ltd".to_string(),
            match_score: None,
            match_score_text: None,
        };
        assert_eq!(identity.score_text(), "");
    }

    #[test]
    fn test_score_text_without_source_text() {
        let identity = ResolvedIdentity {
            identifier: "50169260144".to_string(),
            jurisdiction: "NSW".to_string(),
            legal_name: "Apple Pty Ltd".to_string(),
            match_score: Some(95.0),
            match_score_text: None,
        };
        assert_eq!(identity.score_text(), "95");
    }
}
