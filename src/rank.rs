//! Candidate ranking
//!
//! Picks the single best registry candidate for a merchant name. A name
//! search returns plenty of look-alikes (sole traders, unrelated companies
//! sharing one common word), so candidates pass three gates before any
//! scoring happens:
//!
//! 1. Entity type - the legal name must carry a company marker ("pty", "ltd", ...)
//! 2. Lexical overlap - at least one word in common with the merchant name
//! 3. Noise - an unrelated-business keyword ("cleaning", "freight", ...) needs
//!    at least two common words to survive
//!
//! Survivors are scored as
//! `exact + contains + per_common_word * |common| + registry_score`.
//! The strictly highest score wins; ties go to the earliest candidate.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::ConfigError;
use crate::types::Candidate;

/// Company markers; a legal name must contain one of these
const ENTITY_KEYWORDS: &[&str] = &[
    "pty",
    "limited",
    "ltd",
    "inc",
    "corporation",
    "corp",
    "group",
    "holding",
];

/// Business types that commonly collide with merchant names
const NOISE_KEYWORDS: &[&str] = &[
    "cleaning", "freight", "toners", "candles", "music", "ads", "dogwash",
];

// =============================================================================
// Policy
// =============================================================================

/// Composite score weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingWeights {
    /// Bonus when merchant name and legal name are identical (normalized)
    pub exact_match: f64,
    /// Bonus when either name contains the other
    pub contains: f64,
    /// Added per word the two names share
    pub per_common_word: f64,
    /// Used in place of the registry score when the register gave none
    pub default_registry_score: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            exact_match: 1000.0,
            contains: 500.0,
            per_common_word: 100.0,
            default_registry_score: 50.0,
        }
    }
}

/// Gate keyword lists and score weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingPolicy {
    pub weights: RankingWeights,
    /// Lower-case markers of which a legal name must contain at least one
    pub entity_keywords: Vec<String>,
    /// Lower-case unrelated-business markers
    pub noise_keywords: Vec<String>,
    /// Common words a noisy legal name needs to survive the noise gate
    pub noise_min_common_words: usize,
}

impl Default for RankingPolicy {
    fn default() -> Self {
        Self {
            weights: RankingWeights::default(),
            entity_keywords: ENTITY_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            noise_keywords: NOISE_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            noise_min_common_words: 2,
        }
    }
}

impl RankingPolicy {
    /// Load a policy from YAML; fields left out keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::PolicyIo {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|source| ConfigError::PolicyParse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    pub fn with_weights(mut self, weights: RankingWeights) -> Self {
        self.weights = weights;
        self
    }
}

// =============================================================================
// Verdicts
// =============================================================================

/// The gate a candidate failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gate {
    /// No company marker in the legal name
    EntityType,
    /// No word in common with the merchant name
    NoCommonWords,
    /// Unrelated business keyword with too little overlap
    UnrelatedBusiness,
}

impl std::fmt::Display for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EntityType => write!(f, "entity-type"),
            Self::NoCommonWords => write!(f, "no-common-words"),
            Self::UnrelatedBusiness => write!(f, "unrelated-business"),
        }
    }
}

/// Outcome of evaluating one candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Scored { score: f64, common_words: usize },
    Rejected { gate: Gate },
}

impl Verdict {
    pub fn score(&self) -> Option<f64> {
        match self {
            Self::Scored { score, .. } => Some(*score),
            Self::Rejected { .. } => None,
        }
    }
}

/// A candidate with its verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    #[serde(flatten)]
    pub verdict: Verdict,
}

// =============================================================================
// Ranker
// =============================================================================

/// Merchant name prepared once per ranking call
struct Query {
    text: String,
    words: HashSet<String>,
}

impl Query {
    fn new(input: &str) -> Self {
        let text = normalize(input);
        let words = text.split_whitespace().map(str::to_string).collect();
        Self { text, words }
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Scores and selects registry candidates
#[derive(Debug, Clone, Default)]
pub struct CandidateRanker {
    policy: RankingPolicy,
}

impl CandidateRanker {
    pub fn new(policy: RankingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RankingPolicy {
        &self.policy
    }

    /// Evaluate every candidate against `input`, in candidate order
    pub fn score(&self, input: &str, candidates: &[Candidate]) -> Vec<ScoredCandidate> {
        let query = Query::new(input);

        candidates
            .iter()
            .map(|candidate| {
                let verdict = self.evaluate(&query, candidate);
                tracing::debug!(
                    input,
                    abn = %candidate.identifier,
                    legal_name = %candidate.legal_name,
                    ?verdict,
                    "candidate evaluated"
                );
                ScoredCandidate {
                    candidate: candidate.clone(),
                    verdict,
                }
            })
            .collect()
    }

    /// Select the best candidate for `input`, or `None` if every candidate is gated out
    pub fn rank(&self, input: &str, candidates: &[Candidate]) -> Option<Candidate> {
        let mut best: Option<(f64, ScoredCandidate)> = None;

        for scored in self.score(input, candidates) {
            let Some(score) = scored.verdict.score() else {
                continue;
            };
            // Strictly greater: the earliest candidate keeps a tie
            let better = best
                .as_ref()
                .map_or(true, |(best_score, _)| score > *best_score);
            if better {
                best = Some((score, scored));
            }
        }

        best.map(|(_, scored)| scored.candidate)
    }

    fn evaluate(&self, query: &Query, candidate: &Candidate) -> Verdict {
        let name = normalize(&candidate.legal_name);

        if !contains_any(&name, &self.policy.entity_keywords) {
            return Verdict::Rejected {
                gate: Gate::EntityType,
            };
        }

        let name_words: HashSet<&str> = name.split_whitespace().collect();
        let common_words = query
            .words
            .iter()
            .filter(|w| name_words.contains(w.as_str()))
            .count();
        if common_words == 0 {
            return Verdict::Rejected {
                gate: Gate::NoCommonWords,
            };
        }

        if contains_any(&name, &self.policy.noise_keywords)
            && common_words < self.policy.noise_min_common_words
        {
            return Verdict::Rejected {
                gate: Gate::UnrelatedBusiness,
            };
        }

        let weights = &self.policy.weights;
        let mut score = weights.per_common_word * common_words as f64;
        if query.text == name {
            score += weights.exact_match;
        }
        if query.text.contains(&name) || name.contains(&query.text) {
            score += weights.contains;
        }
        score += candidate
            .match_score
            .unwrap_or(weights.default_registry_score);

        Verdict::Scored {
            score,
            common_words,
        }
    }
}

fn contains_any(haystack: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| haystack.contains(k.as_str()))
}
