//! Two-stage merchant resolution
//!
//! ```text
//! Search ──(no candidate)──────────────────────────────► Done(None)
//!   │
//!   └─(best candidate)──► Verify ──(same ABN found)────► Done(fresh)
//!                            │
//!                            └──(missing / failed)─────► Done(stage 1)
//! ```
//!
//! Search queries the register with the merchant name and ranks what comes
//! back. Verify searches again with the selected candidate's legal name and
//! looks for the same ABN, picking up the register's fresher view of it.
//! Verify can only confirm or refresh the Search result, never discard it.

use std::sync::Arc;

use crate::error::RegistryError;
use crate::extract::extract;
use crate::rank::{CandidateRanker, RankingPolicy, ScoredCandidate};
use crate::registry::RegistryQuery;
use crate::types::{Candidate, ResolvedIdentity};

/// Resolution progress
#[derive(Debug)]
enum Stage {
    Search,
    Verify(Candidate),
    Done(Option<Candidate>),
}

/// Resolves merchant names against a business register
#[derive(Clone)]
pub struct Resolver {
    registry: Arc<dyn RegistryQuery>,
    ranker: CandidateRanker,
    verify: bool,
}

impl Resolver {
    /// Create a resolver with verification enabled
    pub fn new(registry: Arc<dyn RegistryQuery>, policy: RankingPolicy) -> Self {
        Self {
            registry,
            ranker: CandidateRanker::new(policy),
            verify: true,
        }
    }

    /// Enable or disable the verification search
    pub fn with_verification(mut self, enabled: bool) -> Self {
        self.verify = enabled;
        self
    }

    pub fn ranker(&self) -> &CandidateRanker {
        &self.ranker
    }

    /// Resolve `name`, folding every failure into "no match"
    pub async fn resolve(&self, name: &str) -> Option<ResolvedIdentity> {
        match self.try_resolve(name).await {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!(name, error = %e, "Registry search failed; treating as no match");
                None
            }
        }
    }

    /// Resolve `name`, reporting a failed initial search as an error
    ///
    /// `Ok(None)` means the register answered and nothing qualified.
    /// Verification failures never surface here.
    pub async fn try_resolve(
        &self,
        name: &str,
    ) -> Result<Option<ResolvedIdentity>, RegistryError> {
        let mut stage = Stage::Search;

        loop {
            stage = match stage {
                Stage::Search => {
                    let candidates = self.search(name).await?;
                    match self.ranker.rank(name, &candidates) {
                        Some(best) if self.verify && !best.legal_name.is_empty() => {
                            Stage::Verify(best)
                        }
                        selected => Stage::Done(selected),
                    }
                }
                Stage::Verify(selected) => {
                    Stage::Done(Some(self.verify_selection(selected).await))
                }
                Stage::Done(selected) => {
                    match &selected {
                        Some(c) => tracing::info!(
                            name,
                            abn = %c.identifier,
                            legal_name = %c.legal_name,
                            state = %c.jurisdiction,
                            "Merchant resolved"
                        ),
                        None => tracing::info!(name, "No registry match"),
                    }
                    return Ok(selected.map(ResolvedIdentity::from));
                }
            };
        }
    }

    /// Stage-1 candidates for `name` with their ranking verdicts
    ///
    /// Diagnostic view; it queries the register directly.
    pub async fn candidates(&self, name: &str) -> Result<Vec<ScoredCandidate>, RegistryError> {
        let candidates = self.search(name).await?;
        Ok(self.ranker.score(name, &candidates))
    }

    async fn search(&self, name: &str) -> Result<Vec<Candidate>, RegistryError> {
        let records = self.registry.search_by_name(name).await?;
        Ok(extract(&records))
    }

    /// Re-search by legal name and swap in the matching ABN's fresher record
    async fn verify_selection(&self, selected: Candidate) -> Candidate {
        let candidates = match self.search(&selected.legal_name).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!(
                    legal_name = %selected.legal_name,
                    error = %e,
                    "Verification search failed; keeping initial match"
                );
                return selected;
            }
        };

        match candidates
            .into_iter()
            .find(|c| c.identifier == selected.identifier)
        {
            Some(confirmed) => {
                tracing::debug!(abn = %confirmed.identifier, "Verification confirmed ABN");
                confirmed
            }
            None => {
                tracing::debug!(
                    abn = %selected.identifier,
                    "ABN absent from verification search; keeping initial match"
                );
                selected
            }
        }
    }
}
