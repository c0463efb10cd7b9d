//! Merchant Resolver - ABN resolution for bank-transaction merchant names
//!
//! Turns a free-text merchant name ("Apple", "Uber Eats") into the business
//! identity registered with the Australian Business Register: ABN, legal name
//! and state.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Callers: merchant_batch (CSV), merchant_server (HTTP API)      │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     LookupCache                                 │
//! │        normalized name -> settled | in-flight resolution        │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Resolver                                   │
//! │     Search -> Verify -> Done  (extract, rank, re-verify)        │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   RegistryQuery                                 │
//! │             AbrClient (HTTP + XML decode)                       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use merchant_resolver::{AbrClient, LookupCache, Resolver, ResolverConfig};
//!
//! let config = ResolverConfig::from_env()?;
//! let client = AbrClient::new(&config)?;
//! let resolver = Resolver::new(Arc::new(client), config.ranking_policy()?)
//!     .with_verification(config.enable_verification);
//! let cache = LookupCache::new(resolver);
//!
//! if let Some(identity) = cache.resolve("Apple").await {
//!     println!("{} {}", identity.identifier, identity.legal_name);
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod rank;
pub mod registry;
pub mod report;
pub mod resolver;
pub mod types;

#[cfg(feature = "server")]
pub mod api;

// Re-export main types
pub use cache::LookupCache;
pub use config::{default_merchants, ResolverConfig};
pub use error::{ConfigError, RegistryError, ReportError};
pub use extract::extract;
pub use rank::{CandidateRanker, Gate, RankingPolicy, RankingWeights, ScoredCandidate, Verdict};
pub use registry::{AbrClient, NameField, RawRegistryRecord, RegistryQuery};
pub use report::{MerchantRow, ResultsStore, Summary};
pub use resolver::Resolver;
pub use types::{Candidate, ResolvedIdentity};
