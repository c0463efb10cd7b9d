//! Business register access
//!
//! This module provides:
//! - The `RegistryQuery` trait the resolver searches through
//! - Raw record types as the register returns them
//! - `AbrClient`, the HTTP implementation against the ABR name search
//! - The XML decoder for ABR search payloads

pub mod client;
pub mod decode;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

pub use client::AbrClient;
pub use decode::decode_search_results;

/// An organisation name with the register's match score for it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameField {
    pub organisation_name: String,
    /// Score text as returned (normally "0".."100"); `None` when the element is absent
    pub score: Option<String>,
}

/// One `searchResultsRecord` from a name search, undecided and unvalidated
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRegistryRecord {
    /// `ABN/identifierValue`
    pub identifier_value: String,
    /// `ABN/identifierStatus` ("Active", "Cancelled", ...)
    pub identifier_status: String,
    /// `mainBusinessPhysicalAddress/stateCode`
    pub state_code: String,
    pub business_name: NameField,
    pub main_name: NameField,
    pub main_trading_name: NameField,
}

/// Name search against a business register
///
/// Implementations must be Send + Sync for use in async contexts. Transport,
/// authentication and timeouts belong to the implementation; callers only see
/// records or an error.
#[async_trait]
pub trait RegistryQuery: Send + Sync {
    /// Search the register for entities matching `name`
    ///
    /// Returns records in the order the register listed them.
    async fn search_by_name(&self, name: &str) -> Result<Vec<RawRegistryRecord>, RegistryError>;
}
