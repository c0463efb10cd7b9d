//! ABR API Client
//!
//! HTTP client for the Australian Business Register name search.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::decode::decode_search_results;
use super::{RawRegistryRecord, RegistryQuery};
use crate::config::ResolverConfig;
use crate::error::RegistryError;

/// States searched on every request
const STATE_FILTERS: &[&str] = &["NSW", "VIC", "QLD", "WA", "SA", "NT", "ACT", "TAS"];

/// ABR name-search client
pub struct AbrClient {
    http: Client,
    endpoint: String,
    guid: String,
}

impl AbrClient {
    /// Create a client from resolver configuration
    pub fn new(config: &ResolverConfig) -> Result<Self, RegistryError> {
        Self::with_endpoint(
            config.abr_guid.clone(),
            config.abr_endpoint.clone(),
            config.timeout,
        )
    }

    /// Create a client against a specific endpoint
    pub fn with_endpoint(
        guid: String,
        endpoint: String,
        timeout: Duration,
    ) -> Result<Self, RegistryError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            endpoint,
            guid,
        })
    }

    /// Query parameters for a name search
    fn search_params<'a>(&'a self, name: &'a str) -> Vec<(&'a str, &'a str)> {
        let mut params = vec![
            ("name", name),
            ("postcode", ""),
            ("legalName", "Y"),
            ("tradingName", "Y"),
        ];
        params.extend(STATE_FILTERS.iter().map(|state| (*state, "Y")));
        params.push(("authenticationGuid", self.guid.as_str()));
        params
    }

    /// Fetch the raw XML body for a name search
    pub async fn search_xml(&self, name: &str) -> Result<String, RegistryError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&self.search_params(name))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RegistryError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl RegistryQuery for AbrClient {
    async fn search_by_name(&self, name: &str) -> Result<Vec<RawRegistryRecord>, RegistryError> {
        let xml = self.search_xml(name).await?;
        let records = decode_search_results(&xml)?;

        tracing::debug!(name, records = records.len(), "ABR name search");

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> AbrClient {
        AbrClient::with_endpoint(
            "test-guid".to_string(),
            "http://localhost:9/abr".to_string(),
            Duration::from_millis(200),
        )
        .unwrap()
    }

    #[test]
    fn test_search_params() {
        let client = client();
        let params = client.search_params("Uber Eats");

        assert_eq!(params[0], ("name", "Uber Eats"));
        assert!(params.contains(&("legalName", "Y")));
        assert!(params.contains(&("TAS", "Y")));
        assert_eq!(params.last(), Some(&("authenticationGuid", "test-guid")));
        assert_eq!(params.len(), 4 + STATE_FILTERS.len() + 1);
    }

    #[tokio::test]
    async fn test_unreachable_registry_is_transport_error() {
        let err = client().search_by_name("Apple").await.unwrap_err();
        assert!(err.is_transport());
    }
}
