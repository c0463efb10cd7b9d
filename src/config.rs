//! Resolver configuration
//!
//! Read from the process environment (after loading `.env` when present).

use std::time::Duration;

use crate::error::ConfigError;
use crate::rank::RankingPolicy;

/// ABR advanced name search, simple-protocol endpoint
pub const DEFAULT_ABR_ENDPOINT: &str = "https://abr.business.gov.au/abrxmlsearch/AbrXmlSearch.asmx/ABRSearchByNameAdvancedSimpleProtocol2017";

const DEFAULT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_OUTPUT_FILE: &str = "enriched_merchants.csv";
const DEFAULT_SERVER_PORT: u16 = 8080;

/// Merchants resolved by the batch driver when no input file is given
const DEFAULT_MERCHANTS: &[&str] = &[
    "Afterpay",
    "Woolworths",
    "McDonald's",
    "Coles",
    "Apple",
    "Uber Eats",
    "Uber",
    "7-Eleven",
    "Kmart",
    "IGA",
    "KFC",
    "DoorDash",
    "Sportsbet",
    "ATM Cash Out",
    "Ampol",
    "ALDI",
    "PayPal",
    "BP",
    "Transport for NSW",
    "ATM Operator Fee",
    "Zip",
    "Hungry Jack's",
    "Amazon",
    "Chemist Warehouse",
    "Bunnings Warehouse",
    "Saved Up",
    "DiDi",
    "Big W",
    "Optus",
    "Reddy Express",
    "Linkt",
    "Spotify",
    "BWS",
    "Guzman y Gomez",
    "Google Play",
    "EG Ampol",
];

/// The built-in merchant list
pub fn default_merchants() -> Vec<String> {
    DEFAULT_MERCHANTS.iter().map(|m| m.to_string()).collect()
}

/// Runtime settings shared by the batch driver and the API server
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub abr_guid: String,
    pub abr_endpoint: String,
    pub timeout: Duration,
    pub enable_verification: bool,
    pub output_file: String,
    pub results_file: String,
    pub server_port: u16,
    pub ranking_policy_path: Option<String>,
}

impl ResolverConfig {
    /// Load from the environment, reading `.env` first if one exists
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let abr_guid = get("ABR_GUID").ok_or(ConfigError::Missing("ABR_GUID"))?;

        let abr_endpoint = get("ABR_ENDPOINT").unwrap_or_else(|| DEFAULT_ABR_ENDPOINT.to_string());
        if url::Url::parse(&abr_endpoint).is_err() {
            return Err(ConfigError::Invalid {
                var: "ABR_ENDPOINT",
                value: abr_endpoint,
            });
        }

        let timeout_secs = match get("TIMEOUT") {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => return Err(ConfigError::Invalid { var: "TIMEOUT", value }),
            },
            None => DEFAULT_TIMEOUT_SECS,
        };

        let server_port = match get("SERVER_PORT") {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::Invalid {
                var: "SERVER_PORT",
                value,
            })?,
            None => DEFAULT_SERVER_PORT,
        };

        let enable_verification = get("ENABLE_VERIFICATION")
            .map(|v| !v.eq_ignore_ascii_case("false"))
            .unwrap_or(true);

        let output_file = get("OUTPUT_FILE").unwrap_or_else(|| DEFAULT_OUTPUT_FILE.to_string());
        let results_file = get("RESULTS_FILE").unwrap_or_else(|| output_file.clone());

        Ok(Self {
            abr_guid,
            abr_endpoint,
            timeout: Duration::from_secs(timeout_secs),
            enable_verification,
            output_file,
            results_file,
            server_port,
            ranking_policy_path: get("RANKING_POLICY"),
        })
    }

    /// The configured ranking policy, or the default one
    pub fn ranking_policy(&self) -> Result<RankingPolicy, ConfigError> {
        match &self.ranking_policy_path {
            Some(path) => RankingPolicy::from_file(path),
            None => Ok(RankingPolicy::default()),
        }
    }
}
