//! Error types for the merchant resolver
//!
//! Registry failures are kept distinct from "no match" here so that callers
//! who need to can tell an unreachable registry from a genuine miss. The
//! public `resolve` paths still fold them into `None`.

use thiserror::Error;

/// Failures reaching or decoding the business register
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Registry request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Registry returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed registry response: {0}")]
    Decode(#[from] quick_xml::Error),

    #[error("Registry rejected the request: {0}")]
    Exception(String),
}

impl RegistryError {
    /// True for failures that say nothing about whether the name exists
    pub fn is_transport(&self) -> bool {
        matches!(self, RegistryError::Http(_) | RegistryError::Status { .. })
    }
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable {0} is not set")]
    Missing(&'static str),

    #[error("Invalid value for {var}: '{value}'")]
    Invalid { var: &'static str, value: String },

    #[error("Failed to read ranking policy {path}: {source}")]
    PolicyIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse ranking policy {path}: {source}")]
    PolicyParse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Batch result file errors
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        let status = RegistryError::Status {
            status: 503,
            body: "unavailable".to_string(),
        };
        assert!(status.is_transport());
        assert!(!RegistryError::Exception("bad guid".to_string()).is_transport());
    }

    #[test]
    fn test_error_messages() {
        let err = ConfigError::Invalid {
            var: "TIMEOUT",
            value: "soon".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid value for TIMEOUT: 'soon'");
        assert_eq!(
            ConfigError::Missing("ABR_GUID").to_string(),
            "Environment variable ABR_GUID is not set"
        );
    }
}
