use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use strum::{AsRefStr, Display, EnumString};

use crate::error::{Result, SymptomixError};

/// Backend the client talks to when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8080";

/// What a submission does while another exchange is outstanding.
#[derive(
    Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq, Display, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum InFlightPolicy {
    /// Run overlapping exchanges side by side, each with its own placeholder.
    #[default]
    Concurrent,
    /// Refuse new submissions until the outstanding exchange finishes.
    Reject,
}

/// Client configuration, as read from `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the backend (`/get` and `/reset` are appended).
    pub endpoint: String,
    /// Fixed session id; a fresh one is generated when absent.
    pub session_id: Option<String>,
    /// Per-request timeout in seconds; no timeout when absent.
    pub request_timeout_secs: Option<u64>,
    pub in_flight_policy: InFlightPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            session_id: None,
            request_timeout_secs: None,
            in_flight_policy: InFlightPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Parses a TOML document, filling unspecified fields with defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the endpoint and timeout.
    pub fn validate(&self) -> Result<()> {
        let endpoint = self.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(SymptomixError::config(format!(
                "endpoint must be an http(s) URL, got '{}'",
                self.endpoint
            )));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(SymptomixError::config(
                "request_timeout_secs must be greater than zero",
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Endpoint without a trailing slash, ready for path joining.
    pub fn base_url(&self) -> &str {
        self.endpoint.trim().trim_end_matches('/')
    }
}

impl InFlightPolicy {
    /// Parses a policy name as used on the command line and in the environment.
    pub fn parse(value: &str) -> Result<Self> {
        Self::from_str(value.trim()).map_err(|_| {
            SymptomixError::config(format!(
                "unknown in-flight policy '{value}' (expected 'concurrent' or 'reject')"
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = ClientConfig::from_toml_str("").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.base_url(), DEFAULT_ENDPOINT);
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_full_document() {
        let config = ClientConfig::from_toml_str(
            r#"
endpoint = "https://chat.example.com/"
session_id = "user123"
request_timeout_secs = 20
in_flight_policy = "reject"
"#,
        )
        .unwrap();
        assert_eq!(config.base_url(), "https://chat.example.com");
        assert_eq!(config.session_id.as_deref(), Some("user123"));
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(20)));
        assert_eq!(config.in_flight_policy, InFlightPolicy::Reject);
    }

    #[test]
    fn test_rejects_non_http_endpoint() {
        let err = ClientConfig::from_toml_str(r#"endpoint = "ftp://host""#).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let err = ClientConfig::from_toml_str("request_timeout_secs = 0").unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(InFlightPolicy::parse("Reject").unwrap(), InFlightPolicy::Reject);
        assert_eq!(
            InFlightPolicy::parse(" concurrent ").unwrap(),
            InFlightPolicy::Concurrent
        );
        assert!(InFlightPolicy::parse("queue").unwrap_err().is_config());
    }
}
