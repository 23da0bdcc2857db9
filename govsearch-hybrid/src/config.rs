//! Client configuration with sensible defaults.
//!
//! [`ClientConfig`] names the primary service endpoint, the local fallback
//! endpoint, and request timeouts.

use std::time::Duration;

use url::Url;

use crate::error::ClientError;

/// Address of a locally running search service.
pub const DEFAULT_FALLBACK_URL: &str = "http://localhost:8000";

/// Timeout for the reachability probe against the primary endpoint.
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 3;

/// Configuration for the search/chat API client.
///
/// Use [`Default::default()`] for a local setup, or override `base_url`
/// to point at a deployed service.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Primary service endpoint. Every call goes here until it proves unreachable.
    pub base_url: String,
    /// Local endpoint used once the primary has failed.
    pub fallback_url: String,
    /// Per-request timeout in seconds. Chat calls can be slow, so keep this generous.
    pub timeout_seconds: u64,
    /// Timeout for the health probe in seconds.
    pub probe_timeout_seconds: u64,
    /// Custom User-Agent string. Defaults to `govsearch/<version>`.
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_FALLBACK_URL.to_owned(),
            fallback_url: DEFAULT_FALLBACK_URL.to_owned(),
            timeout_seconds: 30,
            probe_timeout_seconds: DEFAULT_PROBE_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

impl ClientConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `base_url` and `fallback_url` parse as `http`/`https` URLs
    /// - `timeout_seconds` must be greater than 0
    /// - `probe_timeout_seconds` must be greater than 0
    pub fn validate(&self) -> Result<(), ClientError> {
        parse_endpoint("base_url", &self.base_url)?;
        parse_endpoint("fallback_url", &self.fallback_url)?;
        if self.timeout_seconds == 0 {
            return Err(ClientError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.probe_timeout_seconds == 0 {
            return Err(ClientError::Config(
                "probe_timeout_seconds must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Parsed primary endpoint.
    pub fn primary_url(&self) -> Result<Url, ClientError> {
        parse_endpoint("base_url", &self.base_url)
    }

    /// Parsed fallback endpoint.
    pub fn fallback_url(&self) -> Result<Url, ClientError> {
        parse_endpoint("fallback_url", &self.fallback_url)
    }

    /// Probe timeout as a [`Duration`].
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_seconds)
    }
}

fn parse_endpoint(field: &str, raw: &str) -> Result<Url, ClientError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ClientError::Config(format!("{field} is not a valid URL: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ClientError::Config(format!(
            "{field} must use http or https, got {other}"
        ))),
    }
}
