//! Shared HTTP client construction and endpoint URL joining.

use std::time::Duration;

use url::Url;

use crate::config::ClientConfig;
use crate::error::ClientError;

/// Build a [`reqwest::Client`] configured for the search/chat service.
///
/// The client has:
/// - Timeout from config
/// - `govsearch/<version>` User-Agent (or custom if configured)
/// - gzip decompression
///
/// # Errors
///
/// Returns [`ClientError::Config`] if the client cannot be constructed.
pub fn build_client(config: &ClientConfig) -> Result<reqwest::Client, ClientError> {
    let ua = match config.user_agent {
        Some(ref custom) => custom.clone(),
        None => default_user_agent(),
    };

    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(ua)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))
}

/// The User-Agent sent when none is configured.
pub fn default_user_agent() -> String {
    format!("govsearch/{}", env!("CARGO_PKG_VERSION"))
}

/// Join an API path onto a base URL, keeping any path prefix on the base.
///
/// Deployed services often live under a stage prefix (`https://host/dev`),
/// which [`Url::join`] would drop without a trailing slash.
pub fn endpoint_url(base: &Url, path: &str) -> Result<Url, ClientError> {
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|e| ClientError::Config(format!("invalid endpoint URL: {e}")))
}

/// Map a transport-level [`reqwest::Error`] into a [`ClientError`].
///
/// Timeouts become [`ClientError::Timeout`]; everything else that happens
/// before a status line arrives is a [`ClientError::Connect`].
pub(crate) fn transport_error(what: &str, err: &reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::Timeout(format!("{what}: {err}"))
    } else {
        ClientError::Connect(format!("{what}: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_client_with_default_config() {
        let config = ClientConfig::default();
        assert!(build_client(&config).is_ok());
    }

    #[test]
    fn build_client_with_custom_ua() {
        let config = ClientConfig {
            user_agent: Some("CustomBot/1.0".into()),
            ..Default::default()
        };
        assert!(build_client(&config).is_ok());
    }

    #[test]
    fn default_user_agent_names_crate() {
        assert!(default_user_agent().starts_with("govsearch/"));
    }

    #[test]
    fn endpoint_url_keeps_stage_prefix() {
        let base = Url::parse("https://api.example.gov/dev").expect("parse");
        let url = endpoint_url(&base, "/api/search").expect("join");
        assert_eq!(url.as_str(), "https://api.example.gov/dev/api/search");
    }

    #[test]
    fn endpoint_url_handles_trailing_slash() {
        let base = Url::parse("http://localhost:8000/").expect("parse");
        let url = endpoint_url(&base, "api/health").expect("join");
        assert_eq!(url.as_str(), "http://localhost:8000/api/health");
    }
}
