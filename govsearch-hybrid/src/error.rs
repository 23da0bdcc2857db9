//! Error types for the govsearch-hybrid crate.
//!
//! Messages are stable and safe to show to users. Request bodies and
//! query text never appear in error messages.

/// Errors that can occur while talking to the search/chat service.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The service could not be reached (connection refused, DNS, TLS, reset).
    #[error("connection error: {0}")]
    Connect(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The service answered with a non-success HTTP status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code returned by the service.
        status: u16,
        /// Response body or reason phrase, truncated.
        message: String,
    },

    /// The response body was not the JSON shape we expected.
    #[error("decode error: {0}")]
    Decode(String),

    /// Invalid client or search configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The search query was rejected before any request was sent.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl ClientError {
    /// Returns `true` for failures that mean the endpoint itself is unreachable.
    ///
    /// Only these trigger the switch to the local fallback endpoint. An HTTP
    /// error status proves the endpoint is up, so it is not counted.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connect(_) | Self::Timeout(_))
    }
}

/// Convenience type alias for govsearch-hybrid results.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_connect() {
        let err = ClientError::Connect("connection refused".into());
        assert_eq!(err.to_string(), "connection error: connection refused");
    }

    #[test]
    fn display_timeout() {
        let err = ClientError::Timeout("exceeded 3s probe".into());
        assert_eq!(err.to_string(), "request timed out: exceeded 3s probe");
    }

    #[test]
    fn display_status() {
        let err = ClientError::Status {
            status: 503,
            message: "Search engine is not available".into(),
        };
        assert_eq!(err.to_string(), "HTTP 503: Search engine is not available");
    }

    #[test]
    fn display_decode() {
        let err = ClientError::Decode("expected array".into());
        assert_eq!(err.to_string(), "decode error: expected array");
    }

    #[test]
    fn display_config_and_query() {
        assert_eq!(
            ClientError::Config("limit must be greater than 0".into()).to_string(),
            "config error: limit must be greater than 0"
        );
        assert_eq!(
            ClientError::InvalidQuery("query is empty".into()).to_string(),
            "invalid query: query is empty"
        );
    }

    #[test]
    fn connectivity_classification() {
        assert!(ClientError::Connect("refused".into()).is_connectivity());
        assert!(ClientError::Timeout("slow".into()).is_connectivity());
        assert!(!ClientError::Status {
            status: 500,
            message: "boom".into()
        }
        .is_connectivity());
        assert!(!ClientError::Decode("bad json".into()).is_connectivity());
        assert!(!ClientError::Config("bad".into()).is_connectivity());
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ClientError>();
    }
}
