//! Sticky primary → local fallback endpoint selection.
//!
//! Every outbound call goes to the primary endpoint until it proves
//! unreachable, either through a failed health probe or a connectivity
//! failure on a real call. From then on the session uses the local fallback
//! endpoint and never switches back.
//!
//! # State Machine
//!
//! ```text
//! ┌─────────┐  probe fails / call cannot connect  ┌──────────┐
//! │ Primary ├────────────────────────────────────►│ Fallback │
//! └─────────┘                                     └──────────┘
//!   (starts in Fallback when the primary is the fallback address)
//! ```
//!
//! The state lives in the resolver instance, so independent sessions never
//! see each other's fallback decision.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use url::Url;

use crate::config::{ClientConfig, DEFAULT_PROBE_TIMEOUT_SECS};
use crate::error::ClientError;
use crate::http::endpoint_url;

/// Path probed to decide whether the primary endpoint is reachable.
pub const HEALTH_PATH: &str = "/api/health";

/// Which endpoint the resolver currently routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointState {
    /// The configured primary endpoint.
    Primary,
    /// The local fallback endpoint. Terminal.
    Fallback,
}

/// Routes calls to the primary endpoint or, once it has failed, to the
/// local fallback.
#[derive(Debug)]
pub struct EndpointResolver {
    primary: Url,
    fallback: Url,
    on_fallback: AtomicBool,
    probe_timeout: Duration,
}

impl EndpointResolver {
    /// Create a resolver for the given endpoints.
    ///
    /// Starts in [`EndpointState::Fallback`] when `primary` is already the
    /// local address.
    pub fn new(primary: Url, fallback: Url) -> Self {
        let starts_local = is_local(&primary, &fallback);
        if starts_local {
            tracing::debug!(%primary, "primary endpoint is local, starting on fallback");
        }
        Self {
            primary,
            fallback,
            on_fallback: AtomicBool::new(starts_local),
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
        }
    }

    /// Create a resolver from a validated [`ClientConfig`].
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Ok(Self::new(config.primary_url()?, config.fallback_url()?)
            .with_probe_timeout(config.probe_timeout()))
    }

    /// Override the health probe timeout.
    pub fn with_probe_timeout(mut self, probe_timeout: Duration) -> Self {
        self.probe_timeout = probe_timeout;
        self
    }

    /// Current routing state.
    pub fn state(&self) -> EndpointState {
        if self.on_fallback.load(Ordering::Acquire) {
            EndpointState::Fallback
        } else {
            EndpointState::Primary
        }
    }

    /// `true` once the session has switched to the fallback endpoint.
    pub fn is_fallback(&self) -> bool {
        self.state() == EndpointState::Fallback
    }

    /// The endpoint the next call will use.
    pub fn current(&self) -> &Url {
        match self.state() {
            EndpointState::Primary => &self.primary,
            EndpointState::Fallback => &self.fallback,
        }
    }

    /// The configured primary endpoint.
    pub fn primary(&self) -> &Url {
        &self.primary
    }

    /// The local fallback endpoint.
    pub fn fallback(&self) -> &Url {
        &self.fallback
    }

    /// Switch to the fallback endpoint for the rest of the session.
    ///
    /// Returns `true` if this call made the transition and `false` if the
    /// resolver was already on the fallback. Concurrent callers may race
    /// here; exactly one of them observes `true`.
    pub fn switch_to_fallback(&self, reason: &str) -> bool {
        let switched = !self.on_fallback.swap(true, Ordering::AcqRel);
        if switched {
            tracing::info!(
                primary = %self.primary,
                fallback = %self.fallback,
                reason,
                "primary endpoint unreachable, switching to local fallback"
            );
        }
        switched
    }

    /// Check that the primary endpoint answers its health check.
    ///
    /// A request error, a non-success status, or no answer within the probe
    /// timeout switches the resolver to the fallback. Does nothing once on
    /// the fallback.
    pub async fn probe(&self, client: &reqwest::Client) -> EndpointState {
        if self.is_fallback() {
            return EndpointState::Fallback;
        }

        let url = match endpoint_url(&self.primary, HEALTH_PATH) {
            Ok(url) => url,
            Err(err) => {
                self.switch_to_fallback(&err.to_string());
                return self.state();
            }
        };

        tracing::debug!(%url, timeout = ?self.probe_timeout, "probing primary endpoint");

        let outcome = tokio::time::timeout(
            self.probe_timeout,
            client.get(url).timeout(self.probe_timeout).send(),
        )
        .await;

        match outcome {
            Ok(Ok(response)) if response.status().is_success() => {
                tracing::debug!("primary endpoint healthy");
            }
            Ok(Ok(response)) => {
                self.switch_to_fallback(&format!("health check returned {}", response.status()));
            }
            Ok(Err(err)) => {
                self.switch_to_fallback(&format!("health check failed: {err}"));
            }
            Err(_) => {
                self.switch_to_fallback(&format!(
                    "health check timed out after {}s",
                    self.probe_timeout.as_secs_f32()
                ));
            }
        }

        self.state()
    }

    /// Run `call` against the current endpoint, falling back once if needed.
    ///
    /// `call` receives the base URL to use. If it fails against the primary
    /// with a connectivity error, the resolver switches to the fallback and
    /// retries immediately. If the retry fails too, the **original** primary
    /// error is returned. Other errors (HTTP status, decode) are returned
    /// as-is without switching.
    pub async fn execute<T, F, Fut>(&self, mut call: F) -> Result<T, ClientError>
    where
        F: FnMut(Url) -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        if self.is_fallback() {
            return call(self.fallback.clone()).await;
        }

        match call(self.primary.clone()).await {
            Ok(value) => Ok(value),
            Err(err) if err.is_connectivity() => {
                self.switch_to_fallback(&err.to_string());
                match call(self.fallback.clone()).await {
                    Ok(value) => Ok(value),
                    Err(retry_err) => {
                        tracing::warn!(
                            error = %err,
                            retry_error = %retry_err,
                            "primary and fallback endpoints both failed"
                        );
                        Err(err)
                    }
                }
            }
            Err(err) => Err(err),
        }
    }
}

/// `true` when `primary` already denotes the local fallback address.
///
/// Loopback spellings (`localhost`, `127.0.0.1`, `::1`) on the same port
/// count as the same address.
fn is_local(primary: &Url, fallback: &Url) -> bool {
    if primary.origin() == fallback.origin() {
        return true;
    }
    is_loopback(primary)
        && is_loopback(fallback)
        && primary.port_or_known_default() == fallback.port_or_known_default()
}

fn is_loopback(url: &Url) -> bool {
    matches!(
        url.host_str(),
        Some("localhost" | "127.0.0.1" | "[::1]" | "::1")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn url(raw: &str) -> Url {
        Url::parse(raw).expect("valid test URL")
    }

    fn remote_resolver() -> EndpointResolver {
        EndpointResolver::new(
            url("https://api.example.gov/dev"),
            url("http://localhost:8000"),
        )
    }

    #[test]
    fn remote_primary_starts_on_primary() {
        let resolver = remote_resolver();
        assert_eq!(resolver.state(), EndpointState::Primary);
        assert_eq!(resolver.current().as_str(), "https://api.example.gov/dev");
    }

    #[test]
    fn local_primary_starts_on_fallback() {
        let resolver = EndpointResolver::new(url("http://127.0.0.1:8000"), url("http://localhost:8000"));
        assert_eq!(resolver.state(), EndpointState::Fallback);

        let ipv6 = EndpointResolver::new(url("http://[::1]:8000/api"), url("http://localhost:8000"));
        assert!(ipv6.is_fallback());

        let same = EndpointResolver::new(url("http://localhost:8000/"), url("http://localhost:8000"));
        assert!(same.is_fallback());
    }

    #[test]
    fn other_local_port_is_a_distinct_primary() {
        let resolver = EndpointResolver::new(url("http://127.0.0.1:9000"), url("http://localhost:8000"));
        assert_eq!(resolver.state(), EndpointState::Primary);
    }

    #[test]
    fn switch_is_one_way_and_reported_once() {
        let resolver = remote_resolver();
        assert!(resolver.switch_to_fallback("test"));
        assert!(!resolver.switch_to_fallback("again"));
        assert_eq!(resolver.state(), EndpointState::Fallback);
        assert_eq!(resolver.current().as_str(), "http://localhost:8000/");
    }

    #[test]
    fn sessions_are_independent() {
        let a = remote_resolver();
        let b = remote_resolver();
        a.switch_to_fallback("a failed");
        assert!(a.is_fallback());
        assert!(!b.is_fallback());
    }

    #[tokio::test]
    async fn connectivity_failure_switches_and_retries_on_fallback() {
        let resolver = remote_resolver();
        let calls = AtomicUsize::new(0);

        let result = resolver
            .execute(|base| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if base.host_str() == Some("api.example.gov") {
                        Err(ClientError::Connect("refused".into()))
                    } else {
                        Ok(base.to_string())
                    }
                }
            })
            .await;

        assert_eq!(result.ok().as_deref(), Some("http://localhost:8000/"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(resolver.is_fallback());
    }

    #[tokio::test]
    async fn primary_never_targeted_after_fallback() {
        let resolver = remote_resolver();
        resolver.switch_to_fallback("probe failed");

        for _ in 0..3 {
            let target = resolver
                .execute(|base| async move { Ok::<_, ClientError>(base) })
                .await
                .expect("fallback call succeeds");
            assert_eq!(target.host_str(), Some("localhost"));
        }
    }

    #[tokio::test]
    async fn both_failing_surfaces_original_error() {
        let resolver = remote_resolver();
        let result: Result<(), ClientError> = resolver
            .execute(|base| async move {
                if base.host_str() == Some("api.example.gov") {
                    Err(ClientError::Timeout("primary slow".into()))
                } else {
                    Err(ClientError::Connect("fallback down".into()))
                }
            })
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, ClientError::Timeout(ref m) if m == "primary slow"));
        assert!(resolver.is_fallback());
    }

    #[tokio::test]
    async fn status_errors_do_not_switch() {
        let resolver = remote_resolver();
        let calls = AtomicUsize::new(0);
        let result: Result<(), ClientError> = resolver
            .execute(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(ClientError::Status {
                        status: 500,
                        message: "boom".into(),
                    })
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.state(), EndpointState::Primary);
    }

    #[tokio::test]
    async fn probe_against_unroutable_primary_switches() {
        // Port 9 on loopback-free TEST-NET address: nothing answers.
        let resolver = EndpointResolver::new(url("http://192.0.2.1:9"), url("http://localhost:8000"))
            .with_probe_timeout(Duration::from_millis(200));
        let client = reqwest::Client::new();
        let state = resolver.probe(&client).await;
        assert_eq!(state, EndpointState::Fallback);
    }

    #[tokio::test]
    async fn probe_is_noop_once_on_fallback() {
        let resolver = remote_resolver();
        resolver.switch_to_fallback("earlier failure");
        let client = reqwest::Client::new();
        assert_eq!(resolver.probe(&client).await, EndpointState::Fallback);
    }

    #[test]
    fn from_config_uses_configured_timeout() {
        let config = ClientConfig {
            base_url: "https://api.example.gov".into(),
            probe_timeout_seconds: 7,
            ..Default::default()
        };
        let resolver = EndpointResolver::from_config(&config).expect("valid config");
        assert_eq!(resolver.probe_timeout, Duration::from_secs(7));
        assert_eq!(resolver.state(), EndpointState::Primary);
    }
}
