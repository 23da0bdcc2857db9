//! # govsearch-hybrid
//!
//! Hybrid vector + knowledge-graph search for government data services.
//!
//! This crate is the client core behind the `govsearch` front-end. It talks to
//! a search/chat service that fronts a vector index, a knowledge graph and a
//! hosted language model, and it owns the logic that sits between those
//! systems and the user:
//!
//! - [`normalize`] turns loosely shaped result records into [`SearchResult`]s
//! - [`merge`] combines vector and graph rankings (weighted, interleave, separate)
//! - [`endpoint`] switches a session from the primary endpoint to a local
//!   fallback, once and for good, when the primary stops answering
//! - [`client`] is the typed HTTP client; [`router`] picks a mode and dispatches
//!
//! ## Security
//!
//! - No credentials are handled here; the service holds them
//! - Queries and chat messages are logged only at trace level
//! - Error messages never include request bodies

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod merge;
pub mod normalize;
pub mod router;
pub mod types;

pub use client::{ApiClient, SearchApi};
pub use config::ClientConfig;
pub use endpoint::{EndpointResolver, EndpointState};
pub use error::{ClientError, Result};
pub use router::{HybridExecution, SearchOutcome};
pub use types::{
    ChatMessage, ChatRole, GraphHit, GraphMatch, HealthStatus, MergeMethod, MergedResult,
    PrimaryScore, SearchCapabilities, SearchMode, SearchParams, SearchResult, VectorHit,
};

/// Run a hybrid search against the service described by `config`.
///
/// Probes the primary endpoint first, so an unreachable deployment falls
/// back to the local service before the query is sent.
///
/// # Errors
///
/// Returns [`ClientError::InvalidQuery`] or [`ClientError::Config`] for bad
/// input, and the request error if the search itself failed on both
/// endpoints.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> govsearch_hybrid::Result<()> {
/// let config = govsearch_hybrid::ClientConfig::default();
/// let params = govsearch_hybrid::SearchParams::new("unemployment statistics by state");
/// let results = govsearch_hybrid::hybrid_search(&params, &config).await?;
/// for merged in &results {
///     println!("{} [{}]", merged.result.title(), merged.primary_score().badge());
/// }
/// # Ok(())
/// # }
/// ```
pub async fn hybrid_search(params: &SearchParams, config: &ClientConfig) -> Result<Vec<MergedResult>> {
    params.validate()?;
    let client = ApiClient::new(config)?;
    client.probe().await;
    client.hybrid_search(params).await
}
