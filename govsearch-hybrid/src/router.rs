//! Search routing: pick a mode, dispatch, and merge.
//!
//! Hybrid searches can run on the service (`/api/search`, merged there) or
//! on the client, which queries `/api/vector-search` and `/api/kg-search`
//! concurrently and merges locally with [`merge::merge`].

use crate::client::SearchApi;
use crate::error::Result;
use crate::merge;
use crate::types::{MergedResult, SearchMode, SearchParams};

/// Where a hybrid merge is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HybridExecution {
    /// Let the service merge (`/api/search`).
    #[default]
    Server,
    /// Query both systems and merge here.
    Client,
}

/// Results of one routed search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// Mode the query was sent to.
    pub mode: SearchMode,
    /// Query text, kept for the empty-result notice.
    pub query: String,
    /// Results in display order.
    pub results: Vec<MergedResult>,
}

impl SearchOutcome {
    /// `true` when nothing matched.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Informational message for an empty result set.
    ///
    /// An empty result is not an error; callers show this instead.
    pub fn notice(&self) -> Option<String> {
        self.is_empty()
            .then(|| format!("No results found for \"{}\"", self.query))
    }
}

/// Resolve the mode for a session.
///
/// An explicit mode wins. Otherwise the service's capabilities decide; if
/// they cannot be fetched the session starts in hybrid mode.
pub async fn resolve_mode<A: SearchApi>(api: &A, explicit: Option<SearchMode>) -> SearchMode {
    if let Some(mode) = explicit {
        return mode;
    }
    match api.capabilities().await {
        Ok(caps) => {
            if let Some(ref err) = caps.error {
                tracing::warn!(error = %err, "service reported a search initialization error");
            }
            let mode = caps.default_mode();
            tracing::debug!(
                vector = caps.vector_search_available,
                graph = caps.knowledge_graph_available,
                %mode,
                "mode derived from capabilities"
            );
            mode
        }
        Err(err) => {
            tracing::warn!(error = %err, "capabilities unavailable, defaulting to hybrid");
            SearchMode::Hybrid
        }
    }
}

/// Run one search in `mode`.
///
/// # Errors
///
/// Returns the request's [`ClientError`](crate::ClientError) if the search
/// failed. For client-side hybrid execution a failing side degrades to an
/// empty list; only when both sides fail is the vector-side error returned.
pub async fn search<A: SearchApi>(
    api: &A,
    mode: SearchMode,
    params: &SearchParams,
    execution: HybridExecution,
) -> Result<SearchOutcome> {
    params.validate()?;
    tracing::trace!(query = %params.query, %mode, "routing search");

    let results = match mode {
        SearchMode::Hybrid => match execution {
            HybridExecution::Server => api.hybrid_search(params).await?,
            HybridExecution::Client => merge_locally(api, params).await?,
        },
        SearchMode::Vector => api
            .vector_search(&params.query, params.limit)
            .await?
            .into_iter()
            .map(MergedResult::from)
            .collect(),
        SearchMode::KnowledgeGraph => api
            .kg_search(&params.query, params.limit)
            .await?
            .into_iter()
            .map(MergedResult::from)
            .collect(),
    };

    tracing::debug!(%mode, count = results.len(), "search complete");

    Ok(SearchOutcome {
        mode,
        query: params.query.clone(),
        results,
    })
}

async fn merge_locally<A: SearchApi>(api: &A, params: &SearchParams) -> Result<Vec<MergedResult>> {
    let (vector, graph) = futures::join!(
        api.vector_search(&params.query, params.limit),
        api.kg_search(&params.query, params.limit)
    );

    let (vector, graph) = match (vector, graph) {
        (Ok(v), Ok(g)) => (v, g),
        (Ok(v), Err(err)) => {
            tracing::warn!(error = %err, "knowledge graph search failed, using vector results only");
            (v, Vec::new())
        }
        (Err(err), Ok(g)) => {
            tracing::warn!(error = %err, "vector search failed, using graph results only");
            (Vec::new(), g)
        }
        (Err(vector_err), Err(graph_err)) => {
            tracing::warn!(error = %graph_err, "knowledge graph search failed");
            return Err(vector_err);
        }
    };

    Ok(merge::merge(
        vector,
        graph,
        params.merge_method,
        params.vector_weight,
        params.limit,
    ))
}
