//! Typed HTTP client for the search/chat service.
//!
//! Every call is routed through the session's [`EndpointResolver`], so a
//! primary endpoint that stops answering is replaced by the local fallback
//! transparently and for good.

use std::future::Future;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::endpoint::{EndpointResolver, EndpointState, HEALTH_PATH};
use crate::error::{ClientError, Result};
use crate::http::{build_client, endpoint_url, transport_error};
use crate::normalize::{normalize_all, normalize_all_merged, RecordOrigin};
use crate::types::{
    ChatMessage, DebugInfo, HealthStatus, MergedResult, SearchCapabilities, SearchMode,
    SearchParams, SearchResult,
};

/// Path reporting which retrieval systems are configured.
pub const DEBUG_PATH: &str = "/api/debug";
/// Path of the grounded chat endpoint.
pub const CHAT_PATH: &str = "/api/chat";

/// Longest error body kept in a [`ClientError::Status`] message.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// The calls the search router and chat assembler need from the service.
///
/// [`ApiClient`] is the real implementation; tests substitute their own.
pub trait SearchApi: Send + Sync {
    /// Server-side hybrid search (`/api/search`).
    fn hybrid_search(
        &self,
        params: &SearchParams,
    ) -> impl Future<Output = Result<Vec<MergedResult>>> + Send;

    /// Vector-only search (`/api/vector-search`).
    fn vector_search(
        &self,
        query: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<SearchResult>>> + Send;

    /// Knowledge-graph-only search (`/api/kg-search`).
    fn kg_search(
        &self,
        query: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<SearchResult>>> + Send;

    /// Which retrieval systems the service can use.
    fn capabilities(&self) -> impl Future<Output = Result<SearchCapabilities>> + Send;

    /// Send one chat turn with its grounding context; returns the reply text.
    fn chat(
        &self,
        query: &str,
        history: &[ChatMessage],
        context: &[MergedResult],
    ) -> impl Future<Output = Result<String>> + Send;
}

#[derive(Serialize)]
struct ListSearchRequest<'a> {
    query: &'a str,
    limit: usize,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    query: &'a str,
    chat_history: &'a [ChatMessage],
    context: &'a [MergedResult],
}

#[derive(Deserialize)]
struct ChatReply {
    response: String,
}

/// HTTP+JSON client bound to one session's endpoint resolver.
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    resolver: EndpointResolver,
}

impl ApiClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the configuration is invalid or the
    /// HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            http: build_client(config)?,
            resolver: EndpointResolver::from_config(config)?,
        })
    }

    /// Build a client around an existing resolver.
    pub fn with_resolver(http: reqwest::Client, resolver: EndpointResolver) -> Self {
        Self { http, resolver }
    }

    /// The session's endpoint resolver.
    pub fn resolver(&self) -> &EndpointResolver {
        &self.resolver
    }

    /// Probe the primary endpoint, switching to the fallback if it is down.
    pub async fn probe(&self) -> EndpointState {
        self.resolver.probe(&self.http).await
    }

    /// Service health (`/api/health`).
    pub async fn health(&self) -> Result<HealthStatus> {
        self.get_json(HEALTH_PATH).await
    }

    async fn list_search(
        &self,
        mode: SearchMode,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Value>> {
        tracing::trace!(query, %mode, "search request");
        let body = ListSearchRequest { query, limit };
        let records: Vec<Value> = self.post_json(mode.path(), &body).await?;
        tracing::debug!(%mode, count = records.len(), "search response");
        Ok(records)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let http = &self.http;
        self.resolver
            .execute(|base| async move {
                let url = endpoint_url(&base, path)?;
                tracing::debug!(%url, "GET");
                let response = http
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| transport_error(path, &e))?;
                read_json(path, response).await
            })
            .await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let http = &self.http;
        self.resolver
            .execute(|base| async move {
                let url = endpoint_url(&base, path)?;
                tracing::debug!(%url, "POST");
                let response = http
                    .post(url)
                    .json(body)
                    .send()
                    .await
                    .map_err(|e| transport_error(path, &e))?;
                read_json(path, response).await
            })
            .await
    }
}

impl SearchApi for ApiClient {
    async fn hybrid_search(&self, params: &SearchParams) -> Result<Vec<MergedResult>> {
        params.validate()?;
        tracing::trace!(query = %params.query, "hybrid search request");
        let records: Vec<Value> = self.post_json(SearchMode::Hybrid.path(), params).await?;
        tracing::debug!(
            count = records.len(),
            method = %params.merge_method,
            "hybrid search response"
        );
        Ok(normalize_all_merged(&records, RecordOrigin::Hybrid))
    }

    async fn vector_search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        check_query(query, limit)?;
        let records = self.list_search(SearchMode::Vector, query, limit).await?;
        Ok(normalize_all(&records, RecordOrigin::Vector))
    }

    async fn kg_search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        check_query(query, limit)?;
        let records = self
            .list_search(SearchMode::KnowledgeGraph, query, limit)
            .await?;
        Ok(normalize_all(&records, RecordOrigin::KnowledgeGraph))
    }

    async fn capabilities(&self) -> Result<SearchCapabilities> {
        let info: DebugInfo = self.get_json(DEBUG_PATH).await?;
        Ok(info.search_capabilities)
    }

    async fn chat(
        &self,
        query: &str,
        history: &[ChatMessage],
        context: &[MergedResult],
    ) -> Result<String> {
        if query.trim().is_empty() {
            return Err(ClientError::InvalidQuery("message must not be empty".into()));
        }
        tracing::trace!(query, "chat request");
        tracing::debug!(
            history = history.len(),
            context = context.len(),
            "sending chat turn"
        );
        let body = ChatRequest {
            query,
            chat_history: history,
            context,
        };
        let reply: ChatReply = self.post_json(CHAT_PATH, &body).await?;
        Ok(reply.response)
    }
}

fn check_query(query: &str, limit: usize) -> Result<()> {
    if query.trim().is_empty() {
        return Err(ClientError::InvalidQuery("query must not be empty".into()));
    }
    if limit == 0 {
        return Err(ClientError::Config("limit must be greater than 0".into()));
    }
    Ok(())
}

/// Read a response body and decode it, mapping error statuses first.
async fn read_json<T: DeserializeOwned>(what: &str, response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| transport_error(what, &e))?;

    if !status.is_success() {
        return Err(ClientError::Status {
            status: status.as_u16(),
            message: error_message(status, &bytes),
        });
    }

    serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(format!("{what}: {e}")))
}

/// Best-effort human message for an error response.
///
/// Prefers a JSON `detail` or `error` field, then the raw body, then the
/// status reason phrase.
fn error_message(status: reqwest::StatusCode, body: &[u8]) -> String {
    if let Ok(Value::Object(fields)) = serde_json::from_slice::<Value>(body) {
        for key in ["detail", "error", "message"] {
            if let Some(Value::String(text)) = fields.get(key) {
                return truncate(text);
            }
        }
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_owned()
    } else {
        truncate(text)
    }
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_ERROR_BODY_CHARS {
        text.to_owned()
    } else {
        let mut cut: String = text.chars().take(MAX_ERROR_BODY_CHARS).collect();
        cut.push('…');
        cut
    }
}
