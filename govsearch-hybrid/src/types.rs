//! Core types for search results, search parameters and chat messages.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ClientError;

/// A document hit from the vector similarity index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorHit {
    /// Document identifier shared with the knowledge graph, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    /// Document title.
    pub title: String,
    /// Canonical document URL.
    pub url: String,
    /// Publishing agency or site.
    #[serde(default)]
    pub source: String,
    /// Section or sub-agency within `source`.
    #[serde(default)]
    pub subsource: String,
    /// Document summary, when the service attached one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Similarity to the query in `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f64>,
}

/// A document reached through the knowledge graph from an entity in the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphHit {
    /// Document identifier shared with the vector index, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    /// Document title.
    pub title: String,
    /// Canonical document URL.
    pub url: String,
    /// Publishing agency or site.
    #[serde(default, alias = "source_name", skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Section or sub-agency within `source`.
    #[serde(default, alias = "subsource_name", skip_serializing_if = "Option::is_none")]
    pub subsource: Option<String>,
    /// Document summary, when the service attached one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// The query entity that led to this document.
    #[serde(default)]
    pub matched_entity: String,
    /// Relationship path from the entity to the document.
    #[serde(default, alias = "context")]
    pub graph_context: String,
    /// Graph relevance in `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f64>,
}

/// One search hit, tagged with the system that produced it.
///
/// On the wire this is a flat object with a `search_type` of `"vector"`
/// or `"knowledge_graph"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "search_type", rename_all = "snake_case")]
pub enum SearchResult {
    /// Vector similarity hit.
    Vector(VectorHit),
    /// Knowledge graph hit.
    KnowledgeGraph(GraphHit),
}

impl SearchResult {
    /// Wire tag of this result (`"vector"` or `"knowledge_graph"`).
    pub fn search_type(&self) -> &'static str {
        match self {
            Self::Vector(_) => "vector",
            Self::KnowledgeGraph(_) => "knowledge_graph",
        }
    }

    /// Document title.
    pub fn title(&self) -> &str {
        match self {
            Self::Vector(hit) => &hit.title,
            Self::KnowledgeGraph(hit) => &hit.title,
        }
    }

    /// Document URL.
    pub fn url(&self) -> &str {
        match self {
            Self::Vector(hit) => &hit.url,
            Self::KnowledgeGraph(hit) => &hit.url,
        }
    }

    /// Shared document identifier, if the source system provided one.
    pub fn doc_id(&self) -> Option<&str> {
        match self {
            Self::Vector(hit) => hit.doc_id.as_deref(),
            Self::KnowledgeGraph(hit) => hit.doc_id.as_deref(),
        }
    }

    /// Document summary, if attached.
    pub fn summary(&self) -> Option<&str> {
        match self {
            Self::Vector(hit) => hit.summary.as_deref(),
            Self::KnowledgeGraph(hit) => hit.summary.as_deref(),
        }
    }

    /// Publishing source, if known.
    pub fn source(&self) -> Option<&str> {
        match self {
            Self::Vector(hit) => Some(hit.source.as_str()).filter(|s| !s.is_empty()),
            Self::KnowledgeGraph(hit) => hit.source.as_deref(),
        }
    }

    /// Similarity score; only vector hits carry one.
    pub fn similarity_score(&self) -> Option<f64> {
        match self {
            Self::Vector(hit) => hit.similarity_score,
            Self::KnowledgeGraph(_) => None,
        }
    }

    /// Relevance score; only graph hits carry one.
    pub fn relevance_score(&self) -> Option<f64> {
        match self {
            Self::KnowledgeGraph(hit) => hit.relevance_score,
            Self::Vector(_) => None,
        }
    }
}

/// Graph evidence attached to a vector hit for the same document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphMatch {
    /// The query entity that reached the document.
    pub matched_entity: String,
    /// Relationship path from the entity to the document.
    pub graph_context: String,
}

/// A search hit as it comes out of a merge.
///
/// `combined_score` is only set by the weighted strategy (or by the
/// service when it ran the weighted strategy itself).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedResult {
    /// The underlying hit.
    #[serde(flatten)]
    pub result: SearchResult,
    /// Weighted blend of similarity and relevance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combined_score: Option<f64>,
    /// Present when a graph hit for the same document was folded in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_match: Option<GraphMatch>,
}

impl MergedResult {
    /// Wrap a hit with a combined score.
    pub fn scored(result: SearchResult, combined_score: f64) -> Self {
        Self {
            result,
            combined_score: Some(combined_score),
            graph_match: None,
        }
    }

    /// The score to display, chosen by precedence combined > similarity > relevance.
    pub fn primary_score(&self) -> PrimaryScore {
        if let Some(score) = self.combined_score {
            return PrimaryScore::Combined(score);
        }
        match &self.result {
            SearchResult::Vector(hit) => hit
                .similarity_score
                .map_or(PrimaryScore::Unscored, PrimaryScore::Similarity),
            SearchResult::KnowledgeGraph(hit) => hit
                .relevance_score
                .map_or(PrimaryScore::Unscored, PrimaryScore::Relevance),
        }
    }
}

impl From<SearchResult> for MergedResult {
    fn from(result: SearchResult) -> Self {
        Self {
            result,
            combined_score: None,
            graph_match: None,
        }
    }
}

/// The score shown on a result badge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrimaryScore {
    /// Weighted hybrid score.
    Combined(f64),
    /// Vector similarity.
    Similarity(f64),
    /// Graph relevance.
    Relevance(f64),
    /// The record carried no usable score.
    Unscored,
}

impl PrimaryScore {
    /// Numeric value, if any.
    pub fn value(&self) -> Option<f64> {
        match *self {
            Self::Combined(v) | Self::Similarity(v) | Self::Relevance(v) => Some(v),
            Self::Unscored => None,
        }
    }

    /// Badge text, e.g. `"Match 45%"`. Unscored results show `"Result"`.
    pub fn badge(&self) -> String {
        match *self {
            Self::Combined(v) => format!("Match {}%", percent(v)),
            Self::Similarity(v) => format!("Similarity {}%", percent(v)),
            Self::Relevance(v) => format!("Relevance {}%", percent(v)),
            Self::Unscored => "Result".to_owned(),
        }
    }
}

fn percent(score: f64) -> i64 {
    (score * 100.0).round() as i64
}

/// How two ranked lists are combined into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMethod {
    /// Rank the union by `w * similarity + (1 - w) * relevance`.
    #[default]
    Weighted,
    /// Alternate vector, graph, vector, ...
    Interleave,
    /// Vector block followed by graph block.
    Separate,
}

impl MergeMethod {
    /// Wire name of this method.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Weighted => "weighted",
            Self::Interleave => "interleave",
            Self::Separate => "separate",
        }
    }
}

impl fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MergeMethod {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weighted" => Ok(Self::Weighted),
            "interleave" => Ok(Self::Interleave),
            "separate" => Ok(Self::Separate),
            other => Err(ClientError::Config(format!(
                "unknown merge method {other:?} (expected weighted, interleave or separate)"
            ))),
        }
    }
}

/// Which retrieval system a query is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Vector similarity only (`/api/vector-search`).
    Vector,
    /// Knowledge graph only (`/api/kg-search`).
    KnowledgeGraph,
    /// Both, merged (`/api/search`).
    Hybrid,
}

impl SearchMode {
    /// Human-readable name of this mode.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Vector => "vector",
            Self::KnowledgeGraph => "knowledge_graph",
            Self::Hybrid => "hybrid",
        }
    }

    /// API path serving this mode.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Vector => "/api/vector-search",
            Self::KnowledgeGraph => "/api/kg-search",
            Self::Hybrid => "/api/search",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SearchMode {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vector" => Ok(Self::Vector),
            "knowledge_graph" | "kg" | "graph" => Ok(Self::KnowledgeGraph),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(ClientError::Config(format!(
                "unknown search mode {other:?} (expected vector, knowledge_graph or hybrid)"
            ))),
        }
    }
}

/// Parameters of one search request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchParams {
    /// Free-text query.
    pub query: String,
    /// Maximum number of results.
    pub limit: usize,
    /// Weight of the vector side in `[0, 1]`; only used by weighted hybrid merges.
    pub vector_weight: f64,
    /// Merge strategy for hybrid searches.
    pub merge_method: MergeMethod,
}

impl SearchParams {
    /// Default result limit.
    pub const DEFAULT_LIMIT: usize = 5;
    /// Default vector weight.
    pub const DEFAULT_VECTOR_WEIGHT: f64 = 0.5;

    /// Parameters for `query` with default limit, weight and method.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: Self::DEFAULT_LIMIT,
            vector_weight: Self::DEFAULT_VECTOR_WEIGHT,
            merge_method: MergeMethod::default(),
        }
    }

    /// Set the result limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set the vector weight.
    pub fn with_vector_weight(mut self, vector_weight: f64) -> Self {
        self.vector_weight = vector_weight;
        self
    }

    /// Set the merge method.
    pub fn with_merge_method(mut self, merge_method: MergeMethod) -> Self {
        self.merge_method = merge_method;
        self
    }

    /// Checks the request before it is sent.
    ///
    /// The merge functions themselves do not clamp `vector_weight`; this is
    /// where out-of-range values are rejected.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.query.trim().is_empty() {
            return Err(ClientError::InvalidQuery("query must not be empty".into()));
        }
        if self.limit == 0 {
            return Err(ClientError::Config("limit must be greater than 0".into()));
        }
        if !(0.0..=1.0).contains(&self.vector_weight) {
            return Err(ClientError::Config(format!(
                "vector_weight must be within [0, 1], got {}",
                self.vector_weight
            )));
        }
        Ok(())
    }
}

/// Response of the health endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// `"ok"` when healthy.
    pub status: String,
    /// Server time (ISO-8601).
    #[serde(default)]
    pub timestamp: String,
}

/// Which retrieval systems the service has credentials for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCapabilities {
    /// Vector search is configured.
    #[serde(default)]
    pub vector_search_available: bool,
    /// Knowledge graph search is configured.
    #[serde(default)]
    pub knowledge_graph_available: bool,
    /// Initialization error reported by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchCapabilities {
    /// The mode a session should start in.
    ///
    /// Hybrid when both systems are up (or when neither is, so the service
    /// reports the problem itself); otherwise whichever one is available.
    pub fn default_mode(&self) -> SearchMode {
        match (self.vector_search_available, self.knowledge_graph_available) {
            (true, false) => SearchMode::Vector,
            (false, true) => SearchMode::KnowledgeGraph,
            _ => SearchMode::Hybrid,
        }
    }
}

/// Response of `/api/debug`; only the capabilities are used.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DebugInfo {
    /// Search capabilities block.
    #[serde(default)]
    pub search_capabilities: SearchCapabilities,
}

/// Speaker of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// The person asking.
    User,
    /// The model.
    Assistant,
}

/// One message of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who said it.
    pub role: ChatRole,
    /// What was said.
    pub content: String,
}

impl ChatMessage {
    /// A user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// An assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}
