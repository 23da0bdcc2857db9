//! Normalisation of raw result records into [`SearchResult`] values.
//!
//! The service returns loosely shaped JSON objects: scores may be missing,
//! `doc_id` may be a number or a string, and the graph context arrives as
//! either `graph_context` or `context`. Normalisation never fails; a record
//! that is missing everything still comes out as a displayable result.

use serde_json::{Map, Value};

use crate::types::{GraphHit, GraphMatch, MergedResult, SearchResult, VectorHit};

/// Title used when a record has none.
pub const UNTITLED: &str = "Untitled";

/// Which endpoint a record came from.
///
/// Used to pick the variant when the record carries no usable
/// `search_type` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOrigin {
    /// `/api/vector-search`.
    Vector,
    /// `/api/kg-search`.
    KnowledgeGraph,
    /// `/api/search`; the record's own fields decide.
    Hybrid,
}

/// Convert one raw record into a [`SearchResult`].
pub fn normalize_result(record: &Value, origin: RecordOrigin) -> SearchResult {
    let empty = Map::new();
    let fields = record.as_object().unwrap_or(&empty);

    if is_graph_record(fields, origin) {
        SearchResult::KnowledgeGraph(GraphHit {
            doc_id: id_field(fields, "doc_id"),
            title: title_field(fields),
            url: string_field(fields, "url").unwrap_or_default(),
            source: string_field(fields, "source")
                .or_else(|| string_field(fields, "source_name")),
            subsource: string_field(fields, "subsource")
                .or_else(|| string_field(fields, "subsource_name")),
            summary: string_field(fields, "summary"),
            matched_entity: string_field(fields, "matched_entity").unwrap_or_default(),
            graph_context: graph_context_field(fields).unwrap_or_default(),
            relevance_score: score_field(fields, "relevance_score"),
        })
    } else {
        SearchResult::Vector(VectorHit {
            doc_id: id_field(fields, "doc_id"),
            title: title_field(fields),
            url: string_field(fields, "url").unwrap_or_default(),
            source: string_field(fields, "source")
                .or_else(|| string_field(fields, "source_name"))
                .unwrap_or_default(),
            subsource: string_field(fields, "subsource")
                .or_else(|| string_field(fields, "subsource_name"))
                .unwrap_or_default(),
            summary: string_field(fields, "summary"),
            similarity_score: score_field(fields, "similarity_score"),
        })
    }
}

/// Convert one raw record from a merged (hybrid) response.
///
/// Keeps the service's `combined_score`, and picks up graph evidence that
/// the service attached to a vector record for the same document.
pub fn normalize_merged(record: &Value, origin: RecordOrigin) -> MergedResult {
    let result = normalize_result(record, origin);
    let empty = Map::new();
    let fields = record.as_object().unwrap_or(&empty);

    let graph_match = match result {
        SearchResult::Vector(_) => {
            let entity = string_field(fields, "matched_entity");
            let context = graph_context_field(fields);
            if entity.is_some() || context.is_some() {
                Some(GraphMatch {
                    matched_entity: entity.unwrap_or_default(),
                    graph_context: context.unwrap_or_default(),
                })
            } else {
                None
            }
        }
        SearchResult::KnowledgeGraph(_) => None,
    };

    MergedResult {
        result,
        combined_score: score_field(fields, "combined_score"),
        graph_match,
    }
}

/// Normalise every record of a response array.
pub fn normalize_all(records: &[Value], origin: RecordOrigin) -> Vec<SearchResult> {
    records
        .iter()
        .map(|record| normalize_result(record, origin))
        .collect()
}

/// Normalise every record of a merged response array.
pub fn normalize_all_merged(records: &[Value], origin: RecordOrigin) -> Vec<MergedResult> {
    records
        .iter()
        .map(|record| normalize_merged(record, origin))
        .collect()
}

fn is_graph_record(fields: &Map<String, Value>, origin: RecordOrigin) -> bool {
    match fields.get("search_type").and_then(Value::as_str) {
        Some("knowledge_graph") => return true,
        Some("vector") => return false,
        _ => {}
    }
    match origin {
        RecordOrigin::Vector => false,
        RecordOrigin::KnowledgeGraph => true,
        RecordOrigin::Hybrid => {
            fields.contains_key("relevance_score") && !fields.contains_key("similarity_score")
        }
    }
}

fn title_field(fields: &Map<String, Value>) -> String {
    string_field(fields, "title")
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| UNTITLED.to_owned())
}

fn graph_context_field(fields: &Map<String, Value>) -> Option<String> {
    string_field(fields, "graph_context").or_else(|| string_field(fields, "context"))
}

/// A string field; `null` and non-strings count as missing.
fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).and_then(Value::as_str).map(str::to_owned)
}

/// An identifier that may be sent as a string or a number.
///
/// Float ids such as `42.0` lose their fractional part, the way the
/// document store keys them.
fn id_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Some(i.to_string()),
            (None, Some(f)) if f.is_finite() => Some((f.trunc() as i64).to_string()),
            _ => None,
        },
        _ => None,
    }
}

/// A score that may be sent as a number or a numeric string.
fn score_field(fields: &Map<String, Value>, key: &str) -> Option<f64> {
    let score = match fields.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    score.is_finite().then_some(score)
}
