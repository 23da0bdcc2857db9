//! Plain-text rendering of search results and chat citations.

use std::fmt::Write as _;

use govsearch_hybrid::{MergedResult, SearchCapabilities, SearchResult};

use crate::chat::ChatResponse;

/// Render one result as a numbered block.
///
/// ```text
/// 1. Local Area Unemployment Statistics  [Match 82%]
///    BLS / LAUS · vector
///    https://www.bls.gov/lau/
/// ```
pub fn format_result(index: usize, merged: &MergedResult) -> String {
    let result = &merged.result;
    let mut out = format!(
        "{index}. {}  [{}]\n",
        result.title(),
        merged.primary_score().badge()
    );

    let origin = source_line(result);
    if origin.is_empty() {
        let _ = writeln!(out, "   {}", result.search_type());
    } else {
        let _ = writeln!(out, "   {origin} · {}", result.search_type());
    }

    if !result.url().is_empty() {
        let _ = writeln!(out, "   {}", result.url());
    }

    let graph = match result {
        SearchResult::KnowledgeGraph(hit) => Some((&hit.matched_entity, &hit.graph_context)),
        SearchResult::Vector(_) => merged
            .graph_match
            .as_ref()
            .map(|m| (&m.matched_entity, &m.graph_context)),
    };
    if let Some((entity, context)) = graph {
        if !context.is_empty() {
            let _ = writeln!(out, "   {context}");
        } else if !entity.is_empty() {
            let _ = writeln!(out, "   Entity: {entity}");
        }
    }

    if let Some(summary) = result.summary().filter(|s| !s.trim().is_empty()) {
        let _ = writeln!(out, "   {}", summary.trim());
    }
    out
}

/// Render a result list, numbered from 1.
pub fn format_results(results: &[MergedResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, merged)| format_result(i + 1, merged))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render a chat reply followed by its numbered sources.
pub fn format_chat_response(response: &ChatResponse) -> String {
    let mut out = response.message.content.trim_end().to_owned();
    if response.sources.is_empty() {
        return out;
    }
    out.push_str("\n\nSources:\n");
    for (i, merged) in response.sources.iter().enumerate() {
        let _ = writeln!(out, "[{}] {} - {}", i + 1, merged.result.title(), merged.result.url());
    }
    out
}

/// Render the service's retrieval capabilities and the mode they imply.
pub fn format_capabilities(caps: &SearchCapabilities) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "vector search:   {}", availability(caps.vector_search_available));
    let _ = writeln!(out, "knowledge graph: {}", availability(caps.knowledge_graph_available));
    if let Some(err) = &caps.error {
        let _ = writeln!(out, "error:           {err}");
    }
    let _ = writeln!(out, "default mode:    {}", caps.default_mode());
    out
}

fn availability(available: bool) -> &'static str {
    if available { "available" } else { "unavailable" }
}

fn source_line(result: &SearchResult) -> String {
    match result {
        SearchResult::Vector(hit) => match (hit.source.is_empty(), hit.subsource.is_empty()) {
            (false, false) => format!("{} / {}", hit.source, hit.subsource),
            (false, true) => hit.source.clone(),
            (true, false) => hit.subsource.clone(),
            (true, true) => String::new(),
        },
        SearchResult::KnowledgeGraph(hit) => match (&hit.source, &hit.subsource) {
            (Some(source), Some(sub)) => format!("{source} / {sub}"),
            (Some(source), None) => source.clone(),
            (None, Some(sub)) => sub.clone(),
            (None, None) => String::new(),
        },
    }
}
