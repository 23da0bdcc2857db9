//! Weighted score blending across the two result lists.
//!
//! Formula: `combined = w * similarity + (1 - w) * relevance`
//! where a missing score counts as 0.

use std::collections::HashMap;

use crate::types::{GraphMatch, MergedResult, SearchResult};

/// Blend the score of a single hit.
///
/// A vector hit contributes only its similarity term and a graph hit only
/// its relevance term, so the score depends on the hit alone and never on
/// its position in the input.
pub fn combined_score(result: &SearchResult, vector_weight: f64) -> f64 {
    let similarity = result.similarity_score().unwrap_or(0.0);
    let relevance = result.relevance_score().unwrap_or(0.0);
    vector_weight * similarity + (1.0 - vector_weight) * relevance
}

/// Rank the union of both lists by combined score, descending.
///
/// A graph hit whose `doc_id` is already in the list is folded into the
/// first entry with that id: its relevance term is added to the entry's
/// score and, on a vector entry, its entity/context are attached as
/// [`GraphMatch`]. Repeated graph hits for one document therefore collapse
/// too. Hits without a `doc_id` are never folded. Ties keep input order
/// (vector list first).
pub fn weighted(
    vector_results: Vec<SearchResult>,
    graph_results: Vec<SearchResult>,
    vector_weight: f64,
    limit: usize,
) -> Vec<MergedResult> {
    let mut merged: Vec<MergedResult> =
        Vec::with_capacity(vector_results.len() + graph_results.len());
    let mut by_doc_id: HashMap<String, usize> = HashMap::new();

    for result in vector_results {
        let score = combined_score(&result, vector_weight);
        if let Some(id) = result.doc_id() {
            by_doc_id.entry(id.to_owned()).or_insert(merged.len());
        }
        merged.push(MergedResult::scored(result, score));
    }

    for result in graph_results {
        let score = combined_score(&result, vector_weight);
        let existing = result.doc_id().and_then(|id| by_doc_id.get(id)).copied();

        match existing {
            Some(idx) => {
                let entry = &mut merged[idx];
                entry.combined_score = Some(entry.combined_score.unwrap_or(0.0) + score);
                if let (SearchResult::Vector(_), SearchResult::KnowledgeGraph(hit)) =
                    (&entry.result, result)
                {
                    entry.graph_match = Some(GraphMatch {
                        matched_entity: hit.matched_entity,
                        graph_context: hit.graph_context,
                    });
                }
            }
            None => {
                if let Some(id) = result.doc_id() {
                    by_doc_id.insert(id.to_owned(), merged.len());
                }
                merged.push(MergedResult::scored(result, score));
            }
        }
    }

    // Stable sort keeps input order for equal scores.
    merged.sort_by(|a, b| {
        let a = a.combined_score.unwrap_or(0.0);
        let b = b.combined_score.unwrap_or(0.0);
        b.partial_cmp(&a).unwrap_or(std::cmp::Ordering::Equal)
    });
    merged.truncate(limit);
    merged
}
