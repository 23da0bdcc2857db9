//! Merging of vector and knowledge-graph result lists.
//!
//! [`merge`] picks one of three strategies by [`MergeMethod`]:
//!
//! - [`weighted::weighted`] ranks the union by a blended score
//! - [`interleave::interleave`] alternates between the two lists
//! - [`separate::separate`] emits a vector block then a graph block
//!
//! All strategies are deterministic and return at most `limit` results.

pub mod interleave;
pub mod separate;
pub mod weighted;

use crate::types::{MergeMethod, MergedResult, SearchResult};

/// Combine two ranked lists into one.
///
/// `vector_results` should be ordered by similarity and `graph_results` by
/// relevance, both descending. When either list is empty the other one is
/// returned as-is (truncated to `limit`) whatever the method.
///
/// `vector_weight` is used as given; callers validate it (see
/// [`SearchParams::validate`](crate::types::SearchParams::validate)).
pub fn merge(
    vector_results: Vec<SearchResult>,
    graph_results: Vec<SearchResult>,
    method: MergeMethod,
    vector_weight: f64,
    limit: usize,
) -> Vec<MergedResult> {
    if limit == 0 {
        return Vec::new();
    }

    if vector_results.is_empty() || graph_results.is_empty() {
        tracing::debug!(
            vector = vector_results.len(),
            graph = graph_results.len(),
            "one side empty, passing the other through"
        );
        return vector_results
            .into_iter()
            .chain(graph_results)
            .take(limit)
            .map(MergedResult::from)
            .collect();
    }

    tracing::debug!(
        %method,
        vector = vector_results.len(),
        graph = graph_results.len(),
        limit,
        "merging result lists"
    );

    match method {
        MergeMethod::Weighted => {
            weighted::weighted(vector_results, graph_results, vector_weight, limit)
        }
        MergeMethod::Interleave => interleave::interleave(vector_results, graph_results, limit),
        MergeMethod::Separate => separate::separate(vector_results, graph_results, limit),
    }
}
