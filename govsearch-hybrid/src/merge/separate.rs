//! Block concatenation: vector results first, then graph results.

use crate::types::{MergedResult, SearchResult};

/// Slots given to each side for a `limit`: `(ceil(limit / 2), floor(limit / 2))`.
///
/// The vector side takes the extra slot when `limit` is odd.
pub fn split_limit(limit: usize) -> (usize, usize) {
    (limit.div_ceil(2), limit / 2)
}

/// Concatenate up to `ceil(limit / 2)` vector results and up to
/// `floor(limit / 2)` graph results, each in its own order.
///
/// When one side has fewer results than its share, the unused slots go to
/// the other side, so a short list never shrinks the page below what the
/// two lists together can fill.
pub fn separate(
    vector_results: Vec<SearchResult>,
    graph_results: Vec<SearchResult>,
    limit: usize,
) -> Vec<MergedResult> {
    let (vector_share, graph_share) = split_limit(limit);

    let vector_take = vector_results.len().min(vector_share);
    let graph_take = graph_results.len().min(graph_share);
    let spare = limit - vector_take - graph_take;

    let vector_extra = spare.min(vector_results.len() - vector_take);
    let graph_extra = (spare - vector_extra).min(graph_results.len() - graph_take);

    vector_results
        .into_iter()
        .take(vector_take + vector_extra)
        .chain(graph_results.into_iter().take(graph_take + graph_extra))
        .map(MergedResult::from)
        .collect()
}
