//! Round-robin interleaving of the two result lists.

use std::collections::HashSet;

use crate::types::{MergedResult, SearchResult};

/// Alternate vector, graph, vector, graph, ... starting with the vector list.
///
/// An exhausted list is skipped. A hit whose `doc_id` was already emitted is
/// dropped without using up a slot; hits without a `doc_id` are always kept.
/// Stops at `limit` results or when both lists are exhausted.
pub fn interleave(
    vector_results: Vec<SearchResult>,
    graph_results: Vec<SearchResult>,
    limit: usize,
) -> Vec<MergedResult> {
    let mut merged: Vec<MergedResult> =
        Vec::with_capacity(limit.min(vector_results.len() + graph_results.len()));
    let mut seen: HashSet<String> = HashSet::new();

    let mut vector_iter = vector_results.into_iter();
    let mut graph_iter = graph_results.into_iter();
    let mut vector_done = false;
    let mut graph_done = false;

    while merged.len() < limit && !(vector_done && graph_done) {
        if !vector_done {
            match vector_iter.next() {
                Some(result) => push_unseen(&mut merged, &mut seen, result),
                None => vector_done = true,
            }
        }
        if merged.len() >= limit {
            break;
        }
        if !graph_done {
            match graph_iter.next() {
                Some(result) => push_unseen(&mut merged, &mut seen, result),
                None => graph_done = true,
            }
        }
    }

    merged
}

fn push_unseen(merged: &mut Vec<MergedResult>, seen: &mut HashSet<String>, result: SearchResult) {
    if let Some(id) = result.doc_id() {
        if !seen.insert(id.to_owned()) {
            tracing::trace!(doc_id = id, "interleave skipping duplicate document");
            return;
        }
    }
    merged.push(MergedResult::from(result));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GraphHit, VectorHit};

    fn v(title: &str, doc_id: Option<&str>) -> SearchResult {
        SearchResult::Vector(VectorHit {
            doc_id: doc_id.map(str::to_owned),
            title: title.into(),
            url: String::new(),
            source: String::new(),
            subsource: String::new(),
            summary: None,
            similarity_score: Some(0.5),
        })
    }

    fn k(title: &str, doc_id: Option<&str>) -> SearchResult {
        SearchResult::KnowledgeGraph(GraphHit {
            doc_id: doc_id.map(str::to_owned),
            title: title.into(),
            url: String::new(),
            source: None,
            subsource: None,
            summary: None,
            matched_entity: String::new(),
            graph_context: String::new(),
            relevance_score: Some(0.5),
        })
    }

    fn titles(results: &[MergedResult]) -> Vec<&str> {
        results.iter().map(|m| m.result.title()).collect()
    }

    #[test]
    fn three_and_two_alternate() {
        let merged = interleave(
            vec![v("v0", None), v("v1", None), v("v2", None)],
            vec![k("k0", None), k("k1", None)],
            10,
        );
        assert_eq!(titles(&merged), ["v0", "k0", "v1", "k1", "v2"]);
    }

    #[test]
    fn graph_longer_than_vector() {
        let merged = interleave(
            vec![v("v0", None)],
            vec![k("k0", None), k("k1", None), k("k2", None)],
            10,
        );
        assert_eq!(titles(&merged), ["v0", "k0", "k1", "k2"]);
    }

    #[test]
    fn stops_at_limit_mid_round() {
        let merged = interleave(
            vec![v("v0", None), v("v1", None)],
            vec![k("k0", None), k("k1", None)],
            3,
        );
        assert_eq!(titles(&merged), ["v0", "k0", "v1"]);
    }

    #[test]
    fn duplicate_doc_ids_emitted_once() {
        let merged = interleave(
            vec![v("v0", Some("1")), v("v1", Some("2"))],
            vec![k("k0", Some("1")), k("k1", Some("3"))],
            10,
        );
        assert_eq!(titles(&merged), ["v0", "v1", "k1"]);
    }

    #[test]
    fn skipped_duplicates_do_not_use_slots() {
        let merged = interleave(
            vec![v("v0", Some("1")), v("v1", Some("2"))],
            vec![k("k0", Some("1")), k("k1", Some("3"))],
            3,
        );
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn interleaved_results_carry_no_combined_score() {
        let merged = interleave(vec![v("v0", None)], vec![k("k0", None)], 5);
        assert!(merged.iter().all(|m| m.combined_score.is_none()));
    }
}
