use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::model::cluster::ScoredCluster;

/// Stable sort by descending overall score.
pub fn sort_desc_by_score(list: &[ScoredCluster]) -> Vec<ScoredCluster> {
    let mut out = list.to_vec();
    out.sort_by(|a, b| b.score().partial_cmp(&a.score()).unwrap_or(Ordering::Equal));
    out
}

pub fn trim_first_n(list: &[ScoredCluster], n: usize) -> Vec<ScoredCluster> {
    list.iter().take(n).cloned().collect()
}

/// Keeps clusters scoring at or above `cutoff`, in input order.
pub fn trim_by_cutoff(list: &[ScoredCluster], cutoff: f64) -> Vec<ScoredCluster> {
    list.iter().filter(|c| c.score() >= cutoff).cloned().collect()
}

/// `primary` unchanged, then each `secondary` entry whose id has not been
/// seen yet. Secondary also de-duplicates against itself.
pub fn union_excluding_seen(
    primary: &[ScoredCluster],
    secondary: &[ScoredCluster],
) -> Vec<ScoredCluster> {
    let mut seen: BTreeSet<i64> = primary.iter().map(|c| c.id()).collect();
    let mut out = primary.to_vec();
    for cluster in secondary {
        if seen.insert(cluster.id()) {
            out.push(cluster.clone());
        }
    }
    out
}

/// One entry per id at the position of its first occurrence, carrying the
/// highest score seen for that id.
pub fn collapse_duplicate_ids(list: &[ScoredCluster]) -> Vec<ScoredCluster> {
    let mut max_score: BTreeMap<i64, f64> = BTreeMap::new();
    for cluster in list {
        max_score
            .entry(cluster.id())
            .and_modify(|s| *s = s.max(cluster.score()))
            .or_insert(cluster.score());
    }
    let mut emitted = BTreeSet::new();
    let mut out = Vec::with_capacity(max_score.len());
    for cluster in list {
        if emitted.insert(cluster.id()) {
            out.push(cluster.with_score(max_score[&cluster.id()]));
        }
    }
    out
}

/// `a` followed by the entries of `b` whose id is not in `a`. This is a union
/// by id even where callers treat it as a narrowing step; duplicates inside
/// `b` itself are kept.
pub fn merge_all(a: &[ScoredCluster], b: &[ScoredCluster]) -> Vec<ScoredCluster> {
    let in_a: BTreeSet<i64> = a.iter().map(|c| c.id()).collect();
    let mut out = a.to_vec();
    out.extend(b.iter().filter(|c| !in_a.contains(&c.id())).cloned());
    out
}

/// Selection knobs for one grid point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionParams {
    pub top_doc: usize,
    pub top_sent: usize,
    pub cutoff: Option<f64>,
}

/// Candidate clusters for one document: the `top_doc` best document-level
/// clusters, merged with every document-level cluster at or above `cutoff`
/// when one is set, then the `top_sent` best sentence-level clusters not
/// already chosen.
pub fn select_candidates(
    doc: &[ScoredCluster],
    sent: &[ScoredCluster],
    params: &SelectionParams,
) -> Vec<ScoredCluster> {
    let doc_sorted = sort_desc_by_score(doc);
    let top_doc = trim_first_n(&doc_sorted, params.top_doc);
    let confident = match params.cutoff {
        Some(cutoff) => trim_by_cutoff(&doc_sorted, cutoff),
        None => Vec::new(),
    };
    let doc_side = merge_all(&top_doc, &confident);

    let sent_sorted = sort_desc_by_score(&collapse_duplicate_ids(sent));
    let top_sent = trim_first_n(&sent_sorted, params.top_sent);

    collapse_duplicate_ids(&union_excluding_seen(&doc_side, &top_sent))
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_select.rs"]
mod tests;
