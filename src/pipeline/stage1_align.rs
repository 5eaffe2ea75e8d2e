use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::model::alignment::Alignment;
use crate::model::cluster::ScoredCluster;

/// Mutable state of one aligner run. Owned by the caller of `claim_topic`
/// so the cascade can be driven without any shared global state.
#[derive(Debug)]
struct AlignState {
    best: Vec<Option<f64>>,
    holder: Vec<Option<usize>>,
    topic_of: Vec<Option<usize>>,
    displacements: usize,
}

/// Greedy, order-dependent one-to-one alignment of `clusters` onto `topics`.
///
/// Clusters are visited in input order. Each claims the topic with the
/// highest dot product among topics that are either unclaimed or currently
/// held with a lower best score; ties keep the earlier topic. A cluster whose
/// claim is taken over goes back through the same step before the next
/// input cluster is visited. Repeated ids keep their first occurrence.
pub fn align_clusters(clusters: &[ScoredCluster], topics: &[ScoredCluster]) -> Alignment {
    let clusters = first_by_id(clusters, "cluster");
    let topics = first_by_id(topics, "topic");

    let scores: Vec<Vec<f64>> = clusters
        .iter()
        .map(|c| topics.iter().map(|t| c.dot(t)).collect())
        .collect();

    let mut state = AlignState {
        best: vec![None; topics.len()],
        holder: vec![None; topics.len()],
        topic_of: vec![None; clusters.len()],
        displacements: 0,
    };

    let mut pending = Vec::new();
    for start in 0..clusters.len() {
        pending.push(start);
        while let Some(ci) = pending.pop() {
            if let Some(displaced) = claim_topic(ci, &scores[ci], &mut state) {
                pending.push(displaced);
            }
        }
    }

    let mut mapped = BTreeMap::new();
    let mut best_scores = BTreeMap::new();
    for (ci, ti) in state.topic_of.iter().enumerate() {
        if let Some(ti) = *ti {
            mapped.insert(clusters[ci].id(), topics[ti].id());
        }
    }
    let mut unclaimed_topics = Vec::new();
    for (ti, topic) in topics.iter().enumerate() {
        match state.best[ti] {
            Some(score) if state.holder[ti].is_some() => {
                best_scores.insert(topic.id(), score);
            }
            _ => unclaimed_topics.push(topic.id()),
        }
    }

    debug!(
        clusters = clusters.len(),
        topics = topics.len(),
        mapped = mapped.len(),
        displacements = state.displacements,
        "alignment finished"
    );
    if !unclaimed_topics.is_empty() {
        debug!(?unclaimed_topics, "topics left without a claimant");
    }

    Alignment {
        cluster_order: clusters.iter().map(|c| c.id()).collect(),
        mapped,
        best_scores,
        unclaimed_topics,
        displacements: state.displacements,
    }
}

/// Runs one claim step for cluster `ci`. Returns the cluster it displaced,
/// which the caller must put back through this step.
fn claim_topic(ci: usize, scores: &[f64], state: &mut AlignState) -> Option<usize> {
    let mut choice: Option<(usize, f64)> = None;
    for (ti, &score) in scores.iter().enumerate() {
        if score <= 0.0 {
            continue;
        }
        let eligible = match (state.holder[ti], state.best[ti]) {
            (None, _) => true,
            (Some(h), _) if h == ci => false,
            (Some(_), Some(best)) => score > best,
            (Some(_), None) => true,
        };
        if !eligible {
            continue;
        }
        if choice.is_none_or(|(_, s)| score > s) {
            choice = Some((ti, score));
        }
    }

    let (ti, score) = choice?;
    state.best[ti] = Some(score);
    state.topic_of[ci] = Some(ti);
    let displaced = state.holder[ti].replace(ci)?;
    state.topic_of[displaced] = None;
    state.displacements += 1;
    Some(displaced)
}

fn first_by_id<'a>(items: &'a [ScoredCluster], what: &str) -> Vec<&'a ScoredCluster> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        if seen.insert(item.id()) {
            out.push(item);
        } else {
            debug!(id = item.id(), kind = what, "duplicate id ignored by aligner");
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_align.rs"]
mod tests;
