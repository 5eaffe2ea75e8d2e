use std::collections::BTreeSet;

use crate::model::alignment::Alignment;
use crate::model::cluster::{ScoredCluster, index_by_id};

/// Linear interpolation of two scored collections for the same document.
///
/// Every primary cluster is emitted under its own id with
/// `lambda * primary + (1 - lambda) * secondary`, where the secondary score
/// comes from the aligned id and counts as zero when that id is absent.
/// Secondary entries nobody was aligned to follow with
/// `(1 - lambda) * secondary`. Output order is not meaningful.
pub fn interpolate(
    primary: &[ScoredCluster],
    secondary: &[ScoredCluster],
    lambda: f64,
    alignment: &Alignment,
) -> Vec<ScoredCluster> {
    debug_assert!((0.0..=1.0).contains(&lambda));
    let by_id = index_by_id(secondary);
    let mut targeted = BTreeSet::new();
    let mut out = Vec::with_capacity(primary.len() + secondary.len());

    for cluster in primary {
        let aligned = alignment.topic_for(cluster.id());
        if let Some(topic) = aligned {
            targeted.insert(topic);
        }
        let score = match aligned.and_then(|t| by_id.get(&t)) {
            Some(other) => lambda * cluster.score() + (1.0 - lambda) * other.score(),
            None => lambda * cluster.score(),
        };
        out.push(cluster.with_score(score));
    }

    let mut emitted = BTreeSet::new();
    for other in secondary {
        if targeted.contains(&other.id()) || !emitted.insert(other.id()) {
            continue;
        }
        out.push(other.with_score((1.0 - lambda) * other.score()));
    }

    out
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_interpolate.rs"]
mod tests;
