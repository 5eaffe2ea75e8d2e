use std::collections::BTreeMap;

/// Sentinel written for clusters that end without a topic.
pub const UNMAPPED: i64 = -1;

/// Cluster id → topic id mapping produced by one aligner run. Injective over
/// mapped entries; rebuilt from scratch rather than edited.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Alignment {
    pub(crate) cluster_order: Vec<i64>,
    pub(crate) mapped: BTreeMap<i64, i64>,
    pub(crate) best_scores: BTreeMap<i64, f64>,
    pub(crate) unclaimed_topics: Vec<i64>,
    pub(crate) displacements: usize,
}

impl Alignment {
    pub fn topic_for(&self, cluster_id: i64) -> Option<i64> {
        self.mapped.get(&cluster_id).copied()
    }

    pub fn best_score(&self, topic_id: i64) -> Option<f64> {
        self.best_scores.get(&topic_id).copied()
    }

    pub fn mapped(&self) -> &BTreeMap<i64, i64> {
        &self.mapped
    }

    /// Cluster ids in input order that ended without a topic.
    pub fn unmapped_clusters(&self) -> Vec<i64> {
        self.cluster_order
            .iter()
            .copied()
            .filter(|id| !self.mapped.contains_key(id))
            .collect()
    }

    pub fn unclaimed_topics(&self) -> &[i64] {
        &self.unclaimed_topics
    }

    pub fn displacements(&self) -> usize {
        self.displacements
    }

    /// `(cluster, topic-or-UNMAPPED)` in cluster input order.
    pub fn entries(&self) -> Vec<(i64, i64)> {
        self.cluster_order
            .iter()
            .map(|&id| (id, self.topic_for(id).unwrap_or(UNMAPPED)))
            .collect()
    }
}
