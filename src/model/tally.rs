use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Which documents and errors feed precision and recall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    /// Only documents where the candidate was evaluated against gold.
    Strict,
    /// Strict plus guesses made on documents without gold for the type.
    AllGuessed,
    /// All-guessed plus gold the candidate never saw.
    FullDomain,
}

impl Tier {
    pub fn all() -> &'static [Tier] {
        &[Tier::Strict, Tier::AllGuessed, Tier::FullDomain]
    }

    pub fn name(self) -> &'static str {
        match self {
            Tier::Strict => "strict",
            Tier::AllGuessed => "all-guessed",
            Tier::FullDomain => "full-domain",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Prf {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl Prf {
    /// Zero denominators give zero rather than NaN.
    pub fn from_counts(correct: usize, guess_errors: usize, gold_errors: usize) -> Self {
        let precision = ratio(correct, correct + guess_errors);
        let recall = ratio(correct, correct + gold_errors);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        Self {
            precision,
            recall,
            f1,
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Running counts for one (candidate, template type) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub correct: usize,
    pub incorrect: usize,
    pub missed: usize,
    /// Non-optional gold entities in the documents this pair was scored on.
    pub evaluated_gold: usize,
    /// Guesses made on documents with no gold for the type.
    pub no_gold_guesses: usize,
}

impl Counts {
    pub fn tier(&self, tier: Tier, total_gold: usize) -> Prf {
        match tier {
            Tier::Strict => Prf::from_counts(self.correct, self.incorrect, self.missed),
            Tier::AllGuessed => Prf::from_counts(
                self.correct,
                self.incorrect + self.no_gold_guesses,
                self.missed,
            ),
            Tier::FullDomain => Prf::from_counts(
                self.correct,
                self.incorrect + self.no_gold_guesses,
                self.missed + total_gold.saturating_sub(self.evaluated_gold),
            ),
        }
    }
}

/// Counts for one grid point: per candidate id and template type, plus the
/// number of non-optional gold entities per type over the whole answer key.
#[derive(Debug, Clone, Default)]
pub struct EvaluationTally {
    order: Vec<i64>,
    counts: BTreeMap<i64, BTreeMap<String, Counts>>,
    totals: BTreeMap<String, usize>,
    pub flagged: usize,
    pub suppressed: usize,
}

impl EvaluationTally {
    pub fn new(totals: BTreeMap<String, usize>) -> Self {
        Self {
            totals,
            ..Self::default()
        }
    }

    pub fn entry(&mut self, candidate: i64, template_type: &str) -> &mut Counts {
        if !self.counts.contains_key(&candidate) {
            self.order.push(candidate);
        }
        self.counts
            .entry(candidate)
            .or_default()
            .entry(template_type.to_string())
            .or_default()
    }

    pub fn get(&self, candidate: i64, template_type: &str) -> Option<&Counts> {
        self.counts.get(&candidate)?.get(template_type)
    }

    pub fn total_gold(&self, template_type: &str) -> usize {
        self.totals.get(template_type).copied().unwrap_or(0)
    }

    /// Candidate ids in the order they were first accumulated.
    pub fn candidates(&self) -> &[i64] {
        &self.order
    }

    /// Candidate with the highest F1 for `template_type` under `tier`;
    /// the earliest seen candidate wins ties.
    pub fn best_for_type(&self, template_type: &str, tier: Tier) -> Option<(i64, Counts)> {
        let total = self.total_gold(template_type);
        let mut best: Option<(i64, Counts, f64)> = None;
        for &candidate in &self.order {
            let Some(counts) = self.get(candidate, template_type) else {
                continue;
            };
            let f1 = counts.tier(tier, total).f1;
            if best.is_none_or(|(_, _, b)| f1 > b) {
                best = Some((candidate, *counts, f1));
            }
        }
        best.map(|(id, counts, _)| (id, counts))
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/tally.rs"]
mod tests;
