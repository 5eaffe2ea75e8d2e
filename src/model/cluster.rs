use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::Write;

use thiserror::Error;

/// A scored bag of tokens: one induced cluster or topic, either from the global
/// inventory or scored against a single document.
///
/// `ordered` always lists the tokens of `token_scores` by descending score
/// (ties by token text), and is rebuilt whenever a token score changes.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCluster {
    id: i64,
    score: f64,
    token_scores: BTreeMap<String, f64>,
    ordered: Vec<String>,
}

#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("empty cluster record")]
    Empty,
    #[error("missing overall score")]
    MissingScore,
    #[error("invalid cluster id '{0}'")]
    BadId(String),
    #[error("invalid score '{0}'")]
    BadScore(String),
    #[error("token entry '{0}' is not of the form token:score")]
    BadToken(String),
    #[error("token '{0}' has a negative score")]
    NegativeToken(String),
    #[error("duplicate token '{0}'")]
    DuplicateToken(String),
}

impl ScoredCluster {
    pub fn new(id: i64, score: f64) -> Self {
        Self {
            id,
            score,
            token_scores: BTreeMap::new(),
            ordered: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn with_tokens<I, S>(id: i64, score: f64, tokens: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut cluster = Self::new(id, score);
        for (token, value) in tokens {
            cluster.token_scores.insert(token.into(), value.max(0.0));
        }
        cluster.reorder();
        cluster
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    /// Derived copy carrying the same id and tokens but a new overall score.
    pub fn with_score(&self, score: f64) -> Self {
        let mut out = self.clone();
        out.score = score;
        out
    }

    pub fn set_token_score(&mut self, token: &str, score: f64) {
        debug_assert!(score >= 0.0, "token scores are non-negative");
        self.token_scores.insert(token.to_string(), score.max(0.0));
        self.reorder();
    }

    pub fn token_score(&self, token: &str) -> Option<f64> {
        self.token_scores.get(token).copied()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.token_scores.contains_key(token)
    }

    pub fn tokens_by_score(&self) -> &[String] {
        &self.ordered
    }

    /// `(token, score)` pairs in descending score order.
    pub fn ranked(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.ordered
            .iter()
            .map(|t| (t.as_str(), self.token_scores[t]))
    }

    /// Unnormalized dot product over shared tokens. Summation follows this
    /// cluster's rank order so repeated calls are bit-identical.
    pub fn dot(&self, other: &ScoredCluster) -> f64 {
        self.ranked()
            .filter_map(|(token, value)| other.token_score(token).map(|theirs| value * theirs))
            .sum()
    }

    fn reorder(&mut self) {
        let mut tokens: Vec<String> = self.token_scores.keys().cloned().collect();
        tokens.sort_by(|a, b| {
            match self.token_scores[b]
                .partial_cmp(&self.token_scores[a])
                .unwrap_or(Ordering::Equal)
            {
                Ordering::Equal => a.cmp(b),
                other => other,
            }
        });
        self.ordered = tokens;
    }

    /// Text record `<id> <score> tok:score ...`, keeping at most `max_tokens`
    /// of the highest scoring tokens.
    pub fn to_record(&self, max_tokens: usize) -> String {
        let mut out = String::new();
        let _ = write!(out, "{} {}", self.id, self.score);
        for (token, value) in self.ranked().take(max_tokens) {
            let _ = write!(out, " {token}:{value}");
        }
        out
    }

    pub fn parse_record(line: &str) -> Result<Self, RecordError> {
        let mut fields = line.split_whitespace();
        let id_field = fields.next().ok_or(RecordError::Empty)?;
        let id = id_field
            .parse::<i64>()
            .map_err(|_| RecordError::BadId(id_field.to_string()))?;
        let score_field = fields.next().ok_or(RecordError::MissingScore)?;
        let score = parse_score(score_field)?;

        let mut cluster = Self::new(id, score);
        for entry in fields {
            let (token, value) = entry
                .rsplit_once(':')
                .filter(|(t, _)| !t.is_empty())
                .ok_or_else(|| RecordError::BadToken(entry.to_string()))?;
            let value = parse_score(value)?;
            if value < 0.0 {
                return Err(RecordError::NegativeToken(token.to_string()));
            }
            if cluster.contains(token) {
                return Err(RecordError::DuplicateToken(token.to_string()));
            }
            cluster.set_token_score(token, value);
        }
        Ok(cluster)
    }
}

fn parse_score(field: &str) -> Result<f64, RecordError> {
    match field.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(RecordError::BadScore(field.to_string())),
    }
}

/// Index of a cluster collection by id; the first occurrence of an id wins.
pub fn index_by_id(clusters: &[ScoredCluster]) -> BTreeMap<i64, &ScoredCluster> {
    let mut out = BTreeMap::new();
    for cluster in clusters {
        out.entry(cluster.id()).or_insert(cluster);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/cluster.rs"]
mod tests;
