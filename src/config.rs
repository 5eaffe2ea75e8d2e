use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::taxonomy::{SlotKind, builtin_template_types, canonical_template_type};
use crate::model::tally::Tier;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read grid config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid grid config {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
    #[error("invalid grid config: {0}")]
    Invalid(String),
}

/// Parameter grid and evaluation settings for one gauntlet run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GauntletConfig {
    pub top_doc: Vec<usize>,
    pub top_sent: Vec<usize>,
    /// Score floors for the high-confidence document clusters; `null` turns
    /// that channel off for the grid point.
    pub cutoffs: Vec<Option<f64>>,
    /// Interpolation weights for document clusters against topics. Empty
    /// disables interpolation.
    pub lambdas: Vec<f64>,
    pub template_types: Vec<String>,
    pub slots: Vec<SlotKind>,
    pub rank_tier: Tier,
    pub max_record_tokens: usize,
    pub parallel: bool,
}

impl Default for GauntletConfig {
    fn default() -> Self {
        Self {
            top_doc: vec![1, 2, 3],
            top_sent: vec![0, 1, 2],
            cutoffs: vec![None],
            lambdas: Vec::new(),
            template_types: builtin_template_types()
                .iter()
                .map(|s| s.to_string())
                .collect(),
            slots: SlotKind::all().to_vec(),
            rank_tier: Tier::FullDomain,
            max_record_tokens: 10,
            parallel: false,
        }
    }
}

/// One point of the Cartesian parameter grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridPoint {
    pub index: usize,
    pub top_doc: usize,
    pub top_sent: usize,
    pub cutoff: Option<f64>,
    pub lambda: Option<f64>,
}

impl GauntletConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config: GauntletConfig =
            serde_json::from_str(&text).map_err(|source| ConfigError::Json {
                path: path.display().to_string(),
                source,
            })?;
        config.canonicalize_types()?;
        config.validate()?;
        Ok(config)
    }

    /// Rewrites template types into the form the answer key uses
    /// (`bombing` becomes `BOMBING`).
    pub fn canonicalize_types(&mut self) -> Result<(), ConfigError> {
        for t in &mut self.template_types {
            let canonical = canonical_template_type(t)
                .ok_or_else(|| ConfigError::Invalid(format!("invalid template type '{t}'")))?;
            *t = canonical;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_doc.is_empty() || self.top_sent.is_empty() || self.cutoffs.is_empty() {
            return Err(ConfigError::Invalid(
                "top_doc, top_sent and cutoffs need at least one value".to_string(),
            ));
        }
        if self.cutoffs.iter().flatten().any(|c| c.is_nan()) {
            return Err(ConfigError::Invalid("cutoff is NaN".to_string()));
        }
        if let Some(l) = self.lambdas.iter().find(|l| !(0.0..=1.0).contains(*l)) {
            return Err(ConfigError::Invalid(format!("lambda {l} outside [0, 1]")));
        }
        if self.template_types.is_empty() {
            return Err(ConfigError::Invalid("no template types".to_string()));
        }
        if let Some(t) = self
            .template_types
            .iter()
            .find(|t| canonical_template_type(t).as_deref() != Some(t.as_str()))
        {
            return Err(ConfigError::Invalid(format!(
                "template type '{t}' is not in answer-key form"
            )));
        }
        if self.slots.is_empty() {
            return Err(ConfigError::Invalid("no slots selected".to_string()));
        }
        Ok(())
    }

    pub fn grid_size(&self) -> usize {
        self.top_doc.len() * self.top_sent.len() * self.cutoffs.len() * self.lambdas.len().max(1)
    }

    /// Grid points with `top_doc` varying slowest and `lambda` fastest.
    pub fn grid(&self) -> Vec<GridPoint> {
        let lambdas: Vec<Option<f64>> = if self.lambdas.is_empty() {
            vec![None]
        } else {
            self.lambdas.iter().copied().map(Some).collect()
        };
        let mut out = Vec::with_capacity(self.grid_size());
        for &top_doc in &self.top_doc {
            for &top_sent in &self.top_sent {
                for &cutoff in &self.cutoffs {
                    for &lambda in &lambdas {
                        out.push(GridPoint {
                            index: out.len(),
                            top_doc,
                            top_sent,
                            cutoff,
                            lambda,
                        });
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "../tests/src_inline/config.rs"]
mod tests;
