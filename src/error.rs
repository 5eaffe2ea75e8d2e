use thiserror::Error;

use crate::config::ConfigError;
use crate::input::InputError;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cannot write report {path}: {source}")]
    Output {
        path: String,
        source: std::io::Error,
    },
    #[error("cannot serialize report: {0}")]
    Json(#[from] serde_json::Error),
}
