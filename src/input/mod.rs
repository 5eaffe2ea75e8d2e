use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use thiserror::Error;

pub mod answer_key;
pub mod run_log;

pub use answer_key::{AnswerKey, read_answer_key};
pub use run_log::{RunLog, read_run_log};

#[derive(Debug, Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing input: {0}")]
    MissingInput(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("parse error at {source_name}:{line}: {msg}")]
    Parse {
        source_name: String,
        line: usize,
        msg: String,
    },
}

impl InputError {
    pub fn parse(source_name: &str, line: usize, msg: impl Into<String>) -> Self {
        InputError::Parse {
            source_name: source_name.to_string(),
            line,
            msg: msg.into(),
        }
    }
}

/// Opens a plain or gzip-compressed text file.
pub fn open_maybe_gz(path: &Path) -> Result<Box<dyn BufRead>, InputError> {
    if !path.exists() {
        return Err(InputError::MissingInput(path.display().to_string()));
    }
    let file = File::open(path)?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}
