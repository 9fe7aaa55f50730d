//! Error types for model fitting and scoring

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FitError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("Sample {index} has no class label")]
    MissingLabel { index: usize },

    #[error("Invalid label: expected 0 or 1, got {0}")]
    InvalidLabel(f64),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type Result<T> = std::result::Result<T, FitError>;
