use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while building datasets, networks or running experiments.
#[derive(Error, Debug)]
pub enum Error {
    /// A configuration value is out of range or inconsistent.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A train/test split would leave one side empty.
    #[error("invalid split: {0}")]
    InvalidSplit(String),

    #[error("dataset is empty")]
    EmptyDataset,

    /// Parameter or data shapes disagree with what a component expects.
    #[error("shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    /// `Sequential::fit` was called before `Sequential::compile`.
    #[error("model must be compiled before training")]
    NotCompiled,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn shape(expected: impl ToString, got: impl ToString) -> Self {
        Error::ShapeMismatch {
            expected: expected.to_string(),
            got: got.to_string(),
        }
    }
}
