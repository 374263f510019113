use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors raised while loading the nutrition dataset.
///
/// Matching itself never errors: an absent index degrades every lookup to
/// not-found, and empty queries are not-found by definition.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The dataset file could not be opened or read.
    #[error("failed to read dataset {path}: {source}")]
    DatasetIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A row of the dataset could not be decoded.
    #[error("failed to decode dataset: {0}")]
    DatasetDecode(#[from] csv::Error),
}
