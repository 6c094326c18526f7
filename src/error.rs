use arrow::error::ArrowError;
use thiserror::Error;

/// Every failure an operation can report back to the user.
///
/// None of these are fatal: the UI turns each into a status message and the
/// session carries on with whatever dataset it held before.
#[derive(Debug, Error)]
pub enum ExploreError {
    /// The upload could not be decoded or parsed into a dataset.
    #[error("Error loading file: {0}")]
    Parse(String),

    /// An operation needing a dataset ran before anything was loaded.
    #[error("No dataset loaded. Load a CSV file in the 'Load data' section first.")]
    NoDataset,

    /// A user-entered value failed conversion or bounds checks.
    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Engine(#[from] ArrowError),
}

impl ExploreError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        ExploreError::InvalidInput(msg.into())
    }
}

pub type Result<T, E = ExploreError> = std::result::Result<T, E>;
