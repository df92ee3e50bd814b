//! Error types for LLMSense.
//!
//! Only failures that abort an operation live here. Recoverable outcomes
//! (backend down, malformed model output, thin windows) are values, see
//! `Generation`, `ParsedOutput` and `FitOutcome`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SenseError {
    #[error("Invalid record name: {0:?}")]
    InvalidRecordName(String),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl SenseError {
    /// True when the failure was caused by operator input rather than the environment
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            SenseError::InvalidRecordName(_) | SenseError::RecordNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SenseError>;
