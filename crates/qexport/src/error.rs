//! Error types for export runs

use qexport_archive::ArchiveError;
use qexport_eval::ProviderError;
use qexport_transform::TransformError;
use thiserror::Error;

/// Result type for persistence reads
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for export runs
pub type ExportResult<T> = Result<T, ExportError>;

/// Persistence layer error
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Questionnaire {id} v{version} not found")]
    QuestionnaireNotFound { id: i64, version: i64 },

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Invalid data: {0}")]
    InvalidData(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn query_failed(message: impl Into<String>) -> Self {
        Self::QueryFailed(message.into())
    }
}

impl From<StoreError> for ProviderError {
    fn from(err: StoreError) -> Self {
        ProviderError::QueryFailed(err.to_string())
    }
}

impl From<StoreError> for ArchiveError {
    fn from(err: StoreError) -> Self {
        ArchiveError::upstream(err.to_string())
    }
}

/// Export run error
///
/// Only option validation and archive writer failures end an export. Everything that goes
/// wrong inside one feature is reported on that feature's entries, which are left out or
/// truncated.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Invalid export options: {0}")]
    InvalidOptions(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

impl ExportError {
    pub fn invalid_options(message: impl Into<String>) -> Self {
        Self::InvalidOptions(message.into())
    }
}

impl From<ExportError> for ArchiveError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::Archive(err) => err,
            other => ArchiveError::upstream(other.to_string()),
        }
    }
}
