//! Transform errors

use thiserror::Error;

/// Result type for planning, formatting and encoding
pub type TransformResult<T> = Result<T, TransformError>;

/// Errors raised while turning structure and answer rows into CSV records
#[derive(Debug, Error)]
pub enum TransformError {
    /// No structure rows were supplied for a questionnaire version
    #[error("Questionnaire structure is empty")]
    EmptyStructure,

    /// Structure rows of several questionnaire versions were mixed
    #[error("Structure rows mix questionnaire {expected} with {found}")]
    MixedStructure { expected: String, found: String },

    /// A date answer could not be parsed
    #[error("Could not parse the date {value:?}")]
    InvalidDate { value: String },

    /// A timestamp answer could not be parsed
    #[error("Could not parse the timestamp {value:?}")]
    InvalidTimestamp { value: String },

    /// A file answer without stored file
    #[error("File reference is missing for answer option {answer_option}")]
    MissingFileReference { answer_option: i64 },

    /// Utc offset outside of ±24h
    #[error("Invalid utc offset of {minutes} minutes")]
    InvalidOffset { minutes: i32 },

    /// CSV serialization failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Encoder buffer could not be flushed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransformError {
    pub fn invalid_date(value: impl Into<String>) -> Self {
        Self::InvalidDate {
            value: value.into(),
        }
    }

    pub fn invalid_timestamp(value: impl Into<String>) -> Self {
        Self::InvalidTimestamp {
            value: value.into(),
        }
    }
}
