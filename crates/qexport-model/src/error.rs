//! Errors raised while reading model values from their textual form

use thiserror::Error;

/// Result type for model conversions
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors that can occur when parsing model enums
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Unknown condition operand
    #[error("Unknown condition operand: {0}")]
    UnknownOperand(String),

    /// Unknown condition link
    #[error("Unknown condition link: {0}")]
    UnknownLink(String),

    /// Unknown condition type
    #[error("Unknown condition type: {0}")]
    UnknownConditionType(String),

    /// Unknown answer type
    #[error("Unknown answer type: {0}")]
    UnknownAnswerType(String),

    /// Unknown questionnaire instance status
    #[error("Unknown instance status: {0}")]
    UnknownStatus(String),
}
