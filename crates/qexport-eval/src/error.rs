//! Evaluation errors
//!
//! These never leave the crate's public decision functions; they describe why a condition
//! was resolved to its conservative outcome and are logged by the caller.

use thiserror::Error;

/// Result type for evaluation helpers
pub type EvalResult<T> = Result<T, EvalError>;

/// Errors that can occur while preparing a condition for evaluation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    /// Condition has no target answer option
    #[error("Condition without target answer option")]
    MissingTarget,

    /// External condition lacks its target questionnaire
    #[error("External condition without target questionnaire for answer option {answer_option}")]
    MissingTargetQuestionnaire { answer_option: i64 },

    /// Condition type the export does not evaluate
    #[error("Unsupported condition type: {condition_type}")]
    UnsupportedConditionType { condition_type: String },

    /// Operand not defined for the answer type
    #[error("Operand {operand} is not defined for {answer_type} answers")]
    UnsupportedOperand {
        operand: String,
        answer_type: String,
    },

    /// Collaborator lookup failed
    #[error("Condition target lookup failed: {message}")]
    Provider { message: String },
}

impl EvalError {
    /// Create an unsupported operand error
    pub fn unsupported_operand(operand: impl Into<String>, answer_type: impl Into<String>) -> Self {
        Self::UnsupportedOperand {
            operand: operand.into(),
            answer_type: answer_type.into(),
        }
    }

    /// Create an unsupported condition type error
    pub fn unsupported_condition_type(condition_type: impl Into<String>) -> Self {
        Self::UnsupportedConditionType {
            condition_type: condition_type.into(),
        }
    }

    /// Create a provider error
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }
}
