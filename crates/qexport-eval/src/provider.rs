//! Condition target provider
//!
//! Point lookups the evaluator needs to resolve `external` conditions. Implemented by the
//! persistence layer; the export only ever reads through it.

use async_trait::async_trait;
use qexport_model::{Answer, AnswerType, InstanceHead};

/// Lookups used to resolve conditions that point outside the current instance
#[async_trait]
pub trait ConditionTargetProvider: Send + Sync {
    /// Most recent released instance of a questionnaire version for a participant
    ///
    /// "Most recent" means highest cycle among the instances whose status is one of
    /// `released`, `released_once` or `released_twice`.
    async fn latest_released_instance(
        &self,
        participant: &str,
        questionnaire_id: i64,
        questionnaire_version: i64,
    ) -> Result<Option<InstanceHead>, ProviderError>;

    /// Answer type of an answer option
    async fn answer_option_type(
        &self,
        answer_option_id: i64,
    ) -> Result<Option<AnswerType>, ProviderError>;

    /// One exact, versioned answer
    async fn answer(
        &self,
        instance_id: i64,
        answer_option_id: i64,
        versioning: i64,
    ) -> Result<Option<Answer>, ProviderError>;
}

/// Condition target lookup error
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Provider that knows no instances, so every external condition is unmet
pub struct NoOpConditionTargetProvider;

#[async_trait]
impl ConditionTargetProvider for NoOpConditionTargetProvider {
    async fn latest_released_instance(
        &self,
        _participant: &str,
        _questionnaire_id: i64,
        _questionnaire_version: i64,
    ) -> Result<Option<InstanceHead>, ProviderError> {
        Ok(None)
    }

    async fn answer_option_type(
        &self,
        _answer_option_id: i64,
    ) -> Result<Option<AnswerType>, ProviderError> {
        Ok(None)
    }

    async fn answer(
        &self,
        _instance_id: i64,
        _answer_option_id: i64,
        _versioning: i64,
    ) -> Result<Option<Answer>, ProviderError> {
        Ok(None)
    }
}

impl NoOpConditionTargetProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoOpConditionTargetProvider {
    fn default() -> Self {
        Self::new()
    }
}
