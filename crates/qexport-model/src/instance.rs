//! Questionnaire instances and their answers

use crate::error::ModelError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle status of a questionnaire instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStatus {
    Inactive,
    Active,
    InProgress,
    Released,
    ReleasedOnce,
    ReleasedTwice,
    Expired,
    Deleted,
}

impl InstanceStatus {
    /// Statuses whose answers count as released
    pub const RELEASED: [InstanceStatus; 3] = [
        InstanceStatus::Released,
        InstanceStatus::ReleasedOnce,
        InstanceStatus::ReleasedTwice,
    ];

    pub fn is_released(&self) -> bool {
        Self::RELEASED.contains(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceStatus::Inactive => "inactive",
            InstanceStatus::Active => "active",
            InstanceStatus::InProgress => "in_progress",
            InstanceStatus::Released => "released",
            InstanceStatus::ReleasedOnce => "released_once",
            InstanceStatus::ReleasedTwice => "released_twice",
            InstanceStatus::Expired => "expired",
            InstanceStatus::Deleted => "deleted",
        }
    }

    /// Status reported in the `answer_status` export column
    pub fn answer_status(&self) -> Option<AnswerStatus> {
        match self {
            InstanceStatus::Active => Some(AnswerStatus::PendingAnswer),
            InstanceStatus::Expired => Some(AnswerStatus::ExpiredAnswer),
            InstanceStatus::InProgress => Some(AnswerStatus::InProgressAnswer),
            InstanceStatus::Released => Some(AnswerStatus::LatestStudyAssistantAnswer),
            InstanceStatus::ReleasedOnce => Some(AnswerStatus::ModifiableParticipantAnswer),
            InstanceStatus::ReleasedTwice => Some(AnswerStatus::FinalParticipantAnswer),
            InstanceStatus::Inactive | InstanceStatus::Deleted => None,
        }
    }
}

impl FromStr for InstanceStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| ModelError::UnknownStatus(s.to_string()))
    }
}

/// Export-facing classification of an instance's answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatus {
    PendingAnswer,
    ExpiredAnswer,
    InProgressAnswer,
    LatestStudyAssistantAnswer,
    ModifiableParticipantAnswer,
    FinalParticipantAnswer,
}

impl AnswerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerStatus::PendingAnswer => "pending_answer",
            AnswerStatus::ExpiredAnswer => "expired_answer",
            AnswerStatus::InProgressAnswer => "in_progress_answer",
            AnswerStatus::LatestStudyAssistantAnswer => "latest_study_assistant_answer",
            AnswerStatus::ModifiableParticipantAnswer => "modifiable_participant_answer",
            AnswerStatus::FinalParticipantAnswer => "final_participant_answer",
        }
    }
}

/// One answer inside an [`InstanceRow`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowAnswer {
    pub answer_option_id: i64,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub file_id: Option<i64>,
    #[serde(default)]
    pub file_name: Option<String>,
}

impl RowAnswer {
    pub fn new(answer_option_id: i64, value: impl Into<String>) -> Self {
        Self {
            answer_option_id,
            value: Some(value.into()),
            file_id: None,
            file_name: None,
        }
    }

    /// The value, treating empty strings as absent
    pub fn non_empty_value(&self) -> Option<&str> {
        self.value.as_deref().filter(|value| !value.is_empty())
    }
}

/// Answer snapshot of one questionnaire instance of one participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceRow {
    pub instance_id: i64,
    pub participant: String,
    #[serde(default)]
    pub is_test_participant: bool,
    pub cycle: i64,
    pub date_of_issue: DateTime<Utc>,
    #[serde(default)]
    pub answer_date: Option<DateTime<Utc>>,
    pub status: InstanceStatus,
    #[serde(default)]
    pub answers: Vec<RowAnswer>,
}

impl InstanceRow {
    /// Answer recorded for an answer option, if any
    pub fn answer(&self, answer_option_id: i64) -> Option<&RowAnswer> {
        self.answers
            .iter()
            .find(|answer| answer.answer_option_id == answer_option_id)
    }
}

/// Minimal view of an instance used to resolve external conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceHead {
    pub id: i64,
    pub status: InstanceStatus,
    #[serde(default)]
    pub release_version: Option<i64>,
}

impl InstanceHead {
    /// Versioning of the answers that were current when the instance was released
    ///
    /// `released` instances use their own release version, `released_once` answers carry
    /// version 1 and `released_twice` answers version 2. Unreleased instances have none.
    pub fn answer_version(&self) -> Option<i64> {
        match self.status {
            InstanceStatus::Released => self.release_version,
            InstanceStatus::ReleasedOnce => Some(1),
            InstanceStatus::ReleasedTwice => Some(2),
            _ => None,
        }
    }
}

/// A stored, versioned answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub instance_id: i64,
    pub answer_option_id: i64,
    #[serde(default = "default_versioning")]
    pub versioning: i64,
    pub value: String,
}

fn default_versioning() -> i64 {
    1
}
