//! Questionnaire structure

use crate::answer_type::AnswerType;
use crate::condition::Condition;
use serde::{Deserialize, Serialize};

/// Identifies one questionnaire version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionnaireRef {
    pub id: i64,
    pub version: i64,
}

impl QuestionnaireRef {
    pub fn new(id: i64, version: i64) -> Self {
        Self { id, version }
    }
}

/// One version of a questionnaire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Questionnaire {
    pub id: i64,
    pub version: i64,
    pub name: String,
    #[serde(default)]
    pub study_id: String,
    /// Top-level condition deciding whether the whole questionnaire applies
    #[serde(default)]
    pub condition: Option<Condition>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Questionnaire {
    pub fn reference(&self) -> QuestionnaireRef {
        QuestionnaireRef::new(self.id, self.version)
    }
}

/// A question of one questionnaire version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub position: i64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub variable_name: Option<String>,
    #[serde(default)]
    pub is_mandatory: bool,
    #[serde(default)]
    pub condition: Option<Condition>,
    #[serde(default)]
    pub answer_options: Vec<AnswerOption>,
}

/// An answer option belonging to exactly one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: i64,
    pub position: i64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub variable_name: Option<String>,
    pub answer_type: AnswerType,
    /// Enumerated values of select and sample types
    #[serde(default)]
    pub values: Vec<String>,
    /// Codes of `values`, index-aligned
    #[serde(default)]
    pub values_code: Vec<i64>,
    #[serde(default)]
    pub restriction_min: Option<f64>,
    #[serde(default)]
    pub restriction_max: Option<f64>,
    #[serde(default)]
    pub is_decimal: bool,
    #[serde(default)]
    pub condition: Option<Condition>,
}
