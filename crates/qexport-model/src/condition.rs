//! Branching conditions on questionnaires, questions and answer options

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where the answer a condition refers to lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionType {
    /// Answer option within the same questionnaire instance
    InternalThis,
    /// Answer option of the previous instance (not evaluated by the export)
    InternalLast,
    /// Answer option of another questionnaire version, resolved against the participant's
    /// most recent released instance of it
    External,
}

impl ConditionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionType::InternalThis => "internal_this",
            ConditionType::InternalLast => "internal_last",
            ConditionType::External => "external",
        }
    }
}

impl FromStr for ConditionType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "internal_this" => Ok(ConditionType::InternalThis),
            "internal_last" => Ok(ConditionType::InternalLast),
            "external" => Ok(ConditionType::External),
            other => Err(ModelError::UnknownConditionType(other.to_string())),
        }
    }
}

/// Comparison applied between one answer value and one condition value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionOperand {
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "\\=")]
    NotEqual,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = ">=")]
    GreaterOrEqual,
}

impl ConditionOperand {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionOperand::Equal => "==",
            ConditionOperand::NotEqual => "\\=",
            ConditionOperand::Less => "<",
            ConditionOperand::Greater => ">",
            ConditionOperand::LessOrEqual => "<=",
            ConditionOperand::GreaterOrEqual => ">=",
        }
    }

    /// Whether the operand only asks for (in)equality
    pub fn is_equality(&self) -> bool {
        matches!(self, ConditionOperand::Equal | ConditionOperand::NotEqual)
    }
}

impl fmt::Display for ConditionOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConditionOperand {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "==" => Ok(ConditionOperand::Equal),
            "\\=" => Ok(ConditionOperand::NotEqual),
            "<" => Ok(ConditionOperand::Less),
            ">" => Ok(ConditionOperand::Greater),
            "<=" => Ok(ConditionOperand::LessOrEqual),
            ">=" => Ok(ConditionOperand::GreaterOrEqual),
            other => Err(ModelError::UnknownOperand(other.to_string())),
        }
    }
}

/// How the matches of a multi-valued condition are combined
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConditionLink {
    /// Every condition value is matched by some answer value
    And,
    /// At least one answer/condition pair matches
    #[default]
    Or,
    /// Exactly one answer/condition pair matches
    Xor,
}

impl ConditionLink {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionLink::And => "AND",
            ConditionLink::Or => "OR",
            ConditionLink::Xor => "XOR",
        }
    }
}

impl fmt::Display for ConditionLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConditionLink {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AND" => Ok(ConditionLink::And),
            "OR" => Ok(ConditionLink::Or),
            "XOR" => Ok(ConditionLink::Xor),
            other => Err(ModelError::UnknownLink(other.to_string())),
        }
    }
}

/// A branching rule gating a questionnaire, question or answer option
///
/// An absent condition means "no gating". A condition without target answer option is
/// malformed and is treated as not met by every evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: ConditionType,
    #[serde(default)]
    pub target_answer_option: Option<i64>,
    #[serde(default)]
    pub target_questionnaire: Option<i64>,
    #[serde(default)]
    pub target_questionnaire_version: Option<i64>,
    pub operand: ConditionOperand,
    /// One or more values joined with `;`
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub link: ConditionLink,
}

impl Condition {
    /// Create an `internal_this` condition targeting an answer option of the same instance
    pub fn internal(
        target_answer_option: i64,
        operand: ConditionOperand,
        value: impl Into<String>,
        link: ConditionLink,
    ) -> Self {
        Self {
            condition_type: ConditionType::InternalThis,
            target_answer_option: Some(target_answer_option),
            target_questionnaire: None,
            target_questionnaire_version: None,
            operand,
            value: value.into(),
            link,
        }
    }

    /// Create an `external` condition targeting an answer option of another questionnaire
    pub fn external(
        target_questionnaire: i64,
        target_questionnaire_version: i64,
        target_answer_option: i64,
        operand: ConditionOperand,
        value: impl Into<String>,
        link: ConditionLink,
    ) -> Self {
        Self {
            condition_type: ConditionType::External,
            target_answer_option: Some(target_answer_option),
            target_questionnaire: Some(target_questionnaire),
            target_questionnaire_version: Some(target_questionnaire_version),
            operand,
            value: value.into(),
            link,
        }
    }

    /// Whether this condition refers to an answer option of the same instance
    pub fn is_internal_this(&self) -> bool {
        self.condition_type == ConditionType::InternalThis
    }

    /// Target answer option, `None` for malformed conditions
    pub fn target(&self) -> Option<i64> {
        self.target_answer_option
    }
}
