//! Answer types of answer options

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Semantic type of an answer option and of the answers recorded for it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerType {
    SingleSelect,
    MultiSelect,
    Number,
    Text,
    Date,
    Sample,
    Pzn,
    Image,
    Timestamp,
    File,
}

impl AnswerType {
    /// All answer types in their canonical order
    pub const ALL: [AnswerType; 10] = [
        AnswerType::SingleSelect,
        AnswerType::MultiSelect,
        AnswerType::Number,
        AnswerType::Text,
        AnswerType::Date,
        AnswerType::Sample,
        AnswerType::Pzn,
        AnswerType::Image,
        AnswerType::Timestamp,
        AnswerType::File,
    ];

    /// Identifier used in serialized structures
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerType::SingleSelect => "single_select",
            AnswerType::MultiSelect => "multi_select",
            AnswerType::Number => "number",
            AnswerType::Text => "text",
            AnswerType::Date => "date",
            AnswerType::Sample => "sample",
            AnswerType::Pzn => "pzn",
            AnswerType::Image => "image",
            AnswerType::Timestamp => "timestamp",
            AnswerType::File => "file",
        }
    }

    /// Whether condition values are compared as floating point numbers
    pub fn is_numeric(&self) -> bool {
        matches!(self, AnswerType::Number | AnswerType::Sample)
    }

    /// Whether answers carry an uploaded file reference
    pub fn is_file(&self) -> bool {
        matches!(self, AnswerType::File | AnswerType::Image)
    }

    /// Whether one answer option expands into several export columns
    pub fn expands(&self) -> bool {
        matches!(self, AnswerType::MultiSelect | AnswerType::Sample)
    }
}

impl fmt::Display for AnswerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnswerType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnswerType::ALL
            .into_iter()
            .find(|ty| ty.as_str() == s)
            .ok_or_else(|| ModelError::UnknownAnswerType(s.to_string()))
    }
}
