//! Export configuration

use crate::error::{ExportError, ExportResult};
use chrono::{DateTime, Utc};
use qexport_model::QuestionnaireRef;
use qexport_transform::{DEFAULT_DELIMITER, ValueFormatter};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Archive content an export can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// One answers CSV per questionnaire version, plus referenced files
    Answers,
    /// One codebook CSV per questionnaire version
    Codebook,
}

impl Feature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Answers => "answers",
            Feature::Codebook => "codebook",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "answers" => Ok(Feature::Answers),
            "codebook" => Ok(Feature::Codebook),
            other => Err(ExportError::invalid_options(format!("unknown feature '{other}'"))),
        }
    }
}

/// What to export and how to render it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportOptions {
    pub study_name: String,
    /// Questionnaire versions to export; the codebook falls back to every version of the study
    #[serde(default)]
    pub questionnaires: Vec<QuestionnaireRef>,
    #[serde(default = "default_features")]
    pub features: Vec<Feature>,
    /// Participants to include, all when absent
    #[serde(default)]
    pub participants: Option<Vec<String>>,
    /// Earliest date of issue of exported instances
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    /// Latest date of issue of exported instances
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub utc_offset_minutes: i32,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Abort the export after this many seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_features() -> Vec<Feature> {
    vec![Feature::Answers, Feature::Codebook]
}

fn default_delimiter() -> char {
    char::from(DEFAULT_DELIMITER)
}

impl ExportOptions {
    pub fn new(study_name: impl Into<String>) -> Self {
        Self {
            study_name: study_name.into(),
            questionnaires: Vec::new(),
            features: default_features(),
            participants: None,
            start_date: None,
            end_date: None,
            utc_offset_minutes: 0,
            delimiter: default_delimiter(),
            timeout_secs: None,
        }
    }

    /// Load options from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> ExportResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|err| {
            ExportError::invalid_options(format!("cannot read {}: {err}", path.display()))
        })?;
        content.parse()
    }

    /// Check option combinations that cannot produce a meaningful export
    pub fn validate(&self) -> ExportResult<()> {
        if self.study_name.trim().is_empty() {
            return Err(ExportError::invalid_options("study_name must not be empty"));
        }
        if self.features.is_empty() {
            return Err(ExportError::invalid_options("no feature requested"));
        }
        if self.features.contains(&Feature::Answers) && self.questionnaires.is_empty() {
            return Err(ExportError::invalid_options(
                "answers can only be exported for explicit questionnaires",
            ));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date)
            && start > end
        {
            return Err(ExportError::invalid_options("start_date is after end_date"));
        }
        self.delimiter_byte()?;
        self.formatter()?;
        Ok(())
    }

    /// Delimiter as the single byte the CSV writer needs
    pub fn delimiter_byte(&self) -> ExportResult<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(|byte| byte.is_ascii() && !matches!(byte, b'"' | b'\n' | b'\r'))
            .ok_or_else(|| {
                ExportError::invalid_options(format!("unusable delimiter {:?}", self.delimiter))
            })
    }

    pub fn formatter(&self) -> ExportResult<ValueFormatter> {
        Ok(ValueFormatter::with_utc_offset(self.utc_offset_minutes)?)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn wants(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }
}

impl FromStr for ExportOptions {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s).map_err(|err| ExportError::invalid_options(err.to_string()))
    }
}
