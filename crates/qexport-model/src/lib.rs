//! Data model for the questionnaire export engine
//!
//! This crate holds the read-only snapshots the export works on:
//!
//! - **Structure**: [`Questionnaire`], [`Question`], [`AnswerOption`] and the flattened
//!   [`StructureRow`] join used to plan export columns
//! - **Conditions**: [`Condition`] with its [`ConditionType`], [`ConditionOperand`] and
//!   [`ConditionLink`]
//! - **Answers**: [`InstanceRow`] (one answer snapshot per questionnaire instance),
//!   [`Answer`] and [`InstanceHead`] for external condition lookups
//! - **Cells**: [`Cell`] and the closed set of [`Missing`] codes
//!
//! Multi-valued answers and condition values share one convention: sub-values are joined
//! with [`VALUE_SEPARATOR`].

pub mod answer_type;
pub mod condition;
pub mod error;
pub mod file;
pub mod instance;
pub mod missing;
pub mod question;
pub mod structure;

pub use answer_type::AnswerType;
pub use condition::{Condition, ConditionLink, ConditionOperand, ConditionType};
pub use error::{ModelError, ModelResult};
pub use file::UserFile;
pub use instance::{Answer, AnswerStatus, InstanceHead, InstanceRow, InstanceStatus, RowAnswer};
pub use missing::{Cell, Missing};
pub use question::{AnswerOption, Question, Questionnaire, QuestionnaireRef};
pub use structure::StructureRow;

/// Separator between the sub-values of multi-valued answers and condition values
pub const VALUE_SEPARATOR: char = ';';

/// Split a stored value into its sub-values
///
/// A value without separator yields exactly one token, an empty string yields one empty token.
pub fn split_values(value: &str) -> impl Iterator<Item = &str> {
    value.split(VALUE_SEPARATOR)
}
