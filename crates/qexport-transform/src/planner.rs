//! Column planning
//!
//! Groups flattened structure rows of one questionnaire version back into per-question
//! metadata and the ordered list of export columns. Select and sample answer options expand
//! into several columns:
//!
//! | answer type    | columns                                  |
//! |----------------|------------------------------------------|
//! | none           | 0 (question-only row)                    |
//! | `multi_select` | one per enumerated value                 |
//! | `sample`       | 2 (slot 1 and slot 2)                    |
//! | anything else  | 1                                        |

use crate::error::{TransformError, TransformResult};
use crate::naming::{self, NameContext};
use indexmap::IndexMap;
use qexport_model::{AnswerType, Condition, QuestionnaireRef, StructureRow};
use std::collections::HashMap;

/// Number of sample ids recorded per sample answer
pub const SAMPLE_SLOTS: usize = 2;

/// Conditions gating one column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnConditions {
    /// Condition of the containing question, authoritative when false
    pub question: Option<Condition>,
    pub answer_option: Option<Condition>,
}

impl ColumnConditions {
    pub fn is_empty(&self) -> bool {
        self.question.is_none() && self.answer_option.is_none()
    }
}

/// Type-specific part of a column
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnKind {
    Plain,
    SingleSelect { values: Vec<String>, codes: Vec<i64> },
    MultiSelect { value: String, code: Option<i64> },
    Sample { slot: usize },
}

/// One export column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMeta {
    pub name: String,
    pub question_id: i64,
    pub answer_option_id: i64,
    pub answer_type: AnswerType,
    pub is_mandatory: bool,
    pub conditions: ColumnConditions,
    pub kind: ColumnKind,
}

impl ColumnMeta {
    /// Whether any condition gates this column
    pub fn has_conditions(&self) -> bool {
        !self.conditions.is_empty()
    }
}

/// Metadata of one question
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionMetaInfo {
    pub id: i64,
    pub position: i64,
    pub text: String,
    pub variable_name: Option<String>,
    pub is_mandatory: bool,
    pub condition: Option<Condition>,
    pub column_name: String,
}

/// Planned export layout of one questionnaire version
///
/// Immutable once planned and shared by every row of that version.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportMetaInfo {
    pub id: i64,
    pub name: String,
    pub version: i64,
    /// Top-level condition of the questionnaire
    pub condition: Option<Condition>,
    pub questions: IndexMap<i64, QuestionMetaInfo>,
    pub columns: Vec<ColumnMeta>,
    /// Answer option id → index of its first column
    column_index: HashMap<i64, usize>,
}

impl ExportMetaInfo {
    pub fn reference(&self) -> QuestionnaireRef {
        QuestionnaireRef::new(self.id, self.version)
    }

    /// First column of an answer option
    pub fn column_for(&self, answer_option_id: i64) -> Option<&ColumnMeta> {
        self.column_index
            .get(&answer_option_id)
            .map(|&index| &self.columns[index])
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }
}

/// Plan the export columns of one questionnaire version
///
/// Rows must come ordered by question position and answer option position, as
/// [`StructureRow::flatten`] produces them.
pub fn plan(rows: &[StructureRow]) -> TransformResult<ExportMetaInfo> {
    let first = rows.first().ok_or(TransformError::EmptyStructure)?;
    let reference = first.questionnaire();
    let context = NameContext {
        questionnaire_id: first.questionnaire_id,
        questionnaire_name: &first.questionnaire_name,
        questionnaire_version: first.questionnaire_version,
    };

    let mut questions = IndexMap::new();
    let mut columns = Vec::new();

    for row in rows {
        if row.questionnaire() != reference {
            return Err(TransformError::MixedStructure {
                expected: format!("{}/v{}", reference.id, reference.version),
                found: format!("{}/v{}", row.questionnaire_id, row.questionnaire_version),
            });
        }

        questions
            .entry(row.question_id)
            .or_insert_with(|| QuestionMetaInfo {
                id: row.question_id,
                position: row.question_position,
                text: row.question_text.clone(),
                variable_name: row.question_variable_name.clone(),
                is_mandatory: row.is_mandatory,
                condition: row.question_condition.clone(),
                column_name: context.question(row.question_variable_name.as_deref(), row.question_position),
            });

        columns.extend(columns_for(&context, row));
    }

    let mut column_index = HashMap::new();
    for (index, column) in columns.iter().enumerate() {
        column_index.entry(column.answer_option_id).or_insert(index);
    }

    log::debug!(
        "Planned {} columns for questionnaire {} v{}",
        columns.len(),
        reference.id,
        reference.version
    );

    Ok(ExportMetaInfo {
        id: first.questionnaire_id,
        name: first.questionnaire_name.clone(),
        version: first.questionnaire_version,
        condition: first.questionnaire_condition.clone(),
        questions,
        columns,
        column_index,
    })
}

/// Name of the answer option column of a structure row
pub fn answer_option_column_name(context: &NameContext<'_>, row: &StructureRow) -> String {
    context.answer_option(
        row.question_variable_name.as_deref(),
        row.question_position,
        row.answer_option_variable_name.as_deref(),
        row.answer_option_position.unwrap_or_default(),
    )
}

fn columns_for(context: &NameContext<'_>, row: &StructureRow) -> Vec<ColumnMeta> {
    let (Some(answer_type), Some(answer_option_id)) = (row.answer_type, row.answer_option_id)
    else {
        return Vec::new();
    };

    let name = answer_option_column_name(context, row);
    let column = |name: String, kind: ColumnKind| ColumnMeta {
        name,
        question_id: row.question_id,
        answer_option_id,
        answer_type,
        is_mandatory: row.is_mandatory,
        conditions: ColumnConditions {
            question: row.question_condition.clone(),
            answer_option: row.answer_option_condition.clone(),
        },
        kind,
    };

    match answer_type {
        AnswerType::SingleSelect => vec![column(
            name,
            ColumnKind::SingleSelect {
                values: row.values.clone(),
                codes: row.values_code.clone(),
            },
        )],
        AnswerType::MultiSelect => row
            .values
            .iter()
            .enumerate()
            .map(|(index, value)| {
                column(
                    naming::multi_select_value(&name, value),
                    ColumnKind::MultiSelect {
                        value: value.clone(),
                        code: row.values_code.get(index).copied(),
                    },
                )
            })
            .collect(),
        AnswerType::Sample => (1..=SAMPLE_SLOTS)
            .map(|slot| column(naming::sample_slot(&name, slot), ColumnKind::Sample { slot }))
            .collect(),
        _ => vec![column(name, ColumnKind::Plain)],
    }
}
