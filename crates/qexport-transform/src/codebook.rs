//! Codebook feature record transform
//!
//! Describes every column of the answers export: one row per question, per answer option
//! and per enumerated value, each with the condition gating it. Structure rows must arrive
//! ordered by question; a new question id starts a new question row.

use crate::naming::{self, NameContext, normalize_diacritics};
use crate::planner::{SAMPLE_SLOTS, answer_option_column_name};
use qexport_model::{AnswerType, Condition, ConditionType, StructureRow};
use serde::Serialize;
use std::collections::HashMap;

/// Category written for the missing row of an answer option or value
const MISSING_CATEGORY: &str = "missing";
const MISSING_CODE: &str = ".";

/// One codebook CSV row
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CodebookRecord {
    pub questionnaire_id: i64,
    pub questionnaire_version: i64,
    pub questionnaire_name: String,
    pub variable_name: Option<String>,
    pub column_name: String,
    pub answer_position: String,
    pub text_level_1: Option<String>,
    pub text_level_2: Option<String>,
    pub answer_option_text: Option<String>,
    pub answer_type: Option<String>,
    pub answer_category: Option<String>,
    pub answer_category_code: Option<String>,
    pub valid_min: Option<String>,
    pub valid_max: Option<String>,
    pub answer_required: bool,
    pub condition_question: bool,
    pub condition_question_type: Option<String>,
    pub condition_question_questionnaire_id: Option<i64>,
    pub condition_question_questionnaire_version: Option<i64>,
    pub condition_question_column_name: Option<String>,
    pub condition_question_operand: Option<String>,
    pub condition_question_answer_value: Option<String>,
    pub condition_question_link: Option<String>,
}

impl CodebookRecord {
    fn normalized(mut self) -> Self {
        let normalize = |value: &mut Option<String>| {
            if let Some(text) = value {
                *text = normalize_diacritics(text);
            }
        };
        self.questionnaire_name = normalize_diacritics(&self.questionnaire_name);
        self.column_name = normalize_diacritics(&self.column_name);
        normalize(&mut self.variable_name);
        normalize(&mut self.text_level_1);
        normalize(&mut self.text_level_2);
        normalize(&mut self.answer_option_text);
        normalize(&mut self.answer_category);
        normalize(&mut self.condition_question_column_name);
        normalize(&mut self.condition_question_answer_value);
        self
    }
}

/// Answer option column names that condition targets resolve to
pub fn answer_option_columns(rows: &[StructureRow]) -> HashMap<i64, String> {
    rows.iter()
        .filter_map(|row| {
            let answer_option_id = row.answer_option_id?;
            let context = NameContext {
                questionnaire_id: row.questionnaire_id,
                questionnaire_name: &row.questionnaire_name,
                questionnaire_version: row.questionnaire_version,
            };
            Some((answer_option_id, answer_option_column_name(&context, row)))
        })
        .collect()
}

fn condition_type_label(condition_type: ConditionType) -> &'static str {
    match condition_type {
        ConditionType::InternalThis => "on current questionnaire",
        ConditionType::InternalLast => "on last questionnaire instance",
        ConditionType::External => "on external questionnaire",
    }
}

fn answer_type_label(answer_type: AnswerType, is_decimal: bool) -> String {
    match answer_type {
        AnswerType::SingleSelect => "single choice".to_string(),
        AnswerType::MultiSelect => "multiple choice".to_string(),
        AnswerType::Number if is_decimal => "numeric float".to_string(),
        AnswerType::Number => "numeric integer".to_string(),
        other => other.as_str().to_string(),
    }
}

/// Value row parameters
#[derive(Debug, Default)]
struct Category<'a> {
    label: Option<&'a str>,
    code: Option<String>,
    value_text: Option<&'a str>,
    value_position: Option<usize>,
    column_name: Option<String>,
}

impl Category<'_> {
    fn missing() -> Self {
        Self {
            label: Some(MISSING_CATEGORY),
            code: Some(MISSING_CODE.to_string()),
            ..Self::default()
        }
    }
}

/// Turns ordered structure rows into codebook records
#[derive(Debug, Default)]
pub struct CodebookTransform {
    current_question: Option<i64>,
    /// Answer option id → column name, for condition targets
    targets: HashMap<i64, String>,
}

impl CodebookTransform {
    pub fn new(targets: HashMap<i64, String>) -> Self {
        Self {
            current_question: None,
            targets,
        }
    }

    /// Codebook records for one structure row
    pub fn records(&mut self, row: &StructureRow) -> Vec<CodebookRecord> {
        let mut records = Vec::new();

        if self.current_question != Some(row.question_id) {
            records.push(self.question_record(row));
            self.current_question = Some(row.question_id);
        }

        if let Some(answer_type) = row.answer_type {
            match answer_type {
                AnswerType::SingleSelect => self.single_select(row, &mut records),
                AnswerType::MultiSelect => self.multi_select(row, &mut records),
                AnswerType::Sample => self.sample(row, &mut records),
                _ => {
                    records.push(self.answer_option_record(row, Category::default()));
                    records.push(self.answer_option_record(row, Category::missing()));
                }
            }
        }

        records.into_iter().map(CodebookRecord::normalized).collect()
    }

    fn single_select(&self, row: &StructureRow, records: &mut Vec<CodebookRecord>) {
        let text = row.answer_option_text.as_deref();
        for (index, value) in row.values.iter().enumerate() {
            records.push(self.answer_option_record(
                row,
                Category {
                    label: Some(value.as_str()),
                    code: row.values_code.get(index).map(ToString::to_string),
                    value_text: text,
                    ..Category::default()
                },
            ));
        }
        records.push(self.answer_option_record(
            row,
            Category {
                value_text: text,
                ..Category::missing()
            },
        ));
    }

    fn multi_select(&self, row: &StructureRow, records: &mut Vec<CodebookRecord>) {
        records.push(self.answer_option_record(row, Category::default()));
        let option_column = self.option_column(row);

        for (index, value) in row.values.iter().enumerate() {
            let position = index + 1;
            let column_name = naming::multi_select_value(&option_column, value);
            let categories = [
                Category {
                    label: Some("yes"),
                    code: Some("1".to_string()),
                    ..Category::default()
                },
                Category {
                    label: Some("no"),
                    code: Some("0".to_string()),
                    ..Category::default()
                },
                Category::missing(),
            ];
            for category in categories {
                records.push(self.value_record(
                    row,
                    Category {
                        value_text: Some(value.as_str()),
                        value_position: Some(position),
                        column_name: Some(column_name.clone()),
                        ..category
                    },
                    None,
                ));
            }
        }
    }

    fn sample(&self, row: &StructureRow, records: &mut Vec<CodebookRecord>) {
        let option_column = self.option_column(row);
        for slot in 1..=SAMPLE_SLOTS {
            let column_name = naming::sample_slot(&option_column, slot);
            for category in [Category::default(), Category::missing()] {
                records.push(self.value_record(
                    row,
                    Category {
                        column_name: Some(column_name.clone()),
                        ..category
                    },
                    row.answer_option_text.clone(),
                ));
            }
        }
    }

    fn context<'a>(&self, row: &'a StructureRow) -> NameContext<'a> {
        NameContext {
            questionnaire_id: row.questionnaire_id,
            questionnaire_name: &row.questionnaire_name,
            questionnaire_version: row.questionnaire_version,
        }
    }

    fn option_column(&self, row: &StructureRow) -> String {
        answer_option_column_name(&self.context(row), row)
    }

    fn question_record(&self, row: &StructureRow) -> CodebookRecord {
        let mut record = CodebookRecord {
            questionnaire_id: row.questionnaire_id,
            questionnaire_version: row.questionnaire_version,
            questionnaire_name: row.questionnaire_name.clone(),
            variable_name: row.question_variable_name.clone(),
            column_name: self
                .context(row)
                .question(row.question_variable_name.as_deref(), row.question_position),
            answer_position: naming::answer_position(row.question_position, None, None),
            text_level_1: Some(row.question_text.clone()),
            answer_required: row.is_mandatory,
            ..CodebookRecord::default()
        };
        self.apply_condition(&mut record, row.question_condition.as_ref());
        record
    }

    fn answer_option_record(&self, row: &StructureRow, category: Category<'_>) -> CodebookRecord {
        let mut record = CodebookRecord {
            questionnaire_id: row.questionnaire_id,
            questionnaire_version: row.questionnaire_version,
            questionnaire_name: row.questionnaire_name.clone(),
            variable_name: row.answer_option_variable_name.clone(),
            column_name: category
                .column_name
                .unwrap_or_else(|| self.option_column(row)),
            answer_position: naming::answer_position(
                row.question_position,
                row.answer_option_position,
                category.value_position,
            ),
            text_level_2: row.answer_option_text.clone(),
            answer_option_text: category.value_text.map(str::to_string),
            answer_type: row
                .answer_type
                .map(|answer_type| answer_type_label(answer_type, row.is_decimal)),
            answer_category: category.label.map(str::to_string),
            answer_category_code: category.code,
            valid_min: row.restriction_min.map(|value| value.to_string()),
            valid_max: row.restriction_max.map(|value| value.to_string()),
            answer_required: row.is_mandatory,
            ..CodebookRecord::default()
        };
        let condition = row
            .answer_option_condition
            .as_ref()
            .or(row.question_condition.as_ref());
        self.apply_condition(&mut record, condition);
        record
    }

    /// Rows below an answer option: one per multi-select value or sample slot
    fn value_record(
        &self,
        row: &StructureRow,
        category: Category<'_>,
        text_level_2: Option<String>,
    ) -> CodebookRecord {
        CodebookRecord {
            text_level_2,
            ..self.answer_option_record(row, category)
        }
    }

    fn apply_condition(&self, record: &mut CodebookRecord, condition: Option<&Condition>) {
        let Some(condition) = condition else {
            return;
        };
        record.condition_question = true;
        record.condition_question_type =
            Some(condition_type_label(condition.condition_type).to_string());
        record.condition_question_questionnaire_id = condition.target_questionnaire;
        record.condition_question_questionnaire_version = condition.target_questionnaire_version;
        record.condition_question_column_name = condition
            .target()
            .and_then(|target| self.targets.get(&target).cloned());
        record.condition_question_operand = Some(condition.operand.as_str().to_string());
        record.condition_question_answer_value = Some(condition.value.clone());
        record.condition_question_link = Some(condition.link.as_str().to_string());
    }
}
