//! Flattened questionnaire structure rows

use crate::answer_type::AnswerType;
use crate::condition::Condition;
use crate::question::{Questionnaire, QuestionnaireRef};
use serde::{Deserialize, Serialize};

/// One row of the questionnaire × question × answer option join
///
/// Questions without answer options appear once with every answer option field empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureRow {
    pub questionnaire_id: i64,
    pub questionnaire_name: String,
    pub questionnaire_version: i64,
    #[serde(default)]
    pub questionnaire_condition: Option<Condition>,

    pub question_id: i64,
    pub question_position: i64,
    #[serde(default)]
    pub question_text: String,
    #[serde(default)]
    pub question_variable_name: Option<String>,
    #[serde(default)]
    pub is_mandatory: bool,
    #[serde(default)]
    pub question_condition: Option<Condition>,

    #[serde(default)]
    pub answer_option_id: Option<i64>,
    #[serde(default)]
    pub answer_option_position: Option<i64>,
    #[serde(default)]
    pub answer_option_text: Option<String>,
    #[serde(default)]
    pub answer_option_variable_name: Option<String>,
    #[serde(default)]
    pub answer_type: Option<AnswerType>,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub values_code: Vec<i64>,
    #[serde(default)]
    pub restriction_min: Option<f64>,
    #[serde(default)]
    pub restriction_max: Option<f64>,
    #[serde(default)]
    pub is_decimal: bool,
    #[serde(default)]
    pub answer_option_condition: Option<Condition>,
}

impl StructureRow {
    pub fn questionnaire(&self) -> QuestionnaireRef {
        QuestionnaireRef::new(self.questionnaire_id, self.questionnaire_version)
    }

    /// Flatten a questionnaire into structure rows ordered by question and answer option position
    pub fn flatten(questionnaire: &Questionnaire) -> Vec<StructureRow> {
        let mut questions: Vec<_> = questionnaire.questions.iter().collect();
        questions.sort_by_key(|question| question.position);

        let mut rows = Vec::new();
        for question in questions {
            let base = StructureRow {
                questionnaire_id: questionnaire.id,
                questionnaire_name: questionnaire.name.clone(),
                questionnaire_version: questionnaire.version,
                questionnaire_condition: questionnaire.condition.clone(),
                question_id: question.id,
                question_position: question.position,
                question_text: question.text.clone(),
                question_variable_name: question.variable_name.clone(),
                is_mandatory: question.is_mandatory,
                question_condition: question.condition.clone(),
                answer_option_id: None,
                answer_option_position: None,
                answer_option_text: None,
                answer_option_variable_name: None,
                answer_type: None,
                values: Vec::new(),
                values_code: Vec::new(),
                restriction_min: None,
                restriction_max: None,
                is_decimal: false,
                answer_option_condition: None,
            };

            if question.answer_options.is_empty() {
                rows.push(base);
                continue;
            }

            let mut options: Vec<_> = question.answer_options.iter().collect();
            options.sort_by_key(|option| option.position);
            for option in options {
                rows.push(StructureRow {
                    answer_option_id: Some(option.id),
                    answer_option_position: Some(option.position),
                    answer_option_text: Some(option.text.clone()),
                    answer_option_variable_name: option.variable_name.clone(),
                    answer_type: Some(option.answer_type),
                    values: option.values.clone(),
                    values_code: option.values_code.clone(),
                    restriction_min: option.restriction_min,
                    restriction_max: option.restriction_max,
                    is_decimal: option.is_decimal,
                    answer_option_condition: option.condition.clone(),
                    ..base.clone()
                });
            }
        }
        rows
    }
}
