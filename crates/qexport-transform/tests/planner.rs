//! Column Planning Tests

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use qexport_model::{AnswerType, Questionnaire, StructureRow};
use qexport_transform::{ColumnKind, plan};
use rstest::rstest;
use serde_json::json;

// ============================================================================
// Test Helpers
// ============================================================================

fn single_option(answer_type: AnswerType, values: &[&str]) -> Vec<StructureRow> {
    let questionnaire: Questionnaire = serde_json::from_value(json!({
        "id": 12,
        "version": 3,
        "name": "Tägliche Symptome",
        "questions": [{
            "id": 120,
            "position": 4,
            "answer_options": [{
                "id": 1200,
                "position": 2,
                "answer_type": answer_type,
                "values": values,
                "values_code": (0..values.len() as i64).collect::<Vec<_>>()
            }]
        }]
    }))
    .unwrap();
    StructureRow::flatten(&questionnaire)
}

// ============================================================================
// Column Counts
// ============================================================================

#[rstest]
#[case(AnswerType::Sample, &["a", "b", "c"], 2)]
#[case(AnswerType::MultiSelect, &["a", "b", "c"], 3)]
#[case(AnswerType::MultiSelect, &["a"], 1)]
#[case(AnswerType::SingleSelect, &["a", "b", "c"], 1)]
#[case(AnswerType::Number, &[], 1)]
#[case(AnswerType::Text, &[], 1)]
#[case(AnswerType::Date, &[], 1)]
#[case(AnswerType::Timestamp, &[], 1)]
#[case(AnswerType::File, &[], 1)]
#[case(AnswerType::Image, &[], 1)]
#[case(AnswerType::Pzn, &[], 1)]
fn test_column_count(#[case] answer_type: AnswerType, #[case] values: &[&str], #[case] expected: usize) {
    let meta = plan(&single_option(answer_type, values)).unwrap();
    assert_eq!(meta.columns.len(), expected);
}

#[test]
fn test_question_only_rows_produce_no_columns() {
    let questionnaire: Questionnaire = serde_json::from_value(json!({
        "id": 1,
        "version": 1,
        "name": "Info",
        "questions": [{ "id": 10, "position": 1, "text": "Bitte lesen" }]
    }))
    .unwrap();

    let meta = plan(&StructureRow::flatten(&questionnaire)).unwrap();
    assert!(meta.columns.is_empty());
    assert_eq!(meta.questions.len(), 1);
    assert_eq!(meta.questions[&10].column_name, "q1_inf_v1_1");
}

// ============================================================================
// Naming
// ============================================================================

#[test]
fn test_expanded_column_names() {
    let multi = plan(&single_option(AnswerType::MultiSelect, &["Kopfweh", "Übelkeit"])).unwrap();
    let names: Vec<_> = multi.column_names().collect();
    assert_eq!(names, ["q12_tae_v3_4_2_kopfweh", "q12_tae_v3_4_2_uebelkeit"]);

    let sample = plan(&single_option(AnswerType::Sample, &[])).unwrap();
    let names: Vec<_> = sample.column_names().collect();
    assert_eq!(names, ["q12_tae_v3_4_2_1", "q12_tae_v3_4_2_2"]);
}

#[test]
fn test_variable_names_take_precedence() {
    let mut rows = single_option(AnswerType::Number, &[]);
    rows[0].question_variable_name = Some("temp".to_string());
    assert_eq!(plan(&rows).unwrap().columns[0].name, "temp_2");

    rows[0].answer_option_variable_name = Some("body_temperature".to_string());
    assert_eq!(plan(&rows).unwrap().columns[0].name, "body_temperature");
}

#[test]
fn test_type_specific_extras() {
    let single = plan(&single_option(AnswerType::SingleSelect, &["Ja", "Nein"])).unwrap();
    assert_eq!(
        single.columns[0].kind,
        ColumnKind::SingleSelect {
            values: vec!["Ja".to_string(), "Nein".to_string()],
            codes: vec![0, 1],
        }
    );

    let multi = plan(&single_option(AnswerType::MultiSelect, &["x", "y"])).unwrap();
    assert_eq!(
        multi.columns[1].kind,
        ColumnKind::MultiSelect {
            value: "y".to_string(),
            code: Some(1),
        }
    );

    let sample = plan(&single_option(AnswerType::Sample, &[])).unwrap();
    assert_eq!(sample.columns[1].kind, ColumnKind::Sample { slot: 2 });
    assert!(sample.columns.iter().all(|column| column.answer_option_id == 1200));
}

proptest! {
    #[test]
    fn prop_planning_is_reproducible(
        name in "\\PC{0,12}",
        values in proptest::collection::vec("[a-zA-ZäöüÄÖÜß ]{1,10}", 1..5),
    ) {
        let mut rows = single_option(AnswerType::MultiSelect, &[]);
        rows[0].questionnaire_name = name;
        rows[0].values = values;
        let first = plan(&rows).unwrap();
        let second = plan(&rows).unwrap();
        prop_assert_eq!(first.columns.len(), rows[0].values.len());
        prop_assert_eq!(first, second);
    }
}
