//! Condition Evaluation Tests
//!
//! Covers operand comparison per answer type and the AND/OR/XOR link semantics over
//! `;`-separated answer and condition values.

use proptest::prelude::*;
use qexport_eval::ConditionEvaluator;
use qexport_model::{AnswerType, Condition, ConditionLink, ConditionOperand};
use rstest::rstest;

// ============================================================================
// Test Helpers
// ============================================================================

fn condition(operand: ConditionOperand, value: &str, link: ConditionLink) -> Condition {
    Condition::internal(1, operand, value, link)
}

fn evaluate(answer: &str, condition: &Condition, answer_type: AnswerType) -> bool {
    ConditionEvaluator::new().evaluate(answer, condition, answer_type)
}

// ============================================================================
// Link Semantics
// ============================================================================

#[rstest]
#[case("ans1;ans2;ans3", "ans1;ans2;ans3", true)]
#[case("ans3;ans1;ans2", "ans1;ans2;ans3", true)]
#[case("ans1;ans2;ans3;ans4", "ans1;ans2;ans3", true)]
#[case("ans1;ans2;ans4", "ans1;ans2;ans3", false)]
#[case("ans1", "ans1;ans2", false)]
#[case("ans2;ans1", "ans1;ans2", true)]
fn test_and_link(#[case] answer: &str, #[case] value: &str, #[case] expected: bool) {
    let condition = condition(ConditionOperand::Equal, value, ConditionLink::And);
    assert_eq!(evaluate(answer, &condition, AnswerType::MultiSelect), expected);
}

#[rstest]
#[case("ans0;ans2;ans5", "ans1;ans2;ans3", true)]
#[case("ans1;ans2", "ans1;ans2;ans3", false)]
#[case("ans0;ans4", "ans1;ans2;ans3", false)]
#[case("ans3", "ans1;ans2;ans3", true)]
fn test_xor_link(#[case] answer: &str, #[case] value: &str, #[case] expected: bool) {
    let condition = condition(ConditionOperand::Equal, value, ConditionLink::Xor);
    assert_eq!(evaluate(answer, &condition, AnswerType::MultiSelect), expected);
}

#[rstest]
#[case("ans4;ans3", "ans1;ans2;ans3", true)]
#[case("ans4;ans5", "ans1;ans2;ans3", false)]
#[case("ans2", "ans2", true)]
#[case("ans1; ans2", "ans2", false)]
#[case("ans1;ans2", "ans2 ", false)]
fn test_or_link(#[case] answer: &str, #[case] value: &str, #[case] expected: bool) {
    let condition = condition(ConditionOperand::Equal, value, ConditionLink::Or);
    assert_eq!(evaluate(answer, &condition, AnswerType::MultiSelect), expected);
}

#[test]
fn test_xor_counts_pairs_not_condition_values() {
    // "5" is greater than both 1 and 2: two matching pairs
    let condition = condition(ConditionOperand::Greater, "1;2", ConditionLink::Xor);
    assert!(!evaluate("5", &condition, AnswerType::Number));
    assert!(evaluate("1.5", &condition, AnswerType::Number));
}

#[test]
fn test_not_equal_with_or_link() {
    let condition = condition(ConditionOperand::NotEqual, "Ja", ConditionLink::Or);
    assert!(evaluate("Nein", &condition, AnswerType::SingleSelect));
    assert!(!evaluate("Ja", &condition, AnswerType::SingleSelect));
}

// ============================================================================
// Numeric Comparison
// ============================================================================

#[rstest]
#[case("13", ConditionOperand::Equal, "13", true)]
#[case("13", ConditionOperand::NotEqual, "13", false)]
#[case("12", ConditionOperand::Less, "13", true)]
#[case("14", ConditionOperand::Greater, "13", true)]
#[case("13", ConditionOperand::LessOrEqual, "13", true)]
#[case("12.5", ConditionOperand::GreaterOrEqual, "13", false)]
#[case("-1", ConditionOperand::Less, "0", true)]
#[case("1e3", ConditionOperand::Equal, "1000", true)]
fn test_number_operands(
    #[case] answer: &str,
    #[case] operand: ConditionOperand,
    #[case] value: &str,
    #[case] expected: bool,
) {
    let condition = condition(operand, value, ConditionLink::Or);
    assert_eq!(evaluate(answer, &condition, AnswerType::Number), expected);
}

#[test]
fn test_sample_answers_compare_numerically() {
    let condition = condition(ConditionOperand::GreaterOrEqual, "100", ConditionLink::Or);
    assert!(evaluate("100.0", &condition, AnswerType::Sample));
    assert!(!evaluate("99", &condition, AnswerType::Sample));
}

// ============================================================================
// Non-numeric Types
// ============================================================================

#[test]
fn test_text_equality_is_exact() {
    let condition = condition(ConditionOperand::Equal, "Ja", ConditionLink::Or);
    assert!(evaluate("Ja", &condition, AnswerType::Text));
    assert!(!evaluate("ja", &condition, AnswerType::Text));
}

#[rstest]
#[case(ConditionOperand::Less)]
#[case(ConditionOperand::Greater)]
#[case(ConditionOperand::LessOrEqual)]
#[case(ConditionOperand::GreaterOrEqual)]
fn test_ordering_operands_on_text_never_match(#[case] operand: ConditionOperand) {
    let condition = condition(operand, "b", ConditionLink::Or);
    assert!(!evaluate("a", &condition, AnswerType::Text));
    assert!(!evaluate("c", &condition, AnswerType::Text));
    assert!(!evaluate("b", &condition, AnswerType::Text));
}

#[test]
fn test_dates_support_ordering() {
    let condition = condition(ConditionOperand::Less, "2021-06-01", ConditionLink::Or);
    assert!(evaluate("31.05.2021", &condition, AnswerType::Date));
    assert!(evaluate("2021-05-31T22:00:00Z", &condition, AnswerType::Date));
    assert!(!evaluate("2021-06-01", &condition, AnswerType::Date));
}

#[test]
fn test_unparseable_dates_fall_back_to_text_equality() {
    let condition = condition(ConditionOperand::Equal, "unknown", ConditionLink::Or);
    assert!(evaluate("unknown", &condition, AnswerType::Date));
    let ordering = self::condition(ConditionOperand::Less, "unknown", ConditionLink::Or);
    assert!(!evaluate("2021-01-01", &ordering, AnswerType::Date));
}

// ============================================================================
// Empty Tokens
// ============================================================================

#[rstest]
#[case("ans1;", "ans1", ConditionLink::And, true)]
#[case("ans1;ans2", "ans1;ans2;", ConditionLink::And, true)]
#[case("ans1;ans2;", "ans1;ans2", ConditionLink::Xor, false)]
#[case(";", "ans1", ConditionLink::Or, false)]
#[case("", "", ConditionLink::Or, true)]
fn test_trailing_separators(
    #[case] answer: &str,
    #[case] value: &str,
    #[case] link: ConditionLink,
    #[case] expected: bool,
) {
    let condition = condition(ConditionOperand::Equal, value, link);
    assert_eq!(evaluate(answer, &condition, AnswerType::MultiSelect), expected);
}

#[test]
fn test_empty_answer_does_not_satisfy_not_equal() {
    let condition = condition(ConditionOperand::NotEqual, "Ja", ConditionLink::Or);
    assert!(!evaluate("", &condition, AnswerType::Text));
}

// ============================================================================
// Properties
// ============================================================================

fn operand_strategy() -> impl Strategy<Value = ConditionOperand> {
    prop_oneof![
        Just(ConditionOperand::Equal),
        Just(ConditionOperand::NotEqual),
        Just(ConditionOperand::Less),
        Just(ConditionOperand::Greater),
        Just(ConditionOperand::LessOrEqual),
        Just(ConditionOperand::GreaterOrEqual),
    ]
}

fn link_strategy() -> impl Strategy<Value = ConditionLink> {
    prop_oneof![
        Just(ConditionLink::And),
        Just(ConditionLink::Or),
        Just(ConditionLink::Xor),
    ]
}

fn type_strategy() -> impl Strategy<Value = AnswerType> {
    proptest::sample::select(AnswerType::ALL.to_vec())
}

proptest! {
    #[test]
    fn prop_evaluate_is_pure(
        answer in "[a-c0-9;.]{0,12}",
        value in "[a-c0-9;.]{0,12}",
        operand in operand_strategy(),
        link in link_strategy(),
        answer_type in type_strategy(),
    ) {
        let condition = condition(operand, &value, link);
        let first = evaluate(&answer, &condition, answer_type);
        let second = evaluate(&answer, &condition, answer_type);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_xor_implies_or(
        answer in "[a-c;]{0,8}",
        value in "[a-c;]{0,8}",
    ) {
        let xor = condition(ConditionOperand::Equal, &value, ConditionLink::Xor);
        let or = condition(ConditionOperand::Equal, &value, ConditionLink::Or);
        if evaluate(&answer, &xor, AnswerType::MultiSelect) {
            prop_assert!(evaluate(&answer, &or, AnswerType::MultiSelect));
        }
    }

    #[test]
    fn prop_answer_order_does_not_matter_for_and(
        mut tokens in proptest::collection::vec("[a-d]", 1..5),
        value in "[a-d](;[a-d]){0,3}",
    ) {
        let condition = condition(ConditionOperand::Equal, &value, ConditionLink::And);
        let forward = evaluate(&tokens.join(";"), &condition, AnswerType::MultiSelect);
        tokens.reverse();
        let backward = evaluate(&tokens.join(";"), &condition, AnswerType::MultiSelect);
        prop_assert_eq!(forward, backward);
    }
}
