//! Evaluator benchmarks using divan
//!
//! Benchmarks for condition evaluation and reachability resolution.

use qexport_eval::{AvailabilityResolver, ConditionEvaluator};
use qexport_model::{
    AnswerOption, AnswerType, Condition, ConditionLink, ConditionOperand, Question,
};

fn main() {
    divan::main();
}

fn condition(operand: ConditionOperand, value: &str, link: ConditionLink) -> Condition {
    Condition::internal(1, operand, value, link)
}

// === Condition Evaluation Benchmarks ===

mod evaluate {
    use super::*;

    #[divan::bench]
    fn single_value_text(bencher: divan::Bencher) {
        let evaluator = ConditionEvaluator::new();
        let condition = condition(ConditionOperand::Equal, "Ja", ConditionLink::Or);

        bencher.bench_local(|| {
            evaluator.evaluate(divan::black_box("Ja"), &condition, AnswerType::Text)
        });
    }

    #[divan::bench]
    fn numeric_ordering(bencher: divan::Bencher) {
        let evaluator = ConditionEvaluator::new();
        let condition = condition(ConditionOperand::GreaterOrEqual, "18", ConditionLink::Or);

        bencher.bench_local(|| {
            evaluator.evaluate(divan::black_box("42.5"), &condition, AnswerType::Number)
        });
    }

    #[divan::bench(args = [ConditionLink::And, ConditionLink::Or, ConditionLink::Xor])]
    fn multi_select(bencher: divan::Bencher, link: ConditionLink) {
        let evaluator = ConditionEvaluator::new();
        let condition = condition(ConditionOperand::Equal, "ans1;ans2;ans3;ans4", link);

        bencher.bench_local(|| {
            evaluator.evaluate(
                divan::black_box("ans0;ans2;ans5;ans4;ans7"),
                &condition,
                AnswerType::MultiSelect,
            )
        });
    }
}

// === Reachability Benchmarks ===

mod availability {
    use super::*;

    /// A chain where every question depends on the previous question's answer option
    fn chain(length: i64) -> Vec<Question> {
        (0..length)
            .map(|id| Question {
                id,
                position: id,
                text: String::new(),
                variable_name: None,
                is_mandatory: false,
                condition: (id > 0).then(|| {
                    Condition::internal(id - 1, ConditionOperand::Equal, "Ja", ConditionLink::Or)
                }),
                answer_options: vec![AnswerOption {
                    id,
                    position: 1,
                    text: String::new(),
                    variable_name: None,
                    answer_type: AnswerType::SingleSelect,
                    values: vec!["Ja".to_string(), "Nein".to_string()],
                    values_code: vec![1, 0],
                    restriction_min: None,
                    restriction_max: None,
                    is_decimal: false,
                    condition: None,
                }],
            })
            .collect()
    }

    #[divan::bench(args = [10, 100, 1000])]
    fn resolve_chain(bencher: divan::Bencher, length: i64) {
        let questions = chain(length);

        bencher.bench_local(|| AvailabilityResolver::resolve(divan::black_box(&questions)));
    }
}
