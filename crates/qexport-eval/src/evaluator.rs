//! Condition evaluator
//!
//! Decides whether one recorded answer satisfies one condition. The evaluator is pure:
//! identical inputs always produce identical results, which lets callers memoize freely.

use crate::error::{EvalError, EvalResult};
use crate::operators::{comparison, link};
use qexport_model::{AnswerType, Condition, ConditionType, split_values};
use smallvec::SmallVec;

/// Tokens of one `;`-separated value
pub type Tokens<'a> = SmallVec<[&'a str; 4]>;

/// Evaluates answers against conditions
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// Create a new evaluator
    pub fn new() -> Self {
        Self
    }

    /// Whether `answer_value` satisfies `condition` for an answer of `answer_type`
    ///
    /// Callers must check [`ConditionEvaluator::validate`] first: a malformed condition is
    /// "not met" without being evaluated.
    pub fn evaluate(&self, answer_value: &str, condition: &Condition, answer_type: AnswerType) -> bool {
        let answers = tokenize(answer_value);
        let conditions = tokenize(&condition.value);

        link::combine(condition.link, &answers, &conditions, |answer, expected| {
            comparison::values_match(answer, expected, condition.operand, answer_type)
        })
    }

    /// Check that a condition can be evaluated by the export at all
    pub fn validate(&self, condition: &Condition) -> EvalResult<()> {
        let target = condition.target().ok_or(EvalError::MissingTarget)?;
        match condition.condition_type {
            ConditionType::InternalThis => Ok(()),
            ConditionType::External => {
                if condition.target_questionnaire.is_none()
                    || condition.target_questionnaire_version.is_none()
                {
                    return Err(EvalError::MissingTargetQuestionnaire {
                        answer_option: target,
                    });
                }
                Ok(())
            }
            ConditionType::InternalLast => Err(EvalError::unsupported_condition_type(
                condition.condition_type.as_str(),
            )),
        }
    }
}

/// Split a value into its non-empty tokens
///
/// Tokens keep surrounding whitespace. Empty tokens from stray separators are dropped. A value
/// consisting only of empty tokens becomes a single empty token so that it still only matches
/// another empty value.
pub fn tokenize(value: &str) -> Tokens<'_> {
    let mut tokens: Tokens<'_> = split_values(value)
        .filter(|token| !token.is_empty())
        .collect();
    if tokens.is_empty() {
        tokens.push("");
    }
    tokens
}
