//! Comparison of single answer and condition values
//!
//! Number and Sample answers compare as floating point numbers, Date answers compare as
//! calendar dates, every other answer type only supports `==` and `\=` on the raw text.

use crate::error::{EvalError, EvalResult};
use chrono::{DateTime, NaiveDate};
use qexport_model::{AnswerType, ConditionOperand};
use std::cmp::Ordering;

/// Date layouts accepted in answers and condition values
const DATE_FORMATS: [&str; 3] = ["%d.%m.%Y", "%Y-%m-%d", "%Y/%m/%d"];

/// Whether `answer` satisfies `operand` against `condition`
///
/// Never fails: undefined comparisons (ordering operands on free text, unparseable numbers)
/// are logged at debug level and count as no match.
pub fn values_match(
    answer: &str,
    condition: &str,
    operand: ConditionOperand,
    answer_type: AnswerType,
) -> bool {
    match compare(answer, condition, operand, answer_type) {
        Ok(result) => result,
        Err(err) => {
            log::debug!("comparing {answer:?} with {condition:?}: {err}");
            false
        }
    }
}

/// Compare one answer value with one condition value
///
/// Empty values only ever match other empty values. Numbers and dates ignore surrounding
/// whitespace, text is compared exactly as stored.
pub fn compare(
    answer: &str,
    condition: &str,
    operand: ConditionOperand,
    answer_type: AnswerType,
) -> EvalResult<bool> {
    if answer.is_empty() || condition.is_empty() {
        let both_empty = answer.is_empty() && condition.is_empty();
        return Ok(both_empty && holds(operand, Some(Ordering::Equal)));
    }

    if answer_type.is_numeric() {
        return Ok(compare_numbers(answer, condition, operand));
    }

    if answer_type == AnswerType::Date
        && let (Some(left), Some(right)) = (parse_calendar_date(answer), parse_calendar_date(condition))
    {
        return Ok(holds(operand, Some(left.cmp(&right))));
    }

    if operand.is_equality() {
        return Ok(holds(operand, Some(answer.cmp(condition))));
    }

    Err(EvalError::unsupported_operand(operand.as_str(), answer_type.as_str()))
}

fn compare_numbers(answer: &str, condition: &str, operand: ConditionOperand) -> bool {
    match (answer.trim().parse::<f64>(), condition.trim().parse::<f64>()) {
        (Ok(left), Ok(right)) => holds(operand, left.partial_cmp(&right)),
        _ => false,
    }
}

/// Apply an operand to the ordering of answer relative to condition
///
/// An unknown ordering (NaN) satisfies no operand.
fn holds(operand: ConditionOperand, ordering: Option<Ordering>) -> bool {
    let Some(ordering) = ordering else {
        return false;
    };
    match operand {
        ConditionOperand::Equal => ordering == Ordering::Equal,
        ConditionOperand::NotEqual => ordering != Ordering::Equal,
        ConditionOperand::Less => ordering == Ordering::Less,
        ConditionOperand::Greater => ordering == Ordering::Greater,
        ConditionOperand::LessOrEqual => ordering != Ordering::Greater,
        ConditionOperand::GreaterOrEqual => ordering != Ordering::Less,
    }
}

/// Parse a calendar date in one of the accepted layouts or as RFC 3339 timestamp
pub fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|timestamp| timestamp.date_naive())
        })
}
