//! Structural reachability of questions and answer options
//!
//! A question or answer option gated by an `internal_this` condition is only reachable if
//! the targeted answer option is reachable, and that option's question is reachable too.
//! Resolution runs over an arena indexed by position in the question list, with one
//! tri-state memo per question and per answer option. A `Pending` entry observed during
//! resolution means the current chain loops back on itself: every member of such a cycle
//! resolves to `Unreachable`.

use qexport_model::{Condition, Question};
use std::collections::HashMap;

/// Resolution state of a question or answer option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reachability {
    #[default]
    Unknown,
    /// Currently being resolved
    Pending,
    Reachable,
    Unreachable,
}

impl Reachability {
    fn is_settled(self) -> bool {
        matches!(self, Reachability::Reachable | Reachability::Unreachable)
    }
}

/// Filters the questions and answer options of one questionnaire version
pub struct AvailabilityResolver<'a> {
    questions: &'a [Question],
    /// Answer option id → (question index, answer option index)
    options_by_id: HashMap<i64, (usize, usize)>,
    question_states: Vec<Reachability>,
    option_states: Vec<Vec<Reachability>>,
}

impl<'a> AvailabilityResolver<'a> {
    pub fn new(questions: &'a [Question]) -> Self {
        let mut options_by_id = HashMap::new();
        for (question_index, question) in questions.iter().enumerate() {
            for (option_index, option) in question.answer_options.iter().enumerate() {
                options_by_id.insert(option.id, (question_index, option_index));
            }
        }

        Self {
            questions,
            options_by_id,
            question_states: vec![Reachability::Unknown; questions.len()],
            option_states: questions
                .iter()
                .map(|question| vec![Reachability::Unknown; question.answer_options.len()])
                .collect(),
        }
    }

    /// Keep only reachable questions, each with only its reachable answer options
    ///
    /// Original order is preserved. Questions that lose all of their answer options are
    /// dropped; questions that never had any are kept if reachable.
    pub fn resolve(questions: &[Question]) -> Vec<Question> {
        AvailabilityResolver::new(questions).into_reachable()
    }

    /// Reachability of the question at `index`
    pub fn question(&mut self, index: usize) -> Reachability {
        let state = self.question_states[index];
        if state.is_settled() || state == Reachability::Pending {
            return state;
        }

        let questions = self.questions;
        let outcome = match internal_condition(questions[index].condition.as_ref()) {
            None => Reachability::Reachable,
            Some(condition) => {
                self.question_states[index] = Reachability::Pending;
                self.follow(condition)
            }
        };
        self.question_states[index] = outcome;
        outcome
    }

    /// Reachability of one answer option of the question at `question_index`
    ///
    /// Only the option's own condition is considered here; [`Self::into_reachable`] also
    /// requires the containing question to be reachable.
    pub fn answer_option(&mut self, question_index: usize, option_index: usize) -> Reachability {
        let state = self.option_states[question_index][option_index];
        if state.is_settled() || state == Reachability::Pending {
            return state;
        }

        let questions = self.questions;
        let option = &questions[question_index].answer_options[option_index];
        let outcome = match internal_condition(option.condition.as_ref()) {
            None => Reachability::Reachable,
            Some(condition) => {
                self.option_states[question_index][option_index] = Reachability::Pending;
                self.follow(condition)
            }
        };
        self.option_states[question_index][option_index] = outcome;
        outcome
    }

    /// Resolve every entry and build the filtered question list
    pub fn into_reachable(mut self) -> Vec<Question> {
        let questions = self.questions;
        let mut reachable = Vec::new();
        for (question_index, question) in questions.iter().enumerate() {
            if self.question(question_index) != Reachability::Reachable {
                continue;
            }

            let options: Vec<_> = question
                .answer_options
                .iter()
                .enumerate()
                .filter(|(option_index, _)| {
                    self.answer_option(question_index, *option_index) == Reachability::Reachable
                })
                .map(|(_, option)| option.clone())
                .collect();

            if options.is_empty() && !question.answer_options.is_empty() {
                log::debug!(
                    "Question {} dropped, none of its answer options is reachable",
                    question.id
                );
                continue;
            }

            reachable.push(Question {
                answer_options: options,
                ..question.clone()
            });
        }
        reachable
    }

    /// Reachability implied by a condition's target
    fn follow(&mut self, condition: &Condition) -> Reachability {
        let Some(target) = condition.target() else {
            return Reachability::Unreachable;
        };
        let Some(&(question_index, option_index)) = self.options_by_id.get(&target) else {
            log::debug!("Condition target answer option {target} does not exist");
            return Reachability::Unreachable;
        };

        match self.question(question_index) {
            Reachability::Pending => {
                log::info!("Condition cycle through question {}", self.questions[question_index].id);
                return Reachability::Unreachable;
            }
            Reachability::Unreachable => return Reachability::Unreachable,
            _ => {}
        }

        match self.answer_option(question_index, option_index) {
            Reachability::Pending => {
                log::info!("Condition cycle through answer option {target}");
                Reachability::Unreachable
            }
            other => other,
        }
    }
}

/// The condition if it is one this resolver follows
fn internal_condition(condition: Option<&Condition>) -> Option<&Condition> {
    condition.filter(|condition| condition.is_internal_this())
}

#[cfg(test)]
mod tests {
    use super::*;
    use qexport_model::{AnswerOption, AnswerType, ConditionLink, ConditionOperand};

    fn option(id: i64, condition: Option<Condition>) -> AnswerOption {
        AnswerOption {
            id,
            position: id,
            text: String::new(),
            variable_name: None,
            answer_type: AnswerType::Text,
            values: vec![],
            values_code: vec![],
            restriction_min: None,
            restriction_max: None,
            is_decimal: false,
            condition,
        }
    }

    fn question(id: i64, condition: Option<Condition>, options: Vec<AnswerOption>) -> Question {
        Question {
            id,
            position: id,
            text: String::new(),
            variable_name: None,
            is_mandatory: false,
            condition,
            answer_options: options,
        }
    }

    fn on(target: i64) -> Option<Condition> {
        Some(Condition::internal(target, ConditionOperand::Equal, "x", ConditionLink::Or))
    }

    #[test]
    fn test_question_gated_by_own_option_is_unreachable() {
        let questions = vec![question(1, on(10), vec![option(10, None)])];
        let mut resolver = AvailabilityResolver::new(&questions);
        assert_eq!(resolver.question(0), Reachability::Unreachable);
        assert_eq!(resolver.answer_option(0, 0), Reachability::Reachable);
    }

    #[test]
    fn test_missing_target_is_unreachable() {
        let questions = vec![question(1, on(99), vec![option(10, None)])];
        let mut resolver = AvailabilityResolver::new(&questions);
        assert_eq!(resolver.question(0), Reachability::Unreachable);
    }
}
