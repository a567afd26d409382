//! Condition evaluation for questionnaire exports
//!
//! This crate decides whether recorded answers satisfy branching conditions and which
//! questions of a questionnaire can be reached at all:
//!
//! - **Operand comparison**: `==`, `\=`, `<`, `>`, `<=`, `>=` between one answer value and one
//!   condition value, numeric for Number/Sample answers, calendar-aware for dates
//! - **Link combination**: `AND`, `OR`, `XOR` over the cross product of `;`-separated
//!   answer and condition values
//! - **Reachability**: [`AvailabilityResolver`] filters questions and answer options whose
//!   `internal_this` conditions can never be met, including condition cycles
//! - **External conditions**: [`resolve_external_condition`] looks up the participant's latest
//!   released instance of another questionnaire through a [`ConditionTargetProvider`]
//!
//! # Example
//!
//! ```
//! use qexport_eval::ConditionEvaluator;
//! use qexport_model::{AnswerType, Condition, ConditionLink, ConditionOperand};
//!
//! let condition = Condition::internal(1, ConditionOperand::Equal, "ans1;ans2", ConditionLink::And);
//! let evaluator = ConditionEvaluator::new();
//!
//! assert!(evaluator.evaluate("ans2;ans1", &condition, AnswerType::MultiSelect));
//! assert!(!evaluator.evaluate("ans1", &condition, AnswerType::MultiSelect));
//! ```
//!
//! # Failure semantics
//!
//! Nothing here raises past its caller. Malformed conditions, unparseable operands and
//! collaborator failures all resolve to "condition not met" or `Unreachable`.

pub mod availability;
pub mod cache;
pub mod error;
pub mod evaluator;
pub mod external;
pub mod operators;
pub mod provider;

pub use availability::{AvailabilityResolver, Reachability};
pub use cache::{ConditionCache, ConditionCacheKey};
pub use error::{EvalError, EvalResult};
pub use evaluator::ConditionEvaluator;
pub use external::resolve_external_condition;
pub use provider::{ConditionTargetProvider, NoOpConditionTargetProvider, ProviderError};

pub use operators::comparison::values_match;
pub use operators::link::combine;
