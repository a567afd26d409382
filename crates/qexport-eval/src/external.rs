//! Resolution of `external` conditions
//!
//! The target is the participant's most recent released instance of the referenced
//! questionnaire version. Its status decides which answer version was current at release.

use crate::error::{EvalError, EvalResult};
use crate::evaluator::ConditionEvaluator;
use crate::provider::ConditionTargetProvider;
use qexport_model::Condition;

/// Evaluate an external condition for a participant
///
/// Resolves to `false` when no released instance or no answer exists. Lookup failures are
/// logged and also resolve to `false`.
pub async fn resolve_external_condition<P>(
    provider: &P,
    evaluator: &ConditionEvaluator,
    participant: &str,
    condition: &Condition,
) -> bool
where
    P: ConditionTargetProvider + ?Sized,
{
    match try_resolve(provider, evaluator, participant, condition).await {
        Ok(outcome) => outcome,
        Err(err) => {
            log::error!("Could not resolve external condition for participant {participant}: {err}");
            false
        }
    }
}

async fn try_resolve<P>(
    provider: &P,
    evaluator: &ConditionEvaluator,
    participant: &str,
    condition: &Condition,
) -> EvalResult<bool>
where
    P: ConditionTargetProvider + ?Sized,
{
    evaluator.validate(condition)?;
    let target = condition.target().ok_or(EvalError::MissingTarget)?;
    let (Some(questionnaire_id), Some(questionnaire_version)) = (
        condition.target_questionnaire,
        condition.target_questionnaire_version,
    ) else {
        return Err(EvalError::MissingTargetQuestionnaire {
            answer_option: target,
        });
    };

    let Some(instance) = provider
        .latest_released_instance(participant, questionnaire_id, questionnaire_version)
        .await
        .map_err(|err| EvalError::provider(err.to_string()))?
    else {
        return Ok(false);
    };

    let Some(versioning) = instance.answer_version() else {
        return Ok(false);
    };

    let Some(answer) = provider
        .answer(instance.id, target, versioning)
        .await
        .map_err(|err| EvalError::provider(err.to_string()))?
    else {
        return Ok(false);
    };

    let Some(answer_type) = provider
        .answer_option_type(target)
        .await
        .map_err(|err| EvalError::provider(err.to_string()))?
    else {
        return Ok(false);
    };

    Ok(evaluator.evaluate(&answer.value, condition, answer_type))
}
