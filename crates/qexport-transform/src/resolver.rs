//! Row resolution
//!
//! Turns one instance row into one cell per planned column. The decision policy is applied
//! once per row and shared by every column:
//!
//! 1. unreleased instance of a questionnaire without top-level condition → every cell is
//!    [`Missing::NotReleased`]
//! 2. top-level condition not met → every cell is [`Missing::NotApplicable`]
//! 3. otherwise each column is resolved on its own: gating conditions first, then the
//!    answer value transformed by answer type
//!
//! Nothing here fails: unparseable values and lookup errors are logged and end up as
//! missing codes.

use crate::error::TransformError;
use crate::format::ValueFormatter;
use crate::naming;
use crate::planner::{ColumnConditions, ColumnKind, ColumnMeta, ExportMetaInfo};
use futures::future::BoxFuture;
use qexport_eval::{
    ConditionCache, ConditionCacheKey, ConditionEvaluator, ConditionTargetProvider,
    resolve_external_condition,
};
use qexport_model::{
    AnswerType, Cell, Condition, ConditionType, InstanceRow, Missing, RowAnswer, split_values,
};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

/// Resolves instance rows of one questionnaire version
///
/// Owns the condition cache and the set of referenced file ids of one export; neither is
/// shared across exports.
pub struct RowResolver<P: ?Sized> {
    meta: Arc<ExportMetaInfo>,
    provider: Arc<P>,
    evaluator: ConditionEvaluator,
    formatter: ValueFormatter,
    cache: ConditionCache,
    file_ids: BTreeSet<i64>,
    /// Internal conditions currently being evaluated
    in_progress: HashSet<ConditionCacheKey>,
}

impl<P> RowResolver<P>
where
    P: ConditionTargetProvider + ?Sized,
{
    pub fn new(meta: Arc<ExportMetaInfo>, provider: Arc<P>) -> Self {
        Self {
            meta,
            provider,
            evaluator: ConditionEvaluator::new(),
            formatter: ValueFormatter::default(),
            cache: ConditionCache::new(),
            file_ids: BTreeSet::new(),
            in_progress: HashSet::new(),
        }
    }

    pub fn with_formatter(mut self, formatter: ValueFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn meta(&self) -> &ExportMetaInfo {
        &self.meta
    }

    pub fn formatter(&self) -> &ValueFormatter {
        &self.formatter
    }

    pub fn cache(&self) -> &ConditionCache {
        &self.cache
    }

    /// Ids of files referenced by the rows resolved so far
    pub fn file_ids(&self) -> &BTreeSet<i64> {
        &self.file_ids
    }

    pub fn take_file_ids(&mut self) -> BTreeSet<i64> {
        std::mem::take(&mut self.file_ids)
    }

    /// Resolve one instance row into one cell per planned column
    pub async fn resolve_row(&mut self, row: &InstanceRow) -> Vec<Cell> {
        let meta = Arc::clone(&self.meta);

        if meta.condition.is_none() && !row.status.is_released() {
            return vec![Cell::from(Missing::NotReleased); meta.columns.len()];
        }
        if let Some(condition) = &meta.condition
            && !self.condition_met(row, condition).await
        {
            return vec![Cell::from(Missing::NotApplicable); meta.columns.len()];
        }

        let mut cells = Vec::with_capacity(meta.columns.len());
        for column in &meta.columns {
            cells.push(self.resolve_column(row, column).await);
        }
        cells
    }

    async fn resolve_column(&mut self, row: &InstanceRow, column: &ColumnMeta) -> Cell {
        if column.has_conditions() && !self.column_conditions_met(row, &column.conditions).await {
            return if column.is_mandatory {
                Missing::NotApplicable.into()
            } else {
                Missing::Unobtainable.into()
            };
        }

        match row
            .answer(column.answer_option_id)
            .and_then(|answer| self.transform(column, answer))
        {
            Some(value) => Cell::Value(value),
            None if column.answer_type == AnswerType::MultiSelect => Missing::NoOrUnobtainable.into(),
            None => Missing::Unobtainable.into(),
        }
    }

    /// Transform a recorded answer into its cell text, `None` if there is nothing to show
    fn transform(&mut self, column: &ColumnMeta, answer: &RowAnswer) -> Option<String> {
        let value = answer.non_empty_value()?;

        match &column.kind {
            ColumnKind::SingleSelect { values, codes } => values
                .iter()
                .position(|candidate| candidate == value)
                .and_then(|index| codes.get(index))
                .map(ToString::to_string),
            ColumnKind::MultiSelect { value: expected, .. } => split_values(value)
                .any(|selected| selected == expected)
                .then(|| "1".to_string()),
            ColumnKind::Sample { slot } => split_values(value)
                .nth(slot.saturating_sub(1))
                .filter(|segment| !segment.is_empty())
                .map(str::to_string),
            ColumnKind::Plain => match column.answer_type {
                AnswerType::File | AnswerType::Image => match answer.file_id {
                    Some(file_id) => {
                        self.file_ids.insert(file_id);
                        Some(naming::compose_file_name(file_id, answer.file_name.as_deref()))
                    }
                    None => {
                        log::error!(
                            "{}",
                            TransformError::MissingFileReference {
                                answer_option: column.answer_option_id
                            }
                        );
                        None
                    }
                },
                AnswerType::Date => self
                    .formatter
                    .date(value)
                    .map_err(|err| log::error!("{err}"))
                    .ok(),
                AnswerType::Timestamp => self
                    .formatter
                    .timestamp(value)
                    .map_err(|err| log::error!("{err}"))
                    .ok(),
                _ => Some(value.to_string()),
            },
        }
    }

    /// Question condition first: if it is not met the answer option condition is irrelevant
    async fn column_conditions_met(&mut self, row: &InstanceRow, conditions: &ColumnConditions) -> bool {
        if let Some(condition) = &conditions.question
            && !self.condition_met(row, condition).await
        {
            return false;
        }
        match &conditions.answer_option {
            Some(condition) => self.condition_met(row, condition).await,
            None => true,
        }
    }

    /// Evaluate a condition for a row, memoized per instance and participant
    fn condition_met<'a>(
        &'a mut self,
        row: &'a InstanceRow,
        condition: &'a Condition,
    ) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            if let Err(err) = self.evaluator.validate(condition) {
                log::debug!("Condition treated as not met: {err}");
                return false;
            }

            let key = ConditionCacheKey::new(row.instance_id, &row.participant, condition);
            if let Some(outcome) = self.cache.get(&key) {
                return outcome;
            }

            let outcome = match condition.condition_type {
                ConditionType::InternalThis => {
                    if !self.in_progress.insert(key.clone()) {
                        log::debug!(
                            "Condition on answer option {:?} depends on itself",
                            condition.target()
                        );
                        return false;
                    }
                    let outcome = self.internal_condition_met(row, condition).await;
                    self.in_progress.remove(&key);
                    outcome
                }
                ConditionType::External => {
                    resolve_external_condition(
                        self.provider.as_ref(),
                        &self.evaluator,
                        &row.participant,
                        condition,
                    )
                    .await
                }
                ConditionType::InternalLast => false,
            };

            self.cache.insert(key, outcome);
            outcome
        })
    }

    /// Evaluate against the row's own answer, which only counts if its column is not gated
    async fn internal_condition_met(&mut self, row: &InstanceRow, condition: &Condition) -> bool {
        let Some(target) = condition.target() else {
            return false;
        };
        let meta = Arc::clone(&self.meta);
        let Some(column) = meta.column_for(target) else {
            return false;
        };
        let Some(answer) = row.answer(target) else {
            return false;
        };

        if column.has_conditions() && !self.column_conditions_met(row, &column.conditions).await {
            return false;
        }

        self.evaluator.evaluate(
            answer.value.as_deref().unwrap_or_default(),
            condition,
            column.answer_type,
        )
    }
}
