//! Persistence collaborator
//!
//! The export only reads. Besides the point lookups of [`ConditionTargetProvider`] it needs
//! the structure of a questionnaire version, a lazily pulled instance row source and the
//! files referenced by answers.

use crate::error::StoreResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use qexport_eval::ConditionTargetProvider;
use qexport_model::{InstanceRow, InstanceStatus, QuestionnaireRef, StructureRow, UserFile};

/// Instance rows of one questionnaire version, pulled one at a time
pub type InstanceRowStream = BoxStream<'static, StoreResult<InstanceRow>>;

/// Which instances a row source yields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowFilter {
    pub participants: Option<Vec<String>>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl RowFilter {
    /// Whether an instance belongs into the export
    ///
    /// Inactive instances never do. Date bounds are inclusive.
    pub fn matches(&self, participant: &str, status: InstanceStatus, date_of_issue: DateTime<Utc>) -> bool {
        status != InstanceStatus::Inactive
            && self
                .participants
                .as_ref()
                .is_none_or(|participants| participants.iter().any(|p| p == participant))
            && self.start_date.is_none_or(|start| date_of_issue >= start)
            && self.end_date.is_none_or(|end| date_of_issue <= end)
    }
}

/// Read access to questionnaires, instances, answers and files
#[async_trait]
pub trait ExportStore: ConditionTargetProvider {
    /// Every questionnaire version of a study
    async fn questionnaire_refs(&self, study: &str) -> StoreResult<Vec<QuestionnaireRef>>;

    /// Structure rows of one questionnaire version, ordered by question and answer option
    /// position
    async fn structure(&self, questionnaire: QuestionnaireRef) -> StoreResult<Vec<StructureRow>>;

    /// Instance rows of one questionnaire version, ordered by participant, then cycle
    async fn instance_rows(
        &self,
        questionnaire: QuestionnaireRef,
        filter: &RowFilter,
    ) -> StoreResult<InstanceRowStream>;

    /// Uploaded files by id; unknown ids are left out
    async fn user_files(&self, ids: &[i64]) -> StoreResult<Vec<UserFile>>;
}
