//! Answers feature record transform

use crate::planner::ExportMetaInfo;
use crate::resolver::RowResolver;
use qexport_eval::ConditionTargetProvider;
use qexport_model::InstanceRow;
use std::collections::BTreeSet;

/// Columns in front of the planned answer columns
pub const BASE_COLUMNS: [&str; 9] = [
    "participant",
    "is_test_participant",
    "questionnaire_name",
    "questionnaire_id",
    "questionnaire_version",
    "questionnaire_cycle",
    "questionnaire_date_of_issue",
    "answer_date",
    "answer_status",
];

/// Builds answers CSV records for one questionnaire version
pub struct AnswersTransform<P: ?Sized> {
    resolver: RowResolver<P>,
}

impl<P> AnswersTransform<P>
where
    P: ConditionTargetProvider + ?Sized,
{
    pub fn new(resolver: RowResolver<P>) -> Self {
        Self { resolver }
    }

    pub fn meta(&self) -> &ExportMetaInfo {
        self.resolver.meta()
    }

    /// Base columns followed by every planned column name
    pub fn header(&self) -> Vec<String> {
        BASE_COLUMNS
            .iter()
            .map(ToString::to_string)
            .chain(self.meta().column_names().map(str::to_string))
            .collect()
    }

    /// One answers record for an instance row
    pub async fn record(&mut self, row: &InstanceRow) -> Vec<String> {
        let formatter = *self.resolver.formatter();
        let meta = self.resolver.meta();

        let mut record = Vec::with_capacity(BASE_COLUMNS.len() + meta.columns.len());
        record.push(row.participant.clone());
        record.push(row.is_test_participant.to_string());
        record.push(meta.name.clone());
        record.push(meta.id.to_string());
        record.push(meta.version.to_string());
        record.push(row.cycle.to_string());
        record.push(formatter.instant(&row.date_of_issue));
        record.push(
            row.answer_date
                .as_ref()
                .map(|date| formatter.instant(date))
                .unwrap_or_default(),
        );
        record.push(
            row.status
                .answer_status()
                .map(|status| status.as_str().to_string())
                .unwrap_or_default(),
        );

        let cells = self.resolver.resolve_row(row).await;
        record.extend(cells.iter().map(|cell| cell.as_field().to_string()));
        record
    }

    /// Files referenced by the records produced so far
    pub fn file_ids(&self) -> &BTreeSet<i64> {
        self.resolver.file_ids()
    }

    pub fn take_file_ids(&mut self) -> BTreeSet<i64> {
        self.resolver.take_file_ids()
    }
}
