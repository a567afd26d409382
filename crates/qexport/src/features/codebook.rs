//! Codebook feature

use crate::error::ExportResult;
use crate::features::ExportContext;
use crate::store::ExportStore;
use qexport_archive::{ArchiveError, ArchiveResult, Entry};
use qexport_model::{ConditionType, QuestionnaireRef, StructureRow};
use qexport_transform::naming::entry_name;
use qexport_transform::{CodebookTransform, CsvEncoder, answer_option_columns};
use std::collections::{BTreeSet, HashMap};

/// Report name of the deferred lookup of the study's questionnaire versions
pub const STUDY_CODEBOOKS_ENTRY: &str = "codebooks";

/// One codebook entry per questionnaire version
///
/// Without explicit questionnaires every version of the study is described. Every version is
/// a deferred lookup, so structures are read only once the entries before it are written.
pub fn codebook_entries<S>(ctx: &ExportContext<S>) -> Vec<Entry>
where
    S: ExportStore + ?Sized + 'static,
{
    if ctx.options.questionnaires.is_empty() {
        let ctx = ctx.clone();
        return vec![Entry::deferred(STUDY_CODEBOOKS_ENTRY, move || {
            Box::pin(study_codebooks(ctx))
        })];
    }

    ctx.options
        .questionnaires
        .iter()
        .map(|&questionnaire| codebook_deferred(ctx, questionnaire))
        .collect()
}

fn codebook_deferred<S>(ctx: &ExportContext<S>, questionnaire: QuestionnaireRef) -> Entry
where
    S: ExportStore + ?Sized + 'static,
{
    let ctx = ctx.clone();
    Entry::deferred(
        format!("codebook {}:{}", questionnaire.id, questionnaire.version),
        move || Box::pin(codebook_lookup(ctx, questionnaire)),
    )
}

async fn study_codebooks<S>(ctx: ExportContext<S>) -> ArchiveResult<Vec<Entry>>
where
    S: ExportStore + ?Sized + 'static,
{
    let questionnaires = ctx.store.questionnaire_refs(&ctx.options.study_name).await?;
    log::debug!(
        "Study {} has {} questionnaire versions",
        ctx.options.study_name,
        questionnaires.len()
    );
    Ok(questionnaires
        .into_iter()
        .map(|questionnaire| codebook_deferred(&ctx, questionnaire))
        .collect())
}

async fn codebook_lookup<S>(
    ctx: ExportContext<S>,
    questionnaire: QuestionnaireRef,
) -> ArchiveResult<Vec<Entry>>
where
    S: ExportStore + ?Sized + 'static,
{
    match codebook_entry(&ctx, questionnaire).await? {
        Some(entry) => Ok(vec![entry]),
        None => {
            log::warn!(
                "Questionnaire {} v{} has no structure, no codebook written",
                questionnaire.id,
                questionnaire.version
            );
            Ok(Vec::new())
        }
    }
}

async fn codebook_entry<S>(
    ctx: &ExportContext<S>,
    questionnaire: QuestionnaireRef,
) -> ExportResult<Option<Entry>>
where
    S: ExportStore + ?Sized,
{
    let rows = ctx.store.structure(questionnaire).await?;
    let Some(first) = rows.first() else {
        return Ok(None);
    };
    let name = entry_name(
        "codebook",
        &ctx.options.study_name,
        &first.questionnaire_name,
        first.questionnaire_version,
    );

    let targets = condition_targets(ctx, &rows).await;
    let mut transform = CodebookTransform::new(targets);
    let mut encoder = CsvEncoder::new(ctx.delimiter);

    let chunks = async_stream::stream! {
        for row in &rows {
            for record in transform.records(row) {
                yield encoder
                    .serialize(&record)
                    .map_err(|err| ArchiveError::upstream(err.to_string()));
            }
        }
    };
    Ok(Some(Entry::stream(name, Box::pin(chunks))))
}

/// Column names of every answer option a condition of these rows can point at
///
/// External targets live in other questionnaire versions, whose structure is read as well.
/// An unreadable target version only leaves its column names empty.
async fn condition_targets<S>(ctx: &ExportContext<S>, rows: &[StructureRow]) -> HashMap<i64, String>
where
    S: ExportStore + ?Sized,
{
    let mut targets = answer_option_columns(rows);

    let own = rows.first().map(StructureRow::questionnaire);
    let external: BTreeSet<QuestionnaireRef> = rows
        .iter()
        .flat_map(|row| {
            [
                row.questionnaire_condition.as_ref(),
                row.question_condition.as_ref(),
                row.answer_option_condition.as_ref(),
            ]
        })
        .flatten()
        .filter(|condition| condition.condition_type == ConditionType::External)
        .filter_map(|condition| {
            Some(QuestionnaireRef::new(
                condition.target_questionnaire?,
                condition.target_questionnaire_version?,
            ))
        })
        .filter(|target| Some(*target) != own)
        .collect();

    for target in external {
        match ctx.store.structure(target).await {
            Ok(structure) => targets.extend(answer_option_columns(&structure)),
            Err(err) => log::warn!(
                "Condition targets in questionnaire {} v{} unavailable: {err}",
                target.id,
                target.version
            ),
        }
    }
    targets
}
