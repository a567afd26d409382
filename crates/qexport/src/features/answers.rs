//! Answers feature
//!
//! One CSV per requested questionnaire version, followed by the files the answers reference.
//! The files are looked up once every answers entry has been written, because only then is
//! the set of referenced ids known. Row sources are opened one questionnaire at a time.

use crate::error::ExportResult;
use crate::features::ExportContext;
use crate::store::{ExportStore, InstanceRowStream, RowFilter};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::{Stream, StreamExt};
use parking_lot::Mutex;
use qexport_archive::{ArchiveError, ArchiveResult, Entry};
use qexport_model::{QuestionnaireRef, UserFile};
use qexport_transform::naming::{compose_file_name, entry_name};
use qexport_transform::{AnswersTransform, CsvEncoder, RowResolver, plan};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Marks the start of the payload in a base64 `data:` URL
const BASE64_MARK: &str = ";base64,";

/// Report name of the deferred file lookup
pub const FILES_ENTRY: &str = "files";

type FileIds = Arc<Mutex<BTreeSet<i64>>>;

/// Answers entries of every requested questionnaire version plus the deferred file lookup
///
/// Each questionnaire is a deferred lookup, so its structure is read and its row source opened
/// only once the entries before it are written. A questionnaire that cannot be read is
/// reported as failed and left out.
pub fn answers_entries<S>(ctx: &ExportContext<S>) -> Vec<Entry>
where
    S: ExportStore + ?Sized + 'static,
{
    let filter = RowFilter {
        participants: ctx.options.participants.clone(),
        start_date: ctx.options.start_date,
        end_date: ctx.options.end_date,
    };
    let file_ids = FileIds::default();

    let mut entries = Vec::with_capacity(ctx.options.questionnaires.len() + 1);
    for &questionnaire in &ctx.options.questionnaires {
        let ctx = ctx.clone();
        let filter = filter.clone();
        let file_ids = Arc::clone(&file_ids);
        entries.push(Entry::deferred(
            format!("answers {}:{}", questionnaire.id, questionnaire.version),
            move || Box::pin(answers_lookup(ctx, questionnaire, filter, file_ids)),
        ));
    }

    let store = Arc::clone(&ctx.store);
    entries.push(Entry::deferred(FILES_ENTRY, move || {
        Box::pin(file_entries(store, file_ids))
    }));
    entries
}

async fn answers_lookup<S>(
    ctx: ExportContext<S>,
    questionnaire: QuestionnaireRef,
    filter: RowFilter,
    file_ids: FileIds,
) -> ArchiveResult<Vec<Entry>>
where
    S: ExportStore + ?Sized + 'static,
{
    let entry = answers_entry(&ctx, questionnaire, &filter, file_ids).await?;
    Ok(vec![entry])
}

async fn answers_entry<S>(
    ctx: &ExportContext<S>,
    questionnaire: QuestionnaireRef,
    filter: &RowFilter,
    file_ids: FileIds,
) -> ExportResult<Entry>
where
    S: ExportStore + ?Sized + 'static,
{
    let structure = ctx.store.structure(questionnaire).await?;
    let meta = Arc::new(plan(&structure)?);
    let name = entry_name("answers", &ctx.options.study_name, &meta.name, meta.version);
    let rows = ctx.store.instance_rows(questionnaire, filter).await?;
    log::debug!("Opened answer rows of questionnaire {} v{}", questionnaire.id, questionnaire.version);

    let resolver = RowResolver::new(meta, Arc::clone(&ctx.store)).with_formatter(ctx.formatter);
    let chunks = answer_chunks(
        rows,
        AnswersTransform::new(resolver),
        CsvEncoder::new(ctx.delimiter),
        file_ids,
    );
    Ok(Entry::stream(name, Box::pin(chunks)))
}

/// Header chunk, then one chunk per instance row
///
/// Referenced file ids are collected after every row, so a truncated entry still gets the
/// files of the rows it contains.
fn answer_chunks<S>(
    mut rows: InstanceRowStream,
    mut transform: AnswersTransform<S>,
    mut encoder: CsvEncoder,
    file_ids: FileIds,
) -> impl Stream<Item = ArchiveResult<Vec<u8>>> + Send + 'static
where
    S: ExportStore + ?Sized + 'static,
{
    async_stream::stream! {
        match encoder.header(transform.header()) {
            Ok(chunk) => yield Ok(chunk),
            Err(err) => {
                yield Err(ArchiveError::upstream(err.to_string()));
                return;
            }
        }

        let mut count = 0usize;
        while let Some(row) = rows.next().await {
            let row = match row {
                Ok(row) => row,
                Err(err) => {
                    yield Err(ArchiveError::from(err));
                    return;
                }
            };

            let record = transform.record(&row).await;
            file_ids.lock().extend(transform.take_file_ids());
            count += 1;

            match encoder.record(&record) {
                Ok(chunk) => yield Ok(chunk),
                Err(err) => {
                    yield Err(ArchiveError::upstream(err.to_string()));
                    return;
                }
            }
        }

        let meta = transform.meta();
        log::debug!("Encoded {count} answer rows of questionnaire {} v{}", meta.id, meta.version);
    }
}

async fn file_entries<S>(store: Arc<S>, file_ids: FileIds) -> ArchiveResult<Vec<Entry>>
where
    S: ExportStore + ?Sized,
{
    let ids: Vec<i64> = std::mem::take(&mut *file_ids.lock()).into_iter().collect();
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let files = store.user_files(&ids).await?;
    if files.len() < ids.len() {
        log::warn!("{} referenced files not found", ids.len() - files.len());
    }
    Ok(files.into_iter().filter_map(file_entry).collect())
}

/// Archive entry of an uploaded file, `None` if its content is not base64 encoded
pub fn file_entry(file: UserFile) -> Option<Entry> {
    let Some((_, payload)) = file.file.split_once(BASE64_MARK) else {
        log::warn!("File {} is not base64 encoded, skipped", file.id);
        return None;
    };

    match STANDARD.decode(payload.trim()) {
        Ok(bytes) => Some(Entry::buffer(
            format!("files/{}", compose_file_name(file.id, file.file_name.as_deref())),
            bytes,
        )),
        Err(err) => {
            log::warn!("File {} has invalid base64 content, skipped: {err}", file.id);
            None
        }
    }
}
