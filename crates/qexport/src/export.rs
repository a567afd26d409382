//! Export runs

use crate::error::ExportResult;
use crate::features::{ExportContext, answers_entries, codebook_entries};
use crate::options::{ExportOptions, Feature};
use crate::store::ExportStore;
use qexport_archive::{AbortSignal, ArchiveAssembler, ArchiveReport};
use std::io::{Seek, Write};
use std::sync::Arc;

/// Export the requested features of a study into one zip archive
///
/// Entries are registered in feature order and written while their sources are pulled. Every
/// store read happens inside the assembler, so the abort signal and the timeout also end
/// lookups that never answer. The archive is always closed; features that failed along the
/// way are missing or truncated and show up in the returned report. Only invalid options and
/// archive writer failures are errors.
///
/// Sinks that cannot seek go through [`SpoolWriter`](qexport_archive::SpoolWriter).
pub async fn run_export<S, W>(
    store: Arc<S>,
    options: ExportOptions,
    writer: W,
    signal: AbortSignal,
) -> ExportResult<(W, ArchiveReport)>
where
    S: ExportStore + ?Sized + 'static,
    W: Write + Seek,
{
    options.validate()?;

    let signal = match options.timeout() {
        Some(timeout) => signal.with_timeout(timeout),
        None => signal,
    };
    let ctx = ExportContext {
        store,
        formatter: options.formatter()?,
        delimiter: options.delimiter_byte()?,
        options,
    };

    log::info!(
        "Exporting {} of study {} ({} questionnaires)",
        ctx.options
            .features
            .iter()
            .map(Feature::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        ctx.options.study_name,
        ctx.options.questionnaires.len()
    );

    let mut assembler = ArchiveAssembler::new(writer, signal);
    for &feature in &ctx.options.features {
        let entries = match feature {
            Feature::Answers => answers_entries(&ctx),
            Feature::Codebook => codebook_entries(&ctx),
        };
        log::debug!("Feature {feature} registered {} entries", entries.len());
        for entry in entries {
            assembler.register(entry);
        }
    }

    let (writer, report) = assembler.finalize().await?;
    if report.is_complete() {
        log::info!("Export finished with {} entries", report.entries.len());
    } else {
        log::warn!(
            "Export finished incomplete: {} of {} entries failed{}",
            report.failures().count(),
            report.entries.len(),
            if report.aborted { ", aborted" } else { "" }
        );
    }
    Ok((writer, report))
}
