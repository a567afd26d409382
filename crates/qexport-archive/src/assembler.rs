//! Streaming archive assembly
//!
//! Entries are written one after another in registration order. Stream entries are pulled
//! chunk by chunk, so a producer is only advanced as fast as the archive accepts bytes.
//! Deferred entries run once everything registered before them has been written, and the
//! entries they produce are written next. The trailer is written after the last entry, also
//! when the export was aborted or single entries failed.
//!
//! The writer is flushed after every finished entry. Sinks that cannot seek are wrapped in a
//! [`SpoolWriter`](crate::SpoolWriter), which passes each entry on at that point.

use crate::entry::{ByteStream, Entry, EntrySource};
use crate::error::{ArchiveError, ArchiveResult};
use crate::report::{ArchiveReport, EntryStatus};
use crate::signal::AbortSignal;
use futures::StreamExt;
use futures::future::BoxFuture;
use std::collections::{HashSet, VecDeque};
use std::io::{Seek, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Outcome of pulling one stream entry
enum Drained {
    Done(u64),
    Failed(u64, ArchiveError),
    Interrupted(u64),
}

/// Combines independently produced entries into one zip archive
pub struct ArchiveAssembler<W: Write + Seek> {
    writer: ZipWriter<W>,
    options: SimpleFileOptions,
    signal: AbortSignal,
    pending: VecDeque<Entry>,
    written: HashSet<String>,
    report: ArchiveReport,
}

impl<W: Write + Seek> ArchiveAssembler<W> {
    pub fn new(writer: W, signal: AbortSignal) -> Self {
        let mut writer = ZipWriter::new(writer);
        writer.set_flush_on_finish_file(true);
        Self {
            writer,
            options: SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .large_file(true),
            signal,
            pending: VecDeque::new(),
            written: HashSet::new(),
            report: ArchiveReport::default(),
        }
    }

    pub fn with_compression(mut self, method: CompressionMethod) -> Self {
        self.options = self.options.compression_method(method);
        self
    }

    /// Queue an entry behind everything registered so far
    pub fn register(&mut self, entry: Entry) {
        log::debug!("Registered archive entry {entry:?}");
        self.pending.push_back(entry);
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Write every registered entry, then the archive trailer
    ///
    /// Only failures of the archive writer itself are returned as errors. Source failures,
    /// failed deferred lookups and aborts are recorded in the report.
    pub async fn finalize(mut self) -> ArchiveResult<(W, ArchiveReport)> {
        while let Some(entry) = self.pending.pop_front() {
            if self.report.aborted || self.signal.is_aborted() {
                self.pending.push_front(entry);
                self.skip_remaining();
                break;
            }
            self.write_entry(entry).await?;
        }

        let mut writer = self.writer.finish()?;
        writer.flush()?;
        log::debug!(
            "Archive finalized with {} entries{}",
            self.written.len(),
            if self.report.aborted { " (aborted)" } else { "" }
        );
        Ok((writer, self.report))
    }

    async fn write_entry(&mut self, entry: Entry) -> ArchiveResult<()> {
        let Entry { name, source } = entry;

        let status = match source {
            EntrySource::Deferred(produce) => {
                self.run_deferred(name, produce()).await;
                return Ok(());
            }
            EntrySource::Buffer(bytes) => {
                if !self.open(&name)? {
                    return Ok(());
                }
                self.writer.write_all(&bytes)?;
                EntryStatus::Completed {
                    bytes: bytes.len() as u64,
                }
            }
            EntrySource::Stream(chunks) => {
                if !self.open(&name)? {
                    return Ok(());
                }
                match self.drain(chunks).await? {
                    Drained::Done(bytes) => EntryStatus::Completed { bytes },
                    Drained::Failed(bytes, error) => {
                        log::error!("Entry {name} truncated after {bytes} bytes: {error}");
                        EntryStatus::Truncated {
                            bytes,
                            error: error.to_string(),
                        }
                    }
                    Drained::Interrupted(bytes) => {
                        log::warn!("Export aborted while writing {name}");
                        self.report.aborted = true;
                        EntryStatus::Interrupted { bytes }
                    }
                }
            }
        };
        log::debug!("Wrote archive entry {name}: {status:?}");
        self.report.record(name, status);
        Ok(())
    }

    /// Start a new zip entry, `false` if the name was already written
    fn open(&mut self, name: &str) -> ArchiveResult<bool> {
        if !self.written.insert(name.to_string()) {
            let error = ArchiveError::duplicate_entry(name);
            log::warn!("{error}");
            self.report.record(name, EntryStatus::Failed {
                error: error.to_string(),
            });
            return Ok(false);
        }
        self.writer.start_file(name, self.options)?;
        Ok(true)
    }

    /// Pull a stream into the open entry until it ends, fails or the export is aborted
    async fn drain(&mut self, mut chunks: ByteStream) -> ArchiveResult<Drained> {
        let mut bytes = 0u64;
        loop {
            let next = tokio::select! {
                biased;
                () = self.signal.aborted() => return Ok(Drained::Interrupted(bytes)),
                next = chunks.next() => next,
            };
            match next {
                Some(Ok(chunk)) => {
                    self.writer.write_all(&chunk)?;
                    bytes += chunk.len() as u64;
                }
                Some(Err(error)) if error.is_fatal() => return Err(error),
                Some(Err(error)) => return Ok(Drained::Failed(bytes, error)),
                None => return Ok(Drained::Done(bytes)),
            }
        }
    }

    async fn run_deferred(
        &mut self,
        name: String,
        lookup: BoxFuture<'static, ArchiveResult<Vec<Entry>>>,
    ) {
        let outcome = tokio::select! {
            biased;
            () = self.signal.aborted() => None,
            outcome = lookup => Some(outcome),
        };

        match outcome {
            Some(Ok(entries)) => {
                log::debug!("Deferred {name} produced {} entries", entries.len());
                self.report
                    .record(name, EntryStatus::Expanded { entries: entries.len() });
                for entry in entries.into_iter().rev() {
                    self.pending.push_front(entry);
                }
            }
            Some(Err(error)) => {
                log::error!("Deferred {name} failed: {error}");
                self.report.record(name, EntryStatus::Failed { error: error.to_string() });
            }
            None => {
                log::warn!("Export aborted during deferred {name}");
                self.report.aborted = true;
                self.report.record(name, EntryStatus::Skipped);
            }
        }
    }

    /// Record everything still queued as skipped
    fn skip_remaining(&mut self) {
        self.report.aborted = true;
        log::warn!("Export aborted, skipping {} entries", self.pending.len());
        for entry in self.pending.drain(..) {
            self.report.record(entry.name, EntryStatus::Skipped);
        }
    }
}
