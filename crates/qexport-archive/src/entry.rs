//! Archive entry sources

use crate::error::ArchiveResult;
use futures::future::BoxFuture;
use futures::stream::{self, BoxStream};
use std::fmt;

/// Pull-based byte chunks of one entry
pub type ByteStream = BoxStream<'static, ArchiveResult<Vec<u8>>>;

/// Produces further entries once everything registered before it has been written
pub type DeferredEntries = Box<dyn FnOnce() -> BoxFuture<'static, ArchiveResult<Vec<Entry>>> + Send>;

/// Content of an entry
pub enum EntrySource {
    /// Complete content known up front
    Buffer(Vec<u8>),
    /// Content appended chunk by chunk as the stream is pulled
    Stream(ByteStream),
    /// Second-phase lookup; the produced entries are written right after it
    Deferred(DeferredEntries),
}

/// A named archive entry
pub struct Entry {
    pub name: String,
    pub source: EntrySource,
}

impl Entry {
    pub fn buffer(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            source: EntrySource::Buffer(bytes.into()),
        }
    }

    pub fn stream(name: impl Into<String>, chunks: ByteStream) -> Self {
        Self {
            name: name.into(),
            source: EntrySource::Stream(chunks),
        }
    }

    /// Entry written from an iterator of already produced chunks
    pub fn chunks<I>(name: impl Into<String>, chunks: I) -> Self
    where
        I: IntoIterator<Item = ArchiveResult<Vec<u8>>>,
        I::IntoIter: Send + 'static,
    {
        Self::stream(name, Box::pin(stream::iter(chunks)))
    }

    /// Deferred lookup, `name` only identifies it in the report
    pub fn deferred<F>(name: impl Into<String>, produce: F) -> Self
    where
        F: FnOnce() -> BoxFuture<'static, ArchiveResult<Vec<Entry>>> + Send + 'static,
    {
        Self {
            name: name.into(),
            source: EntrySource::Deferred(Box::new(produce)),
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self.source, EntrySource::Deferred(_))
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.source {
            EntrySource::Buffer(bytes) => format!("buffer({} bytes)", bytes.len()),
            EntrySource::Stream(_) => "stream".to_string(),
            EntrySource::Deferred(_) => "deferred".to_string(),
        };
        f.debug_struct("Entry")
            .field("name", &self.name)
            .field("source", &kind)
            .finish()
    }
}
