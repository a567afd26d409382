//! Streaming zip assembly for questionnaire exports
//!
//! Each export feature contributes named [`Entry`] values: complete buffers, pull-based
//! byte streams, or deferred lookups that produce further entries once everything before
//! them has been written. [`ArchiveAssembler::finalize`] writes them in registration order
//! and always closes the archive, reporting per-entry outcomes in an [`ArchiveReport`].
//! Output goes to any seekable writer, or through [`SpoolWriter`] to a forward-only sink.
//!
//! # Example
//!
//! ```
//! use qexport_archive::{AbortSignal, ArchiveAssembler, Entry};
//! use std::io::Cursor;
//!
//! # tokio_test();
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn tokio_test() {
//! let mut assembler = ArchiveAssembler::new(Cursor::new(Vec::new()), AbortSignal::never());
//! assembler.register(Entry::buffer("readme.txt", "hello"));
//! assembler.register(Entry::chunks("data.csv", [Ok(b"a;b\n".to_vec()), Ok(b"1;2\n".to_vec())]));
//!
//! let (_archive, report) = assembler.finalize().await.unwrap();
//! assert!(report.is_complete());
//! assert_eq!(report.entries.len(), 2);
//! # }
//! ```

pub mod assembler;
pub mod entry;
pub mod error;
pub mod report;
pub mod signal;
pub mod spool;

pub use assembler::ArchiveAssembler;
pub use entry::{ByteStream, DeferredEntries, Entry, EntrySource};
pub use error::{ArchiveError, ArchiveResult};
pub use report::{ArchiveReport, EntryReport, EntryStatus};
pub use signal::{AbortHandle, AbortSignal};
pub use spool::{ChannelWriter, SpoolWriter, byte_channel};
