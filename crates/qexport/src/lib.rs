//! Conditional questionnaire exports
//!
//! This crate ties the export pieces together into one run:
//!
//! - **Options**: [`ExportOptions`] names the study, questionnaire versions, features, filters
//!   and rendering settings
//! - **Persistence**: [`ExportStore`] is the read-only collaborator; [`MemoryStore`] serves a
//!   JSON snapshot
//! - **Features**: answers CSVs with their referenced files, and codebook CSVs
//! - **Archive**: [`run_export`] streams every entry into one zip archive
//!
//! # Example
//!
//! ```
//! use qexport::{AbortSignal, ExportOptions, Feature, MemoryStore, run_export};
//! use std::io::Cursor;
//! use std::sync::Arc;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let store = Arc::new(MemoryStore::default());
//! let mut options = ExportOptions::new("Teststudie");
//! options.features = vec![Feature::Codebook];
//!
//! let (_, report) = run_export(store, options, Cursor::new(Vec::new()), AbortSignal::never())
//!     .await
//!     .unwrap();
//! assert!(report.is_complete());
//! # });
//! ```

pub mod error;
pub mod export;
pub mod features;
pub mod memory;
pub mod options;
pub mod store;

pub use qexport_archive as archive;
pub use qexport_eval as eval;
pub use qexport_model as model;
pub use qexport_transform as transform;

pub use error::{ExportError, ExportResult, StoreError, StoreResult};
pub use export::run_export;
pub use memory::{MemoryStore, StoreData, StoredAnswer, StoredInstance};
pub use options::{ExportOptions, Feature};
pub use qexport_archive::{AbortHandle, AbortSignal, ArchiveReport, EntryStatus, SpoolWriter, byte_channel};
pub use store::{ExportStore, InstanceRowStream, RowFilter};

// CLI module (only available with cli feature)
#[cfg(feature = "cli")]
pub mod cli;
