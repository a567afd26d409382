//! Export features
//!
//! Each feature turns the export options into archive entries without reading anything yet.
//! Questionnaires are looked up by deferred entries once it is their turn, and rows are read
//! and encoded only while the assembler pulls them.

pub mod answers;
pub mod codebook;

use crate::options::ExportOptions;
use qexport_transform::ValueFormatter;
use std::sync::Arc;

pub use answers::answers_entries;
pub use codebook::codebook_entries;

/// What every feature of one export run shares
pub struct ExportContext<S: ?Sized> {
    pub store: Arc<S>,
    pub options: ExportOptions,
    pub formatter: ValueFormatter,
    pub delimiter: u8,
}

impl<S: ?Sized> Clone for ExportContext<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            options: self.options.clone(),
            formatter: self.formatter,
            delimiter: self.delimiter,
        }
    }
}
