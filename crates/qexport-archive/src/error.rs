//! Error types for archive assembly

use thiserror::Error;

/// Result type for archive operations
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Archive assembly error
///
/// `Zip` and `Io` are hard failures of the archive writer. `Upstream` is what entry
/// sources yield when their producer fails; it only ever truncates the entry it belongs to.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Archive write failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Upstream source failed: {message}")]
    Upstream { message: String },

    #[error("Duplicate entry name: {name}")]
    DuplicateEntry { name: String },
}

impl ArchiveError {
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    pub fn duplicate_entry(name: impl Into<String>) -> Self {
        Self::DuplicateEntry { name: name.into() }
    }

    /// Whether this error comes from the archive writer itself
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Zip(_) | Self::Io(_))
    }
}
