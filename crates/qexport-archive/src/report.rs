//! Outcome of an assembled archive

/// What happened to one registered entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryStatus {
    /// Fully written
    Completed { bytes: u64 },
    /// Source failed after `bytes` were written; the entry is kept as-is
    Truncated { bytes: u64, error: String },
    /// Abort raised while the entry was being written
    Interrupted { bytes: u64 },
    /// Never opened because the export was aborted first
    Skipped,
    /// Not written at all (deferred lookup failed, duplicate name)
    Failed { error: String },
    /// Deferred lookup that produced `entries` further entries
    Expanded { entries: usize },
}

impl EntryStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Expanded { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryReport {
    pub name: String,
    pub status: EntryStatus,
}

/// Per-entry outcome of one archive, in processing order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveReport {
    pub entries: Vec<EntryReport>,
    pub aborted: bool,
}

impl ArchiveReport {
    pub(crate) fn record(&mut self, name: impl Into<String>, status: EntryStatus) {
        self.entries.push(EntryReport {
            name: name.into(),
            status,
        });
    }

    /// Status of the first entry with this name
    pub fn status(&self, name: &str) -> Option<&EntryStatus> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.status)
    }

    /// Whether every entry was written in full and nothing was aborted
    pub fn is_complete(&self) -> bool {
        !self.aborted && self.entries.iter().all(|entry| entry.status.is_completed())
    }

    /// Entries that did not complete
    pub fn failures(&self) -> impl Iterator<Item = &EntryReport> {
        self.entries
            .iter()
            .filter(|entry| !entry.status.is_completed())
    }
}
