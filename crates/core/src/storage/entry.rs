//! Stored entry metadata.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use super::id::EntryId;
use super::layout::StorageLayout;

/// One uploaded file.
///
/// Entries are write-once: created by an upload, read by any number of
/// downloads, removed only by the reaper.
#[derive(Debug, Clone)]
pub struct StorageEntry {
    /// Identifier naming the entry directory.
    pub id: EntryId,
    /// Sanitized original filename.
    pub display_name: String,
    /// Full path of the stored file.
    pub path: PathBuf,
    /// Number of content bytes stored.
    pub size: u64,
    /// Modification time of the entry directory.
    pub created_at: DateTime<Utc>,
}

impl StorageEntry {
    /// Retrieval path of this entry.
    #[must_use]
    pub fn download_path(&self) -> String {
        StorageLayout::download_path(&self.id, &self.display_name)
    }
}
