//! Storage configuration types.

use std::path::PathBuf;

/// Storage service configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding one subdirectory per entry.
    pub root: PathBuf,
    /// Maximum number of content bytes accepted for a single entry.
    pub max_upload_bytes: u64,
}

impl StorageConfig {
    /// Default max upload size: 200 MiB.
    pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 200 * 1024 * 1024;

    /// Create a new storage config with default settings.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_upload_bytes: Self::DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Set maximum upload size.
    #[must_use]
    pub fn with_max_upload_bytes(mut self, max: u64) -> Self {
        self.max_upload_bytes = max;
        self
    }
}
