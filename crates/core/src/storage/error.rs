//! Storage error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The OS random source could not produce an identifier.
    #[error("failed to generate id: {0}")]
    IdGeneration(String),

    /// Entry directory could not be created.
    #[error("failed to create dir {}: {source}", .path.display())]
    CreateDir {
        /// Directory that was being created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Entry file could not be created.
    #[error("failed to create file {}: {source}", .path.display())]
    CreateFile {
        /// File that was being created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Reading the uploaded content failed.
    ///
    /// The source is kept intact so callers can recover the error the
    /// upstream reader produced.
    #[error("failed to read upload: {source}")]
    Read {
        /// Error returned by the content reader.
        source: io::Error,
    },

    /// Writing the uploaded content to disk failed.
    #[error("failed to write file {}: {source}", .path.display())]
    Write {
        /// File that was being written.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Uploaded content exceeds the configured maximum.
    #[error("upload exceeds maximum size of {max} bytes")]
    TooLarge {
        /// Maximum allowed size.
        max: u64,
    },

    /// Entry not found in storage.
    #[error("file not found: {0}")]
    NotFound(String),

    /// The request resolved to a directory.
    #[error("directory enumeration is banned")]
    IsDirectory,

    /// Text is not a well-formed entry identifier.
    #[error("invalid entry id: {0}")]
    InvalidId(String),

    /// Name contains characters no stored entry can carry.
    #[error("invalid file name: {0}")]
    InvalidName(String),

    /// Resolved path lies outside the storage root.
    #[error("path escapes storage root: {}", .0.display())]
    OutsideRoot(PathBuf),

    /// Other filesystem failure.
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),
}

impl StorageError {
    /// Create an id generation error.
    #[must_use]
    pub fn id_generation(msg: impl Into<String>) -> Self {
        Self::IdGeneration(msg.into())
    }

    /// Create a directory creation error.
    #[must_use]
    pub fn create_dir(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::CreateDir {
            path: path.into(),
            source,
        }
    }

    /// Create a file creation error.
    #[must_use]
    pub fn create_file(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::CreateFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write error.
    #[must_use]
    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound(key.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_path() {
        let err = StorageError::create_dir(
            "/tmp/fish/abc",
            io::Error::new(io::ErrorKind::AlreadyExists, "exists"),
        );
        assert_eq!(err.to_string(), "failed to create dir /tmp/fish/abc: exists");
    }
}
