//! Mapping between entries, filesystem paths and retrieval URLs.

use std::path::{Component, Path, PathBuf};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use super::error::StorageError;
use super::id::EntryId;
use super::sanitize::is_safe_filename;

/// URL prefix under which entries are served.
pub const DOWNLOAD_PREFIX: &str = "/download";

/// Bytes left unescaped in a URL path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b',')
    .remove(b':')
    .remove(b';')
    .remove(b'=')
    .remove(b'@');

/// On-disk layout of the storage root.
///
/// `root/{id}` is the entry directory, `root/{id}/{name}` the entry file.
#[derive(Debug, Clone)]
pub struct StorageLayout {
    root: PathBuf,
}

impl StorageLayout {
    /// Create a layout rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The storage root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of the entry `id`.
    #[must_use]
    pub fn entry_dir(&self, id: &EntryId) -> PathBuf {
        self.root.join(id.to_string())
    }

    /// File of the entry `id` named `display_name`.
    #[must_use]
    pub fn file_path(&self, id: &EntryId, display_name: &str) -> PathBuf {
        self.entry_dir(id).join(display_name)
    }

    /// Retrieval path: `/download/{id}/{url-escaped display_name}`.
    #[must_use]
    pub fn download_path(id: &EntryId, display_name: &str) -> String {
        format!(
            "{DOWNLOAD_PREFIX}/{id}/{}",
            utf8_percent_encode(display_name, PATH_SEGMENT)
        )
    }

    /// Resolves untrusted `{id}/{name}` segments to a file path under the root.
    ///
    /// Only identifiers in canonical form and names that sanitization
    /// leaves unchanged are accepted. The composed path is checked to be
    /// exactly two normal components below the root.
    ///
    /// # Errors
    ///
    /// - `StorageError::InvalidId` if `id` is not a canonical identifier
    /// - `StorageError::InvalidName` if `name` is not a sanitized name
    /// - `StorageError::OutsideRoot` if the composed path leaves the root
    pub fn resolve(&self, id: &str, name: &str) -> Result<PathBuf, StorageError> {
        let id: EntryId = id.parse()?;
        if !is_safe_filename(name) {
            return Err(StorageError::InvalidName(name.to_string()));
        }

        let path = self.file_path(&id, name);
        self.ensure_confined(&path)?;
        Ok(path)
    }

    fn ensure_confined(&self, path: &Path) -> Result<(), StorageError> {
        let relative = path
            .strip_prefix(&self.root)
            .map_err(|_| StorageError::OutsideRoot(path.to_path_buf()))?;

        let mut components = relative.components();
        let confined = matches!(
            (components.next(), components.next(), components.next()),
            (Some(Component::Normal(_)), Some(Component::Normal(_)), None)
        );

        if confined {
            Ok(())
        } else {
            Err(StorageError::OutsideRoot(path.to_path_buf()))
        }
    }
}
