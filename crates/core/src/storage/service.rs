//! Storage service implementation on the local filesystem.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info, warn};

use super::config::StorageConfig;
use super::entry::StorageEntry;
use super::error::StorageError;
use super::id::EntryId;
use super::layout::StorageLayout;
use super::sanitize::sanitize_filename;

/// Size of the buffer used to stream uploads to disk.
const COPY_BUF_SIZE: usize = 64 * 1024;

/// Storage service for uploaded files.
///
/// Holds no locks: every upload owns the directory it created, and the
/// reaper only ever removes whole entry directories.
#[derive(Debug, Clone)]
pub struct StorageService {
    layout: StorageLayout,
    config: StorageConfig,
}

impl StorageService {
    /// Create a new storage service from configuration.
    #[must_use]
    pub fn new(config: StorageConfig) -> Self {
        let layout = StorageLayout::new(config.root.clone());
        Self { layout, config }
    }

    /// Creates the storage root (and parents) if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn ensure_root(&self) -> Result<(), StorageError> {
        let root = self.layout.root();
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(0o700);

        builder
            .create(root)
            .await
            .map_err(|e| StorageError::create_dir(root, e))
    }

    /// Stores the content of `reader` as a new entry named after `filename`.
    ///
    /// The content is streamed through a fixed-size buffer, never held in
    /// memory as a whole. If anything fails after the entry directory was
    /// created, the directory is removed again.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No identifier can be generated
    /// - The entry directory or file cannot be created
    /// - Reading from `reader` fails
    /// - The content exceeds the configured maximum
    /// - Writing to disk fails
    pub async fn store<R>(&self, filename: &str, reader: R) -> Result<StorageEntry, StorageError>
    where
        R: AsyncRead + Unpin,
    {
        let id = EntryId::generate()?;
        self.store_as(id, filename, reader).await
    }

    async fn store_as<R>(
        &self,
        id: EntryId,
        filename: &str,
        reader: R,
    ) -> Result<StorageEntry, StorageError>
    where
        R: AsyncRead + Unpin,
    {
        let display_name = sanitize_filename(filename);
        let dir = self.layout.entry_dir(&id);
        let path = self.layout.file_path(&id, &display_name);

        info!(id = %id, path = %path.display(), "writing upload");

        create_entry_dir(&dir)
            .await
            .map_err(|e| StorageError::create_dir(&dir, e))?;

        let size = match self.write_file(&path, reader).await {
            Ok(size) => size,
            Err(err) => {
                discard(&dir).await;
                return Err(err);
            }
        };

        let created_at = fs::metadata(&dir)
            .await
            .and_then(|meta| meta.modified())
            .map_or_else(|_| Utc::now(), DateTime::<Utc>::from);

        Ok(StorageEntry {
            id,
            display_name,
            path,
            size,
            created_at,
        })
    }

    async fn write_file<R>(&self, path: &Path, mut reader: R) -> Result<u64, StorageError>
    where
        R: AsyncRead + Unpin,
    {
        let mut options = fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options
            .open(path)
            .await
            .map_err(|e| StorageError::create_file(path, e))?;

        let max = self.config.max_upload_bytes;
        let mut buf = vec![0u8; COPY_BUF_SIZE];
        let mut written: u64 = 0;

        loop {
            let n = reader
                .read(&mut buf)
                .await
                .map_err(|source| StorageError::Read { source })?;
            if n == 0 {
                break;
            }

            written += n as u64;
            if written > max {
                return Err(StorageError::TooLarge { max });
            }

            file.write_all(&buf[..n])
                .await
                .map_err(|e| StorageError::write(path, e))?;
        }

        file.flush()
            .await
            .map_err(|e| StorageError::write(path, e))?;

        Ok(written)
    }

    /// Resolves untrusted `{id}/{name}` segments to an existing stored file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The segments are malformed or escape the root (see [`StorageLayout::resolve`])
    /// - Nothing exists at the resolved path (`NotFound`)
    /// - The resolved path is a directory (`IsDirectory`)
    pub async fn locate(&self, id: &str, name: &str) -> Result<PathBuf, StorageError> {
        let path = self.layout.resolve(id, name)?;

        match fs::metadata(&path).await {
            Ok(meta) if meta.is_dir() => Err(StorageError::IsDirectory),
            Ok(_) => Ok(path),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
                ) =>
            {
                Err(StorageError::not_found(format!("{id}/{name}")))
            }
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    /// Get the on-disk layout.
    #[must_use]
    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

/// Creates a single entry directory; fails if it already exists.
async fn create_entry_dir(dir: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    #[cfg(unix)]
    builder.mode(0o700);
    builder.create(dir).await
}

/// Best-effort removal of a partially written entry.
async fn discard(dir: &Path) {
    match fs::remove_dir_all(dir).await {
        Ok(()) => debug!(path = %dir.display(), "discarded partial upload"),
        Err(e) => warn!(path = %dir.display(), error = %e, "failed to discard partial upload"),
    }
}
