//! Upload storage on the local filesystem.
//!
//! Every upload becomes one entry: a directory named by a random
//! [`EntryId`] holding exactly one file named by the sanitized original
//! filename.
//!
//! # Layout
//!
//! ```text
//! {root}/
//! ├── 3f2a9c0e8b7d4e1fa6c5b4d3e2f10987/
//! │   └── report.pdf
//! └── 0c1d2e3f4a5b4c6d8e7f8091a2b3c4d5/
//!     └── holiday photo (1).jpg
//! ```
//!
//! The retrieval path of an entry is `/download/{id}/{url-escaped name}`.

mod config;
mod entry;
mod error;
mod id;
mod layout;
mod sanitize;
mod service;

pub use config::StorageConfig;
pub use entry::StorageEntry;
pub use error::StorageError;
pub use id::{ENTRY_ID_LEN, EntryId};
pub use layout::{DOWNLOAD_PREFIX, StorageLayout};
pub use sanitize::{MAX_NAME_LEN, PLACEHOLDER, is_safe_filename, sanitize_filename};
pub use service::StorageService;
