//! Core storage and expiry logic for Fish.
//!
//! This crate contains everything that touches the upload directory, with
//! ZERO web dependencies. The HTTP layer only translates requests into
//! calls on these types.
//!
//! # Modules
//!
//! - `storage` - Identifiers, filename sanitization, on-disk layout and the
//!   storage service that writes and resolves entries
//! - `reaper` - Background deletion of expired entries

pub mod reaper;
pub mod storage;
