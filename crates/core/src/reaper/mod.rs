//! Background expiry of stored entries.
//!
//! The [`Reaper`] periodically scans the storage root and deletes every
//! entry whose modification time is older than the configured expiry. It
//! runs until its cancellation token fires.

mod config;
mod service;

pub use config::ReaperConfig;
pub use service::{Reaper, SweepReport};
