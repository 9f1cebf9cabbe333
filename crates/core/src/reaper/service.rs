//! Reaper task and sweep logic.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use tokio::fs;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::config::ReaperConfig;

/// `tokio::time::interval` rejects a zero period.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Outcome of a single pass over the storage root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Children of the root that were examined.
    pub scanned: usize,
    /// Expired children that were deleted.
    pub purged: usize,
    /// Expired children that could not be deleted.
    pub failed: usize,
}

/// Deletes expired entries from the storage root.
#[derive(Debug, Clone)]
pub struct Reaper {
    root: PathBuf,
    config: ReaperConfig,
}

impl Reaper {
    /// Create a reaper for `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, config: ReaperConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// The storage root being swept.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &ReaperConfig {
        &self.config
    }

    /// Runs one pass using the current wall-clock time.
    pub async fn sweep(&self) -> SweepReport {
        self.sweep_at(SystemTime::now()).await
    }

    /// Runs one pass, treating `now` as the current time.
    ///
    /// Every direct child of the root whose modification time is more than
    /// the expiry before `now` is removed recursively. Failures are logged
    /// and counted, never returned: a pass always completes.
    pub async fn sweep_at(&self, now: SystemTime) -> SweepReport {
        let mut report = SweepReport::default();

        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) => {
                error!(root = %self.root.display(), error = %e, "failed to scan storage root");
                return report;
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    error!(root = %self.root.display(), error = %e, "failed to read storage root");
                    break;
                }
            };
            report.scanned += 1;

            let path = entry.path();
            let meta = match entry.metadata().await {
                Ok(meta) => meta,
                // Raced with a concurrent removal.
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to stat upload");
                    continue;
                }
            };

            let modified = match meta.modified() {
                Ok(modified) => modified,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "upload has no modification time");
                    continue;
                }
            };

            if !self.is_expired(modified, now) {
                continue;
            }

            match remove(&path, meta.is_dir()).await {
                Ok(()) => {
                    report.purged += 1;
                    info!(
                        path = %path.display(),
                        modified = %DateTime::<Utc>::from(modified),
                        "purged expired upload"
                    );
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!(path = %path.display(), "expired upload already gone");
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(path = %path.display(), error = %e, "failed to purge expired upload");
                }
            }
        }

        report
    }

    fn is_expired(&self, modified: SystemTime, now: SystemTime) -> bool {
        now.duration_since(modified)
            .is_ok_and(|age| age > self.config.expiry)
    }

    /// Sweeps until `token` is cancelled.
    ///
    /// The first pass starts immediately, later ones `interval` after the
    /// start of the previous pass. A pass that overruns the interval delays
    /// the next one instead of bunching passes together.
    /// Cancellation is observed between passes, so a pass in progress
    /// always finishes.
    pub async fn run(self, token: CancellationToken) {
        info!(
            root = %self.root.display(),
            expiry_secs = self.config.expiry.as_secs(),
            interval_secs = self.config.interval.as_secs(),
            "reaper started"
        );

        let mut ticker = time::interval(self.config.interval.max(MIN_INTERVAL));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let report = self.sweep().await;
            if report.purged > 0 || report.failed > 0 {
                info!(
                    scanned = report.scanned,
                    purged = report.purged,
                    failed = report.failed,
                    "reaper pass finished"
                );
            } else {
                debug!(scanned = report.scanned, "reaper pass finished");
            }
        }

        info!("reaper stopped");
    }

    /// Spawns [`Reaper::run`] on the current runtime.
    #[must_use]
    pub fn spawn(self, token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(token))
    }
}

async fn remove(path: &Path, is_dir: bool) -> io::Result<()> {
    if is_dir {
        fs::remove_dir_all(path).await
    } else {
        fs::remove_file(path).await
    }
}
