//! Reaper configuration types.

use std::time::Duration;

/// Reaper configuration.
#[derive(Debug, Clone, Copy)]
pub struct ReaperConfig {
    /// Entries strictly older than this are deleted.
    pub expiry: Duration,
    /// Period between the starts of two passes. A pass that overruns it
    /// pushes the next one back by the overrun.
    pub interval: Duration,
}

impl ReaperConfig {
    /// Default period between passes: one minute.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

    /// Create a reaper config with the default interval.
    #[must_use]
    pub const fn new(expiry: Duration) -> Self {
        Self {
            expiry,
            interval: Self::DEFAULT_INTERVAL,
        }
    }

    /// Set the period between passes.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reaper_config_defaults() {
        let config = ReaperConfig::new(Duration::from_secs(900));
        assert_eq!(config.expiry, Duration::from_secs(900));
        assert_eq!(config.interval, ReaperConfig::DEFAULT_INTERVAL);
    }

    #[test]
    fn test_reaper_config_interval() {
        let config =
            ReaperConfig::new(Duration::from_secs(900)).with_interval(Duration::from_millis(50));
        assert_eq!(config.interval, Duration::from_millis(50));
    }
}
