//! Application configuration management.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Application configuration.
///
/// Loaded once at startup and never mutated afterwards. Every section has
/// defaults, so an empty environment yields a runnable configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Upload storage configuration.
    #[serde(default)]
    pub storage: StorageSettings,
    /// Expiry (reaper) configuration.
    #[serde(default)]
    pub expiry: ExpiryConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory holding the static UI, served for every unmatched path.
    #[serde(default = "default_static_dir")]
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[allow(clippy::unnecessary_wraps)]
fn default_static_dir() -> Option<PathBuf> {
    Some(PathBuf::from("static"))
}

/// Upload storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Directory that holds one subdirectory per uploaded file.
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
    /// Maximum upload request size in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("/tmp/fish")
}

fn default_max_upload_bytes() -> u64 {
    200 << 20 // 200 MiB
}

/// Expiry configuration for the background reaper.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpiryConfig {
    /// Delete uploads older than this many seconds. `None` or `0` disables expiry.
    #[serde(default = "default_expiry_after")]
    pub after_secs: Option<u64>,
    /// Pause between two reaper passes, in seconds.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl Default for ExpiryConfig {
    fn default() -> Self {
        Self {
            after_secs: default_expiry_after(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

#[allow(clippy::unnecessary_wraps)]
fn default_expiry_after() -> Option<u64> {
    Some(900) // 15 minutes
}

fn default_sweep_interval() -> u64 {
    60
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, lowest precedence first: `config/default`, `config/{RUN_MODE}`,
    /// then `FISH__SECTION__KEY` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("FISH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Returns the expiry threshold, or `None` when expiry is disabled.
    #[must_use]
    pub fn expiry(&self) -> Option<Duration> {
        self.expiry
            .after_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Returns the pause between two reaper passes.
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.expiry.sweep_interval_secs.max(1))
    }
}
