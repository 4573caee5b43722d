//! Application-level configuration loading: storage backend, persistence
//! deadline and the defaults used when seeding groups and guests.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "KICKOFF_BACK_CONFIG_PATH";
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_PERSIST_TIMEOUT_MS: u64 = 5_000;

/// Which snapshot store the binary installs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Process memory; everything is lost on shutdown.
    Memory,
    /// JSON files under `data_dir`.
    #[default]
    File,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
/// Where snapshots are written.
pub struct StorageConfig {
    /// Snapshot store implementation.
    pub backend: StorageBackend,
    /// Directory used by the file backend.
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
/// Scheduling parameters applied when a group is created without them.
pub struct GroupDefaults {
    /// Kick-off time, `HH:MM`.
    pub time: String,
    /// Price per person.
    pub price: f64,
    /// Session capacity.
    pub max_players: u32,
}

impl Default for GroupDefaults {
    fn default() -> Self {
        Self {
            time: "19:00".into(),
            price: 0.0,
            max_players: 14,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Snapshot store selection.
    pub storage: StorageConfig,
    /// Deadline for persisting one mutation; `null` or 0 disables it.
    pub persist_timeout_ms: Option<u64>,
    /// Values used when a group is created without them.
    pub group_defaults: GroupDefaults,
    /// Manual rating given to guests admitted without one.
    pub guest_default_rating: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            persist_timeout_ms: Some(DEFAULT_PERSIST_TIMEOUT_MS),
            group_defaults: GroupDefaults::default(),
            guest_default_rating: 3.0,
        }
    }
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(config) => {
                    info!(
                        path = %path.display(),
                        backend = ?config.storage.backend,
                        "loaded configuration"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a JSON document; missing keys take their default values.
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }

    /// Deadline applied to each snapshot write, `None` when disabled.
    pub fn persist_timeout(&self) -> Option<Duration> {
        self.persist_timeout_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
