//! TOML-based configuration for the server.
//!
//! The config file is optional.  Every field has a default, so a missing
//! file, an empty file, or a file written by an older version all load
//! cleanly.  A full file looks like this:
//!
//! ```toml
//! [server]
//! bind_address = "0.0.0.0"
//! port = 8080
//! max_body_bytes = 4096
//! queue_depth = 8
//! log_level = "info"
//!
//! [transport]
//! connection_id = 0
//!
//! [timing]
//! touch_interval_ms = 16
//! tap_hold_ms = 50
//! long_press_min_ms = 20
//! swipe_default_duration_ms = 600
//! key_hold_ms = 80
//! multi_tap_pause_ms = 100
//! multi_long_press_pause_ms = 150
//! ```
//!
//! # Serde default values
//!
//! Fields annotated with `#[serde(default = "some_fn")]` use the return value
//! of `some_fn()` when the field is absent from the TOML file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::synthesize_gesture::GestureTiming;
use crate::infrastructure::worker::DEFAULT_QUEUE_DEPTH;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub timing: TimingConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// IP address to bind to.  `"0.0.0.0"` binds all interfaces.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// TCP port for the command endpoint.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Largest request body accepted; larger bodies get `413`.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Gestures allowed to wait behind the one playing; more get `503 Busy`.
    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,
    /// `tracing` filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Injection transport session settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TransportConfig {
    /// Connection to treat as active at startup.  Absent means "not
    /// connected" until the transport reports a session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<u16>,
}

/// Gesture pacing, all in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimingConfig {
    #[serde(default = "default_touch_interval_ms")]
    pub touch_interval_ms: u64,
    #[serde(default = "default_tap_hold_ms")]
    pub tap_hold_ms: u64,
    #[serde(default = "default_long_press_min_ms")]
    pub long_press_min_ms: u64,
    #[serde(default = "default_swipe_default_duration_ms")]
    pub swipe_default_duration_ms: u64,
    #[serde(default = "default_key_hold_ms")]
    pub key_hold_ms: u64,
    #[serde(default = "default_multi_tap_pause_ms")]
    pub multi_tap_pause_ms: u64,
    #[serde(default = "default_multi_long_press_pause_ms")]
    pub multi_long_press_pause_ms: u64,
}

impl TimingConfig {
    /// Converts the millisecond fields into a [`GestureTiming`].
    pub fn to_timing(&self) -> GestureTiming {
        GestureTiming {
            touch_interval: Duration::from_millis(self.touch_interval_ms),
            tap_hold: Duration::from_millis(self.tap_hold_ms),
            long_press_min: Duration::from_millis(self.long_press_min_ms),
            swipe_default_duration: Duration::from_millis(self.swipe_default_duration_ms),
            key_hold: Duration::from_millis(self.key_hold_ms),
            multi_tap_pause: Duration::from_millis(self.multi_tap_pause_ms),
            multi_long_press_pause: Duration::from_millis(self.multi_long_press_pause_ms),
        }
    }
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_max_body_bytes() -> usize {
    4096
}
fn default_queue_depth() -> usize {
    DEFAULT_QUEUE_DEPTH
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_touch_interval_ms() -> u64 {
    16
}
fn default_tap_hold_ms() -> u64 {
    50
}
fn default_long_press_min_ms() -> u64 {
    20
}
fn default_swipe_default_duration_ms() -> u64 {
    600
}
fn default_key_hold_ms() -> u64 {
    80
}
fn default_multi_tap_pause_ms() -> u64 {
    100
}
fn default_multi_long_press_pause_ms() -> u64 {
    150
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
            queue_depth: default_queue_depth(),
            log_level: default_log_level(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            touch_interval_ms: default_touch_interval_ms(),
            tap_hold_ms: default_tap_hold_ms(),
            long_press_min_ms: default_long_press_min_ms(),
            swipe_default_duration_ms: default_swipe_default_duration_ms(),
            key_hold_ms: default_key_hold_ms(),
            multi_tap_pause_ms: default_multi_tap_pause_ms(),
            multi_long_press_pause_ms: default_multi_long_press_pause_ms(),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Loads `AppConfig` from `path`, returning `AppConfig::default()` if the
/// file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cfg: AppConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Writes `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
