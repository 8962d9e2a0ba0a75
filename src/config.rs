//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::api::ApiConfig as ServerConfig;
use crate::domain::{AttendanceSettings, SystemClock};
use crate::store::{StoreBackend, StoreConfig as BackendConfig};
use chrono::FixedOffset;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub daycare: DaycareConfig,

    #[serde(default)]
    pub attendance: AttendanceConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Document store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// `sqlite` or `memory`
    #[serde(default = "default_backend")]
    pub backend: String,

    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_backend() -> String {
    "sqlite".to_string()
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("daycare").to_string_lossy().to_string())
        .unwrap_or_else(|| "./daycare_data".to_string())
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            data_dir: default_data_dir(),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_body_size() -> usize {
    2 * 1024 * 1024
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_size: default_max_body_size(),
        }
    }
}

/// Site settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DaycareConfig {
    /// UTC offset used for day boundaries; host local time when unset
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
}

/// Attendance board settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttendanceConfig {
    #[serde(default)]
    pub lock_after_mark: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let (config, source) = Self::resolve(&Self::default_paths());
        source.log();
        config
    }

    /// Search paths used by [`Config::load_default`], in priority order
    pub fn default_paths() -> Vec<PathBuf> {
        [
            dirs::config_dir().map(|p| p.join("daycare").join("config.toml")),
            Some(PathBuf::from("/etc/daycare/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Load the first existing file in `candidates` without logging, so the
    /// caller can report the outcome once tracing is set up
    pub fn resolve(candidates: &[PathBuf]) -> (Self, ConfigSource) {
        for path in candidates {
            if path.exists() {
                return match Self::load_with_env(path) {
                    Ok(config) => (config, ConfigSource::File(path.clone())),
                    Err(error) => (
                        Self::from_env(),
                        ConfigSource::Fallback {
                            path: path.clone(),
                            error,
                        },
                    ),
                };
            }
        }
        (Self::from_env(), ConfigSource::Defaults)
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply `DAYCARE_*` overrides from `lookup`
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Store overrides
        if let Some(data_dir) = lookup("DAYCARE_DATA_DIR") {
            self.store.data_dir = data_dir;
        }
        if let Some(backend) = lookup("DAYCARE_STORE") {
            self.store.backend = backend;
        }

        // API overrides
        if let Some(host) = lookup("DAYCARE_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = lookup("DAYCARE_API_PORT") {
            match port.parse() {
                Ok(p) => self.api.port = p,
                Err(_) => tracing::warn!("Ignoring invalid DAYCARE_API_PORT: {}", port),
            }
        }

        // Site overrides
        if let Some(offset) = lookup("DAYCARE_UTC_OFFSET_MINUTES") {
            match offset.parse() {
                Ok(m) => self.daycare.utc_offset_minutes = Some(m),
                Err(_) => tracing::warn!("Ignoring invalid DAYCARE_UTC_OFFSET_MINUTES: {}", offset),
            }
        }
        if let Some(lock) = lookup("DAYCARE_LOCK_AFTER_MARK") {
            self.attendance.lock_after_mark = matches!(lock.as_str(), "1" | "true" | "yes");
        }

        // Logging overrides
        if let Some(level) = lookup("DAYCARE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("DAYCARE_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Store settings for [`crate::store::open_store`]
    pub fn store_config(&self) -> Result<BackendConfig, ConfigError> {
        let backend: StoreBackend = self.store.backend.parse().map_err(ConfigError::Invalid)?;
        Ok(BackendConfig {
            backend,
            data_dir: expand_home(&self.store.data_dir),
        })
    }

    pub fn api_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.api.host.clone(),
            port: self.api.port,
            max_body_size: self.api.max_body_size,
        }
    }

    /// Clock for day boundaries
    pub fn clock(&self) -> Result<SystemClock, ConfigError> {
        match self.daycare.utc_offset_minutes {
            None => Ok(SystemClock::local()),
            Some(minutes) => minutes
                .checked_mul(60)
                .and_then(FixedOffset::east_opt)
                .map(SystemClock::with_offset)
                .ok_or_else(|| {
                    ConfigError::Invalid(format!("utc_offset_minutes out of range: {}", minutes))
                }),
        }
    }

    pub fn attendance_settings(&self) -> AttendanceSettings {
        AttendanceSettings {
            lock_after_mark: self.attendance.lock_after_mark,
        }
    }
}

/// Where the loaded settings came from
#[derive(Debug)]
pub enum ConfigSource {
    File(PathBuf),
    /// No config file found
    Defaults,
    /// A config file was found but could not be loaded
    Fallback { path: PathBuf, error: ConfigError },
}

impl ConfigSource {
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => tracing::info!("Loaded config from {:?}", path),
            ConfigSource::Defaults => {
                tracing::info!("Using default config with environment overrides")
            }
            ConfigSource::Fallback { path, error } => {
                tracing::warn!("Failed to load config from {:?}: {}", path, error);
                tracing::info!("Using default config with environment overrides");
            }
        }
    }
}

/// Expand a leading `~` to the user's home directory
fn expand_home(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return PathBuf::from(path),
    };
    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(path),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Daycare Configuration
#
# Environment variables override these settings:
# - DAYCARE_DATA_DIR
# - DAYCARE_STORE
# - DAYCARE_API_HOST
# - DAYCARE_API_PORT
# - DAYCARE_UTC_OFFSET_MINUTES
# - DAYCARE_LOCK_AFTER_MARK
# - DAYCARE_LOG_LEVEL
# - DAYCARE_LOG_FORMAT

[store]
# Document store backend: sqlite or memory
backend = "sqlite"

# Directory holding daycare.db
data_dir = "~/.local/share/daycare"

[api]
# API server host
host = "127.0.0.1"

# API server port
port = 8080

# Maximum request body size (bytes)
max_body_size = 2097152

[daycare]
# Offset from UTC used to decide what "today" is, in minutes.
# Leave unset to use the server's local time.
# utc_offset_minutes = -240

[attendance]
# Refuse to change a child's status once marked for the day
lock_after_mark = false

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.store.backend, "sqlite");
        assert_eq!(config.api.port, 8080);
        assert_eq!(config.daycare.utc_offset_minutes, None);
        assert!(!config.attendance.lock_after_mark);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("[attendance]\nlock_after_mark = true\n").unwrap();
        assert!(config.attendance_settings().lock_after_mark);
        assert_eq!(config.api.host, "127.0.0.1");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("DAYCARE_STORE", "memory"),
            ("DAYCARE_API_PORT", "9090"),
            ("DAYCARE_UTC_OFFSET_MINUTES", "-240"),
            ("DAYCARE_LOCK_AFTER_MARK", "true"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.store_config().unwrap().backend, StoreBackend::Memory);
        assert_eq!(config.api_config().addr(), "127.0.0.1:9090");
        assert_eq!(config.daycare.utc_offset_minutes, Some(-240));
        assert!(config.attendance.lock_after_mark);
        assert!(config.clock().is_ok());
    }

    #[test]
    fn test_invalid_values() {
        let mut config = Config::default();
        config.store.backend = "postgres".to_string();
        assert!(matches!(config.store_config(), Err(ConfigError::Invalid(_))));

        config.daycare.utc_offset_minutes = Some(24 * 60);
        assert!(matches!(config.clock(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_generated_data_dir_expands_home() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        let data_dir = config.store_config().unwrap().data_dir;

        if let Some(home) = dirs::home_dir() {
            assert_eq!(data_dir, home.join(".local/share/daycare"));
            assert!(data_dir.is_absolute());
        }
        assert_eq!(expand_home("./data"), PathBuf::from("./data"));
        assert_eq!(expand_home("~user/data"), PathBuf::from("~user/data"));
    }

    #[test]
    fn test_resolve_reports_source() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.toml");
        let good = dir.path().join("config.toml");
        std::fs::write(&broken, "[api\nport = ").unwrap();
        std::fs::write(&good, "[logging]\nformat = \"json\"\n").unwrap();

        let (config, source) = Config::resolve(&[dir.path().join("missing.toml"), good.clone()]);
        assert!(matches!(source, ConfigSource::File(ref p) if *p == good));
        assert_eq!(config.logging.format, "json");

        let (_, source) = Config::resolve(&[broken.clone(), good]);
        assert!(matches!(
            source,
            ConfigSource::Fallback { ref path, error: ConfigError::Parse { .. } } if *path == broken
        ));

        let (_, source) = Config::resolve(&[dir.path().join("missing.toml")]);
        assert!(matches!(source, ConfigSource::Defaults));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[store]\ndata_dir = \"/tmp/daycare\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.store.data_dir, "/tmp/daycare");

        assert!(matches!(
            Config::load(&dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
