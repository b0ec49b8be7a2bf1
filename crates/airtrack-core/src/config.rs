//! Application configuration management.
//!
//! Handles loading, saving, and validating airtrack configuration including:
//! - Location and delimiter of the airodump-ng report
//! - Recency window and the (reserved) exclusion list
//! - Distance model calibration
//! - HTTP server settings
//!
//! Configuration is layered: an optional TOML file, overridden by
//! `AIRTRACK__<SECTION>__<KEY>` environment variables.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::distance::PathLossModel;
use crate::report::DEFAULT_DELIMITER;

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "AIRTRACK_CONFIG";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "AIRTRACK";

/// Default report written by `airodump-ng -w /tmp/airodump --output-format csv`.
pub const DEFAULT_REPORT_PATH: &str = "/tmp/airodump-01.csv";

/// Default recency window in seconds.
pub const DEFAULT_RECENCY_WINDOW_SECS: u64 = 15;

/// Upper bound accepted for the recency window (one day).
pub const MAX_RECENCY_WINDOW_SECS: u64 = 86_400;

static MAC_ADDRESS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9A-Fa-f]{2}(:[0-9A-Fa-f]{2}){5}$").expect("MAC address regex is valid")
});

/// Check whether `address` is a colon-separated six-byte hardware address.
#[must_use]
pub fn is_valid_mac_address(address: &str) -> bool {
    MAC_ADDRESS_RE.is_match(address.trim())
}

/// Check whether `name` is a known IANA timezone.
#[must_use]
pub fn is_valid_timezone_format(name: &str) -> bool {
    name.parse::<chrono_tz::Tz>().is_ok()
}

/// Errors raised while loading, validating or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file or environment could not be read or deserialized.
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] ::config::ConfigError),

    /// The configuration could not be written.
    #[error("Failed to write {}: {source}", .path.display())]
    WriteError {
        /// Target path.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The configuration could not be serialized to TOML.
    #[error("Failed to serialize configuration: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// A single field failed validation.
    #[error("{field}: {message}")]
    ValidationError {
        /// Dotted field path.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// Several fields failed validation.
    #[error("{} validation errors", .0.len())]
    MultipleValidationErrors(Vec<ConfigError>),
}

/// Result alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Main application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Report input settings.
    pub report: ReportConfig,

    /// Presence filtering settings.
    pub presence: PresenceConfig,

    /// Distance model calibration.
    pub distance: PathLossModel,

    /// HTTP server settings.
    pub server: ServerConfig,
}

/// Where and how to read the airodump-ng report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Path of the CSV report.
    pub path: PathBuf,

    /// Column delimiter.
    pub delimiter: char,

    /// IANA timezone the capture host writes timestamps in.
    /// `None` uses the local timezone of this process.
    pub timezone: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_REPORT_PATH),
            delimiter: DEFAULT_DELIMITER,
            timezone: None,
        }
    }
}

/// Presence filtering settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    /// Clients last seen this many seconds ago or earlier are dropped.
    pub recency_window_secs: u64,

    /// MAC addresses reserved for exclusion. Validated, not yet applied.
    pub exclude: Vec<String>,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            recency_window_secs: DEFAULT_RECENCY_WINDOW_SECS,
            exclude: Vec::new(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind_address: String,

    /// Use production logging (JSON files + compact stdout).
    pub production: bool,

    /// Directory for rolling JSON logs in production.
    /// `None` uses `/var/log/airtrack` on Linux, the platform data dir elsewhere.
    pub log_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            production: false,
            log_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from `path` layered under environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if the file does not exist, or a
    /// load/validation error.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        Self::load_layered(path)
    }

    /// Load configuration, falling back to defaults if the file is missing.
    ///
    /// Environment overrides still apply when the file is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is invalid, or if the result
    /// fails validation.
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        Self::load_layered(path)
    }

    fn load_layered(path: &Path) -> ConfigResult<Self> {
        let config: Self = ::config::Config::builder()
            .add_source(::config::File::from(path).required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("presence.exclude")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration as TOML, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::WriteError {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, content).map_err(|source| ConfigError::WriteError {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validate every section, collecting all problems.
    ///
    /// # Errors
    ///
    /// Returns the single failure, or [`ConfigError::MultipleValidationErrors`].
    pub fn validate(&self) -> ConfigResult<()> {
        let mut errors = Vec::new();
        let mut fail = |field: &str, message: String| {
            errors.push(ConfigError::ValidationError {
                field: field.to_string(),
                message,
            });
        };

        if self.report.path.as_os_str().is_empty() {
            fail("report.path", "must not be empty".to_string());
        }
        if self.report.delimiter == ':' || self.report.delimiter.is_whitespace() {
            fail(
                "report.delimiter",
                format!("'{}' cannot separate columns", self.report.delimiter),
            );
        }
        if let Some(tz) = &self.report.timezone {
            if !is_valid_timezone_format(tz) {
                fail("report.timezone", format!("unknown timezone '{tz}'"));
            }
        }

        let window = self.presence.recency_window_secs;
        if window == 0 || window > MAX_RECENCY_WINDOW_SECS {
            fail(
                "presence.recency_window_secs",
                format!("must be between 1 and {MAX_RECENCY_WINDOW_SECS}, got {window}"),
            );
        }
        for mac in &self.presence.exclude {
            if !is_valid_mac_address(mac) {
                fail("presence.exclude", format!("invalid MAC address '{mac}'"));
            }
        }

        let alpha = self.distance.path_loss_exponent;
        if !alpha.is_finite() || alpha <= 0.0 {
            fail(
                "distance.path_loss_exponent",
                format!("must be a positive number, got {alpha}"),
            );
        }

        if self
            .server
            .log_dir
            .as_ref()
            .is_some_and(|dir| dir.as_os_str().is_empty())
        {
            fail("server.log_dir", "must not be empty".to_string());
        }
        if self.server.bind_address.parse::<SocketAddr>().is_err() {
            fail(
                "server.bind_address",
                format!("'{}' is not a socket address", self.server.bind_address),
            );
        }

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ConfigError::MultipleValidationErrors(errors)),
        }
    }
}

/// Default configuration file path.
///
/// `AIRTRACK_CONFIG` wins if set. On Linux the default is
/// `/etc/airtrack/config.toml`; elsewhere the platform config directory.
#[must_use]
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }

    #[cfg(target_os = "linux")]
    {
        PathBuf::from("/etc/airtrack/config.toml")
    }
    #[cfg(not(target_os = "linux"))]
    {
        directories::ProjectDirs::from("", "", "airtrack").map_or_else(
            || PathBuf::from("./config.toml"),
            |dirs| dirs.config_dir().join("config.toml"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.presence.recency_window_secs, 15);
        assert_eq!(config.report.path, PathBuf::from("/tmp/airodump-01.csv"));
        assert_eq!(config.report.delimiter, ',');
    }

    #[test]
    fn test_is_valid_mac_address() {
        assert!(is_valid_mac_address("AA:BB:CC:DD:EE:FF"));
        assert!(is_valid_mac_address("aa:bb:cc:dd:ee:ff"));
        assert!(!is_valid_mac_address("AA:BB:CC:DD:EE"));
        assert!(!is_valid_mac_address("AA-BB-CC-DD-EE-FF"));
        assert!(!is_valid_mac_address("GG:BB:CC:DD:EE:FF"));
    }

    #[test]
    fn test_is_valid_timezone_format() {
        assert!(is_valid_timezone_format("Europe/Berlin"));
        assert!(is_valid_timezone_format("UTC"));
        assert!(!is_valid_timezone_format("Mars/Olympus"));
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let mut config = Config::default();
        config.presence.recency_window_secs = 0;
        config.distance.path_loss_exponent = 0.0;
        config.presence.exclude = vec!["not-a-mac".to_string()];
        config.report.timezone = Some("Nowhere/Land".to_string());

        match config.validate() {
            Err(ConfigError::MultipleValidationErrors(errors)) => assert_eq!(errors.len(), 4),
            other => panic!("expected multiple errors, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_single_error() {
        let mut config = Config::default();
        config.server.bind_address = "localhost".to_string();

        match config.validate() {
            Err(ConfigError::ValidationError { field, .. }) => {
                assert_eq!(field, "server.bind_address");
            }
            other => panic!("expected single error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.toml");
        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::NotFound(_))
        ));
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[report]
path = "/var/run/airodump-01.csv"

[distance]
reference_power_2ghz_dbm = -38
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.report.path, PathBuf::from("/var/run/airodump-01.csv"));
        assert_eq!(config.distance.reference_power_2ghz_dbm, -38);
        assert_eq!(config.distance.reference_power_5ghz_dbm, -55);
        assert_eq!(config.presence.recency_window_secs, 15);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[presence]\nrecency_window_secs = 0\n").unwrap();

        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_empty_log_dir_is_rejected() {
        let mut config = Config::default();
        config.server.log_dir = Some(PathBuf::new());

        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError { field, .. }) if field == "server.log_dir"
        ));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.presence.recency_window_secs = 30;
        config.presence.exclude = vec!["AA:BB:CC:DD:EE:FF".to_string()];
        config.report.timezone = Some("Europe/Berlin".to_string());
        config.server.log_dir = Some(dir.path().join("logs"));
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
