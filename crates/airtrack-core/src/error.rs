//! Unified error types for the airtrack core library.
//!
//! [`TrackerError`] covers every failure mode that can leave the core. The
//! config module has its own [`ConfigError`](crate::config::ConfigError) for
//! internal use, and the report parser reports per-line rejections with
//! [`LineError`](crate::report::LineError), which never escapes a pass.
//!
//! # Example
//!
//! ```rust
//! use airtrack_core::error::{TrackerError, Result};
//! use std::path::PathBuf;
//!
//! fn require_config(path: &PathBuf) -> Result<()> {
//!     if !path.exists() {
//!         return Err(TrackerError::ConfigNotFound(path.clone()));
//!     }
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// The unified error type for all airtrack operations.
#[derive(Debug, Error)]
pub enum TrackerError {
    // =========================================================================
    // REPORT ERRORS
    // =========================================================================
    /// The airodump-ng report could not be opened or read.
    #[error(
        "Report unreadable at {}: {source}. Ensure airodump-ng is running with --output-format csv.",
        .path.display()
    )]
    ReportUnreadable {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A MAC address supplied by a caller is malformed.
    #[error("Invalid MAC address: '{0}'. Expected format XX:XX:XX:XX:XX:XX.")]
    InvalidMacAddress(String),

    // =========================================================================
    // CONFIGURATION ERRORS
    // =========================================================================
    /// The configuration file was not found at the expected path.
    #[error("Configuration file not found at: {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// The configuration file exists but could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    ConfigParseError(String),

    /// The configuration was parsed but contains invalid values.
    #[error("Configuration validation failed: {0}")]
    ConfigValidationError(String),

    // =========================================================================
    // PERSISTENCE & I/O ERRORS
    // =========================================================================
    /// An error occurred while writing configuration back to disk.
    #[error("Persistence error: {0}")]
    PersistenceError(String),

    /// A low-level I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A specialized [`Result`] type for airtrack operations.
pub type Result<T> = std::result::Result<T, TrackerError>;

impl TrackerError {
    /// Returns `true` if the report artifact could not be read.
    #[inline]
    #[must_use]
    pub const fn is_report_error(&self) -> bool {
        matches!(self, Self::ReportUnreadable { .. })
    }

    /// Returns `true` if this error is related to configuration.
    #[inline]
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound(_) | Self::ConfigParseError(_) | Self::ConfigValidationError(_)
        )
    }

    /// Returns `true` if this error is related to I/O or persistence.
    #[inline]
    #[must_use]
    pub const fn is_io_error(&self) -> bool {
        matches!(
            self,
            Self::PersistenceError(_) | Self::IoError(_) | Self::ReportUnreadable { .. }
        )
    }

    /// Returns `true` if the next poll may succeed without intervention.
    ///
    /// A missing report usually means the capture process has not written
    /// its first snapshot yet.
    #[inline]
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::ReportUnreadable { .. })
    }

    /// Returns an HTTP-appropriate status code for this error.
    #[inline]
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidMacAddress(_) => 400,
            Self::ConfigNotFound(_) => 404,
            Self::ConfigParseError(_) | Self::ConfigValidationError(_) => 422,
            Self::PersistenceError(_) | Self::IoError(_) => 500,
            Self::ReportUnreadable { .. } => 503,
        }
    }

    /// Returns a machine-readable error code for API responses.
    #[inline]
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ReportUnreadable { .. } => "REPORT_UNREADABLE",
            Self::InvalidMacAddress(_) => "INVALID_MAC_ADDRESS",
            Self::ConfigNotFound(_) => "CONFIG_NOT_FOUND",
            Self::ConfigParseError(_) => "CONFIG_PARSE_ERROR",
            Self::ConfigValidationError(_) => "CONFIG_VALIDATION_ERROR",
            Self::PersistenceError(_) => "PERSISTENCE_ERROR",
            Self::IoError(_) => "IO_ERROR",
        }
    }
}

// =============================================================================
// CONVERSIONS FROM MODULE-SPECIFIC ERRORS
// =============================================================================

impl From<crate::config::ConfigError> for TrackerError {
    fn from(err: crate::config::ConfigError) -> Self {
        use crate::config::ConfigError;
        match err {
            ConfigError::NotFound(path) => Self::ConfigNotFound(path),
            ConfigError::LoadError(e) => Self::ConfigParseError(e.to_string()),
            ConfigError::WriteError { path, source } => {
                Self::PersistenceError(format!("Failed to write {}: {}", path.display(), source))
            }
            ConfigError::SerializeError(e) => Self::PersistenceError(e.to_string()),
            ConfigError::ValidationError { field, message } => {
                Self::ConfigValidationError(format!("{field}: {message}"))
            }
            ConfigError::MultipleValidationErrors(errors) => {
                let messages: Vec<String> = errors.into_iter().map(|e| e.to_string()).collect();
                Self::ConfigValidationError(messages.join("; "))
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use std::io::{Error as IoErr, ErrorKind};

    fn unreadable() -> TrackerError {
        TrackerError::ReportUnreadable {
            path: PathBuf::from("/tmp/airodump-01.csv"),
            source: IoErr::new(ErrorKind::NotFound, "missing"),
        }
    }

    #[test]
    fn test_report_error_classification() {
        assert!(unreadable().is_report_error());
        assert!(unreadable().is_transient());
        assert!(unreadable().is_io_error());
        assert!(!TrackerError::ConfigParseError("x".into()).is_report_error());
    }

    #[test]
    fn test_config_error_classification() {
        assert!(TrackerError::ConfigNotFound(PathBuf::from("/test")).is_config_error());
        assert!(TrackerError::ConfigParseError("syntax error".into()).is_config_error());
        assert!(TrackerError::ConfigValidationError("invalid value".into()).is_config_error());
        assert!(!unreadable().is_config_error());
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(
            TrackerError::InvalidMacAddress("nope".into()).http_status_code(),
            400
        );
        assert_eq!(
            TrackerError::ConfigNotFound(PathBuf::new()).http_status_code(),
            404
        );
        assert_eq!(
            TrackerError::ConfigValidationError("bad".into()).http_status_code(),
            422
        );
        assert_eq!(
            TrackerError::PersistenceError("disk full".into()).http_status_code(),
            500
        );
        assert_eq!(unreadable().http_status_code(), 503);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(unreadable().error_code(), "REPORT_UNREADABLE");
        assert_eq!(
            TrackerError::InvalidMacAddress("x".into()).error_code(),
            "INVALID_MAC_ADDRESS"
        );
    }

    #[test]
    fn test_from_io_error() {
        let err: TrackerError = IoErr::new(ErrorKind::PermissionDenied, "denied").into();
        assert!(matches!(err, TrackerError::IoError(_)));
    }

    #[test]
    fn test_from_config_validation_errors() {
        let err: TrackerError = ConfigError::MultipleValidationErrors(vec![
            ConfigError::ValidationError {
                field: "presence.recency_window_secs".into(),
                message: "must be greater than 0".into(),
            },
            ConfigError::ValidationError {
                field: "report.timezone".into(),
                message: "unknown timezone".into(),
            },
        ])
        .into();

        let message = err.to_string();
        assert!(message.contains("recency_window_secs"));
        assert!(message.contains("; "));
        assert!(err.is_config_error());
    }

    #[test]
    fn test_error_display_messages() {
        assert!(unreadable().to_string().contains("/tmp/airodump-01.csv"));
        assert!(TrackerError::InvalidMacAddress("zz".into())
            .to_string()
            .contains("zz"));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<TrackerError>();
        assert_sync::<TrackerError>();
    }
}
