//! # airtrack-core
//!
//! Core logic for the airtrack presence tracking system.
//!
//! This crate provides:
//! - Parsing of airodump-ng CSV reports into access point and station records
//! - Correlation of stations with their access points and a recency filter
//! - Distance estimation from signal strength (log-distance path loss)
//! - Configuration management and a tracker handle that owns the last roster
//!
//! ## Architecture
//!
//! - [`report`] - Row classification and report parsing
//! - [`correlator`] - Association, recency filtering, roster construction
//! - [`distance`] - Calibrated path loss model
//! - [`tracker`] - Poll-driven handle exposing device ids, names and attributes
//! - [`config`] - Configuration loading, saving, and validation
//! - [`error`] - Unified error types for the crate
//! - [`types`] - Records, devices and the roster

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(missing_docs)]

pub mod config;
pub mod correlator;
pub mod distance;
pub mod error;
pub mod report;
pub mod tracker;
pub mod types;

// Re-export primary types for convenience
pub use config::{
    default_config_path, is_valid_mac_address, is_valid_timezone_format, Config, ConfigError,
    ConfigResult, PresenceConfig, ReportConfig, ServerConfig,
};
pub use correlator::{display_name, Correlation, CorrelationStats, PresenceCorrelator};
pub use distance::{distance_meters, Band, PathLossModel};
pub use error::{Result, TrackerError};
pub use report::{classify_line, parse_line, LineError, LineKind, ParsedReport, Record, ReportParser};
pub use tracker::{Poll, PresenceTracker, ReportClock, ScanSummary};
pub use types::{normalize_mac, AccessPoint, ClientObservation, Device, DeviceAttributes, Roster};
