//! airodump-ng CSV report parsing.
//!
//! A report holds two tables: access points, then stations. They share a
//! file and are told apart purely by column count. Header, separator and
//! truncated rows fail the six-group MAC check on column 0 and are skipped.
//!
//! ```text
//! BSSID, First time seen, Last time seen, channel, Speed, Privacy, Cipher, Authentication, Power, # beacons, # IV, LAN IP, ID-length, ESSID, Key
//! 00:11:22:33:44:55, 2025-01-15 03:29:00, 2025-01-15 03:30:00,  6,  54, WPA2, CCMP, PSK, -48, 120, 0, 0.0.0.0, 11, HomeNetwork,
//!
//! Station MAC, First time seen, Last time seen, Power, # packets, BSSID, Probed ESSIDs
//! AA:BB:CC:11:22:33, 2025-01-15 03:29:10, 2025-01-15 03:29:58, -62, 40, 00:11:22:33:44:55,
//! ```

use std::path::Path;

use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::{debug, trace};

use crate::error::{Result, TrackerError};
use crate::types::{normalize_mac, AccessPoint, ClientObservation};

/// Column separator used by airodump-ng.
pub const DEFAULT_DELIMITER: char = ',';

/// Format of the "Last time seen" column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Number of colon-separated groups in a hardware address.
pub const MAC_GROUPS: usize = 6;

/// Minimum column count of an access point row.
pub const ACCESS_POINT_MIN_COLUMNS: usize = 14;

/// Minimum column count of a station row.
pub const CLIENT_MIN_COLUMNS: usize = 7;

mod columns {
    pub const MAC: usize = 0;
    pub const LAST_SEEN: usize = 2;
    pub const CHANNEL: usize = 3;
    pub const POWER: usize = 3;
    pub const BSSID: usize = 5;
    pub const ESSID: usize = 13;
}

/// Shape of a report row, decided from its columns alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Access point table row.
    AccessPoint,
    /// Station table row.
    Client,
    /// Header, separator, or malformed row.
    Unrecognized,
}

/// Classify a split row.
///
/// Column 0 must be a six-group hardware address. Rows with at least
/// [`ACCESS_POINT_MIN_COLUMNS`] columns are access points, rows with at least
/// [`CLIENT_MIN_COLUMNS`] are stations.
#[must_use]
pub fn classify_line(columns: &[&str]) -> LineKind {
    let Some(first) = columns.first() else {
        return LineKind::Unrecognized;
    };
    if first.trim().split(':').count() != MAC_GROUPS {
        return LineKind::Unrecognized;
    }

    match columns.len() {
        n if n >= ACCESS_POINT_MIN_COLUMNS => LineKind::AccessPoint,
        n if n >= CLIENT_MIN_COLUMNS => LineKind::Client,
        _ => LineKind::Unrecognized,
    }
}

/// Why a row was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    /// The row is not an access point or station row.
    #[error("not a record ({columns} columns)")]
    NotARecord {
        /// Column count of the rejected row.
        columns: usize,
    },

    /// The last-seen column is not `YYYY-MM-DD HH:MM:SS`.
    #[error("invalid last-seen timestamp '{0}'")]
    InvalidTimestamp(String),

    /// The power column is not an integer.
    #[error("invalid power value '{0}'")]
    InvalidPower(String),
}

/// A successfully parsed row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// Access point row.
    AccessPoint(AccessPoint),
    /// Station row.
    Client(ClientObservation),
}

/// Parse one row of a report.
///
/// # Errors
///
/// Returns a [`LineError`] describing why the row is not a usable record.
pub fn parse_line(line: &str, delimiter: char) -> std::result::Result<Record, LineError> {
    let cols: Vec<&str> = line.split(delimiter).collect();

    match classify_line(&cols) {
        LineKind::AccessPoint => Ok(Record::AccessPoint(AccessPoint {
            bssid: normalize_mac(cols[columns::MAC]),
            channel: cols[columns::CHANNEL].trim().to_string(),
            ssid: cols[columns::ESSID].trim().to_string(),
        })),
        LineKind::Client => {
            let last_seen_raw = cols[columns::LAST_SEEN].trim();
            let last_seen = NaiveDateTime::parse_from_str(last_seen_raw, TIMESTAMP_FORMAT)
                .map_err(|_| LineError::InvalidTimestamp(last_seen_raw.to_string()))?;

            let power_raw = cols[columns::POWER].trim();
            let power_dbm = power_raw
                .parse::<i32>()
                .map_err(|_| LineError::InvalidPower(power_raw.to_string()))?;

            Ok(Record::Client(ClientObservation {
                mac: normalize_mac(cols[columns::MAC]),
                associated_bssid: normalize_mac(cols[columns::BSSID]),
                power_dbm,
                last_seen,
            }))
        }
        LineKind::Unrecognized => Err(LineError::NotARecord {
            columns: cols.len(),
        }),
    }
}

/// Records of one report, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedReport {
    /// Access point rows.
    pub access_points: Vec<AccessPoint>,

    /// Station rows.
    pub clients: Vec<ClientObservation>,

    /// Non-blank rows that produced no record (headers included).
    pub skipped_lines: usize,
}

/// Parser for airodump-ng CSV reports.
#[derive(Debug, Clone, Copy)]
pub struct ReportParser {
    delimiter: char,
}

impl Default for ReportParser {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITER)
    }
}

impl ReportParser {
    /// Create a parser splitting on `delimiter`.
    #[must_use]
    pub const fn new(delimiter: char) -> Self {
        Self { delimiter }
    }

    /// Column delimiter in use.
    #[must_use]
    pub const fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Parse report content. Never fails; bad rows are counted and skipped.
    #[must_use]
    pub fn parse(&self, content: &str) -> ParsedReport {
        let mut report = ParsedReport::default();

        for (index, raw) in content.lines().enumerate() {
            let line = raw.trim_end();
            if line.is_empty() {
                continue;
            }

            match parse_line(line, self.delimiter) {
                Ok(Record::AccessPoint(ap)) => report.access_points.push(ap),
                Ok(Record::Client(client)) => report.clients.push(client),
                Err(reason) => {
                    trace!(line = index + 1, %reason, "Skipping report line");
                    report.skipped_lines += 1;
                }
            }
        }

        report
    }

    /// Read and parse a report file.
    ///
    /// The file is decoded lossily since ESSIDs may carry arbitrary bytes.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::ReportUnreadable`] if the file cannot be read.
    pub fn read(&self, path: &Path) -> Result<ParsedReport> {
        let bytes = std::fs::read(path).map_err(|source| TrackerError::ReportUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let report = self.parse(&String::from_utf8_lossy(&bytes));

        debug!(
            path = %path.display(),
            access_points = report.access_points.len(),
            clients = report.clients.len(),
            skipped = report.skipped_lines,
            "Parsed report"
        );

        Ok(report)
    }
}
