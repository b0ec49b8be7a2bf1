//! Presence tracker handle.
//!
//! [`PresenceTracker`] is what the host keeps across polls. Each poll reads
//! the report, correlates it and replaces the stored roster; lookups read the
//! roster from the most recent poll. An unreadable report is logged and
//! produces an empty roster, never an error.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{Local, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{info_span, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::Config;
use crate::correlator::PresenceCorrelator;
use crate::error::{Result, TrackerError};
use crate::report::ReportParser;
use crate::types::{Device, DeviceAttributes, Roster};

/// Source of "now", in the same clock the report is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportClock {
    /// Local timezone of this process.
    Local,
    /// A fixed IANA timezone.
    Zone(Tz),
}

impl ReportClock {
    /// Build a clock from an optional IANA name.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::ConfigValidationError`] for unknown names.
    pub fn from_timezone(name: Option<&str>) -> Result<Self> {
        name.map_or(Ok(Self::Local), |name| {
            name.parse::<Tz>().map(Self::Zone).map_err(|_| {
                TrackerError::ConfigValidationError(format!("unknown timezone '{name}'"))
            })
        })
    }

    /// Current wall-clock time without offset.
    #[must_use]
    pub fn now(&self) -> NaiveDateTime {
        match self {
            Self::Local => Local::now().naive_local(),
            Self::Zone(tz) => Utc::now().with_timezone(tz).naive_local(),
        }
    }
}

/// Outcome of one poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "scan_id": "01947a2e-8c1b-7f3a-9d2e-5b6c7d8e9f00",
    "scanned_at": "2025-01-15T03:30:00",
    "report_available": true,
    "access_points": 4,
    "clients": 9,
    "skipped_lines": 3,
    "unassociated": 5,
    "stale": 1,
    "invalid_channel": 0,
    "devices": 3
}))]
pub struct ScanSummary {
    /// Identifier of this poll, for log correlation.
    pub scan_id: Uuid,

    /// "Now" used for the recency filter.
    pub scanned_at: NaiveDateTime,

    /// Whether the report could be read.
    pub report_available: bool,

    /// Access point rows parsed.
    pub access_points: usize,

    /// Station rows parsed.
    pub clients: usize,

    /// Non-blank rows skipped by the parser.
    pub skipped_lines: usize,

    /// Stations without a known access point.
    pub unassociated: usize,

    /// Stations outside the recency window.
    pub stale: usize,

    /// Stations whose access point channel was not numeric.
    pub invalid_channel: usize,

    /// Devices in the resulting roster.
    pub devices: usize,
}

/// One poll: its counters and the device ids it left in the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poll {
    /// Counters for the pass.
    pub summary: ScanSummary,

    /// Sorted MACs of the roster this pass produced.
    pub device_ids: BTreeSet<String>,
}

/// Handle owning the last computed roster.
#[derive(Debug)]
pub struct PresenceTracker {
    report_path: PathBuf,
    parser: ReportParser,
    correlator: PresenceCorrelator,
    clock: ReportClock,
    excluded: Vec<String>,
    roster: Mutex<Roster>,
}

impl PresenceTracker {
    /// Create a tracker reading `report_path`.
    #[must_use]
    pub fn new(
        report_path: impl Into<PathBuf>,
        parser: ReportParser,
        correlator: PresenceCorrelator,
        clock: ReportClock,
    ) -> Self {
        Self {
            report_path: report_path.into(),
            parser,
            correlator,
            clock,
            excluded: Vec::new(),
            roster: Mutex::new(Roster::new()),
        }
    }

    /// Create a tracker from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured timezone is unknown.
    pub fn from_config(config: &Config) -> Result<Self> {
        let clock = ReportClock::from_timezone(config.report.timezone.as_deref())?;
        let mut tracker = Self::new(
            config.report.path.clone(),
            ReportParser::new(config.report.delimiter),
            PresenceCorrelator::new(config.presence.recency_window_secs, config.distance),
            clock,
        );
        tracker.excluded = config.presence.exclude.clone();
        Ok(tracker)
    }

    /// Path of the report being read.
    #[must_use]
    pub fn report_path(&self) -> &Path {
        &self.report_path
    }

    /// Correlator in use.
    #[must_use]
    pub const fn correlator(&self) -> &PresenceCorrelator {
        &self.correlator
    }

    /// Configured exclusion list. Reserved; not applied to the roster.
    #[must_use]
    pub fn excluded(&self) -> &[String] {
        &self.excluded
    }

    /// Poll using the report clock.
    pub fn scan(&self) -> ScanSummary {
        self.poll().summary
    }

    /// Poll with an explicit "now".
    pub fn scan_at(&self, now: NaiveDateTime) -> ScanSummary {
        self.poll_at(now).summary
    }

    /// Poll using the report clock, returning the summary with the ids it produced.
    pub fn poll(&self) -> Poll {
        self.poll_at(self.clock.now())
    }

    /// Poll with an explicit "now".
    ///
    /// The roster lock is held for the whole pass, including reading back the
    /// ids, so concurrent polls run one after another and each [`Poll`] is
    /// internally consistent.
    pub fn poll_at(&self, now: NaiveDateTime) -> Poll {
        let scan_id = Uuid::now_v7();
        let _span = info_span!("scan", %scan_id).entered();
        let mut roster = self.lock_roster();

        let mut summary = ScanSummary {
            scan_id,
            scanned_at: now,
            report_available: false,
            access_points: 0,
            clients: 0,
            skipped_lines: 0,
            unassociated: 0,
            stale: 0,
            invalid_channel: 0,
            devices: 0,
        };

        match self.parser.read(&self.report_path) {
            Ok(report) => {
                let correlation = self.correlator.correlate(&report, now);
                summary.report_available = true;
                summary.access_points = report.access_points.len();
                summary.clients = report.clients.len();
                summary.skipped_lines = report.skipped_lines;
                summary.unassociated = correlation.stats.unassociated;
                summary.stale = correlation.stats.stale;
                summary.invalid_channel = correlation.stats.invalid_channel;
                summary.devices = correlation.roster.len();
                *roster = correlation.roster;
            }
            Err(e) => {
                warn!(error = %e, "No report this cycle, roster cleared");
                *roster = Roster::new();
            }
        }

        Poll {
            summary,
            device_ids: roster.device_ids(),
        }
    }

    /// Poll and return the visible device MACs.
    pub fn list_device_ids(&self) -> BTreeSet<String> {
        self.poll().device_ids
    }

    /// Display name from the last poll.
    pub fn display_name(&self, mac: &str) -> Option<String> {
        self.lock_roster().get(mac).map(|d| d.display_name.clone())
    }

    /// Attributes from the last poll.
    pub fn attributes(&self, mac: &str) -> Option<DeviceAttributes> {
        self.lock_roster().get(mac).map(Device::attributes)
    }

    /// Full device from the last poll.
    pub fn device(&self, mac: &str) -> Option<Device> {
        self.lock_roster().get(mac).cloned()
    }

    /// Copy of the last roster.
    pub fn roster(&self) -> Roster {
        self.lock_roster().clone()
    }

    fn lock_roster(&self) -> MutexGuard<'_, Roster> {
        // The roster is replaced wholesale, so a poisoned value is still consistent.
        self.roster.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
