//! Correlation of station observations with access points.
//!
//! Turns one [`ParsedReport`] into a [`Roster`]. A station is reported only
//! if it is associated with an access point from the same report, was heard
//! within the recency window, and its access point has a numeric channel.

use chrono::{NaiveDateTime, TimeDelta};
use tracing::{debug, trace};

use crate::config::DEFAULT_RECENCY_WINDOW_SECS;
use crate::distance::PathLossModel;
use crate::report::ParsedReport;
use crate::types::{AccessPoint, ClientObservation, Device, Roster};

/// Counts of observations dropped during a correlation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorrelationStats {
    /// No access point in the report matched the associated BSSID.
    pub unassociated: usize,

    /// Age was not strictly inside `(0, window)`.
    pub stale: usize,

    /// The matched access point's channel was not an integer.
    pub invalid_channel: usize,
}

/// Output of a correlation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Correlation {
    /// Devices that passed every filter.
    pub roster: Roster,

    /// Why the others did not.
    pub stats: CorrelationStats,
}

/// Builds device rosters from parsed reports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresenceCorrelator {
    recency_window: TimeDelta,
    model: PathLossModel,
}

impl Default for PresenceCorrelator {
    fn default() -> Self {
        Self::new(DEFAULT_RECENCY_WINDOW_SECS, PathLossModel::default())
    }
}

impl PresenceCorrelator {
    /// Create a correlator with a recency window in seconds.
    #[must_use]
    pub fn new(recency_window_secs: u64, model: PathLossModel) -> Self {
        let secs = i64::try_from(recency_window_secs).unwrap_or(i64::MAX);
        Self {
            recency_window: TimeDelta::try_seconds(secs).unwrap_or(TimeDelta::MAX),
            model,
        }
    }

    /// Recency window in use.
    #[must_use]
    pub const fn recency_window(&self) -> TimeDelta {
        self.recency_window
    }

    /// Distance model in use.
    #[must_use]
    pub const fn model(&self) -> &PathLossModel {
        &self.model
    }

    /// Correlate a report against `now`.
    ///
    /// When a MAC appears more than once, the last qualifying row wins.
    #[must_use]
    pub fn correlate(&self, report: &ParsedReport, now: NaiveDateTime) -> Correlation {
        let mut correlation = Correlation::default();

        for client in &report.clients {
            let Some(ap) = find_access_point(&report.access_points, &client.associated_bssid)
            else {
                trace!(mac = %client.mac, bssid = %client.associated_bssid, "Client not associated");
                correlation.stats.unassociated += 1;
                continue;
            };

            if !self.is_recent(client, now) {
                trace!(mac = %client.mac, last_seen = %client.last_seen, "Client outside recency window");
                correlation.stats.stale += 1;
                continue;
            }

            let Ok(channel) = ap.channel.parse::<i32>() else {
                trace!(mac = %client.mac, channel = %ap.channel, "Access point channel not numeric");
                correlation.stats.invalid_channel += 1;
                continue;
            };

            correlation.roster.insert(Device {
                mac: client.mac.clone(),
                display_name: display_name(&client.mac),
                ssid: ap.ssid.clone(),
                channel: ap.channel.clone(),
                power: client.power_dbm,
                distance_meters: self.model.estimate(client.power_dbm, channel),
                last_seen: client.last_seen,
            });
        }

        debug!(
            devices = correlation.roster.len(),
            unassociated = correlation.stats.unassociated,
            stale = correlation.stats.stale,
            invalid_channel = correlation.stats.invalid_channel,
            "Correlated report"
        );

        correlation
    }

    /// Whether `0 < now - last_seen < window`.
    ///
    /// A zero or negative age means the capture clock is ahead of ours.
    fn is_recent(&self, client: &ClientObservation, now: NaiveDateTime) -> bool {
        let age = now.signed_duration_since(client.last_seen);
        age > TimeDelta::zero() && age < self.recency_window
    }
}

fn find_access_point<'a>(access_points: &'a [AccessPoint], bssid: &str) -> Option<&'a AccessPoint> {
    access_points.iter().find(|ap| ap.bssid == bssid)
}

/// Anonymized label `dev_<g0>_<g1>` from the first two MAC groups.
#[must_use]
pub fn display_name(mac: &str) -> String {
    let mut groups = mac.split(':');
    let first = groups.next().unwrap_or_default();
    let second = groups.next().unwrap_or_default();
    format!("dev_{first}_{second}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const AP_BSSID: &str = "00:11:22:33:44:55";

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 15)
            .unwrap()
            .and_hms_opt(3, 30, 0)
            .unwrap()
    }

    fn ap(bssid: &str, channel: &str) -> AccessPoint {
        AccessPoint {
            bssid: bssid.to_string(),
            channel: channel.to_string(),
            ssid: "HomeNetwork".to_string(),
        }
    }

    fn client(mac: &str, bssid: &str, power_dbm: i32, age_secs: i64) -> ClientObservation {
        ClientObservation {
            mac: mac.to_string(),
            associated_bssid: bssid.to_string(),
            power_dbm,
            last_seen: now() - TimeDelta::seconds(age_secs),
        }
    }

    fn report(clients: Vec<ClientObservation>) -> ParsedReport {
        ParsedReport {
            access_points: vec![ap(AP_BSSID, "6")],
            clients,
            skipped_lines: 0,
        }
    }

    #[test]
    fn test_associated_recent_client_becomes_device() {
        let report = report(vec![client("AA:BB:CC:11:22:33", AP_BSSID, -60, 5)]);
        let result = PresenceCorrelator::default().correlate(&report, now());

        let device = result.roster.get("AA:BB:CC:11:22:33").unwrap();
        assert_eq!(device.display_name, "dev_AA_BB");
        assert_eq!(device.ssid, "HomeNetwork");
        assert_eq!(device.channel, "6");
        assert_eq!(device.power, -60);
        assert_eq!(device.distance_meters, 4);
        assert_eq!(device.last_seen, now() - TimeDelta::seconds(5));
    }

    #[test]
    fn test_recency_boundaries() {
        let correlator = PresenceCorrelator::default();
        let at = |age: i64| {
            let report = report(vec![client("AA:BB:CC:11:22:33", AP_BSSID, -60, age)]);
            correlator.correlate(&report, now()).roster.len()
        };

        assert_eq!(at(0), 0);
        assert_eq!(at(15), 0);
        assert_eq!(at(14), 1);
        assert_eq!(at(1), 1);
        assert_eq!(at(-3), 0);
    }

    #[test]
    fn test_subsecond_age_counts_as_recent() {
        let report = report(vec![client("AA:BB:CC:11:22:33", AP_BSSID, -60, 0)]);
        let later = now() + TimeDelta::milliseconds(500);

        let result = PresenceCorrelator::default().correlate(&report, later);
        assert_eq!(result.roster.len(), 1);
    }

    #[test]
    fn test_unassociated_client_is_dropped() {
        let report = report(vec![
            client("AA:BB:CC:11:22:33", "(NOT ASSOCIATED)", -60, 5),
            client("AA:BB:CC:11:22:34", "66:77:88:99:AA:BB", -60, 5),
        ]);
        let result = PresenceCorrelator::default().correlate(&report, now());

        assert!(result.roster.is_empty());
        assert_eq!(result.stats.unassociated, 2);
    }

    #[test]
    fn test_non_numeric_channel_is_dropped() {
        let report = ParsedReport {
            access_points: vec![ap(AP_BSSID, "auto")],
            clients: vec![client("AA:BB:CC:11:22:33", AP_BSSID, -60, 5)],
            skipped_lines: 0,
        };
        let result = PresenceCorrelator::default().correlate(&report, now());

        assert!(result.roster.is_empty());
        assert_eq!(result.stats.invalid_channel, 1);
    }

    #[test]
    fn test_duplicate_mac_last_wins() {
        let report = report(vec![
            client("AA:BB:CC:11:22:33", AP_BSSID, -50, 5),
            client("AA:BB:CC:11:22:33", AP_BSSID, -70, 3),
        ]);
        let result = PresenceCorrelator::default().correlate(&report, now());

        assert_eq!(result.roster.len(), 1);
        assert_eq!(result.roster.get("AA:BB:CC:11:22:33").unwrap().power, -70);
    }

    #[test]
    fn test_stale_duplicate_does_not_replace_fresh_entry() {
        let report = report(vec![
            client("AA:BB:CC:11:22:33", AP_BSSID, -50, 5),
            client("AA:BB:CC:11:22:33", AP_BSSID, -70, 60),
        ]);
        let result = PresenceCorrelator::default().correlate(&report, now());

        assert_eq!(result.roster.get("AA:BB:CC:11:22:33").unwrap().power, -50);
        assert_eq!(result.stats.stale, 1);
    }

    #[test]
    fn test_five_ghz_calibration_applies() {
        let report = ParsedReport {
            access_points: vec![ap(AP_BSSID, "36")],
            clients: vec![client("AA:BB:CC:11:22:33", AP_BSSID, -55, 5)],
            skipped_lines: 0,
        };
        let result = PresenceCorrelator::default().correlate(&report, now());

        assert_eq!(
            result.roster.get("AA:BB:CC:11:22:33").unwrap().distance_meters,
            1
        );
    }

    #[test]
    fn test_custom_window() {
        let correlator = PresenceCorrelator::new(60, PathLossModel::default());
        let report = report(vec![client("AA:BB:CC:11:22:33", AP_BSSID, -60, 45)]);

        assert_eq!(correlator.correlate(&report, now()).roster.len(), 1);
        assert_eq!(correlator.recency_window(), TimeDelta::seconds(60));
    }

    #[test]
    fn test_correlation_is_idempotent() {
        let report = report(vec![
            client("AA:BB:CC:11:22:33", AP_BSSID, -50, 5),
            client("DD:EE:FF:11:22:33", AP_BSSID, -75, 2),
        ]);
        let correlator = PresenceCorrelator::default();

        assert_eq!(
            correlator.correlate(&report, now()),
            correlator.correlate(&report, now())
        );
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("AA:BB:CC:11:22:33"), "dev_AA_BB");
        assert_eq!(display_name("AA"), "dev_AA_");
    }
}
