//! Shared record and roster types.
//!
//! [`AccessPoint`] and [`ClientObservation`] live for a single report pass.
//! [`Device`] is the output unit; a [`Roster`] holds every device of one pass
//! and is rebuilt from scratch on the next one.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Normalize a MAC address or BSSID token for comparison.
///
/// Trims surrounding whitespace and uppercases. Everything downstream compares
/// normalized values with plain string equality.
#[must_use]
pub fn normalize_mac(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// An access point line from the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPoint {
    /// Normalized BSSID.
    pub bssid: String,

    /// Raw channel token. Usually numeric but not guaranteed.
    pub channel: String,

    /// Network name, possibly empty.
    pub ssid: String,
}

/// A client (station) line from the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientObservation {
    /// Normalized client MAC address.
    pub mac: String,

    /// Normalized BSSID the client is associated with.
    ///
    /// airodump-ng writes `(not associated)` for idle stations, which never
    /// matches an access point.
    pub associated_bssid: String,

    /// Received signal strength in dBm.
    pub power_dbm: i32,

    /// Last time the client was heard, in the capture host's local time.
    pub last_seen: NaiveDateTime,
}

/// A client device that passed association and recency filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "mac": "AA:BB:CC:11:22:33",
    "display_name": "dev_AA_BB",
    "ssid": "HomeNetwork",
    "channel": "6",
    "power": -62,
    "distance_meters": 4,
    "last_seen": "2025-01-15T03:30:00"
}))]
pub struct Device {
    /// Normalized MAC address, unique within a roster.
    #[schema(example = "AA:BB:CC:11:22:33")]
    pub mac: String,

    /// Anonymized label built from the first two MAC groups.
    #[schema(example = "dev_AA_BB")]
    pub display_name: String,

    /// SSID of the associated access point.
    #[schema(example = "HomeNetwork")]
    pub ssid: String,

    /// Channel of the associated access point, as reported.
    #[schema(example = "6")]
    pub channel: String,

    /// Received signal strength in dBm.
    #[schema(example = -62)]
    pub power: i32,

    /// Estimated distance from the scanning point, rounded up.
    #[schema(example = 4)]
    pub distance_meters: u64,

    /// Last time the client was heard.
    pub last_seen: NaiveDateTime,
}

impl Device {
    /// Attributes surfaced to the presence-tracking collaborator.
    #[must_use]
    pub fn attributes(&self) -> DeviceAttributes {
        DeviceAttributes {
            ssid: self.ssid.clone(),
            channel: self.channel.clone(),
            power: self.power,
            distance_meters: self.distance_meters,
            last_seen: self.last_seen,
        }
    }
}

/// Extra per-device attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeviceAttributes {
    /// SSID of the associated access point.
    #[schema(example = "HomeNetwork")]
    pub ssid: String,

    /// Channel of the associated access point.
    #[schema(example = "6")]
    pub channel: String,

    /// Received signal strength in dBm.
    #[schema(example = -62)]
    pub power: i32,

    /// Estimated distance in meters.
    #[schema(example = 4)]
    pub distance_meters: u64,

    /// Last time the client was heard.
    pub last_seen: NaiveDateTime,
}

/// The set of devices produced by one correlation pass, keyed by MAC.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    devices: HashMap<String, Device>,
}

impl Roster {
    /// Create an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a device, replacing any earlier entry with the same MAC.
    pub fn insert(&mut self, device: Device) {
        self.devices.insert(device.mac.clone(), device);
    }

    /// Look up a device. The key is normalized first.
    #[must_use]
    pub fn get(&self, mac: &str) -> Option<&Device> {
        self.devices.get(&normalize_mac(mac))
    }

    /// Sorted set of device MACs.
    #[must_use]
    pub fn device_ids(&self) -> BTreeSet<String> {
        self.devices.keys().cloned().collect()
    }

    /// Number of devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Whether the roster has no devices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Iterate over devices in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    /// Consume the roster, returning devices sorted by MAC.
    #[must_use]
    pub fn into_devices(self) -> Vec<Device> {
        let mut devices: Vec<Device> = self.devices.into_values().collect();
        devices.sort_by(|a, b| a.mac.cmp(&b.mac));
        devices
    }
}
