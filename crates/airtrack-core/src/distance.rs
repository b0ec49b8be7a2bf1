//! Signal strength to distance estimation.
//!
//! Uses the log-distance path loss model:
//!
//! ```text
//! distance = 10 ^ (-(power_dbm - P0) / (10 * alpha))
//! ```
//!
//! where `P0` is the received power one meter from the transmitter and
//! `alpha` is the path loss exponent. Both are calibration values for a
//! particular deployment, so they are carried in [`PathLossModel`] rather
//! than inlined. The result is rounded up to whole meters.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default path loss exponent for both bands.
pub const DEFAULT_PATH_LOSS_EXPONENT: f64 = 4.0;

/// Default received power at one meter on 2.4 GHz, in dBm.
pub const DEFAULT_REFERENCE_POWER_2GHZ_DBM: i32 = -40;

/// Default received power at one meter on 5 GHz, in dBm.
pub const DEFAULT_REFERENCE_POWER_5GHZ_DBM: i32 = -55;

/// Highest channel number treated as 2.4 GHz.
pub const DEFAULT_BAND_THRESHOLD_CHANNEL: i32 = 14;

/// Frequency band inferred from a channel number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    /// 2.4 GHz (channels up to the threshold, 14 by default).
    TwoPointFourGhz,
    /// 5 GHz (everything above the threshold).
    FiveGhz,
}

impl Band {
    /// Infer the band from a channel using the given threshold.
    #[must_use]
    pub const fn from_channel(channel: i32, threshold: i32) -> Self {
        if channel <= threshold {
            Self::TwoPointFourGhz
        } else {
            Self::FiveGhz
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TwoPointFourGhz => write!(f, "2.4 GHz"),
            Self::FiveGhz => write!(f, "5 GHz"),
        }
    }
}

/// Calibrated log-distance path loss model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathLossModel {
    /// Path loss exponent (`alpha`).
    pub path_loss_exponent: f64,

    /// Reference power at one meter on 2.4 GHz.
    pub reference_power_2ghz_dbm: i32,

    /// Reference power at one meter on 5 GHz.
    pub reference_power_5ghz_dbm: i32,

    /// Channels at or below this value are 2.4 GHz.
    pub band_threshold_channel: i32,
}

impl Default for PathLossModel {
    fn default() -> Self {
        Self {
            path_loss_exponent: DEFAULT_PATH_LOSS_EXPONENT,
            reference_power_2ghz_dbm: DEFAULT_REFERENCE_POWER_2GHZ_DBM,
            reference_power_5ghz_dbm: DEFAULT_REFERENCE_POWER_5GHZ_DBM,
            band_threshold_channel: DEFAULT_BAND_THRESHOLD_CHANNEL,
        }
    }
}

impl PathLossModel {
    /// Band for a channel under this calibration.
    #[must_use]
    pub const fn band(&self, channel: i32) -> Band {
        Band::from_channel(channel, self.band_threshold_channel)
    }

    /// Reference power at one meter for a band.
    #[must_use]
    pub const fn reference_power(&self, band: Band) -> i32 {
        match band {
            Band::TwoPointFourGhz => self.reference_power_2ghz_dbm,
            Band::FiveGhz => self.reference_power_5ghz_dbm,
        }
    }

    /// Estimate the distance in meters for a signal heard on `channel`.
    ///
    /// Signals at or above the reference power come out at one meter or
    /// less before rounding; they are not clamped.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn estimate(&self, power_dbm: i32, channel: i32) -> u64 {
        let p0 = self.reference_power(self.band(channel));
        let exponent = -(f64::from(power_dbm) - f64::from(p0)) / (10.0 * self.path_loss_exponent);
        // Float to int casts saturate, so very weak signals cap at u64::MAX.
        10f64.powf(exponent).ceil() as u64
    }
}

/// Estimate distance with the default calibration.
#[must_use]
pub fn distance_meters(power_dbm: i32, channel: i32) -> u64 {
    PathLossModel::default().estimate(power_dbm, channel)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_power_is_one_meter() {
        assert_eq!(distance_meters(-40, 6), 1);
        assert_eq!(distance_meters(-55, 36), 1);
    }

    #[test]
    fn test_weaker_signal_is_farther() {
        assert!(distance_meters(-70, 6) > distance_meters(-60, 6));
        assert!(distance_meters(-80, 36) > distance_meters(-70, 36));
    }

    #[test]
    fn test_known_values() {
        // 10^0.5 = 3.16, 10^0.75 = 5.62, 10^0.625 = 4.22
        assert_eq!(distance_meters(-60, 6), 4);
        assert_eq!(distance_meters(-70, 6), 6);
        assert_eq!(distance_meters(-80, 36), 5);
    }

    #[test]
    fn test_band_threshold() {
        assert_eq!(Band::from_channel(14, 14), Band::TwoPointFourGhz);
        assert_eq!(Band::from_channel(15, 14), Band::FiveGhz);
        assert_eq!(Band::from_channel(-1, 14), Band::TwoPointFourGhz);

        // Same power lands closer on 5 GHz because its reference is lower.
        assert!(distance_meters(-65, 14) > distance_meters(-65, 36));
    }

    #[test]
    fn test_strong_signal_is_not_clamped_below_reference() {
        // 10^-1 = 0.1 rounds up to 1; nothing special-cases zero or positive power.
        assert_eq!(distance_meters(0, 6), 1);
        assert_eq!(distance_meters(10, 36), 1);
    }

    #[test]
    fn test_very_weak_signal_has_no_upper_bound() {
        assert!(distance_meters(-120, 6) >= 100);
    }

    #[test]
    fn test_custom_calibration() {
        let model = PathLossModel {
            path_loss_exponent: 2.0,
            reference_power_2ghz_dbm: -30,
            reference_power_5ghz_dbm: -45,
            band_threshold_channel: 14,
        };
        // -(-50 + 30) / 20 = 1.0 -> 10 m
        assert_eq!(model.estimate(-50, 1), 10);
        assert_eq!(model.estimate(-45, 40), 1);
    }

    #[test]
    fn test_band_display() {
        assert_eq!(Band::TwoPointFourGhz.to_string(), "2.4 GHz");
        assert_eq!(Band::FiveGhz.to_string(), "5 GHz");
    }
}
