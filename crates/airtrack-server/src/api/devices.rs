//! Device roster API endpoints.
//!
//! `GET /devices` runs a fresh report pass; the lookups read the roster that
//! pass left behind, matching how the presence tracker polls ids first and
//! then asks for names and attributes.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use airtrack_core::{is_valid_mac_address, normalize_mac, Device, DeviceAttributes, ScanSummary};

use crate::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::state::SharedState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Result of a fresh poll.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "device_ids": ["AA:BB:CC:11:22:33", "DD:EE:FF:00:11:22"],
    "scan": {
        "scan_id": "01947a2e-8c1b-7f3a-9d2e-5b6c7d8e9f00",
        "scanned_at": "2025-01-15T03:30:00",
        "report_available": true,
        "access_points": 2,
        "clients": 4,
        "skipped_lines": 2,
        "unassociated": 1,
        "stale": 1,
        "invalid_channel": 0,
        "devices": 2
    }
}))]
pub struct DeviceListResponse {
    /// Visible device MACs, sorted.
    pub device_ids: Vec<String>,

    /// Counters for the pass that produced the list.
    pub scan: ScanSummary,
}

/// A single device from the last poll.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "mac": "AA:BB:CC:11:22:33",
    "display_name": "dev_AA_BB",
    "attributes": {
        "ssid": "HomeNetwork",
        "channel": "6",
        "power": -62,
        "distance_meters": 4,
        "last_seen": "2025-01-15T03:29:58"
    }
}))]
pub struct DeviceResponse {
    /// Normalized MAC address.
    #[schema(example = "AA:BB:CC:11:22:33")]
    pub mac: String,

    /// Anonymized display name.
    #[schema(example = "dev_AA_BB")]
    pub display_name: String,

    /// Signal, distance and association details.
    pub attributes: DeviceAttributes,
}

/// Every device from the last poll.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RosterResponse {
    /// Devices sorted by MAC.
    pub devices: Vec<Device>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Poll the report and list visible devices.
#[utoipa::path(
    get,
    path = "/api/devices",
    tag = "devices",
    operation_id = "listDevices",
    summary = "List currently visible devices",
    description = "Reads the airodump-ng report, correlates stations with their \
        access points and returns the MACs of devices heard within the recency \
        window. An unreadable report yields an empty list with \
        `report_available: false`.",
    responses(
        (status = 200, description = "Poll completed", body = DeviceListResponse),
        (status = 500, description = "Poll task failed", body = ErrorResponse)
    )
)]
pub async fn list_devices(State(state): State<SharedState>) -> ApiResult<Json<DeviceListResponse>> {
    let tracker = state.read().await.tracker.clone();

    let poll = tokio::task::spawn_blocking(move || tracker.poll())
        .await
        .map_err(|e| ApiError::InternalError {
            error_code: "scan_task_failed".to_string(),
            message: "Report pass did not complete".to_string(),
            details: Some(e.to_string()),
        })?;

    debug!(scan_id = %poll.summary.scan_id, devices = poll.summary.devices, "Listed devices");

    Ok(Json(DeviceListResponse {
        device_ids: poll.device_ids.into_iter().collect(),
        scan: poll.summary,
    }))
}

/// Look up one device from the last poll.
#[utoipa::path(
    get,
    path = "/api/devices/{mac}",
    tag = "devices",
    operation_id = "getDevice",
    summary = "Get a device's name and attributes",
    description = "Returns the display name and attributes recorded for the \
        device by the most recent poll. Does not read the report again.",
    params(
        ("mac" = String, Path, description = "Device MAC address (case-insensitive)", example = "AA:BB:CC:11:22:33")
    ),
    responses(
        (status = 200, description = "Device found", body = DeviceResponse),
        (status = 400, description = "Malformed MAC address", body = ErrorResponse),
        (status = 404, description = "Device not in the last roster", body = ErrorResponse)
    )
)]
pub async fn get_device(
    State(state): State<SharedState>,
    Path(mac): Path<String>,
) -> ApiResult<Json<DeviceResponse>> {
    if !is_valid_mac_address(&mac) {
        return Err(ApiError::invalid_mac(&mac));
    }

    let tracker = state.read().await.tracker.clone();
    let device = tracker.device(&mac).ok_or_else(|| ApiError::NotFound {
        error_code: "device_not_found".to_string(),
        message: format!("Device {} was not seen in the last poll", normalize_mac(&mac)),
    })?;

    Ok(Json(DeviceResponse {
        attributes: device.attributes(),
        mac: device.mac,
        display_name: device.display_name,
    }))
}

/// Return the full roster from the last poll.
#[utoipa::path(
    get,
    path = "/api/roster",
    tag = "devices",
    operation_id = "getRoster",
    summary = "Get the last computed roster",
    description = "Returns every device from the most recent poll without \
        reading the report again.",
    responses(
        (status = 200, description = "Roster retrieved", body = RosterResponse)
    )
)]
pub async fn get_roster(State(state): State<SharedState>) -> Json<RosterResponse> {
    let tracker = state.read().await.tracker.clone();
    Json(RosterResponse {
        devices: tracker.roster().into_devices(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_device_response_serialization() {
        let response = DeviceResponse {
            mac: "AA:BB:CC:11:22:33".to_string(),
            display_name: "dev_AA_BB".to_string(),
            attributes: DeviceAttributes {
                ssid: "HomeNetwork".to_string(),
                channel: "6".to_string(),
                power: -62,
                distance_meters: 4,
                last_seen: NaiveDate::from_ymd_opt(2025, 1, 15)
                    .unwrap()
                    .and_hms_opt(3, 29, 58)
                    .unwrap(),
            },
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"display_name\":\"dev_AA_BB\""));
        assert!(json.contains("\"distance_meters\":4"));
    }
}
