//! OpenAPI specification for the airtrack API.
//!
//! Served at `/api/openapi.json` and written to disk by the `gen-openapi`
//! binary for client generation.

use axum::Json;
use utoipa::OpenApi;

use airtrack_core::{Device, DeviceAttributes, ScanSummary};

use super::config::{
    CalibrationResponse, ConfigResponse, UpdateCalibrationRequest, UpdateConfigResponse,
    UpdateRecencyRequest,
};
use super::devices::{DeviceListResponse, DeviceResponse, RosterResponse};
use super::error::ErrorResponse;
use super::health::HealthResponse;

/// Serve the OpenAPI specification as JSON.
pub async fn get_openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Returns the OpenAPI specification as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if the document cannot be serialized.
pub fn get_openapi_json() -> Result<String, serde_json::Error> {
    ApiDoc::openapi().to_pretty_json()
}

/// Main OpenAPI document structure for airtrack.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "airtrack API",
        version = "0.1.0",
        description = r"
# airtrack API

airtrack reads the CSV report that airodump-ng keeps rewriting and reports
which wireless stations are nearby.

## Polling model

1. `GET /api/devices` reads the report, pairs each station with the access
   point it is associated with, drops stations not heard within the recency
   window and returns the MACs that remain.
2. `GET /api/devices/{mac}` returns the display name and attributes recorded
   by that poll. It never reads the report again.

## Distance

Distances are whole meters from a log-distance path loss model with separate
one-meter reference powers for 2.4 GHz and 5 GHz. Recalibrate with
`PUT /api/config/calibration`.
",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/", description = "Local airtrack server")
    ),
    tags(
        (name = "system", description = "Health checks"),
        (name = "devices", description = "Nearby wireless stations from the airodump-ng report"),
        (name = "config", description = "Report location, recency window and distance calibration")
    ),
    paths(
        super::health::health_check,
        super::devices::list_devices,
        super::devices::get_device,
        super::devices::get_roster,
        super::config::get_config,
        super::config::update_calibration,
        super::config::update_recency,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            // Device types
            Device,
            DeviceAttributes,
            ScanSummary,
            DeviceListResponse,
            DeviceResponse,
            RosterResponse,
            // Config types
            ConfigResponse,
            CalibrationResponse,
            UpdateCalibrationRequest,
            UpdateRecencyRequest,
            UpdateConfigResponse,
        )
    )
)]
pub struct ApiDoc;
