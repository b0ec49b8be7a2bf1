//! Configuration API endpoints.
//!
//! Provides endpoints for reading configuration and recalibrating the
//! distance model or recency window without a restart. Updates are
//! validated, saved to the config file, and rebuild the tracker.

use axum::extract::State;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use airtrack_core::{Config, PathLossModel, TrackerError};

use crate::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::state::{AppState, SharedState};

/// Creates the config router with all endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(get_config))
        .route("/calibration", put(update_calibration))
        .route("/recency", put(update_recency))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Current configuration response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "report_path": "/tmp/airodump-01.csv",
    "delimiter": ",",
    "timezone": "Europe/Berlin",
    "recency_window_secs": 15,
    "exclude": [],
    "calibration": {
        "path_loss_exponent": 4.0,
        "reference_power_2ghz_dbm": -40,
        "reference_power_5ghz_dbm": -55,
        "band_threshold_channel": 14
    },
    "bind_address": "0.0.0.0:3000"
}))]
pub struct ConfigResponse {
    /// Report file read on every poll.
    #[schema(example = "/tmp/airodump-01.csv")]
    pub report_path: String,

    /// Column delimiter.
    #[schema(example = ",")]
    pub delimiter: String,

    /// Timezone of report timestamps; `null` means the server's local zone.
    #[schema(example = "Europe/Berlin", nullable)]
    pub timezone: Option<String>,

    /// Recency window in seconds.
    #[schema(example = 15)]
    pub recency_window_secs: u64,

    /// Reserved exclusion list. Not applied to the roster yet.
    pub exclude: Vec<String>,

    /// Distance model calibration.
    pub calibration: CalibrationResponse,

    /// HTTP listen address.
    #[schema(example = "0.0.0.0:3000")]
    pub bind_address: String,
}

/// Distance model calibration.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CalibrationResponse {
    /// Path loss exponent.
    #[schema(example = 4.0)]
    pub path_loss_exponent: f64,

    /// Received power at one meter on 2.4 GHz.
    #[schema(example = -40)]
    pub reference_power_2ghz_dbm: i32,

    /// Received power at one meter on 5 GHz.
    #[schema(example = -55)]
    pub reference_power_5ghz_dbm: i32,

    /// Channels at or below this are 2.4 GHz.
    #[schema(example = 14)]
    pub band_threshold_channel: i32,
}

impl From<&PathLossModel> for CalibrationResponse {
    fn from(model: &PathLossModel) -> Self {
        Self {
            path_loss_exponent: model.path_loss_exponent,
            reference_power_2ghz_dbm: model.reference_power_2ghz_dbm,
            reference_power_5ghz_dbm: model.reference_power_5ghz_dbm,
            band_threshold_channel: model.band_threshold_channel,
        }
    }
}

impl From<&Config> for ConfigResponse {
    fn from(config: &Config) -> Self {
        Self {
            report_path: config.report.path.display().to_string(),
            delimiter: config.report.delimiter.to_string(),
            timezone: config.report.timezone.clone(),
            recency_window_secs: config.presence.recency_window_secs,
            exclude: config.presence.exclude.clone(),
            calibration: CalibrationResponse::from(&config.distance),
            bind_address: config.server.bind_address.clone(),
        }
    }
}

/// Partial calibration update. Omitted fields keep their value.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[schema(example = json!({
    "reference_power_2ghz_dbm": -38,
    "path_loss_exponent": 3.5
}))]
pub struct UpdateCalibrationRequest {
    /// New path loss exponent (> 0).
    #[schema(example = 3.5)]
    pub path_loss_exponent: Option<f64>,

    /// New 2.4 GHz reference power (-120 to 0 dBm).
    #[schema(example = -38)]
    pub reference_power_2ghz_dbm: Option<i32>,

    /// New 5 GHz reference power (-120 to 0 dBm).
    #[schema(example = -52)]
    pub reference_power_5ghz_dbm: Option<i32>,

    /// New band threshold channel.
    #[schema(example = 14)]
    pub band_threshold_channel: Option<i32>,
}

/// Request to change the recency window.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(example = json!({ "recency_window_secs": 30 }))]
pub struct UpdateRecencyRequest {
    /// Window in seconds (1-86400).
    #[schema(example = 30, minimum = 1, maximum = 86400)]
    pub recency_window_secs: u64,
}

/// Response after a configuration update.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateConfigResponse {
    /// Whether the update was applied and saved.
    pub success: bool,

    /// Configuration now in effect.
    pub config: ConfigResponse,
}

// ============================================================================
// Handlers
// ============================================================================

const REFERENCE_POWER_RANGE: std::ops::RangeInclusive<i32> = -120..=0;

/// Get current configuration.
#[utoipa::path(
    get,
    path = "/api/config",
    tag = "config",
    operation_id = "getConfig",
    summary = "Get current configuration",
    description = "Returns the report location, recency window, exclusion list \
        and distance calibration currently in effect.",
    responses(
        (status = 200, description = "Configuration retrieved", body = ConfigResponse)
    )
)]
pub async fn get_config(State(state): State<SharedState>) -> Json<ConfigResponse> {
    let state_guard = state.read().await;
    Json(ConfigResponse::from(&state_guard.config))
}

/// Update distance calibration.
#[utoipa::path(
    put,
    path = "/api/config/calibration",
    tag = "config",
    operation_id = "updateCalibration",
    summary = "Update distance calibration",
    description = "Changes the path loss model used for distance estimates. \
        Takes effect on the next poll; the current roster is cleared.",
    request_body = UpdateCalibrationRequest,
    responses(
        (status = 200, description = "Calibration updated", body = UpdateConfigResponse),
        (status = 400, description = "Value out of range", body = ErrorResponse),
        (status = 500, description = "Configuration could not be saved", body = ErrorResponse)
    )
)]
pub async fn update_calibration(
    State(state): State<SharedState>,
    Json(request): Json<UpdateCalibrationRequest>,
) -> ApiResult<Json<UpdateConfigResponse>> {
    for (field, value) in [
        ("reference_power_2ghz_dbm", request.reference_power_2ghz_dbm),
        ("reference_power_5ghz_dbm", request.reference_power_5ghz_dbm),
    ] {
        if let Some(dbm) = value {
            if !REFERENCE_POWER_RANGE.contains(&dbm) {
                return Err(ApiError::BadRequest {
                    error_code: "invalid_reference_power".to_string(),
                    message: format!("{field} must be between -120 and 0 dBm, got {dbm}"),
                });
            }
        }
    }
    if let Some(alpha) = request.path_loss_exponent {
        if !alpha.is_finite() || alpha <= 0.0 {
            return Err(ApiError::BadRequest {
                error_code: "invalid_path_loss_exponent".to_string(),
                message: format!("path_loss_exponent must be positive, got {alpha}"),
            });
        }
    }

    let mut state_guard = state.write().await;
    let mut config = state_guard.config.clone();
    let model = &mut config.distance;
    if let Some(alpha) = request.path_loss_exponent {
        model.path_loss_exponent = alpha;
    }
    if let Some(dbm) = request.reference_power_2ghz_dbm {
        model.reference_power_2ghz_dbm = dbm;
    }
    if let Some(dbm) = request.reference_power_5ghz_dbm {
        model.reference_power_5ghz_dbm = dbm;
    }
    if let Some(channel) = request.band_threshold_channel {
        model.band_threshold_channel = channel;
    }

    info!(calibration = ?config.distance, "Updating distance calibration");
    apply_and_save(&mut state_guard, config)
}

/// Update the recency window.
#[utoipa::path(
    put,
    path = "/api/config/recency",
    tag = "config",
    operation_id = "updateRecency",
    summary = "Update recency window",
    description = "Changes how recently a client must have been heard to be \
        reported. Takes effect on the next poll.",
    request_body = UpdateRecencyRequest,
    responses(
        (status = 200, description = "Recency window updated", body = UpdateConfigResponse),
        (status = 422, description = "Window out of range", body = ErrorResponse),
        (status = 500, description = "Configuration could not be saved", body = ErrorResponse)
    )
)]
pub async fn update_recency(
    State(state): State<SharedState>,
    Json(request): Json<UpdateRecencyRequest>,
) -> ApiResult<Json<UpdateConfigResponse>> {
    let mut state_guard = state.write().await;
    let mut config = state_guard.config.clone();
    config.presence.recency_window_secs = request.recency_window_secs;

    info!(
        recency_window_secs = request.recency_window_secs,
        "Updating recency window"
    );
    apply_and_save(&mut state_guard, config)
}

fn apply_and_save(state: &mut AppState, config: Config) -> ApiResult<Json<UpdateConfigResponse>> {
    state.commit_config(config).map_err(|e| match e {
        TrackerError::PersistenceError(details) => ApiError::InternalError {
            error_code: "config_save_failed".to_string(),
            message: "Failed to save configuration".to_string(),
            details: Some(details),
        },
        other => ApiError::from(other),
    })?;

    Ok(Json(UpdateConfigResponse {
        success: true,
        config: ConfigResponse::from(&state.config),
    }))
}
