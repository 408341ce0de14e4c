use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::ephemeris::StateVector;
use crate::source::SnapshotSummary;
use crate::web::api::epochs::{location_of, speed_of, LocationResponse, SpeedResponse};
use crate::web::api::error::{ApiResult, ErrorResponse};
use crate::web::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct NowResponse {
    pub requested_at: DateTime<Utc>,
    /// Seconds from the request time to the returned epoch (negative if in the past)
    pub offset_seconds: f64,
    pub state_vector: StateVector,
    pub speed: SpeedResponse,
    pub location: LocationResponse,
}

#[utoipa::path(
    get,
    path = "/api/now",
    responses(
        (status = 200, description = "State vector nearest to the current time", body = NowResponse),
        (status = 422, description = "Degenerate state vector", body = ErrorResponse),
        (status = 503, description = "No ephemeris loaded", body = ErrorResponse)
    ),
    tag = "epochs"
)]
pub async fn now(State(state): State<AppState>) -> ApiResult<Json<NowResponse>> {
    Ok(Json(nearest_to(&state, Utc::now())?))
}

pub(crate) fn nearest_to(state: &AppState, at: DateTime<Utc>) -> ApiResult<NowResponse> {
    let snapshot = state.snapshot()?;
    let vector = *snapshot.series.nearest(at)?;
    let offset = vector.epoch.delta_from(at);
    Ok(NowResponse {
        requested_at: at,
        offset_seconds: offset.num_microseconds().unwrap_or(i64::MAX) as f64 * 1e-6,
        speed: speed_of(state, &vector)?,
        location: location_of(state, &vector)?,
        state_vector: vector,
    })
}

#[utoipa::path(
    get,
    path = "/api/status",
    responses(
        (status = 200, description = "Currently loaded ephemeris", body = SnapshotSummary),
        (status = 503, description = "No ephemeris loaded", body = ErrorResponse)
    ),
    tag = "service"
)]
pub async fn status(State(state): State<AppState>) -> ApiResult<Json<SnapshotSummary>> {
    Ok(Json(state.snapshot()?.summary()))
}

#[utoipa::path(
    post,
    path = "/api/refresh",
    responses(
        (status = 200, description = "Ephemeris reloaded", body = SnapshotSummary),
        (status = 502, description = "Source unavailable or document malformed; previous ephemeris kept", body = ErrorResponse)
    ),
    tag = "service"
)]
pub async fn refresh(State(state): State<AppState>) -> ApiResult<Json<SnapshotSummary>> {
    let snapshot = state.loader.refresh(&state.store).await?;
    Ok(Json(snapshot.summary()))
}
