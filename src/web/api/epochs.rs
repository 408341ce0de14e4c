use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::ephemeris::{kinematics, Epoch, StateVector};
use crate::frames::{self, GeodeticLocation};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SpeedResponse {
    pub epoch: Epoch,
    /// Inertial speed, km/s
    pub speed_km_s: f64,
    /// Speed relative to the rotating Earth, km/s
    pub earth_fixed_speed_km_s: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LocationResponse {
    pub epoch: Epoch,
    #[serde(flatten)]
    pub location: GeodeticLocation,
}

#[utoipa::path(
    get,
    path = "/api/epochs",
    params(
        ("offset" = Option<i64>, Query, description = "Index of the first state vector (default 0)"),
        ("limit" = Option<i64>, Query, description = "Maximum number of state vectors (default all)")
    ),
    responses(
        (status = 200, description = "State vectors in chronological order", body = Vec<StateVector>),
        (status = 400, description = "Invalid offset or limit", body = ErrorResponse),
        (status = 503, description = "No ephemeris loaded", body = ErrorResponse)
    ),
    tag = "epochs"
)]
pub async fn list_epochs(
    State(state): State<AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<StateVector>>> {
    let Query(query) = query.map_err(|e| ApiError::Validation(e.body_text()))?;
    let snapshot = state.snapshot()?;
    let vectors = snapshot.series.range(query.offset, query.limit)?;
    Ok(Json(vectors.to_vec()))
}

#[utoipa::path(
    get,
    path = "/api/epochs/{epoch}",
    params(
        ("epoch" = String, Path, description = "Epoch, e.g. 2024-047T12:00:00.000Z")
    ),
    responses(
        (status = 200, description = "State vector at the epoch", body = StateVector),
        (status = 400, description = "Unparseable epoch", body = ErrorResponse),
        (status = 404, description = "No state vector at the epoch", body = ErrorResponse),
        (status = 503, description = "No ephemeris loaded", body = ErrorResponse)
    ),
    tag = "epochs"
)]
pub async fn get_epoch(
    State(state): State<AppState>,
    Path(epoch): Path<String>,
) -> ApiResult<Json<StateVector>> {
    Ok(Json(lookup(&state, &epoch)?))
}

#[utoipa::path(
    get,
    path = "/api/epochs/{epoch}/speed",
    params(
        ("epoch" = String, Path, description = "Epoch, e.g. 2024-047T12:00:00.000Z")
    ),
    responses(
        (status = 200, description = "Instantaneous speed", body = SpeedResponse),
        (status = 400, description = "Unparseable epoch", body = ErrorResponse),
        (status = 404, description = "No state vector at the epoch", body = ErrorResponse),
        (status = 422, description = "Non-finite velocity", body = ErrorResponse)
    ),
    tag = "epochs"
)]
pub async fn get_speed(
    State(state): State<AppState>,
    Path(epoch): Path<String>,
) -> ApiResult<Json<SpeedResponse>> {
    let vector = lookup(&state, &epoch)?;
    Ok(Json(speed_of(&state, &vector)?))
}

#[utoipa::path(
    get,
    path = "/api/epochs/{epoch}/location",
    params(
        ("epoch" = String, Path, description = "Epoch, e.g. 2024-047T12:00:00.000Z")
    ),
    responses(
        (status = 200, description = "Geodetic location below the spacecraft", body = LocationResponse),
        (status = 400, description = "Unparseable epoch", body = ErrorResponse),
        (status = 404, description = "No state vector at the epoch", body = ErrorResponse),
        (status = 422, description = "Position at the origin or non-finite", body = ErrorResponse)
    ),
    tag = "epochs"
)]
pub async fn get_location(
    State(state): State<AppState>,
    Path(epoch): Path<String>,
) -> ApiResult<Json<LocationResponse>> {
    let vector = lookup(&state, &epoch)?;
    Ok(Json(location_of(&state, &vector)?))
}

fn lookup(state: &AppState, epoch: &str) -> ApiResult<StateVector> {
    let epoch = Epoch::parse(epoch)?;
    let snapshot = state.snapshot()?;
    let vector = *snapshot.series.by_epoch(epoch)?;
    Ok(vector)
}

pub(crate) fn speed_of(state: &AppState, vector: &StateVector) -> ApiResult<SpeedResponse> {
    let speed_km_s = kinematics::speed(&vector.velocity)?;
    let angle = frames::earth_rotation_angle(vector.epoch.datetime(), state.frames.rotation);
    let ground = frames::eci_to_ecef_velocity(&vector.position, &vector.velocity, angle);
    Ok(SpeedResponse {
        epoch: vector.epoch,
        speed_km_s,
        earth_fixed_speed_km_s: kinematics::speed(&ground)?,
    })
}

pub(crate) fn location_of(state: &AppState, vector: &StateVector) -> ApiResult<LocationResponse> {
    let location = frames::to_geodetic(vector.epoch, &vector.position, state.frames)?;
    Ok(LocationResponse {
        epoch: vector.epoch,
        location,
    })
}
