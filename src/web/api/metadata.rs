use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct CommentsResponse {
    pub comments: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MetadataValue {
    pub key: String,
    pub value: String,
}

#[utoipa::path(
    get,
    path = "/api/comment",
    responses(
        (status = 200, description = "Document comments in order", body = CommentsResponse),
        (status = 503, description = "No ephemeris loaded", body = ErrorResponse)
    ),
    tag = "metadata"
)]
pub async fn comments(State(state): State<AppState>) -> ApiResult<Json<CommentsResponse>> {
    let snapshot = state.snapshot()?;
    Ok(Json(CommentsResponse {
        comments: snapshot.metadata.comments().to_vec(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/header",
    responses(
        (status = 200, description = "Document header fields", body = BTreeMap<String, String>),
        (status = 503, description = "No ephemeris loaded", body = ErrorResponse)
    ),
    tag = "metadata"
)]
pub async fn header(State(state): State<AppState>) -> ApiResult<Json<BTreeMap<String, String>>> {
    let snapshot = state.snapshot()?;
    Ok(Json(snapshot.metadata.header().clone()))
}

#[utoipa::path(
    get,
    path = "/api/metadata",
    responses(
        (status = 200, description = "Segment metadata fields", body = BTreeMap<String, String>),
        (status = 503, description = "No ephemeris loaded", body = ErrorResponse)
    ),
    tag = "metadata"
)]
pub async fn segment_metadata(
    State(state): State<AppState>,
) -> ApiResult<Json<BTreeMap<String, String>>> {
    let snapshot = state.snapshot()?;
    Ok(Json(snapshot.metadata.segment_metadata().clone()))
}

#[utoipa::path(
    get,
    path = "/api/metadata/{key}",
    params(
        ("key" = String, Path, description = "Metadata key, e.g. OBJECT_NAME")
    ),
    responses(
        (status = 200, description = "Single metadata field", body = MetadataValue),
        (status = 404, description = "Key not present", body = ErrorResponse),
        (status = 503, description = "No ephemeris loaded", body = ErrorResponse)
    ),
    tag = "metadata"
)]
pub async fn segment_metadata_value(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<MetadataValue>> {
    let snapshot = state.snapshot()?;
    let value = snapshot
        .metadata
        .segment_value(&key)
        .ok_or_else(|| ApiError::NotFound(format!("no metadata field {}", key)))?;
    Ok(Json(MetadataValue {
        value: value.to_string(),
        key,
    }))
}
