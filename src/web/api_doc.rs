use utoipa::OpenApi;

use super::api::epochs::{LocationResponse, SpeedResponse};
use super::api::error::ErrorResponse;
use super::api::metadata::{CommentsResponse, MetadataValue};
use super::api::status::NowResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::epochs::list_epochs,
        super::api::epochs::get_epoch,
        super::api::epochs::get_speed,
        super::api::epochs::get_location,
        super::api::status::now,
        super::api::metadata::comments,
        super::api::metadata::header,
        super::api::metadata::segment_metadata,
        super::api::metadata::segment_metadata_value,
        super::api::status::status,
        super::api::status::refresh,
    ),
    components(
        schemas(
            crate::ephemeris::Epoch,
            crate::ephemeris::Vector3,
            crate::ephemeris::StateVector,
            crate::frames::GeodeticLocation,
            crate::frames::Ellipsoid,
            crate::source::SnapshotSummary,
            SpeedResponse,
            LocationResponse,
            NowResponse,
            CommentsResponse,
            MetadataValue,
            ErrorResponse,
        )
    ),
    info(
        title = "OEM Tracker API",
        description = "Query spacecraft state vectors from an orbit ephemeris message",
        version = "0.1.0"
    ),
    tags(
        (name = "epochs", description = "State vectors, speed and ground location"),
        (name = "metadata", description = "Document header, metadata and comments"),
        (name = "service", description = "Loaded ephemeris and refresh")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/epochs",
            "/api/epochs/{epoch}",
            "/api/epochs/{epoch}/speed",
            "/api/epochs/{epoch}/location",
            "/api/now",
            "/api/comment",
            "/api/header",
            "/api/metadata",
            "/api/metadata/{key}",
            "/api/status",
            "/api/refresh",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
