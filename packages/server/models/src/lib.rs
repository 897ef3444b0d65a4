#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the dirtio soil server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the lookup types so the wire format can stay stable while the
//! internals change.

use dirtio_soil_models::{ResolvedMatch, SoilKey};
use serde::{Deserialize, Serialize};

/// Message returned when the upstream service has no map units at a point.
pub const NO_POLYGONS_MESSAGE: &str = "No map unit polygons found for given coordinates";

/// Query parameters for `GET /soil`.
///
/// Both fields are kept as raw strings so that validation can report
/// every bad field at once instead of failing on the first.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SoilQueryParams {
    /// Longitude (WGS84).
    pub lon: Option<String>,
    /// Latitude (WGS84).
    pub lat: Option<String>,
}

/// A matched polygon, serialized as `[mupolygonkey, mukey, wkt]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiPolygonRow(pub SoilKey, pub SoilKey, pub String);

impl From<ResolvedMatch> for ApiPolygonRow {
    fn from(m: ResolvedMatch) -> Self {
        Self(m.polygon_key, m.unit_key, m.geometry_wkt)
    }
}

/// Response body when the lookup produced a (possibly empty) match list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoilDataResponse {
    /// Polygons containing the query point, in upstream order.
    pub data: Vec<ApiPolygonRow>,
}

/// Response body carrying an informational message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoilMessageResponse {
    /// Human-readable message.
    pub message: String,
}

/// Response body for server-side and upstream failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Description of the failure.
    pub detail: String,
}

/// A single invalid query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Parameter name.
    pub field: String,
    /// Why the value was rejected.
    pub message: String,
}

/// Response body for request validation failures (HTTP 422).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorResponse {
    /// Every invalid parameter.
    pub detail: Vec<FieldError>,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}
