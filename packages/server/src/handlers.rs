//! HTTP handler functions for the soil API.

use actix_web::{HttpResponse, web};
use dirtio_server_models::{
    ApiHealth, ApiPolygonRow, ErrorDetail, FieldError, NO_POLYGONS_MESSAGE, SoilDataResponse,
    SoilMessageResponse, SoilQueryParams, ValidationErrorResponse,
};
use dirtio_soil::{SoilError, SoilLookup};
use dirtio_soil_models::{PointError, QueryPoint};

use crate::AppState;

/// `GET /health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /soil?lon=<f64>&lat=<f64>`
///
/// Returns the map unit polygons containing the point. Invalid parameters
/// are rejected with 422 before any upstream call is made.
pub async fn soil(
    state: web::Data<AppState>,
    params: web::Query<SoilQueryParams>,
) -> HttpResponse {
    let point = match validate_point(&params) {
        Ok(point) => point,
        Err(detail) => {
            return HttpResponse::UnprocessableEntity().json(ValidationErrorResponse { detail });
        }
    };

    match dirtio_soil::lookup(state.source.as_ref(), &point, state.policy).await {
        Ok(SoilLookup::NoCandidates) => HttpResponse::Ok().json(SoilMessageResponse {
            message: NO_POLYGONS_MESSAGE.to_string(),
        }),
        Ok(SoilLookup::Matches(matches)) => HttpResponse::Ok().json(SoilDataResponse {
            data: matches.into_iter().map(ApiPolygonRow::from).collect(),
        }),
        Err(e @ (SoilError::Upstream(_) | SoilError::Geometry(_))) => {
            log::error!("Soil lookup for {point} failed: {e}");
            HttpResponse::BadGateway().json(ErrorDetail {
                detail: e.to_string(),
            })
        }
        Err(e @ SoilError::Config { .. }) => {
            log::error!("Soil lookup for {point} failed: {e}");
            HttpResponse::InternalServerError().json(ErrorDetail {
                detail: e.to_string(),
            })
        }
    }
}

/// Validates both coordinates, collecting an error for every bad field.
fn validate_point(params: &SoilQueryParams) -> Result<QueryPoint, Vec<FieldError>> {
    let lon = parse_coordinate("lon", params.lon.as_deref(), QueryPoint::check_lon);
    let lat = parse_coordinate("lat", params.lat.as_deref(), QueryPoint::check_lat);

    match (lon, lat) {
        (Ok(lon), Ok(lat)) => QueryPoint::new(lon, lat).map_err(|e| vec![field_error(&e)]),
        (lon, lat) => Err([lon.err(), lat.err()].into_iter().flatten().collect()),
    }
}

fn parse_coordinate(
    field: &str,
    raw: Option<&str>,
    check: fn(f64) -> Result<f64, PointError>,
) -> Result<f64, FieldError> {
    let Some(raw) = raw else {
        return Err(FieldError {
            field: field.to_string(),
            message: "field required".to_string(),
        });
    };

    let value: f64 = raw.trim().parse().map_err(|_| FieldError {
        field: field.to_string(),
        message: format!("value is not a valid number: {raw:?}"),
    })?;

    check(value).map_err(|e| field_error(&e))
}

fn field_error(e: &PointError) -> FieldError {
    FieldError {
        field: e.field().to_string(),
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use dirtio_sda::memory::InMemorySoilDataAccess;
    use dirtio_soil_models::CandidateRow;
    use dirtio_spatial::ParsePolicy;

    use super::*;

    const ENCLOSING_POLYGON: &str =
        "POLYGON ((-122.46 37.48, -122.44 37.48, -122.44 37.50, -122.46 37.50, -122.46 37.48))";

    async fn call(
        source: Arc<InMemorySoilDataAccess>,
        uri: &str,
    ) -> (StatusCode, serde_json::Value) {
        let state = web::Data::new(AppState {
            source,
            policy: ParsePolicy::FailFast,
        });
        let app = test::init_service(App::new().app_data(state).configure(crate::configure)).await;
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        let status = resp.status();
        let body: serde_json::Value = test::read_body_json(resp).await;
        (status, body)
    }

    #[actix_web::test]
    async fn returns_matching_polygons() {
        let source = Arc::new(InMemorySoilDataAccess::with_rows(vec![
            CandidateRow::new("399359807", "456385", ENCLOSING_POLYGON),
            CandidateRow::new("1", "2", "POLYGON ((0 0, 1 0, 1 1, 0 1, 0 0))"),
        ]));
        let (status, body) = call(source, "/soil?lon=-122.449871&lat=37.492633").await;

        assert_eq!(status, StatusCode::OK);
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0][0], "399359807");
        assert_eq!(data[0][1], "456385");
        assert!(data[0][2].as_str().unwrap().starts_with("POLYGON"));
    }

    #[actix_web::test]
    async fn no_candidates_returns_message() {
        let source = Arc::new(InMemorySoilDataAccess::empty());
        let (status, body) = call(source, "/soil?lon=-10.0&lat=-10.0").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "message": NO_POLYGONS_MESSAGE }));
    }

    #[actix_web::test]
    async fn candidates_without_containment_return_empty_data() {
        let source = Arc::new(InMemorySoilDataAccess::with_rows(vec![CandidateRow::new(
            "1",
            "2",
            "POLYGON ((0 0, 1 0, 1 1, 0 1, 0 0))",
        )]));
        let (status, body) = call(source, "/soil?lon=5&lat=5").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "data": [] }));
    }

    #[actix_web::test]
    async fn out_of_range_coordinates_are_rejected_without_upstream_call() {
        for uri in ["/soil?lon=-200.0&lat=37.49", "/soil?lon=-122.44&lat=100.0"] {
            let source = Arc::new(InMemorySoilDataAccess::empty());
            let (status, body) = call(Arc::clone(&source), uri).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
            assert_eq!(body["detail"].as_array().unwrap().len(), 1);
            assert_eq!(source.calls(), 0);
        }
    }

    #[actix_web::test]
    async fn non_numeric_coordinates_are_rejected() {
        let source = Arc::new(InMemorySoilDataAccess::empty());
        let (status, body) = call(Arc::clone(&source), "/soil?lon=abc&lat=cde").await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let fields: Vec<&str> = body["detail"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["lon", "lat"]);
        assert_eq!(source.calls(), 0);
    }

    #[actix_web::test]
    async fn missing_coordinates_are_rejected() {
        for uri in ["/soil", "/soil?lon=-122.449871"] {
            let source = Arc::new(InMemorySoilDataAccess::empty());
            let (status, _) = call(source, uri).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
        }
    }

    #[actix_web::test]
    async fn non_finite_coordinates_are_rejected() {
        let source = Arc::new(InMemorySoilDataAccess::empty());
        let (status, body) = call(source, "/soil?lon=NaN&lat=10").await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["detail"][0]["field"], "lon");
    }

    #[actix_web::test]
    async fn upstream_failure_is_bad_gateway() {
        let source = Arc::new(InMemorySoilDataAccess::failing(503));
        let (status, body) = call(source, "/soil?lon=-77.0&lat=39.0").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(
            body["detail"]
                .as_str()
                .unwrap()
                .starts_with("Upstream service error: ")
        );
    }

    #[actix_web::test]
    async fn invalid_upstream_geometry_is_bad_gateway() {
        let source = Arc::new(InMemorySoilDataAccess::with_rows(vec![
            CandidateRow::new("1", "2", ENCLOSING_POLYGON),
            CandidateRow::new("3", "2", "POLYGON(("),
        ]));
        let (status, body) = call(source, "/soil?lon=-122.449871&lat=37.492633").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.get("data").is_none());
        assert!(
            body["detail"]
                .as_str()
                .unwrap()
                .starts_with("Upstream geometry error: ")
        );
    }

    #[actix_web::test]
    async fn health_reports_version() {
        let source = Arc::new(InMemorySoilDataAccess::empty());
        let (status, body) = call(source, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["healthy"], true);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}
