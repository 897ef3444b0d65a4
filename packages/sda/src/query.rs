//! SQL statements sent to Soil Data Access.
//!
//! SDA's `SDA_Get_Mukey_from_intersection_with_WktWgs84` table function
//! returns the map unit keys whose spatial index intersects a WGS84 WKT
//! geometry. It is a coarse filter, so the polygon query returns every
//! polygon of each such map unit.

use dirtio_soil_models::QueryPoint;

/// Polygon key, map unit key, and WKT geometry for every polygon of the
/// map units intersecting `point`.
#[must_use]
pub fn map_unit_polygons(point: &QueryPoint) -> String {
    single_line(&format!(
        "
        SELECT mup.mupolygonkey, mup.mukey, mup.mupolygongeo
        FROM mupolygon AS mup
        WHERE mup.mukey IN (
          SELECT mukey
          FROM SDA_Get_Mukey_from_intersection_with_WktWgs84('{point}')
        )
        "
    ))
}

/// Keys of the map units intersecting `point`.
#[must_use]
pub fn map_unit_keys(point: &QueryPoint) -> String {
    format!("SELECT mukey FROM SDA_Get_Mukey_from_intersection_with_WktWgs84('{point}')")
}

/// Collapses a multi-line statement into one line with single spaces.
#[must_use]
fn single_line(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}
