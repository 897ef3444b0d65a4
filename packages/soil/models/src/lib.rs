#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Soil map unit query point and polygon row types.
//!
//! These types flow from the Soil Data Access response table, through
//! point-in-polygon resolution, and out to the API. None of them outlive
//! a single request.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Valid longitude range (WGS84 degrees).
pub const LON_RANGE: (f64, f64) = (-180.0, 180.0);

/// Valid latitude range (WGS84 degrees).
pub const LAT_RANGE: (f64, f64) = (-90.0, 90.0);

/// Errors from constructing a [`QueryPoint`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PointError {
    /// The component is NaN or infinite.
    #[error("{field} must be a finite number")]
    NotFinite {
        /// Name of the offending component (`"lon"` or `"lat"`).
        field: &'static str,
    },

    /// The component is outside its valid range.
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        /// Name of the offending component (`"lon"` or `"lat"`).
        field: &'static str,
        /// The rejected value.
        value: f64,
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
    },
}

impl PointError {
    /// Returns the name of the component that failed validation.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::NotFinite { field } | Self::OutOfRange { field, .. } => field,
        }
    }
}

/// A validated WGS84 longitude/latitude pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryPoint {
    lon: f64,
    lat: f64,
}

impl QueryPoint {
    /// Creates a point after checking both components are finite and in
    /// range.
    ///
    /// # Errors
    ///
    /// Returns [`PointError`] for the first invalid component, longitude
    /// first.
    pub fn new(lon: f64, lat: f64) -> Result<Self, PointError> {
        check_component("lon", lon, LON_RANGE)?;
        check_component("lat", lat, LAT_RANGE)?;
        Ok(Self { lon, lat })
    }

    /// Validates a single longitude value.
    ///
    /// # Errors
    ///
    /// Returns [`PointError`] if the value is not finite or out of range.
    pub fn check_lon(lon: f64) -> Result<f64, PointError> {
        check_component("lon", lon, LON_RANGE).map(|()| lon)
    }

    /// Validates a single latitude value.
    ///
    /// # Errors
    ///
    /// Returns [`PointError`] if the value is not finite or out of range.
    pub fn check_lat(lat: f64) -> Result<f64, PointError> {
        check_component("lat", lat, LAT_RANGE).map(|()| lat)
    }

    /// Longitude (X).
    #[must_use]
    pub const fn lon(&self) -> f64 {
        self.lon
    }

    /// Latitude (Y).
    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.lat
    }
}

impl fmt::Display for QueryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "POINT({} {})", self.lon, self.lat)
    }
}

fn check_component(
    field: &'static str,
    value: f64,
    (min, max): (f64, f64),
) -> Result<(), PointError> {
    if !value.is_finite() {
        return Err(PointError::NotFinite { field });
    }
    if value < min || value > max {
        return Err(PointError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// An opaque upstream identifier.
///
/// Soil Data Access returns keys as JSON strings, but integer keys are
/// accepted too. Keys serialize back in the JSON type they arrived in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SoilKey {
    /// String-valued key (e.g. `"456385"`).
    Text(String),
    /// Integer-valued key.
    Integer(i64),
}

impl SoilKey {
    /// Reads a key from a JSON cell. Returns `None` for anything other
    /// than a string or an integer.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            serde_json::Value::Number(n) => n.as_i64().map(Self::Integer),
            _ => None,
        }
    }
}

impl fmt::Display for SoilKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for SoilKey {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for SoilKey {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

/// A malformed row in the upstream response table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Malformed table row: {message}")]
pub struct RowError {
    /// Description of what was wrong with the row.
    pub message: String,
}

/// One map unit polygon returned by the upstream intersection query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRow {
    /// Map unit polygon key (`mupolygonkey`), unique per polygon.
    pub polygon_key: SoilKey,
    /// Map unit key (`mukey`), shared by all polygons of one map unit.
    pub unit_key: SoilKey,
    /// Polygon geometry as WGS84 WKT.
    pub geometry_wkt: String,
}

impl CandidateRow {
    /// Creates a candidate row.
    #[must_use]
    pub fn new(
        polygon_key: impl Into<SoilKey>,
        unit_key: impl Into<SoilKey>,
        geometry_wkt: impl Into<String>,
    ) -> Self {
        Self {
            polygon_key: polygon_key.into(),
            unit_key: unit_key.into(),
            geometry_wkt: geometry_wkt.into(),
        }
    }

    /// Reads a `[polygon_key, unit_key, wkt]` triple from a response
    /// table row.
    ///
    /// # Errors
    ///
    /// Returns [`RowError`] if the row is not a three-element array, a
    /// key is not a string or integer, or the geometry is not a string.
    pub fn from_table_row(row: &serde_json::Value) -> Result<Self, RowError> {
        let cells = row.as_array().ok_or_else(|| RowError {
            message: format!("expected an array, got {row}"),
        })?;

        let [polygon_key, unit_key, geometry] = cells.as_slice() else {
            return Err(RowError {
                message: format!("expected 3 columns, got {}", cells.len()),
            });
        };

        let polygon_key = SoilKey::from_json(polygon_key).ok_or_else(|| RowError {
            message: format!("invalid polygon key {polygon_key}"),
        })?;
        let unit_key = SoilKey::from_json(unit_key).ok_or_else(|| RowError {
            message: format!("invalid map unit key {unit_key}"),
        })?;
        let geometry_wkt = geometry
            .as_str()
            .ok_or_else(|| RowError {
                message: format!("geometry for polygon {polygon_key} is not a string"),
            })?
            .to_string();

        Ok(Self {
            polygon_key,
            unit_key,
            geometry_wkt,
        })
    }
}

/// A candidate whose polygon contains the query point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMatch {
    /// Map unit polygon key.
    pub polygon_key: SoilKey,
    /// Map unit key.
    pub unit_key: SoilKey,
    /// Re-serialized polygon geometry.
    pub geometry_wkt: String,
}
