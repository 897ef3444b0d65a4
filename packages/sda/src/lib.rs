#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Client for the USDA NRCS Soil Data Access (SDA) tabular service.
//!
//! SDA accepts a T-SQL statement as a form-encoded POST and answers with
//! a JSON object holding a `Table` array of rows. This crate builds the
//! map unit intersection queries, dispatches them with a bounded timeout,
//! and normalizes the response table into typed rows.
//!
//! Consumers depend on the [`SoilDataAccess`] trait rather than on
//! [`client::SdaClient`] directly, so that tests can inject
//! [`memory::InMemorySoilDataAccess`] instead of hitting the network.

pub mod client;
pub mod memory;
pub mod query;
pub mod table;

use dirtio_soil_models::{CandidateRow, QueryPoint, RowError, SoilKey};
use thiserror::Error;

pub use client::{SdaClient, SdaConfig};

/// Errors from talking to Soil Data Access.
///
/// Every variant means the upstream call failed; an empty result table is
/// not an error.
#[derive(Debug, Error)]
pub enum SdaError {
    /// Transport failure: connection, timeout, or body read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Truncated response body.
        body: String,
    },

    /// The response body was not the expected JSON shape.
    #[error("Invalid response: {message}")]
    Decode {
        /// Description of the decoding failure.
        message: String,
    },

    /// A row in the response table was malformed.
    #[error(transparent)]
    Row(#[from] RowError),

    /// Client configuration was invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem.
        message: String,
    },
}

impl SdaError {
    /// Whether the request exceeded the configured timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_timeout())
    }
}

/// Source of map unit data for a query point.
#[async_trait::async_trait]
pub trait SoilDataAccess: Send + Sync {
    /// Fetches every polygon of every map unit intersecting `point`.
    ///
    /// Returns an empty `Vec` when the service has no map units there.
    ///
    /// # Errors
    ///
    /// Returns [`SdaError`] if the request fails or the response cannot
    /// be decoded.
    async fn map_unit_polygons(
        &self,
        point: &QueryPoint,
    ) -> Result<Vec<CandidateRow>, SdaError>;

    /// Fetches the keys of the map units intersecting `point`.
    ///
    /// # Errors
    ///
    /// Returns [`SdaError`] if the request fails or the response cannot
    /// be decoded.
    async fn map_unit_keys(&self, point: &QueryPoint) -> Result<Vec<SoilKey>, SdaError>;
}
