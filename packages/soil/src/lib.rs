#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Soil map unit lookup for a single point.
//!
//! Asks a [`SoilDataAccess`] source for the polygons of every map unit
//! intersecting the point, then narrows them to the polygons that
//! actually contain it. Exactly one upstream call is made per lookup.

use dirtio_sda::{SdaError, SoilDataAccess};
use dirtio_soil_models::{QueryPoint, ResolvedMatch};
use dirtio_spatial::{GeometryParseError, ParsePolicy};
use thiserror::Error;

/// Environment variable selecting the [`ParsePolicy`].
pub const POLICY_ENV_VAR: &str = "DIRTIO_GEOMETRY_POLICY";

/// Errors from a soil lookup.
#[derive(Debug, Error)]
pub enum SoilError {
    /// The upstream service call failed.
    #[error("Upstream service error: {0}")]
    Upstream(#[from] SdaError),

    /// A candidate polygon returned by the upstream service was invalid.
    #[error("Upstream geometry error: {0}")]
    Geometry(#[from] GeometryParseError),

    /// Lookup configuration was invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem.
        message: String,
    },
}

/// Outcome of a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoilLookup {
    /// The upstream service had no map units at the point.
    NoCandidates,
    /// Candidates whose polygon contains the point, in upstream order.
    /// Empty when candidates existed but none contained the point.
    Matches(Vec<ResolvedMatch>),
}

/// Fetches candidate polygons for `point` and keeps the ones containing it.
///
/// # Errors
///
/// Returns [`SoilError::Upstream`] if the source fails, or
/// [`SoilError::Geometry`] if a candidate's WKT is invalid under
/// [`ParsePolicy::FailFast`].
pub async fn lookup(
    source: &dyn SoilDataAccess,
    point: &QueryPoint,
    policy: ParsePolicy,
) -> Result<SoilLookup, SoilError> {
    let candidates = source.map_unit_polygons(point).await?;

    if candidates.is_empty() {
        log::info!("No map unit polygons found for {point}");
        return Ok(SoilLookup::NoCandidates);
    }

    let matches = dirtio_spatial::resolve_with_policy(point, &candidates, policy)?;
    log::info!(
        "{} of {} map unit polygons contain {point}",
        matches.len(),
        candidates.len()
    );

    Ok(SoilLookup::Matches(matches))
}

/// Reads the [`ParsePolicy`] from [`POLICY_ENV_VAR`], defaulting to
/// [`ParsePolicy::FailFast`] when unset.
///
/// # Errors
///
/// Returns [`SoilError::Config`] if the variable holds an unknown policy.
pub fn policy_from_env() -> Result<ParsePolicy, SoilError> {
    std::env::var(POLICY_ENV_VAR)
        .ok()
        .map_or(Ok(ParsePolicy::default()), |raw| parse_policy(&raw))
}

fn parse_policy(raw: &str) -> Result<ParsePolicy, SoilError> {
    raw.trim().parse().map_err(|_| SoilError::Config {
        message: format!(
            "{POLICY_ENV_VAR} must be one of {:?} or {:?}, got {raw:?}",
            ParsePolicy::FailFast.as_ref(),
            ParsePolicy::SkipInvalid.as_ref(),
        ),
    })
}
