//! Exact point-in-polygon resolution over a set of candidate rows.
//!
//! [`resolve`] is a pure function: it parses every candidate geometry,
//! tags the parsed set with [`Crs::WGS84`], and keeps the rows whose
//! polygon contains the query point, in input order. More than one row
//! can match (overlapping survey boundaries), and all matches are kept.

use dirtio_soil_models::{CandidateRow, QueryPoint, ResolvedMatch, SoilKey};
use geo::{BoundingRect as _, Contains as _, Geometry, Point, Rect};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

use crate::Crs;
use crate::wkt_io::{self, WktError};

/// What to do when a candidate's WKT fails to parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum ParsePolicy {
    /// Abort the whole resolution on the first unparseable row.
    #[default]
    FailFast,
    /// Drop unparseable rows with a warning and resolve the rest.
    SkipInvalid,
}

/// A candidate row whose geometry could not be parsed.
#[derive(Debug, Error)]
#[error("Invalid geometry for polygon {polygon_key} (row {index}): {source}")]
pub struct GeometryParseError {
    /// Zero-based position of the row in the candidate list.
    pub index: usize,
    /// Polygon key of the offending row.
    pub polygon_key: SoilKey,
    /// Underlying WKT error.
    #[source]
    pub source: WktError,
}

/// A candidate row with its parsed geometry and envelope.
struct ParsedCandidate<'a> {
    row: &'a CandidateRow,
    geometry: Geometry<f64>,
    envelope: Option<Rect<f64>>,
}

impl ParsedCandidate<'_> {
    fn contains(&self, point: &Point<f64>) -> bool {
        // An empty polygon has no envelope and contains nothing. Points on
        // the envelope edge can only be on or outside the polygon boundary.
        let Some(envelope) = self.envelope else {
            return false;
        };
        envelope.contains(point) && self.geometry.contains(point)
    }
}

/// Parsed candidate geometries sharing one coordinate reference system.
pub struct CandidateFrame<'a> {
    crs: Crs,
    candidates: Vec<ParsedCandidate<'a>>,
}

impl<'a> CandidateFrame<'a> {
    /// Parses every candidate's WKT and tags the set as WGS84.
    ///
    /// # Errors
    ///
    /// With [`ParsePolicy::FailFast`], returns [`GeometryParseError`] for
    /// the first row that fails to parse. [`ParsePolicy::SkipInvalid`]
    /// never fails.
    pub fn parse(
        rows: &'a [CandidateRow],
        policy: ParsePolicy,
    ) -> Result<Self, GeometryParseError> {
        let mut candidates = Vec::with_capacity(rows.len());

        for (index, row) in rows.iter().enumerate() {
            match wkt_io::parse_polygonal(&row.geometry_wkt) {
                Ok(geometry) => {
                    let envelope = geometry.bounding_rect();
                    candidates.push(ParsedCandidate {
                        row,
                        geometry,
                        envelope,
                    });
                }
                Err(source) => {
                    let error = GeometryParseError {
                        index,
                        polygon_key: row.polygon_key.clone(),
                        source,
                    };
                    match policy {
                        ParsePolicy::FailFast => return Err(error),
                        ParsePolicy::SkipInvalid => log::warn!("Skipping row: {error}"),
                    }
                }
            }
        }

        Ok(Self {
            crs: Crs::WGS84,
            candidates,
        })
    }

    /// Reference system shared by every geometry in the frame.
    #[must_use]
    pub const fn crs(&self) -> Crs {
        self.crs
    }

    /// Number of successfully parsed candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether no candidates were parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Returns the candidates whose polygon contains `point`, in input
    /// order, with geometry re-serialized to WKT.
    ///
    /// [`QueryPoint`] is always WGS84, the same reference as the frame.
    #[must_use]
    pub fn containing(&self, point: &QueryPoint) -> Vec<ResolvedMatch> {
        let target = Point::new(point.lon(), point.lat());

        self.candidates
            .iter()
            .filter(|candidate| candidate.contains(&target))
            .map(|candidate| ResolvedMatch {
                polygon_key: candidate.row.polygon_key.clone(),
                unit_key: candidate.row.unit_key.clone(),
                geometry_wkt: wkt_io::to_wkt(&candidate.geometry),
            })
            .collect()
    }
}

/// Returns the candidates whose polygon contains `point`, failing the
/// whole resolution if any candidate's WKT is invalid.
///
/// # Errors
///
/// Returns [`GeometryParseError`] for the first unparseable row.
pub fn resolve(
    point: &QueryPoint,
    candidates: &[CandidateRow],
) -> Result<Vec<ResolvedMatch>, GeometryParseError> {
    resolve_with_policy(point, candidates, ParsePolicy::FailFast)
}

/// Like [`resolve`], with an explicit policy for unparseable rows.
///
/// # Errors
///
/// Returns [`GeometryParseError`] only under [`ParsePolicy::FailFast`].
pub fn resolve_with_policy(
    point: &QueryPoint,
    candidates: &[CandidateRow],
    policy: ParsePolicy,
) -> Result<Vec<ResolvedMatch>, GeometryParseError> {
    let frame = CandidateFrame::parse(candidates, policy)?;
    let matches = frame.containing(point);

    log::debug!(
        "{} of {} candidate polygons ({}) contain {point}",
        matches.len(),
        frame.len(),
        frame.crs(),
    );

    Ok(matches)
}
