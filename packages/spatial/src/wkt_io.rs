//! WKT parsing and serialization for polygonal geometries.

use std::str::FromStr as _;

use geo::Geometry;
use thiserror::Error;
use wkt::types::Polygon;
use wkt::{ToWkt as _, Wkt};

/// Fewest coordinates a closed ring can have.
const MIN_RING_COORDS: usize = 4;

/// Errors from parsing a polygon WKT string.
#[derive(Debug, Error)]
pub enum WktError {
    /// The text is not valid WKT.
    #[error("Invalid WKT: {message}")]
    Syntax {
        /// Parser error description.
        message: String,
    },

    /// A complete geometry was followed by more text.
    #[error("Unexpected text after geometry: {text:?}")]
    TrailingText {
        /// Everything after the end of the geometry, trimmed.
        text: String,
    },

    /// The text is valid WKT but not a `POLYGON` or `MULTIPOLYGON`.
    #[error("Expected POLYGON or MULTIPOLYGON, got {kind}")]
    NotPolygonal {
        /// WKT type name of the geometry that was found.
        kind: &'static str,
    },

    /// A ring has fewer than four coordinates.
    #[error("A linear ring requires at least {MIN_RING_COORDS} coordinates, got {count}")]
    TooFewRingCoordinates {
        /// Number of coordinates in the ring.
        count: usize,
    },

    /// A ring's first and last coordinates differ.
    #[error("Linear ring is not closed")]
    UnclosedRing,
}

/// Parses a `POLYGON` or `MULTIPOLYGON` WKT string.
///
/// The whole text must be one geometry, and every non-empty ring must be
/// closed with at least four coordinates. The geometry kind is preserved
/// so that [`to_wkt`] writes back the same kind it was given.
///
/// # Errors
///
/// Returns [`WktError`] if the text is malformed, has trailing content,
/// describes a non-polygonal geometry, or contains an invalid ring.
pub fn parse_polygonal(text: &str) -> Result<Geometry<f64>, WktError> {
    let text = text.trim();
    let parsed = Wkt::<f64>::from_str(text).map_err(syntax)?;

    if let Some(rest) = trailing_text(text) {
        return Err(WktError::TrailingText {
            text: rest.to_string(),
        });
    }

    match &parsed {
        Wkt::Polygon(polygon) => check_rings(polygon)?,
        Wkt::MultiPolygon(multi) => multi.polygons().iter().try_for_each(check_rings)?,
        other => {
            return Err(WktError::NotPolygonal {
                kind: kind_name(other),
            });
        }
    }

    Geometry::try_from(parsed).map_err(syntax)
}

/// Serializes a geometry back to WKT.
#[must_use]
pub fn to_wkt(geometry: &Geometry<f64>) -> String {
    geometry.wkt_string()
}

fn syntax(e: impl std::fmt::Display) -> WktError {
    WktError::Syntax {
        message: e.to_string(),
    }
}

/// Returns whatever follows the first complete geometry in `text`.
///
/// The geometry ends at the parenthesis that closes its first `(`, or
/// after the `EMPTY` keyword when that comes first.
fn trailing_text(text: &str) -> Option<&str> {
    let open = text.find('(');
    let empty = text
        .to_ascii_uppercase()
        .find("EMPTY")
        .map(|i| i + "EMPTY".len());

    let end = match (open, empty) {
        (Some(open), Some(empty)) if empty <= open => empty,
        (None, Some(empty)) => empty,
        (Some(open), _) => closing_paren(text, open)?,
        (None, None) => return None,
    };

    let rest = text[end..].trim();
    (!rest.is_empty()).then_some(rest)
}

/// Byte offset just past the `)` that balances the `(` at `open`.
fn closing_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0_usize;
    for (i, c) in text[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

#[allow(clippy::float_cmp)]
fn check_rings(polygon: &Polygon<f64>) -> Result<(), WktError> {
    for ring in polygon.rings() {
        match ring.coords() {
            [] => {}
            [first, .., last] if ring.coords().len() >= MIN_RING_COORDS => {
                if first.x != last.x || first.y != last.y {
                    return Err(WktError::UnclosedRing);
                }
            }
            coords => {
                return Err(WktError::TooFewRingCoordinates {
                    count: coords.len(),
                });
            }
        }
    }
    Ok(())
}

const fn kind_name(geometry: &Wkt<f64>) -> &'static str {
    match geometry {
        Wkt::Point(_) => "POINT",
        Wkt::LineString(_) => "LINESTRING",
        Wkt::Polygon(_) => "POLYGON",
        Wkt::MultiPoint(_) => "MULTIPOINT",
        Wkt::MultiLineString(_) => "MULTILINESTRING",
        Wkt::MultiPolygon(_) => "MULTIPOLYGON",
        Wkt::GeometryCollection(_) => "GEOMETRYCOLLECTION",
    }
}

#[cfg(test)]
mod tests {
    use geo::{Contains as _, Point};

    use super::*;

    const SQUARE_WITH_HOLE: &str =
        "POLYGON ((0 0, 10 0, 10 10, 0 10, 0 0), (4 4, 6 4, 6 6, 4 6, 4 4))";

    #[test]
    fn parses_polygon() {
        let geometry = parse_polygonal(SQUARE_WITH_HOLE).unwrap();
        let Geometry::Polygon(polygon) = geometry else {
            panic!("expected a polygon");
        };
        assert_eq!(polygon.interiors().len(), 1);
    }

    #[test]
    fn parses_multipolygon() {
        let geometry = parse_polygonal(
            "MULTIPOLYGON (((0 0, 1 0, 1 1, 0 1, 0 0)), ((5 5, 6 5, 6 6, 5 6, 5 5)))",
        )
        .unwrap();
        assert!(matches!(geometry, Geometry::MultiPolygon(ref mp) if mp.0.len() == 2));
    }

    #[test]
    fn rejects_truncated_text() {
        assert!(matches!(
            parse_polygonal("POLYGON(("),
            Err(WktError::Syntax { .. })
        ));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            parse_polygonal("not a geometry"),
            Err(WktError::Syntax { .. })
        ));
    }

    #[test]
    fn rejects_point() {
        let err = parse_polygonal("POINT (1 2)").unwrap_err();
        assert!(matches!(err, WktError::NotPolygonal { kind: "POINT" }));
    }

    #[test]
    fn rejects_text_after_geometry() {
        for text in [
            "POLYGON ((0 0, 4 0, 4 4, 0 4, 0 0)) trailing junk",
            "POLYGON ((0 0, 4 0, 4 4, 0 4, 0 0)),",
            "POLYGON ((0 0, 4 0, 4 4, 0 4, 0 0)))",
            "POLYGON EMPTY EMPTY",
        ] {
            assert!(
                matches!(parse_polygonal(text), Err(WktError::TrailingText { .. })),
                "{text}"
            );
        }
    }

    #[test]
    fn allows_surrounding_whitespace() {
        assert!(parse_polygonal("\n  POLYGON ((0 0, 4 0, 4 4, 0 4, 0 0))  \n").is_ok());
        assert!(parse_polygonal("POLYGON EMPTY ").is_ok());
    }

    #[test]
    fn rejects_short_rings() {
        assert!(matches!(
            parse_polygonal("POLYGON ((0 0, 4 0))"),
            Err(WktError::TooFewRingCoordinates { count: 2 })
        ));
        assert!(matches!(
            parse_polygonal("POLYGON ((0 0, 10 0, 10 10, 0 10, 0 0), (4 4, 6 4, 4 4))"),
            Err(WktError::TooFewRingCoordinates { count: 3 })
        ));
        assert!(matches!(
            parse_polygonal("MULTIPOLYGON (((0 0, 1 0, 1 1, 0 1, 0 0)), ((5 5, 6 5, 5 5)))"),
            Err(WktError::TooFewRingCoordinates { count: 3 })
        ));
    }

    #[test]
    fn rejects_unclosed_rings() {
        assert!(matches!(
            parse_polygonal("POLYGON ((0 0, 4 0, 4 4, 0 4))"),
            Err(WktError::UnclosedRing)
        ));
    }

    #[test]
    fn keeps_geometry_kind_when_serializing() {
        let polygon = parse_polygonal(SQUARE_WITH_HOLE).unwrap();
        assert!(to_wkt(&polygon).starts_with("POLYGON"));

        let multi = parse_polygonal("MULTIPOLYGON (((0 0, 1 0, 1 1, 0 0)))").unwrap();
        assert!(to_wkt(&multi).starts_with("MULTIPOLYGON"));
    }

    #[test]
    fn reserialized_wkt_has_same_membership() {
        let original = parse_polygonal(SQUARE_WITH_HOLE).unwrap();
        let reparsed = parse_polygonal(&to_wkt(&original)).unwrap();

        for x in 0..=20 {
            for y in 0..=20 {
                let point = Point::new(f64::from(x) * 0.5 + 0.25, f64::from(y) * 0.5 + 0.25);
                assert_eq!(
                    original.contains(&point),
                    reparsed.contains(&point),
                    "membership differs at {point:?}"
                );
            }
        }
    }
}
