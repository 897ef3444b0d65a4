//! Coordinate reference system tags.

use std::fmt;

/// A coordinate reference system identified by its EPSG code.
///
/// Only used as a tag: geometries and query points carrying the same
/// [`Crs`] are compared directly, without reprojection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Crs {
    epsg: u32,
}

impl Crs {
    /// WGS84 geographic longitude/latitude (EPSG:4326), X = longitude.
    pub const WGS84: Self = Self { epsg: 4326 };

    /// Creates a tag for an arbitrary EPSG code.
    #[must_use]
    pub const fn from_epsg(epsg: u32) -> Self {
        Self { epsg }
    }

    /// The EPSG code.
    #[must_use]
    pub const fn epsg(self) -> u32 {
        self.epsg
    }
}

impl Default for Crs {
    fn default() -> Self {
        Self::WGS84
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wgs84_is_default() {
        assert_eq!(Crs::default(), Crs::WGS84);
        assert_eq!(Crs::WGS84.epsg(), 4326);
        assert_eq!(Crs::WGS84.to_string(), "EPSG:4326");
    }
}
