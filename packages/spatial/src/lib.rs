#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Point-in-polygon resolution for soil map unit polygons.
//!
//! Soil Data Access answers a point query with every polygon of every map
//! unit whose spatial index intersects the point. That is a coarse filter:
//! a map unit may have dozens of disjoint polygons, and only the ones
//! whose geometry actually contains the point are wanted. This crate
//! parses the candidate WKT geometries, tags them with a single WGS84
//! reference, and runs an exact, hole-aware containment test.
//!
//! Containment follows `geo`'s `Contains` semantics, which exclude the
//! boundary: a point lying exactly on a ring is not contained.

pub mod crs;
pub mod resolver;
pub mod wkt_io;

pub use crs::Crs;
pub use resolver::{
    CandidateFrame, GeometryParseError, ParsePolicy, resolve, resolve_with_policy,
};
pub use wkt_io::WktError;
