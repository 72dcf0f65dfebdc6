//! # Geodesic coordinate engine
//!
//! This module converts between GPS coordinates and the local planar meter
//! frame in which the coverage grid and the motion controller operate. The
//! local frame is anchored at a chosen GPS origin, with x pointing east and
//! y pointing north.
//!
//! All conversions are short-range flat-earth approximations over the WGS84
//! ellipsoid: each axis is evaluated independently using the ellipsoidal
//! radii of curvature at the mean latitude of the two points. The
//! approximation holds to sub-centimeter accuracy for ranges of a few
//! kilometers, which comfortably covers a coverage mission's working area.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod ellipsoid;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
pub use ellipsoid::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A point on the Earth's surface in GPS coordinates.
///
/// Constructed through [`GeoPoint::new`], which rejects non-finite or
/// out-of-range coordinates, so a `GeoPoint` held anywhere in the system is
/// always valid.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct GeoPoint {
    /// Latitude in degrees, in [-90, 90]
    lat_deg: f64,

    /// Longitude in degrees, in [-180, 180]
    long_deg: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with the geodesic engine.
#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    #[error("Invalid GPS coordinate ({0}, {1}): latitude must be finite and \
        in [-90, 90], longitude finite and in [-180, 180]")]
    InvalidCoordinate(f64, f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GeoPoint {
    /// Create a new point from a latitude and longitude in degrees.
    ///
    /// Malformed input (NaN, infinite, or out-of-range coordinates) is fatal
    /// for whatever is being constructed from it, so an error is returned
    /// rather than clamping.
    pub fn new(lat_deg: f64, long_deg: f64) -> Result<Self, GeoError> {
        if !lat_deg.is_finite()
            || !long_deg.is_finite()
            || lat_deg.abs() > 90.0
            || long_deg.abs() > 180.0
        {
            return Err(GeoError::InvalidCoordinate(lat_deg, long_deg));
        }

        Ok(Self { lat_deg, long_deg })
    }

    /// Latitude in degrees.
    pub fn lat_deg(&self) -> f64 {
        self.lat_deg
    }

    /// Longitude in degrees.
    pub fn long_deg(&self) -> f64 {
        self.long_deg
    }
}
