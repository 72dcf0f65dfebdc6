//! Per-axis geodesic distances and meter/degree conversions over WGS84.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;

// Internal
use super::{GeoError, GeoPoint};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// WGS84 semi-major axis in meters.
const SEMI_MAJOR_AXIS_M: f64 = 6_378_137.0;

/// WGS84 first eccentricity squared, e^2 = f * (2 - f).
const ECCENTRICITY_SQ: f64 = 6.694_379_990_14e-3;

/// Mean (rectifying) meridian radius of the WGS84 ellipsoid in meters.
///
/// Used for the latitude/meter conversions, which have no latitude argument.
const MEAN_MERIDIAN_RADIUS_M: f64 = 6_367_449.146;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Eastward distance in meters from `origin` to `point`.
///
/// The longitude difference is evaluated at fixed latitude - the mean of the
/// two points' latitudes - using the prime-vertical radius of curvature
/// there. Positive east. Antisymmetric under swapping `origin` and `point`,
/// and zero when they coincide.
pub fn distance_x(origin: &GeoPoint, point: &GeoPoint) -> f64 {
    let mean_lat_rad = 0.5 * (origin.lat_deg() + point.lat_deg()).to_radians();
    let dlong_rad = (point.long_deg() - origin.long_deg()).to_radians();

    normal_radius(mean_lat_rad) * mean_lat_rad.cos() * dlong_rad
}

/// Northward distance in meters from `origin` to `point`.
///
/// The latitude difference is scaled by the meridian radius of curvature at
/// the mean latitude. Positive north. Antisymmetric under swapping `origin`
/// and `point`, and zero when they coincide.
pub fn distance_y(origin: &GeoPoint, point: &GeoPoint) -> f64 {
    let mean_lat_rad = 0.5 * (origin.lat_deg() + point.lat_deg()).to_radians();
    let dlat_rad = (point.lat_deg() - origin.lat_deg()).to_radians();

    meridian_radius(mean_lat_rad) * dlat_rad
}

/// Degrees of latitude spanning the given meter distance.
pub fn meters_to_lat(meters: f64) -> f64 {
    (meters / MEAN_MERIDIAN_RADIUS_M).to_degrees()
}

/// Degrees of longitude spanning the given meter distance at the given
/// latitude.
///
/// Grows as `1 / cos(latitude)`, diverging toward infinity as the latitude
/// approaches the poles.
pub fn meters_to_long(meters: f64, lat_deg: f64) -> f64 {
    meters_to_lat(meters) / lat_deg.to_radians().cos()
}

/// Convert a GPS point into the local frame anchored at `origin`.
pub fn geo_to_local(origin: &GeoPoint, point: &GeoPoint) -> Vector2<f64> {
    Vector2::new(distance_x(origin, point), distance_y(origin, point))
}

/// Convert a local-frame point back into GPS coordinates.
///
/// Inverse of [`geo_to_local`]: the latitude is recovered with one
/// fixed-point refinement of the mean-latitude meridian radius, so a round
/// trip through both conversions reproduces the original point to well
/// under 1e-6 degrees for ranges of a few kilometers.
pub fn local_to_geo(origin: &GeoPoint, local_m: &Vector2<f64>) -> Result<GeoPoint, GeoError> {
    let origin_lat_rad = origin.lat_deg().to_radians();

    // First guess with the meridian radius at the origin, then refine at the
    // mean latitude implied by that guess
    let dlat_rad = local_m[1] / meridian_radius(origin_lat_rad);
    let mean_lat_rad = origin_lat_rad + 0.5 * dlat_rad;
    let dlat_rad = local_m[1] / meridian_radius(mean_lat_rad);

    let dlong_rad = local_m[0] / (normal_radius(mean_lat_rad) * mean_lat_rad.cos());

    GeoPoint::new(
        origin.lat_deg() + dlat_rad.to_degrees(),
        origin.long_deg() + dlong_rad.to_degrees(),
    )
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Meridian (north-south) radius of curvature at the given latitude.
fn meridian_radius(lat_rad: f64) -> f64 {
    let sin_sq = lat_rad.sin().powi(2);

    SEMI_MAJOR_AXIS_M * (1.0 - ECCENTRICITY_SQ) / (1.0 - ECCENTRICITY_SQ * sin_sq).powf(1.5)
}

/// Prime-vertical (east-west) radius of curvature at the given latitude.
fn normal_radius(lat_rad: f64) -> f64 {
    let sin_sq = lat_rad.sin().powi(2);

    SEMI_MAJOR_AXIS_M / (1.0 - ECCENTRICITY_SQ * sin_sq).sqrt()
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn quad_origin() -> GeoPoint {
        GeoPoint::new(42.444250, -76.483682).unwrap()
    }

    #[test]
    fn test_zero_for_coincident_points() {
        let origin = quad_origin();
        assert_eq!(distance_x(&origin, &origin), 0.0);
        assert_eq!(distance_y(&origin, &origin), 0.0);
    }

    #[test]
    fn test_antisymmetric_under_swap() {
        let origin = quad_origin();
        let point = GeoPoint::new(42.444599, -76.483276).unwrap();

        assert!((distance_x(&origin, &point) + distance_x(&point, &origin)).abs() < 1e-9);
        assert!((distance_y(&origin, &point) + distance_y(&point, &origin)).abs() < 1e-9);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        // One degree of latitude at mid-latitudes is close to 111.1 km
        let origin = quad_origin();
        let point = GeoPoint::new(43.444250, -76.483682).unwrap();

        let y = distance_y(&origin, &point);
        assert!((y - 111_100.0).abs() < 200.0, "got {}", y);
    }

    #[test]
    fn test_meters_to_long_scaling() {
        // Exactly the latitude conversion scaled by 1/cos(lat)
        let lat_deg = 42.444250f64;
        let expected = meters_to_lat(10.0) / lat_deg.to_radians().cos();
        assert_eq!(meters_to_long(10.0, lat_deg), expected);

        // Diverges toward the poles
        assert!(meters_to_long(1.0, 89.9999) > 1e3 * meters_to_long(1.0, 0.0));
    }

    #[test]
    fn test_round_trip() {
        let origin = quad_origin();
        // A point a few kilometers away
        let point = GeoPoint::new(42.470000, -76.450000).unwrap();

        let local = geo_to_local(&origin, &point);
        let recovered = local_to_geo(&origin, &local).unwrap();

        assert!((recovered.lat_deg() - point.lat_deg()).abs() < 1e-6);
        assert!((recovered.long_deg() - point.long_deg()).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_malformed_coordinates() {
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(0.0, f64::INFINITY).is_err());
        assert!(GeoPoint::new(91.0, 0.0).is_err());
        assert!(GeoPoint::new(0.0, -181.0).is_err());
    }
}
