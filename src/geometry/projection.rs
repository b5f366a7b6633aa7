use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use crate::domain::{Location, MercatorPoint};

/// Radius of the Web Mercator sphere in meters (EPSG:3857 treats the
/// earth as a sphere of this radius, not an ellipsoid).
pub const EARTH_RADIUS: f64 = 6378137.0;

/// Project a geographic location to spherical Web Mercator meters.
///
/// x = R * lon_rad, y = R * ln(tan(pi/4 + lat_rad/2)).
///
/// Total over all finite inputs: y blows up to ±infinity as the latitude
/// approaches ±90°, which is the projection's polar singularity and not
/// treated as an error. Callers wanting sane numbers should stay within
/// roughly ±85.05° latitude.
pub fn project(location: Location) -> MercatorPoint {
    let lat_rad = location.latitude.to_radians();
    let lon_rad = location.longitude.to_radians();

    MercatorPoint::new(
        EARTH_RADIUS * lon_rad,
        EARTH_RADIUS * (FRAC_PI_4 + lat_rad / 2.0).tan().ln(),
    )
}

/// Unproject spherical Web Mercator meters back to a geographic location.
///
/// Exact algebraic inverse of [`project`] up to floating-point rounding,
/// for all finite (x, y).
pub fn unproject(point: MercatorPoint) -> Location {
    let lat_rad = 2.0 * (point.y / EARTH_RADIUS).exp().atan() - FRAC_PI_2;
    let lon_rad = point.x / EARTH_RADIUS;

    Location::new(lat_rad.to_degrees(), lon_rad.to_degrees())
}

/// Heuristic: does a raw numeric pair look like (latitude, longitude)?
///
/// True iff -85 <= a <= 85 and -180 <= b <= 180. Mercator coordinates that
/// happen to fall in that range are misclassified as geographic; this is a
/// documented limitation of range-based inference, accepted for the
/// convenience of not having to tag every input. Callers can bypass it by
/// tagging the coordinate system explicitly.
pub fn is_geographic(a: f64, b: f64) -> bool {
    (-85.0..=85.0).contains(&a) && (-180.0..=180.0).contains(&b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_known_point() {
        // San Francisco, cross-checked against proj's spherical mercator
        let m = project(Location::new(37.764897, -122.419453));
        assert!((m.x - -13627671.17).abs() < 0.01);
        assert!((m.y - 4546266.67).abs() < 0.01);
    }

    #[test]
    fn test_unproject_known_point() {
        let loc = unproject(MercatorPoint::new(-13627671.0, 4546266.0));
        assert!((loc.latitude - 37.76489221).abs() < 1e-7);
        assert!((loc.longitude - -122.41945146).abs() < 1e-7);
    }

    #[test]
    fn test_project_equator_origin() {
        let m = project(Location::new(0.0, 0.0));
        assert!(m.x.abs() < 1e-9);
        assert!(m.y.abs() < 1e-9);
    }

    #[test]
    fn test_round_trip_within_usable_latitudes() {
        for lat in [-84.9, -60.0, -23.5, 0.0, 10.0, 45.0, 71.2, 84.9] {
            for lon in [-179.9, -122.419453, -1.0, 0.0, 13.4, 179.9] {
                let loc = Location::new(lat, lon);
                let back = unproject(project(loc));
                assert!(
                    (back.latitude - lat).abs() < 1e-6,
                    "latitude drifted at ({lat}, {lon}): {}",
                    back.latitude
                );
                assert!(
                    (back.longitude - lon).abs() < 1e-6,
                    "longitude drifted at ({lat}, {lon}): {}",
                    back.longitude
                );
            }
        }
    }

    #[test]
    fn test_pole_blows_up() {
        let m = project(Location::new(90.0, 0.0));
        assert!(m.y.is_infinite() || m.y > 1e15);
    }

    #[test]
    fn test_is_geographic() {
        assert!(is_geographic(37.764897, -122.419453));
        assert!(is_geographic(-85.0, 180.0));
        assert!(!is_geographic(-13627671.0, 4546266.0));
        assert!(!is_geographic(86.0, 0.0));
        assert!(!is_geographic(0.0, 180.1));
        // The known ambiguity: small mercator values pass as geographic
        assert!(is_geographic(50.0, 50.0));
    }
}
