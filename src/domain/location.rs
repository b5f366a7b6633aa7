use serde::Serialize;

/// A geographic position in WGS84 degrees.
///
/// Latitude is in [-90, 90] and longitude in [-180, 180], though anything
/// beyond roughly ±85.05° latitude is unusable on the Mercator plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A position on the spherical Web Mercator plane, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MercatorPoint {
    pub x: f64,
    pub y: f64,
}

impl MercatorPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}
