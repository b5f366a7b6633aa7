use serde::Serialize;

use super::{Location, MercatorPoint};

/// A geographic bounding box, normalized so southwest <= northeast
/// componentwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoBox {
    pub southwest: Location,
    pub northeast: Location,
}

impl GeoBox {
    /// Build a box from two corners given in any order.
    pub fn from_corners(a: Location, b: Location) -> Self {
        Self {
            southwest: Location::new(
                a.latitude.min(b.latitude),
                a.longitude.min(b.longitude),
            ),
            northeast: Location::new(
                a.latitude.max(b.latitude),
                a.longitude.max(b.longitude),
            ),
        }
    }

    pub fn center(&self) -> Location {
        Location::new(
            (self.southwest.latitude + self.northeast.latitude) / 2.0,
            (self.southwest.longitude + self.northeast.longitude) / 2.0,
        )
    }

    /// Latitude span in degrees.
    pub fn height(&self) -> f64 {
        self.northeast.latitude - self.southwest.latitude
    }

    /// Longitude span in degrees.
    pub fn width(&self) -> f64 {
        self.northeast.longitude - self.southwest.longitude
    }
}

/// A projected bounding box, normalized so min <= max componentwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MercatorBox {
    pub min: MercatorPoint,
    pub max: MercatorPoint,
}

impl MercatorBox {
    /// Build a box from two corners given in any order.
    pub fn from_corners(a: MercatorPoint, b: MercatorPoint) -> Self {
        Self {
            min: MercatorPoint::new(a.x.min(b.x), a.y.min(b.y)),
            max: MercatorPoint::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// The northwest corner (min x, max y).
    pub fn upper_left(&self) -> MercatorPoint {
        MercatorPoint::new(self.min.x, self.max.y)
    }

    /// The southeast corner (max x, min y).
    pub fn lower_right(&self) -> MercatorPoint {
        MercatorPoint::new(self.max.x, self.min.y)
    }
}
