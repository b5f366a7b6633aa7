use std::f64::consts::{FRAC_PI_4, PI};
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::domain::{GeoBox, Location};

/// Tile edge length in pixels, fixed by the slippy-map scheme.
pub const TILE_SIZE: u32 = 256;

/// Deepest zoom level we accept in a tile address.
pub const MAX_ZOOM: u8 = 30;

/// A tile row/column outside `[0, 2^zoom)`, or a zoom beyond [`MAX_ZOOM`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("tile {zoom}/{column}/{row} is out of range: column and row must be below 2^{zoom}")]
pub struct OutOfRangeTile {
    pub zoom: u32,
    pub column: u32,
    pub row: u32,
}

/// One tile in the slippy-map pyramid: zoom 0 is the whole world in a
/// single tile, column 0 is the west edge, row 0 is the north edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileCoordinate {
    pub zoom: u8,
    pub column: u32,
    pub row: u32,
}

impl TileCoordinate {
    /// Build a validated tile coordinate.
    ///
    /// Rejects column/row outside `[0, 2^zoom)`, which would otherwise
    /// yield nonsensical geography when unprojected.
    pub fn new(zoom: u32, column: u32, row: u32) -> Result<Self, OutOfRangeTile> {
        let out_of_range = OutOfRangeTile { zoom, column, row };
        if zoom > u32::from(MAX_ZOOM) {
            return Err(out_of_range);
        }
        let tiles_per_axis = 1u64 << zoom;
        if u64::from(column) >= tiles_per_axis || u64::from(row) >= tiles_per_axis {
            return Err(out_of_range);
        }
        Ok(Self {
            zoom: zoom as u8,
            column,
            row,
        })
    }

    /// Geographic corner shared by this tile and the one below it: the
    /// tile's southwest corner.
    pub fn south_west(&self) -> Location {
        tile_corner(self.zoom, f64::from(self.column), f64::from(self.row) + 1.0)
    }

    /// Geographic corner shared by this tile and the one to its right: the
    /// tile's northeast corner.
    pub fn north_east(&self) -> Location {
        tile_corner(self.zoom, f64::from(self.column) + 1.0, f64::from(self.row))
    }

    /// The geographic bounding box this tile covers.
    pub fn bounding_box(&self) -> GeoBox {
        GeoBox::from_corners(self.south_west(), self.north_east())
    }
}

impl fmt::Display for TileCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.column, self.row)
    }
}

/// Fraction of the world span covered west-to-east and north-to-south up to
/// this location: (0, 0) is the northwest corner of the Mercator square,
/// (1, 1) the southeast.
fn world_fraction(location: Location) -> (f64, f64) {
    let lat_rad = location.latitude.to_radians();
    let fx = (location.longitude + 180.0) / 360.0;
    let fy = 0.5 - (FRAC_PI_4 + lat_rad / 2.0).tan().ln() / (2.0 * PI);
    (fx, fy)
}

/// The tile containing a location at the given zoom.
///
/// Locations on or beyond the map edge (longitude 180, latitudes past the
/// Mercator cutoff) clamp into the last row/column rather than spilling
/// outside the pyramid; zooms beyond [`MAX_ZOOM`] clamp down to it.
pub fn location_to_tile(location: Location, zoom: u8) -> TileCoordinate {
    let zoom = zoom.min(MAX_ZOOM);
    let tiles_per_axis = (1u64 << zoom) as f64;
    let (fx, fy) = world_fraction(location);

    let clamp = |fraction: f64| -> u32 {
        let index = (fraction * tiles_per_axis).floor();
        index.clamp(0.0, tiles_per_axis - 1.0) as u32
    };

    TileCoordinate {
        zoom,
        column: clamp(fx),
        row: clamp(fy),
    }
}

/// Geographic location of a tile-grid vertex; fractional column/row address
/// points inside a tile.
fn tile_corner(zoom: u8, column: f64, row: f64) -> Location {
    let tiles_per_axis = (1u64 << zoom) as f64;
    let longitude = column / tiles_per_axis * 360.0 - 180.0;
    let latitude = (PI * (1.0 - 2.0 * row / tiles_per_axis)).sinh().atan().to_degrees();
    Location::new(latitude, longitude)
}

/// The tile nearest a bounding box: the tile containing the box center at
/// the deepest zoom where the whole box still fits in a map image of the
/// given pixel size.
pub fn fitting_tile(bounds: &GeoBox, width: u32, height: u32) -> TileCoordinate {
    let (west_fx, south_fy) = world_fraction(bounds.southwest);
    let (east_fx, north_fy) = world_fraction(bounds.northeast);

    let span_x = (east_fx - west_fx).abs().max(f64::EPSILON);
    let span_y = (south_fy - north_fy).abs().max(f64::EPSILON);

    let tile_size = f64::from(TILE_SIZE);
    let horizontal = f64::from(width) / (tile_size * span_x);
    let vertical = f64::from(height) / (tile_size * span_y);

    let zoom = horizontal
        .min(vertical)
        .log2()
        .floor()
        .clamp(0.0, f64::from(MAX_ZOOM)) as u8;

    location_to_tile(bounds.center(), zoom)
}
