//! URL construction for the external map viewer, so results can be
//! eyeballed on an actual map.

use anyhow::{Context, Result};
use url::Url;

use crate::classify::{BoxResult, PointResult, Resolution};
use crate::domain::GeoBox;
use crate::geometry::TileCoordinate;

pub const DEFAULT_VIEWER_URL: &str = "http://pafciu17.dev.openstreetmap.org/";

/// Where and how big the rendered map image should be.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub base_url: String,
    pub width: u32,
    pub height: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_VIEWER_URL.to_string(),
            width: 512,
            height: 384,
        }
    }
}

/// Build the viewer URL for a resolved result.
pub fn viewer_url(resolution: &Resolution, config: &ViewerConfig) -> Result<String> {
    match resolution {
        Resolution::Point(point) => point_url(point, config),
        Resolution::Box(boxed) => box_url(boxed, config),
    }
}

/// Map centered on the point, with a point marker and the containing tile
/// outlined.
fn point_url(point: &PointResult, config: &ViewerConfig) -> Result<String> {
    let mut url = map_base(config)?;

    url.query_pairs_mut()
        .append_pair("lat", &point.location.latitude.to_string())
        .append_pair("lon", &point.location.longitude.to_string())
        .append_pair("zoom", &point.tile.zoom.to_string())
        .append_pair(
            "points",
            &format!(
                "{:.6},{:.6}",
                point.location.longitude, point.location.latitude
            ),
        )
        .append_pair("polygons", &tile_polygon(&point.tile));

    Ok(url.into())
}

/// Map showing the box with an 1/8-extent margin around it, the box drawn
/// as a polygon, and the near tile outlined when there is one.
fn box_url(boxed: &BoxResult, config: &ViewerConfig) -> Result<String> {
    let bounds = &boxed.geographic;
    let buffer_lat = bounds.height() / 8.0;
    let buffer_lon = bounds.width() / 8.0;

    let bbox = format!(
        "{:.6},{:.6},{:.6},{:.6}",
        bounds.southwest.longitude - buffer_lon,
        bounds.northeast.latitude + buffer_lat,
        bounds.northeast.longitude + buffer_lon,
        bounds.southwest.latitude - buffer_lat,
    );

    let mut polygons = format!("{},color:0:0:0", box_outline(bounds));
    if let Some(tile) = &boxed.near_tile {
        polygons.push(';');
        polygons.push_str(&tile_polygon(tile));
    }

    let mut url = map_base(config)?;
    url.query_pairs_mut()
        .append_pair("bbox", &bbox)
        .append_pair("polygons", &polygons);

    Ok(url.into())
}

fn map_base(config: &ViewerConfig) -> Result<Url> {
    let mut url = Url::parse(&config.base_url)
        .with_context(|| format!("Invalid viewer base URL: {}", config.base_url))?;

    url.query_pairs_mut()
        .append_pair("module", "map")
        .append_pair("width", &config.width.to_string())
        .append_pair("height", &config.height.to_string());

    Ok(url)
}

/// Corner ring of a box as the viewer's lon,lat polygon syntax.
fn box_outline(bounds: &GeoBox) -> String {
    let (south, west) = (bounds.southwest.latitude, bounds.southwest.longitude);
    let (north, east) = (bounds.northeast.latitude, bounds.northeast.longitude);

    format!(
        "{west:.6},{south:.6},{west:.6},{north:.6},{east:.6},{north:.6},{east:.6},{south:.6}"
    )
}

/// A tile's outline, drawn semi-transparent and thick so it reads as an
/// overlay rather than data.
fn tile_polygon(tile: &TileCoordinate) -> String {
    format!(
        "{},transparency:102,thickness:3,color:0:0:0",
        box_outline(&tile.bounding_box())
    )
}
