pub mod projection;
pub mod tile;

pub use projection::{EARTH_RADIUS, is_geographic, project, unproject};
pub use tile::{MAX_ZOOM, OutOfRangeTile, TILE_SIZE, TileCoordinate, fitting_tile, location_to_tile};
