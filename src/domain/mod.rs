pub mod bounds;
pub mod location;

pub use bounds::{GeoBox, MercatorBox};
pub use location::{Location, MercatorPoint};
