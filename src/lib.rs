//! whereami - sanity-check map locations given as lat/lon, Web Mercator
//! meters, or slippy-map tile addresses

pub mod classify;
pub mod config;
pub mod domain;
pub mod geometry;
pub mod viewer;
