//! Decide what a flat list of input tokens describes - a tile address, a
//! point, or a bounding box, in geographic or mercator coordinates - and
//! resolve it into a structured result.

use serde::Serialize;
use thiserror::Error;

use crate::domain::{GeoBox, Location, MercatorBox, MercatorPoint};
use crate::geometry::tile::{MAX_ZOOM, OutOfRangeTile, TileCoordinate};
use crate::geometry::{fitting_tile, is_geographic, location_to_tile, project, unproject};

/// How to interpret raw coordinate pairs.
///
/// `Auto` infers the system from the numeric range, which misclassifies
/// the (rare) mercator coordinates that fall within ±85/±180; the explicit
/// variants bypass the inference entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinateSystem {
    #[default]
    Auto,
    Geographic,
    Mercator,
}

/// Knobs for classification and resolution.
#[derive(Debug, Clone, Copy)]
pub struct ClassifyOptions {
    pub system: CoordinateSystem,
    /// Zoom used for point inputs that do not carry their own.
    pub default_zoom: u8,
    /// Viewer image size in pixels, used to pick the near-tile zoom for
    /// box inputs.
    pub map_size: (u32, u32),
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            system: CoordinateSystem::Auto,
            default_zoom: 8,
            map_size: (512, 384),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifyError {
    #[error("a group of {expected} values must all be numeric, but {token:?} is not")]
    NonNumericInput { expected: usize, token: String },
    #[error("looks like a mix of mercator and lat, lon: both corners must use the same coordinate system")]
    MixedCoordinateSystems,
    #[error(
        "not sure what to do with {0} value(s): expected a zoom/column/row tile address, a point with optional zoom, or two corners"
    )]
    UnrecognizedInput(usize),
    #[error(transparent)]
    OutOfRangeTile(#[from] OutOfRangeTile),
}

/// A coordinate pair tagged with the system it was classified into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoordPair {
    Geographic(Location),
    Mercator(MercatorPoint),
}

/// What the input tokens turned out to describe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputKind {
    TileAddress(TileCoordinate),
    Point { pair: CoordPair, zoom: u8 },
    Corners(CoordPair, CoordPair),
}

/// Which system the user typed a point in, echoed back in the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSystem {
    Geographic,
    Mercator,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointResult {
    pub input: InputSystem,
    pub location: Location,
    pub mercator: MercatorPoint,
    pub tile: TileCoordinate,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxResult {
    pub geographic: GeoBox,
    pub mercator: MercatorBox,
    /// Tile near the box center at a zoom where the box fits one map image;
    /// absent when the box came from a tile address and *is* a tile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub near_tile: Option<TileCoordinate>,
}

/// The all-or-nothing outcome of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    Point(PointResult),
    Box(BoxResult),
}

/// Classify tokens and resolve them in one step.
pub fn classify_and_solve(
    tokens: &[String],
    options: &ClassifyOptions,
) -> Result<Resolution, ClassifyError> {
    resolve(classify(tokens, options)?, options)
}

/// Classify tokens into an [`InputKind`], in order of precedence: a single
/// `zoom/column/row` token, then 2-3 tokens as a point with optional zoom,
/// then 4 tokens as two box corners.
pub fn classify(tokens: &[String], options: &ClassifyOptions) -> Result<InputKind, ClassifyError> {
    if tokens.len() == 1
        && let Some((zoom, column, row)) = split_tile_address(&tokens[0])
    {
        let tile = TileCoordinate::new(zoom, column, row)?;
        return Ok(InputKind::TileAddress(tile));
    }

    match tokens.len() {
        2 | 3 => {
            let values = parse_numbers(tokens)?;
            let zoom = match values.get(2) {
                Some(&z) => z.clamp(0.0, f64::from(MAX_ZOOM)) as u8,
                None => options.default_zoom,
            };
            Ok(InputKind::Point {
                pair: classify_pair(values[0], values[1], options.system),
                zoom,
            })
        }
        4 => {
            let values = parse_numbers(tokens)?;
            Ok(InputKind::Corners(
                classify_pair(values[0], values[1], options.system),
                classify_pair(values[2], values[3], options.system),
            ))
        }
        count => Err(ClassifyError::UnrecognizedInput(count)),
    }
}

/// Resolve a classified input into a point or box result.
pub fn resolve(kind: InputKind, options: &ClassifyOptions) -> Result<Resolution, ClassifyError> {
    let (width, height) = options.map_size;

    match kind {
        InputKind::TileAddress(tile) => {
            let geographic = tile.bounding_box();
            Ok(Resolution::Box(BoxResult {
                geographic,
                mercator: project_box(&geographic),
                near_tile: None,
            }))
        }
        InputKind::Point { pair, zoom } => {
            let (input, location, mercator) = match pair {
                CoordPair::Geographic(location) => {
                    (InputSystem::Geographic, location, project(location))
                }
                CoordPair::Mercator(point) => (InputSystem::Mercator, unproject(point), point),
            };
            Ok(Resolution::Point(PointResult {
                input,
                location,
                mercator,
                tile: location_to_tile(location, zoom),
            }))
        }
        InputKind::Corners(a, b) => {
            let (geographic, mercator) = match (a, b) {
                (CoordPair::Geographic(a), CoordPair::Geographic(b)) => {
                    let geographic = GeoBox::from_corners(a, b);
                    (geographic, project_box(&geographic))
                }
                (CoordPair::Mercator(a), CoordPair::Mercator(b)) => {
                    let mercator = MercatorBox::from_corners(a, b);
                    let geographic =
                        GeoBox::from_corners(unproject(mercator.min), unproject(mercator.max));
                    (geographic, mercator)
                }
                _ => return Err(ClassifyError::MixedCoordinateSystems),
            };
            Ok(Resolution::Box(BoxResult {
                geographic,
                mercator,
                near_tile: Some(fitting_tile(&geographic, width, height)),
            }))
        }
    }
}

/// Split a `zoom/column/row` token into its three non-negative integers.
/// Only plain decimal digits count; sign prefixes like `+15` do not make a
/// tile address.
fn split_tile_address(token: &str) -> Option<(u32, u32, u32)> {
    if !token.bytes().all(|b| b.is_ascii_digit() || b == b'/') {
        return None;
    }
    let mut parts = token.split('/');
    let zoom = parts.next()?.parse().ok()?;
    let column = parts.next()?.parse().ok()?;
    let row = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((zoom, column, row))
}

/// Parse every token as a float, stripping trailing commas so pasted
/// "lat, lon" pairs work as-is.
fn parse_numbers(tokens: &[String]) -> Result<Vec<f64>, ClassifyError> {
    tokens
        .iter()
        .map(|token| {
            token
                .trim_end_matches(',')
                .parse()
                .map_err(|_| ClassifyError::NonNumericInput {
                    expected: tokens.len(),
                    token: token.clone(),
                })
        })
        .collect()
}

fn classify_pair(a: f64, b: f64, system: CoordinateSystem) -> CoordPair {
    let geographic = match system {
        CoordinateSystem::Auto => is_geographic(a, b),
        CoordinateSystem::Geographic => true,
        CoordinateSystem::Mercator => false,
    };

    if geographic {
        CoordPair::Geographic(Location::new(a, b))
    } else {
        CoordPair::Mercator(MercatorPoint::new(a, b))
    }
}

fn project_box(geographic: &GeoBox) -> MercatorBox {
    MercatorBox::from_corners(project(geographic.southwest), project(geographic.northeast))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_string()).collect()
    }

    fn solve(raw: &[&str]) -> Result<Resolution, ClassifyError> {
        classify_and_solve(&tokens(raw), &ClassifyOptions::default())
    }

    fn solve_box(raw: &[&str]) -> BoxResult {
        match solve(raw).unwrap() {
            Resolution::Box(result) => result,
            other => panic!("expected a box result, got {other:?}"),
        }
    }

    fn solve_point(raw: &[&str]) -> PointResult {
        match solve(raw).unwrap() {
            Resolution::Point(result) => result,
            other => panic!("expected a point result, got {other:?}"),
        }
    }

    fn close(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() < tolerance
    }

    #[test]
    fn test_tile_address_box() {
        let result = solve_box(&["15/5241/12666"]);

        assert!(close(result.geographic.southwest.latitude, 37.76201938, 1e-7));
        assert!(close(result.geographic.southwest.longitude, -122.42064938, 1e-7));
        assert!(close(result.geographic.northeast.latitude, 37.77070423, 1e-7));
        assert!(close(result.geographic.northeast.longitude, -122.40966305, 1e-7));
        assert!(result.near_tile.is_none());
    }

    #[test]
    fn test_geographic_point_default_zoom() {
        let result = solve_point(&["37.764897", "-122.419453"]);

        assert_eq!(result.input, InputSystem::Geographic);
        assert!(close(result.mercator.x, -13627671.17, 0.01));
        assert!(close(result.mercator.y, 4546266.67, 0.01));
        assert_eq!(result.tile.to_string(), "8/40/98");
    }

    #[test]
    fn test_geographic_point_explicit_zoom() {
        let result = solve_point(&["37.764897", "-122.419453", "14"]);
        assert_eq!(result.tile.to_string(), "14/2620/6333");
    }

    #[test]
    fn test_mercator_point() {
        let result = solve_point(&["-13627671", "4546266"]);

        assert_eq!(result.input, InputSystem::Mercator);
        assert!(close(result.location.latitude, 37.76489221, 1e-7));
        assert!(close(result.location.longitude, -122.41945146, 1e-7));
        assert_eq!(result.tile.to_string(), "8/40/98");
    }

    #[test]
    fn test_geographic_box() {
        let result = solve_box(&["37.763251", "-122.424002", "37.768476", "-122.417865"]);

        assert!(close(result.geographic.southwest.latitude, 37.763251, 1e-9));
        assert!(close(result.geographic.southwest.longitude, -122.424002, 1e-9));
        assert!(close(result.geographic.northeast.latitude, 37.768476, 1e-9));
        assert!(close(result.geographic.northeast.longitude, -122.417865, 1e-9));
        // Projected corners match proj within a couple of centimeters
        assert!(close(result.mercator.upper_left().x, -13628177.56, 0.02));
        assert!(close(result.mercator.upper_left().y, 4546770.67, 0.02));
        assert!(close(result.mercator.lower_right().x, -13627494.40, 0.02));
        assert!(close(result.mercator.lower_right().y, 4546034.89, 0.02));
        assert!(result.near_tile.is_some());
    }

    #[test]
    fn test_mercator_box() {
        let result = solve_box(&["-13628177", "4546770", "-13627494", "4546034"]);

        assert!(close(result.geographic.southwest.latitude, 37.76324465, 1e-7));
        assert!(close(result.geographic.southwest.longitude, -122.42399694, 1e-7));
        assert!(close(result.geographic.northeast.latitude, 37.76847126, 1e-7));
        assert!(close(result.geographic.northeast.longitude, -122.41786144, 1e-7));
        // Mercator corners are echoed back, not reprojected
        assert_eq!(result.mercator.upper_left(), MercatorPoint::new(-13628177.0, 4546770.0));
        assert_eq!(result.mercator.lower_right(), MercatorPoint::new(-13627494.0, 4546034.0));
    }

    #[test]
    fn test_box_corner_order_does_not_matter() {
        let forward = solve_box(&["37.763251", "-122.424002", "37.768476", "-122.417865"]);
        let swapped = solve_box(&["37.768476", "-122.417865", "37.763251", "-122.424002"]);
        assert_eq!(forward, swapped);
    }

    #[test]
    fn test_mixed_systems_rejected() {
        let result = solve(&["37.763251", "-122.424002", "-13627494", "4546034"]);
        assert_eq!(result, Err(ClassifyError::MixedCoordinateSystems));
    }

    #[test]
    fn test_non_numeric_token() {
        let result = solve(&["37.763251", "fish"]);
        assert_eq!(
            result,
            Err(ClassifyError::NonNumericInput {
                expected: 2,
                token: "fish".to_string(),
            })
        );
    }

    #[test]
    fn test_trailing_commas_stripped() {
        let result = solve_point(&["37.764897,", "-122.419453"]);
        assert_eq!(result.tile.to_string(), "8/40/98");
    }

    #[test]
    fn test_unrecognized_token_counts() {
        assert_eq!(solve(&[]), Err(ClassifyError::UnrecognizedInput(0)));
        assert_eq!(solve(&["37.5"]), Err(ClassifyError::UnrecognizedInput(1)));
        assert_eq!(
            solve(&["1", "2", "3", "4", "5"]),
            Err(ClassifyError::UnrecognizedInput(5))
        );
    }

    #[test]
    fn test_out_of_range_tile_address() {
        assert!(matches!(
            solve(&["3/8/0"]),
            Err(ClassifyError::OutOfRangeTile(_))
        ));
    }

    #[test]
    fn test_malformed_tile_address_is_not_a_tile() {
        // Four slash-separated parts is not a tile address, and a single
        // plain number is no recognized shape at all
        assert_eq!(solve(&["1/2/3/4"]), Err(ClassifyError::UnrecognizedInput(1)));
        assert_eq!(solve(&["16/-1/5"]), Err(ClassifyError::UnrecognizedInput(1)));
        // A sign prefix parses as a u32 but is not a plain-digit address
        assert_eq!(
            solve(&["+15/5241/12666"]),
            Err(ClassifyError::UnrecognizedInput(1))
        );
    }

    #[test]
    fn test_forced_coordinate_system() {
        // 50, 50 is inside the geographic range, but a forced mercator tag
        // overrides the heuristic
        let options = ClassifyOptions {
            system: CoordinateSystem::Mercator,
            ..ClassifyOptions::default()
        };
        let result = match classify_and_solve(&tokens(&["50", "50"]), &options).unwrap() {
            Resolution::Point(result) => result,
            other => panic!("expected a point result, got {other:?}"),
        };
        assert_eq!(result.input, InputSystem::Mercator);
        assert_eq!(result.mercator, MercatorPoint::new(50.0, 50.0));
        assert!(result.location.latitude.abs() < 0.001);
    }

    #[test]
    fn test_oversized_default_zoom_is_usable() {
        // --zoom and the config file accept any u8; deep values settle on
        // the deepest supported zoom instead of overflowing the tile math
        let options = ClassifyOptions {
            default_zoom: 64,
            ..ClassifyOptions::default()
        };
        let result = match classify_and_solve(&tokens(&["37.764897", "-122.419453"]), &options) {
            Ok(Resolution::Point(result)) => result,
            other => panic!("expected a point result, got {other:?}"),
        };
        assert_eq!(result.tile.zoom, MAX_ZOOM);
    }

    #[test]
    fn test_point_result_serializes_tagged() {
        let resolution = solve(&["37.764897", "-122.419453"]).unwrap();
        let json = serde_json::to_value(&resolution).unwrap();

        assert_eq!(json["kind"], "point");
        assert_eq!(json["input"], "geographic");
        assert_eq!(json["tile"]["zoom"], 8);
        assert_eq!(json["tile"]["column"], 40);
        assert_eq!(json["tile"]["row"], 98);
    }
}
