use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use whereami::classify::{
    ClassifyOptions, CoordinateSystem, InputSystem, Resolution, classify_and_solve,
};
use whereami::config::FileConfig;
use whereami::viewer::{ViewerConfig, viewer_url};

/// Sanity-check a map location: where is this point, box, or tile?
///
/// Detail lines go to stderr and the viewer URL alone to stdout, so the
/// output can be fed straight to a browser opener:
///
///   open $(whereami -- -13628177 4546770 -13627494 4546034)
///
/// Examples:
///   # A tile address prints its bounding box
///   whereami 15/5241/12666
///
///   # A lat/lon point, with the containing tile at zoom 14
///   whereami 37.764897 -122.419453 14
///
///   # Two corners make a box; mercator meters are recognized by range
///   whereami 37.763251 -122.424002 37.768476 -122.417865
#[derive(Parser, Debug)]
#[command(name = "whereami")]
#[command(version, about, long_about = None)]
struct Args {
    /// A point (2 values), point plus zoom (3), two box corners (4), or a
    /// single zoom/column/row tile address
    #[arg(value_name = "VALUE", allow_hyphen_values = true)]
    values: Vec<String>,

    /// Path to config file (optional, auto-searches whereami.toml if not provided)
    #[arg(long)]
    config: Option<PathBuf>,

    /// How to read coordinate pairs, instead of inferring from their range
    #[arg(long, value_enum, default_value_t = CoordMode::Auto)]
    coords: CoordMode,

    /// Zoom for point inputs that do not carry their own
    #[arg(short = 'z', long)]
    zoom: Option<u8>,

    /// Map viewer base URL override
    #[arg(long)]
    viewer_url: Option<String>,

    /// Print the result as JSON on stdout instead of text
    #[arg(long)]
    json: bool,

    /// Run as a CGI program: read tokens from QUERY_STRING, respond with JSON
    #[arg(long)]
    cgi: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
enum CoordMode {
    /// Infer from the numeric range (±85/±180 reads as lat/lon)
    #[default]
    Auto,
    /// Pairs are latitude, longitude
    Latlon,
    /// Pairs are mercator x, y meters
    Mercator,
}

impl From<CoordMode> for CoordinateSystem {
    fn from(mode: CoordMode) -> Self {
        match mode {
            CoordMode::Auto => CoordinateSystem::Auto,
            CoordMode::Latlon => CoordinateSystem::Geographic,
            CoordMode::Mercator => CoordinateSystem::Mercator,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let file_config = if let Some(ref config_path) = args.config {
        if config_path.exists() {
            let contents = std::fs::read_to_string(config_path)
                .context(format!("Failed to read config file: {:?}", config_path))?;
            Some(toml::from_str(&contents).context("Failed to parse config file")?)
        } else {
            bail!("Config file not found: {:?}", config_path);
        }
    } else {
        FileConfig::load()
    };
    let config = file_config.unwrap_or_default();

    let options = ClassifyOptions {
        system: args.coords.into(),
        default_zoom: args.zoom.unwrap_or(config.default_zoom),
        map_size: (config.width, config.height),
    };
    let viewer = ViewerConfig {
        base_url: args.viewer_url.clone().unwrap_or(config.viewer_url),
        width: config.width,
        height: config.height,
    };

    if args.cgi {
        return run_cgi(&options, &viewer);
    }

    let tokens = split_tokens(&args.values);
    let resolution = classify_and_solve(&tokens, &options)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&json_body(&resolution, &viewer)?)?);
        return Ok(());
    }

    print_details(&resolution);
    println!("{}", viewer_url(&resolution, &viewer)?);

    Ok(())
}

/// Split command-line values on commas, so pasted "lat, lon" pairs arrive
/// as clean tokens whether or not the shell already split them.
fn split_tokens(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Human-readable detail lines, on stderr.
fn print_details(resolution: &Resolution) {
    match resolution {
        Resolution::Point(point) => {
            match point.input {
                InputSystem::Geographic => {
                    eprintln!("mercator: {:.2} {:.2}", point.mercator.x, point.mercator.y);
                }
                InputSystem::Mercator => {
                    eprintln!(
                        "lat, lon: {:.8} {:.8}",
                        point.location.latitude, point.location.longitude
                    );
                }
            }
            eprintln!("in tile:  {}", point.tile);
        }
        Resolution::Box(boxed) => {
            let bounds = &boxed.geographic;
            let upper_left = boxed.mercator.upper_left();
            let lower_right = boxed.mercator.lower_right();

            eprintln!(
                "southwest:   {:.8} {:.8}",
                bounds.southwest.latitude, bounds.southwest.longitude
            );
            eprintln!(
                "northeast:   {:.8} {:.8}",
                bounds.northeast.latitude, bounds.northeast.longitude
            );
            eprintln!("upper-left:  {:.2} {:.2}", upper_left.x, upper_left.y);
            eprintln!("lower-right: {:.2} {:.2}", lower_right.x, lower_right.y);
            if let Some(tile) = &boxed.near_tile {
                eprintln!("near tile:   {}", tile);
            }
        }
    }
    eprintln!();
}

/// CGI front end: tokens come from the `q` query parameter, the response is
/// the result as JSON, or an error object with a server-error status.
fn run_cgi(options: &ClassifyOptions, viewer: &ViewerConfig) -> Result<()> {
    let query = std::env::var("QUERY_STRING").unwrap_or_default();
    let tokens = cgi_tokens(&query);

    match classify_and_solve(&tokens, options) {
        Ok(resolution) => {
            let body = json_body(&resolution, viewer)?;
            println!("Content-Type: application/json");
            println!();
            println!("{}", serde_json::to_string(&body)?);
        }
        Err(e) => {
            println!("Status: 500 Internal Server Error");
            println!("Content-Type: application/json");
            println!();
            println!(
                "{}",
                serde_json::to_string(&serde_json::json!({ "error": e.to_string() }))?
            );
        }
    }

    Ok(())
}

/// The result as a JSON object with the viewer URL attached, shared by the
/// `--json` and CGI outputs.
fn json_body(resolution: &Resolution, viewer: &ViewerConfig) -> Result<serde_json::Value> {
    let mut body = serde_json::to_value(resolution)?;
    if let Some(map) = body.as_object_mut() {
        map.insert("url".to_string(), viewer_url(resolution, viewer)?.into());
    }
    Ok(body)
}

/// Tokens from a CGI query string: everything in `q`, split on commas and
/// whitespace ('+' arrives as whitespace after form decoding).
fn cgi_tokens(query: &str) -> Vec<String> {
    let mut tokens = Vec::new();

    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        if key != "q" {
            continue;
        }
        tokens.extend(
            value
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|token| !token.is_empty())
                .map(str::to_string),
        );
    }

    tokens
}
