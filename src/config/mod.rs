use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::viewer::DEFAULT_VIEWER_URL;

fn default_viewer_url() -> String {
    DEFAULT_VIEWER_URL.to_string()
}
fn default_width() -> u32 {
    512
}
fn default_height() -> u32 {
    384
}
fn default_zoom() -> u8 {
    8
}

/// Optional TOML configuration: viewer endpoint, image size, and the zoom
/// used when a point input does not carry one.
#[derive(Debug, Deserialize, Clone)]
pub struct FileConfig {
    #[serde(default = "default_viewer_url")]
    pub viewer_url: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_zoom")]
    pub default_zoom: u8,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            viewer_url: default_viewer_url(),
            width: default_width(),
            height: default_height(),
            default_zoom: default_zoom(),
        }
    }
}

impl FileConfig {
    /// Load the first parseable config file from the search path, or None
    /// when no config file exists. A malformed file warns and is skipped.
    pub fn load() -> Option<Self> {
        let config_paths = get_config_paths();

        for path in config_paths {
            if path.exists()
                && let Some(config) = Self::load_from(&path)
            {
                return Some(config);
            }
        }
        None
    }

    fn load_from(path: &Path) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!("Warning: Failed to parse config file {:?}: {}", path, e);
                None
            }
        }
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("whereami.toml"));
    paths.push(PathBuf::from(".whereami.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("whereami").join("config.toml"));
        paths.push(config_dir.join("whereami.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".whereami.toml"));
        paths.push(home.join(".config").join("whereami").join("config.toml"));
    }

    paths
}
