use super::parameters::Variant;
use serde::Deserialize;
use std::path::Path;

/// Pipeline configuration loaded from a YAML file.
///
/// Every field has a default, so an empty file (or none at all) gives the
/// stock behaviour.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Largest accepted input file in bytes
    pub max_file_size: u64,

    /// Pixel count above which a freshly loaded image triggers a prompt
    pub optimal_pixel_count: u64,

    /// Pixel count above which requested output dimensions trigger a prompt
    pub output_pixel_threshold: u64,

    /// Lower bound for the view zoom
    pub min_zoom: f64,

    /// Zoom applied on every image load
    pub initial_zoom: f64,

    /// Pan offset applied on every image load
    pub initial_pan: (f64, f64),

    /// Frame interval for the interval clock
    pub frame_interval_ms: u64,

    /// Variant selected at startup
    pub default_variant: Variant,
}

pub const MAX_FILE_SIZE: u64 = 20 * 1024 * 1024;
pub const OPTIMAL_PIXEL_COUNT: u64 = 3_000_000;
pub const OUTPUT_PIXEL_THRESHOLD: u64 = 4_000_000;

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            optimal_pixel_count: OPTIMAL_PIXEL_COUNT,
            output_pixel_threshold: OUTPUT_PIXEL_THRESHOLD,
            min_zoom: 0.1,
            initial_zoom: 0.70,
            initial_pan: (-200.0, -60.0),
            frame_interval_ms: 16, // ~60 Hz
            default_variant: Variant::Jarvis,
        }
    }
}

impl PipelineConfig {
    /// Parse configuration from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        // serde_yaml rejects an empty document for a struct
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Load configuration from `path`, falling back to defaults on any error.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_yaml(&content) {
                Ok(config) => {
                    tracing::info!(
                        path = %path.display(),
                        variant = %config.default_variant,
                        "Loaded configuration"
                    );
                    config
                }
                Err(e) => {
                    tracing::warn!(%e, "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(%e, path = %path.display(), "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    /// Resolve the config path from an explicit argument or `DITHER_LIVE_CONFIG`.
    pub fn load_optional(path: Option<&Path>) -> Self {
        let from_env = std::env::var_os("DITHER_LIVE_CONFIG").map(std::path::PathBuf::from);
        match path.map(Path::to_path_buf).or(from_env) {
            Some(p) => Self::load(&p),
            None => Self::default(),
        }
    }
}
