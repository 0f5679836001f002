//! Configuration types for the cloud path pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading, saving or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Options for reading the input CSV.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputConfig {
    /// Skip the first record as a header row
    #[serde(default)]
    pub has_header: bool,
}

/// Axis-aligned acceptance region for loaded points.
///
/// All bounds are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    #[serde(default = "default_x_min")]
    pub x_min: f64,
    #[serde(default = "default_x_max")]
    pub x_max: f64,
    #[serde(default)]
    pub y_min: f64,
    #[serde(default = "default_y_max")]
    pub y_max: f64,
    #[serde(default)]
    pub z_min: f64,
    #[serde(default = "default_z_max")]
    pub z_max: f64,
}

fn default_x_min() -> f64 {
    -0.42
}

fn default_x_max() -> f64 {
    -0.05
}

fn default_y_max() -> f64 {
    0.5
}

fn default_z_max() -> f64 {
    0.35
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            x_min: default_x_min(),
            x_max: default_x_max(),
            y_min: 0.0,
            y_max: default_y_max(),
            z_min: 0.0,
            z_max: default_z_max(),
        }
    }
}

impl BoundingBox {
    /// Creates a bounding box from per-axis `(min, max)` pairs.
    pub fn new(x: (f64, f64), y: (f64, f64), z: (f64, f64)) -> Self {
        Self {
            x_min: x.0,
            x_max: x.1,
            y_min: y.0,
            y_max: y.1,
            z_min: z.0,
            z_max: z.1,
        }
    }

    /// Box that accepts every finite point.
    pub fn unbounded() -> Self {
        Self::new(
            (f64::NEG_INFINITY, f64::INFINITY),
            (f64::NEG_INFINITY, f64::INFINITY),
            (f64::NEG_INFINITY, f64::INFINITY),
        )
    }
}

/// Configuration for the angular sort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortingConfig {
    /// Direction of zero angle in the XY plane
    #[serde(default = "default_reference")]
    pub reference: [f64; 2],
}

fn default_reference() -> [f64; 2] {
    [0.0, 1.0]
}

impl Default for SortingConfig {
    fn default() -> Self {
        Self {
            reference: default_reference(),
        }
    }
}

/// Configuration for local-polynomial smoothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmoothingConfig {
    /// Number of samples in the sliding window (odd)
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Degree of the fitted polynomial (must be below the window size)
    #[serde(default = "default_polynomial_order")]
    pub polynomial_order: usize,
}

fn default_window_size() -> usize {
    201
}

fn default_polynomial_order() -> usize {
    2
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            polynomial_order: default_polynomial_order(),
        }
    }
}

/// Configuration for exports and rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Keep every Nth sorted point in the downsampled export
    #[serde(default = "default_downsample_interval")]
    pub downsample_interval: usize,

    /// Maximum number of points drawn per series
    #[serde(default = "default_plot_max_points")]
    pub plot_max_points: usize,

    /// Image width in pixels
    #[serde(default = "default_width")]
    pub width: u32,

    /// Image height in pixels
    #[serde(default = "default_height")]
    pub height: u32,

    /// Delay between animation frames
    #[serde(default = "default_frame_delay_ms")]
    pub frame_delay_ms: u32,

    /// Upper bound on rendered animation frames
    #[serde(default = "default_max_frames")]
    pub max_frames: usize,
}

fn default_downsample_interval() -> usize {
    1
}

fn default_plot_max_points() -> usize {
    100_000
}

fn default_width() -> u32 {
    1280
}

fn default_height() -> u32 {
    960
}

fn default_frame_delay_ms() -> u32 {
    100
}

fn default_max_frames() -> usize {
    300
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            downsample_interval: default_downsample_interval(),
            plot_max_points: default_plot_max_points(),
            width: default_width(),
            height: default_height(),
            frame_delay_ms: default_frame_delay_ms(),
            max_frames: default_max_frames(),
        }
    }
}

/// Main pipeline configuration combining all sub-configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub bounds: BoundingBox,

    #[serde(default)]
    pub sorting: SortingConfig,

    #[serde(default)]
    pub smoothing: SmoothingConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl PipelineConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let b = &self.bounds;
        for (axis, lo, hi) in [
            ("x", b.x_min, b.x_max),
            ("y", b.y_min, b.y_max),
            ("z", b.z_min, b.z_max),
        ] {
            if lo.is_nan() || hi.is_nan() || lo >= hi {
                return Err(ConfigError::Invalid(format!(
                    "bounds for {} must satisfy min < max (got {} .. {})",
                    axis, lo, hi
                )));
            }
        }

        let [rx, ry] = self.sorting.reference;
        if !(rx.is_finite() && ry.is_finite()) || rx.hypot(ry) == 0.0 {
            return Err(ConfigError::Invalid(format!(
                "reference vector must be finite and non-zero (got [{}, {}])",
                rx, ry
            )));
        }

        let s = &self.smoothing;
        if s.window_size == 0 || s.window_size % 2 == 0 {
            return Err(ConfigError::Invalid(format!(
                "smoothing window must be a positive odd number (got {})",
                s.window_size
            )));
        }
        if s.polynomial_order >= s.window_size {
            return Err(ConfigError::Invalid(format!(
                "polynomial order {} must be less than window size {}",
                s.polynomial_order, s.window_size
            )));
        }

        if self.output.width == 0 || self.output.height == 0 {
            return Err(ConfigError::Invalid(
                "image dimensions must be non-zero".to_string(),
            ));
        }

        Ok(())
    }
}
