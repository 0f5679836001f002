//! Point cloud to traversal path pipeline.
//!
//! This crate provides tools for:
//! - Loading x,y,z CSV point clouds and filtering them with a bounding box
//! - Ordering points by angle around an origin (angular sort)
//! - Savitzky-Golay smoothing of each coordinate channel (parallelized)
//! - Exporting CSV/PLY files and rendering PNG/GIF comparisons
//!
//! # Example
//!
//! ```no_run
//! use cloud_path_pipeline::{run_pipeline, PipelineConfig};
//!
//! let output = run_pipeline("cloud.csv", &PipelineConfig::default()).unwrap();
//! println!("{} points on the path", output.smoothed.len());
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod processors;
pub mod visualization;

pub use config::{BoundingBox, PipelineConfig, SmoothingConfig};
pub use core::loaders::{Point3D, PointCloud};
pub use core::transforms::Channels;
pub use processors::pipeline::{process_cloud, run_pipeline, PipelineOutput};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
