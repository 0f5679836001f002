//! Data processing modules.

pub mod filtering;
pub mod pipeline;
pub mod smoothing;
pub mod sorting;

// Re-export key types for convenience
pub use filtering::{count_rejected, filter_cloud};
pub use pipeline::{process_cloud, run_pipeline, PipelineError, PipelineOutput};
pub use smoothing::{smooth_channels, PolynomialSmoother, SmoothingError};
pub use sorting::{angular_sort, sort_from_first_point, AngularKey, Origin, ReferenceVector, SortingError};
