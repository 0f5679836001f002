//! End-to-end pipeline: load, sort, split and smooth.

use std::path::Path;
use std::time::Instant;

use thiserror::Error;

use crate::config::PipelineConfig;
use crate::core::loaders::{load_filtered_csv, LoaderError, PointCloud};
use crate::core::transforms::{downsample, split_channels, Channels};
use crate::processors::smoothing::{smooth_channels, validate_params, SmoothingError};
use crate::processors::sorting::{angular_sort, Origin, ReferenceVector, SortingError};

/// Errors that stop the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoaderError),

    #[error(transparent)]
    Sort(#[from] SortingError),

    #[error(transparent)]
    Smooth(#[from] SmoothingError),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// The three completed series of one run.
///
/// Every field is fully computed before the value is handed out, so
/// consumers can index each series from 0 to its length.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Filtered points in file order.
    pub raw: PointCloud,
    /// Origin used by the angular sort.
    pub origin: Origin,
    /// Permutation of `raw` in traversal order.
    pub sorted: PointCloud,
    /// Smoothed channels, index-aligned with `sorted`.
    pub smoothed: Channels,
}

impl PipelineOutput {
    /// Sorted points thinned to every `interval`-th point.
    pub fn downsampled_sorted(&self, interval: usize) -> PointCloud {
        downsample(&self.sorted, interval)
    }

    /// Smoothed channels reassembled as points.
    pub fn smoothed_cloud(&self) -> PointCloud {
        self.smoothed.to_cloud()
    }
}

/// Run origin selection, angular sort and smoothing on an already filtered
/// cloud.
///
/// Smoothing parameters and the reference vector are checked before any
/// stage runs.
pub fn process_cloud(raw: PointCloud, config: &PipelineConfig) -> Result<PipelineOutput> {
    validate_params(&config.smoothing)?;
    let reference = ReferenceVector::try_from(config.sorting.reference)?;

    let origin = Origin::from_cloud(&raw)?;
    log::debug!("origin at ({:.6}, {:.6})", origin.x, origin.y);

    let start = Instant::now();
    let sorted = angular_sort(&raw, origin, reference);
    log::debug!("angular sort of {} points took {:.2?}", sorted.len(), start.elapsed());

    let channels = split_channels(&sorted);

    let start = Instant::now();
    let smoothed = smooth_channels(&channels, &config.smoothing)?;
    log::debug!(
        "smoothing (window {}, order {}) took {:.2?}",
        config.smoothing.window_size,
        config.smoothing.polynomial_order,
        start.elapsed()
    );

    log::info!(
        "pipeline complete: {} raw, {} sorted, {} smoothed",
        raw.len(),
        sorted.len(),
        smoothed.len()
    );

    Ok(PipelineOutput {
        raw,
        origin,
        sorted,
        smoothed,
    })
}

/// Load `path`, filter it with the configured bounds and run
/// [`process_cloud`].
pub fn run_pipeline<P: AsRef<Path>>(path: P, config: &PipelineConfig) -> Result<PipelineOutput> {
    let raw = load_filtered_csv(path, &config.bounds, &config.input)?;
    process_cloud(raw, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BoundingBox, SmoothingConfig};
    use crate::core::loaders::Point3D;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn small_config(window_size: usize, polynomial_order: usize) -> PipelineConfig {
        PipelineConfig {
            bounds: BoundingBox::new((-10.0, 10.0), (-10.0, 10.0), (-10.0, 10.0)),
            smoothing: SmoothingConfig {
                window_size,
                polynomial_order,
            },
            ..PipelineConfig::default()
        }
    }

    fn ring(n: usize) -> PointCloud {
        (0..n)
            .map(|i| {
                let t = i as f64 * 0.37;
                Point3D::new(t.cos() * 2.0, t.sin() * 2.0, 0.1 * i as f64)
            })
            .collect()
    }

    #[test]
    fn test_process_cloud_lengths() {
        let output = process_cloud(ring(40), &small_config(5, 2)).unwrap();

        assert_eq!(output.raw.len(), 40);
        assert_eq!(output.sorted.len(), 40);
        assert_eq!(output.smoothed.len(), 40);
        assert_eq!(output.origin, Origin::new(2.0, 0.0));
        assert_eq!(output.sorted[0], output.raw[0]);
    }

    #[test]
    fn test_empty_cloud_fails_origin_selection() {
        let err = process_cloud(PointCloud::new(), &small_config(5, 2)).unwrap_err();
        assert!(matches!(err, PipelineError::Sort(SortingError::EmptyCloud)));
    }

    #[test]
    fn test_bad_window_fails_before_sorting() {
        let err = process_cloud(PointCloud::new(), &small_config(4, 2)).unwrap_err();
        assert!(matches!(err, PipelineError::Smooth(SmoothingError::EvenWindow(4))));
    }

    #[test]
    fn test_too_few_points_for_window() {
        let err = process_cloud(ring(3), &small_config(5, 2)).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Smooth(SmoothingError::InputTooShort { len: 3, window: 5 })
        ));
    }

    #[test]
    fn test_downsampled_sorted() {
        let output = process_cloud(ring(10), &small_config(3, 1)).unwrap();
        let thinned = output.downsampled_sorted(4);
        assert_eq!(thinned.len(), 3);
        assert_eq!(thinned[1], output.sorted[4]);
        assert_eq!(output.smoothed_cloud().len(), 10);
    }

    #[test]
    fn test_run_pipeline_from_csv() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "0,0,0").unwrap();
        writeln!(file, "1,0,0").unwrap();
        writeln!(file, "0,1,0").unwrap();
        writeln!(file, "-1,0,0").unwrap();
        writeln!(file, "50,0,0").unwrap();
        file.flush().unwrap();

        let output = run_pipeline(file.path(), &small_config(3, 1)).unwrap();

        assert_eq!(output.raw.len(), 4);
        assert_eq!(
            output.sorted.into_points(),
            vec![
                Point3D::new(0.0, 0.0, 0.0),
                Point3D::new(0.0, 1.0, 0.0),
                Point3D::new(1.0, 0.0, 0.0),
                Point3D::new(-1.0, 0.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_malformed_csv_stops_pipeline() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "0,0,0").unwrap();
        writeln!(file, "1,0").unwrap();
        file.flush().unwrap();

        let err = run_pipeline(file.path(), &small_config(1, 0)).unwrap_err();
        assert!(matches!(err, PipelineError::Load(LoaderError::FieldCount { .. })));
    }
}
