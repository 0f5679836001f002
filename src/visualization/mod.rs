//! Visualization of raw, sorted and smoothed point series.
//!
//! Renders 3-D scatter plots with the plotters library, either as a single
//! PNG showing the complete series or as an animated GIF (see
//! [`animation`]) that reveals the series point by point.

pub mod animation;

use std::ops::Range;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use thiserror::Error;

use crate::config::OutputConfig;
use crate::core::loaders::{Point3D, PointCloud};
use crate::core::transforms::{stride_for, Channels};
use crate::processors::pipeline::PipelineOutput;

pub use animation::{animate_comparison, FrameCursor};

/// Errors that can occur during visualization.
#[derive(Error, Debug)]
pub enum VisualizationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Plotting error: {0}")]
    PlottingError(String),

    #[error("Nothing to plot: all series are empty")]
    EmptyPointCloud,
}

/// Result type for visualization operations.
pub type Result<T> = std::result::Result<T, VisualizationError>;

pub(crate) fn plot_err<E: std::fmt::Display>(e: E) -> VisualizationError {
    VisualizationError::PlottingError(e.to_string())
}

/// Default chart title.
pub const DEFAULT_TITLE: &str = "Path Planner (m)";

/// The three series drawn in a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    Raw,
    Sorted,
    Smoothed,
}

impl SeriesKind {
    /// Drawing order; the sorted series goes last so it stays visible on top.
    pub const ALL: [SeriesKind; 3] = [SeriesKind::Raw, SeriesKind::Smoothed, SeriesKind::Sorted];

    pub fn label(self) -> &'static str {
        match self {
            SeriesKind::Raw => "original pointcloud",
            SeriesKind::Sorted => "sorted pointcloud",
            SeriesKind::Smoothed => "planned path",
        }
    }

    /// Tag used in per-frame log lines.
    pub fn tag(self) -> &'static str {
        match self {
            SeriesKind::Raw => "RAW",
            SeriesKind::Sorted => "Sorted",
            SeriesKind::Smoothed => "Smooth",
        }
    }

    /// RGB color shared by plots and PLY exports.
    pub fn rgb(self) -> [u8; 3] {
        match self {
            SeriesKind::Raw => [220, 30, 30],
            SeriesKind::Sorted => [30, 60, 220],
            SeriesKind::Smoothed => [20, 160, 60],
        }
    }

    fn color(self) -> RGBColor {
        let [r, g, b] = self.rgb();
        RGBColor(r, g, b)
    }
}

/// Borrowed view of the three completed series.
///
/// Each series is indexed independently; they do not need equal lengths.
#[derive(Debug, Clone, Copy)]
pub struct SeriesView<'a> {
    pub raw: &'a PointCloud,
    pub sorted: &'a PointCloud,
    pub smoothed: &'a Channels,
}

impl<'a> SeriesView<'a> {
    pub fn new(raw: &'a PointCloud, sorted: &'a PointCloud, smoothed: &'a Channels) -> Self {
        Self {
            raw,
            sorted,
            smoothed,
        }
    }

    pub fn from_output(output: &'a PipelineOutput) -> Self {
        Self::new(&output.raw, &output.sorted, &output.smoothed)
    }

    pub fn len(&self, kind: SeriesKind) -> usize {
        match kind {
            SeriesKind::Raw => self.raw.len(),
            SeriesKind::Sorted => self.sorted.len(),
            SeriesKind::Smoothed => self.smoothed.len(),
        }
    }

    /// Length of the longest series.
    pub fn max_len(&self) -> usize {
        SeriesKind::ALL.iter().map(|&k| self.len(k)).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.max_len() == 0
    }

    /// Point `index` of a series, if the series is that long.
    pub fn point(&self, kind: SeriesKind, index: usize) -> Option<Point3D> {
        match kind {
            SeriesKind::Raw => self.raw.get(index).copied(),
            SeriesKind::Sorted => self.sorted.get(index).copied(),
            SeriesKind::Smoothed => self.smoothed.point(index),
        }
    }

    /// The first `upto` points of a series, keeping every `stride`-th one.
    pub fn prefix(&self, kind: SeriesKind, upto: usize, stride: usize) -> Vec<(f64, f64, f64)> {
        let end = upto.min(self.len(kind));
        (0..end)
            .step_by(stride.max(1))
            .filter_map(|i| self.point(kind, i))
            .map(|p| (p.x, p.y, p.z))
            .collect()
    }
}

/// Rendering parameters.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    /// Maximum points drawn per series
    pub max_points: usize,
    pub frame_delay_ms: u32,
    pub max_frames: usize,
    pub title: String,
}

impl RenderOptions {
    pub fn from_config(config: &OutputConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            max_points: config.plot_max_points,
            frame_delay_ms: config.frame_delay_ms,
            max_frames: config.max_frames,
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from_config(&OutputConfig::default())
    }
}

/// Axis ranges shared by every frame of a rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotBounds {
    pub x: Range<f64>,
    pub y: Range<f64>,
    pub z: Range<f64>,
}

fn padded_range(min: f64, max: f64) -> Range<f64> {
    let (mut lo, mut hi) = (min, max);
    if (hi - lo).abs() < f64::EPSILON {
        lo -= 1.0;
        hi += 1.0;
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad)..(hi + pad)
}

/// Compute padded bounds over all points of all series.
pub fn compute_bounds(view: &SeriesView<'_>) -> Option<PlotBounds> {
    let mut min = [f64::MAX; 3];
    let mut max = [f64::MIN; 3];
    let mut any = false;

    for kind in SeriesKind::ALL {
        for i in 0..view.len(kind) {
            let Some(p) = view.point(kind, i) else { continue };
            for (axis, v) in p.to_array().into_iter().enumerate() {
                if !v.is_finite() {
                    continue;
                }
                min[axis] = min[axis].min(v);
                max[axis] = max[axis].max(v);
                any = true;
            }
        }
    }

    if !any {
        return None;
    }

    Some(PlotBounds {
        x: padded_range(min[0], max[0]),
        y: padded_range(min[1], max[1]),
        z: padded_range(min[2], max[2]),
    })
}

/// Draw one frame showing the first `upto` points of every series.
pub(crate) fn draw_frame(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    view: &SeriesView<'_>,
    upto: usize,
    bounds: &PlotBounds,
    options: &RenderOptions,
) -> Result<()> {
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(root)
        .margin(20)
        .caption(&options.title, ("sans-serif", 28))
        .build_cartesian_3d(bounds.x.clone(), bounds.y.clone(), bounds.z.clone())
        .map_err(plot_err)?;

    chart.with_projection(|mut pb| {
        pb.yaw = 0.6;
        pb.pitch = 0.35;
        pb.scale = 0.85;
        pb.into_matrix()
    });

    chart
        .configure_axes()
        .light_grid_style(BLACK.mix(0.1))
        .max_light_lines(3)
        .draw()
        .map_err(plot_err)?;

    for kind in SeriesKind::ALL {
        let stride = stride_for(view.len(kind), options.max_points);
        let points = view.prefix(kind, upto, stride);
        let color = kind.color();

        chart
            .draw_series(
                points
                    .into_iter()
                    .map(move |p| Circle::new(p, 2, color.filled())),
            )
            .map_err(plot_err)?
            .label(kind.label())
            .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)?;

    Ok(())
}

/// Plot all three complete series into a single PNG.
pub fn plot_comparison(output_path: &Path, view: &SeriesView<'_>, options: &RenderOptions) -> Result<()> {
    let bounds = compute_bounds(view).ok_or(VisualizationError::EmptyPointCloud)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let root = BitMapBackend::new(output_path, (options.width, options.height)).into_drawing_area();
    draw_frame(&root, view, view.max_len(), &bounds, options)?;
    root.present().map_err(plot_err)?;

    log::info!("comparison plot -> {}", output_path.display());
    Ok(())
}
