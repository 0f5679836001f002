//! Animated GIF rendering of the comparison.
//!
//! The animation state lives in a [`FrameCursor`] owned by the renderer; the
//! series themselves are only borrowed.

use std::path::Path;

use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;

use super::{compute_bounds, draw_frame, plot_err, RenderOptions, Result, SeriesKind, SeriesView, VisualizationError};
use crate::core::transforms::stride_for;

/// Position in an incremental reveal of `len` points.
///
/// Each step reveals `step` more points; iteration yields the number of
/// points visible after the step, ending with `len`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameCursor {
    revealed: usize,
    len: usize,
    step: usize,
}

impl FrameCursor {
    /// Cursor over `len` points that finishes within `max_frames` steps.
    ///
    /// A `max_frames` of 0 means one point per frame.
    pub fn new(len: usize, max_frames: usize) -> Self {
        Self {
            revealed: 0,
            len,
            step: stride_for(len, max_frames),
        }
    }

    /// Number of points visible so far.
    #[inline]
    pub fn revealed(&self) -> usize {
        self.revealed
    }

    #[inline]
    pub fn step(&self) -> usize {
        self.step
    }

    /// Total number of frames this cursor produces.
    pub fn frame_count(&self) -> usize {
        (self.len + self.step - 1) / self.step
    }

    pub fn is_done(&self) -> bool {
        self.revealed >= self.len
    }
}

impl Iterator for FrameCursor {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.is_done() {
            return None;
        }
        self.revealed = (self.revealed + self.step).min(self.len);
        Some(self.revealed)
    }
}

fn log_revealed(view: &SeriesView<'_>, from: usize, to: usize) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    for index in from..to {
        for kind in [SeriesKind::Raw, SeriesKind::Sorted, SeriesKind::Smoothed] {
            if let Some(p) = view.point(kind, index) {
                log::debug!("[{}] index:{} x:{} y:{} z:{}", kind.tag(), index, p.x, p.y, p.z);
            }
        }
    }
}

/// Render an animated GIF revealing every series point by point.
///
/// Returns the number of frames written.
pub fn animate_comparison(output_path: &Path, view: &SeriesView<'_>, options: &RenderOptions) -> Result<usize> {
    let bounds = compute_bounds(view).ok_or(VisualizationError::EmptyPointCloud)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let root = BitMapBackend::gif(output_path, (options.width, options.height), options.frame_delay_ms)
        .map_err(plot_err)?
        .into_drawing_area();

    let cursor = FrameCursor::new(view.max_len(), options.max_frames);
    log::info!(
        "animating {} points in {} frames ({} per frame)",
        view.max_len(),
        cursor.frame_count(),
        cursor.step()
    );

    let mut previous = 0;
    let mut frames = 0;
    for revealed in cursor {
        log_revealed(view, previous, revealed);
        draw_frame(&root, view, revealed, &bounds, options)?;
        root.present().map_err(plot_err)?;
        previous = revealed;
        frames += 1;
    }

    log::info!("animation ({} frames) -> {}", frames, output_path.display());
    Ok(frames)
}
