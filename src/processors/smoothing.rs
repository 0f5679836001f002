//! Local-polynomial (Savitzky-Golay) smoothing of coordinate channels.
//!
//! Each sample is replaced by the value at that position of a degree-P
//! polynomial least-squares fitted to a window of W consecutive samples.
//! Interior samples use the window centred on them. The first and last
//! `W / 2` samples are evaluated on the polynomial fitted to the first or
//! last full window, so the output always has the input's length.
//!
//! The fit only depends on W and P, so the least-squares projection matrix
//! is computed once per smoother and reused for every sample and channel.

use nalgebra::DMatrix;
use thiserror::Error;

use crate::config::SmoothingConfig;
use crate::core::transforms::Channels;

/// Errors that can occur during smoothing.
#[derive(Debug, Error, PartialEq)]
pub enum SmoothingError {
    #[error("Window size must be positive")]
    ZeroWindow,

    #[error("Window size must be odd, got {0}")]
    EvenWindow(usize),

    #[error("Polynomial order {order} must be less than window size {window}")]
    OrderTooHigh { order: usize, window: usize },

    #[error("Cannot smooth an empty sequence")]
    EmptyInput,

    #[error("Input has {len} samples, fewer than the window size {window}")]
    InputTooShort { len: usize, window: usize },

    #[error("Least-squares fit failed: {0}")]
    Numerical(String),
}

/// Result type for smoothing operations.
pub type Result<T> = std::result::Result<T, SmoothingError>;

/// Check window and order constraints.
pub fn validate_params(params: &SmoothingConfig) -> Result<()> {
    let window = params.window_size;
    if window == 0 {
        return Err(SmoothingError::ZeroWindow);
    }
    if window % 2 == 0 {
        return Err(SmoothingError::EvenWindow(window));
    }
    if params.polynomial_order >= window {
        return Err(SmoothingError::OrderTooHigh {
            order: params.polynomial_order,
            window,
        });
    }
    Ok(())
}

/// Smoother for a fixed window size and polynomial order.
#[derive(Debug, Clone)]
pub struct PolynomialSmoother {
    window: usize,
    order: usize,
    /// `hat[(k, j)]` weights sample `j` of a window when evaluating the fit
    /// at window position `k`.
    hat: DMatrix<f64>,
}

impl PolynomialSmoother {
    /// Validate `params` and precompute the projection matrix.
    pub fn new(params: &SmoothingConfig) -> Result<Self> {
        validate_params(params)?;

        let window = params.window_size;
        let order = params.polynomial_order;
        let half = (window / 2) as f64;
        // Abscissae are scaled to [-1, 1]; the projection does not change but
        // the Vandermonde columns stay well conditioned for large windows.
        let scale = if half > 0.0 { half } else { 1.0 };

        let design = DMatrix::from_fn(window, order + 1, |i, j| {
            let t = (i as f64 - half) / scale;
            t.powi(j as i32)
        });

        let pinv = design
            .clone()
            .pseudo_inverse(f64::EPSILON * 100.0)
            .map_err(|e| SmoothingError::Numerical(e.to_string()))?;

        Ok(Self {
            window,
            order,
            hat: design * pinv,
        })
    }

    #[inline]
    pub fn window_size(&self) -> usize {
        self.window
    }

    #[inline]
    pub fn polynomial_order(&self) -> usize {
        self.order
    }

    /// Convolution weights applied to interior samples.
    pub fn coefficients(&self) -> Vec<f64> {
        self.hat.row(self.window / 2).iter().copied().collect()
    }

    /// Check that a sequence of `len` samples can be smoothed.
    pub fn check_len(&self, len: usize) -> Result<()> {
        if len == 0 {
            return Err(SmoothingError::EmptyInput);
        }
        if len < self.window {
            return Err(SmoothingError::InputTooShort {
                len,
                window: self.window,
            });
        }
        Ok(())
    }

    /// Smooth a single channel.
    pub fn smooth(&self, values: &[f64]) -> Result<Vec<f64>> {
        self.check_len(values.len())?;

        let n = values.len();
        let w = self.window;
        let half = w / 2;

        let smoothed: Vec<f64> = (0..n)
            .map(|i| {
                let (start, row) = if i < half {
                    (0, i)
                } else if i + half >= n {
                    (n - w, i + w - n)
                } else {
                    (i - half, half)
                };

                values[start..start + w]
                    .iter()
                    .enumerate()
                    .map(|(j, &v)| self.hat[(row, j)] * v)
                    .sum::<f64>()
            })
            .collect();

        Ok(smoothed)
    }
}

/// Smooth the x, y and z channels independently.
///
/// Parameters and lengths are validated before any channel is processed.
/// Channels are evaluated in parallel; each channel's result does not depend
/// on scheduling.
pub fn smooth_channels(channels: &Channels, params: &SmoothingConfig) -> Result<Channels> {
    let smoother = PolynomialSmoother::new(params)?;
    smoother.check_len(channels.len())?;

    let (x, (y, z)) = rayon::join(
        || smoother.smooth(&channels.x),
        || {
            rayon::join(
                || smoother.smooth(&channels.y),
                || smoother.smooth(&channels.z),
            )
        },
    );

    Ok(Channels { x: x?, y: y?, z: z? })
}
