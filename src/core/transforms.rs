//! Reshaping operations between point sequences and per-axis channels.

use crate::core::loaders::{Point3D, PointCloud};

/// Three index-aligned coordinate sequences, one per axis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Channels {
    /// X coordinates of all points.
    pub x: Vec<f64>,
    /// Y coordinates of all points.
    pub y: Vec<f64>,
    /// Z coordinates of all points.
    pub z: Vec<f64>,
}

impl Channels {
    /// Creates channels from coordinate vectors.
    ///
    /// Returns `None` if the vectors differ in length.
    pub fn from_xyz(x: Vec<f64>, y: Vec<f64>, z: Vec<f64>) -> Option<Self> {
        if x.len() != y.len() || y.len() != z.len() {
            return None;
        }
        Some(Self { x, y, z })
    }

    /// Creates empty channels with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            x: Vec::with_capacity(capacity),
            y: Vec::with_capacity(capacity),
            z: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Point at `index`, assembled from the three channels.
    pub fn point(&self, index: usize) -> Option<Point3D> {
        Some(Point3D::new(
            *self.x.get(index)?,
            *self.y.get(index)?,
            *self.z.get(index)?,
        ))
    }

    /// Reassembles the channels into an ordered point cloud.
    pub fn to_cloud(&self) -> PointCloud {
        self.x
            .iter()
            .zip(&self.y)
            .zip(&self.z)
            .map(|((&x, &y), &z)| Point3D::new(x, y, z))
            .collect()
    }

    /// Channels as `[x, y, z]` slices, in axis order.
    pub fn as_array(&self) -> [&[f64]; 3] {
        [self.x.as_slice(), self.y.as_slice(), self.z.as_slice()]
    }
}

/// Split an ordered cloud into x, y and z channels.
///
/// Pure reshape: no filtering and no reordering.
pub fn split_channels(cloud: &PointCloud) -> Channels {
    let mut channels = Channels::with_capacity(cloud.len());
    for p in cloud {
        channels.x.push(p.x);
        channels.y.push(p.y);
        channels.z.push(p.z);
    }
    channels
}

/// Keep every `interval`-th point, starting with the first.
///
/// Used to thin the sorted cloud for display and export. An interval of
/// 0 or 1 returns a copy of the input.
pub fn downsample(cloud: &PointCloud, interval: usize) -> PointCloud {
    if interval <= 1 {
        return cloud.clone();
    }

    cloud.iter().step_by(interval).copied().collect()
}

/// Stride needed to bring `len` samples down to at most `max_points`.
pub fn stride_for(len: usize, max_points: usize) -> usize {
    if max_points == 0 || len <= max_points {
        1
    } else {
        (len + max_points - 1) / max_points
    }
}
