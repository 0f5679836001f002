//! Angular ordering of a point cloud around an origin.
//!
//! Points are projected onto the XY plane and ordered by the clockwise angle
//! between the reference direction and the vector from the origin, with the
//! distance from the origin as tie-break. The origin itself has no direction
//! and is given the angle `-PI`, so it always leads the traversal.

use std::cmp::Ordering;
use std::f64::consts::PI;

use rayon::prelude::*;
use thiserror::Error;

use crate::core::loaders::{Point3D, PointCloud};

/// Errors that can occur while preparing or running the angular sort.
#[derive(Debug, Error)]
pub enum SortingError {
    #[error("Cannot select an origin from an empty point cloud")]
    EmptyCloud,

    #[error("Reference vector must be finite and non-zero, got ({x}, {y})")]
    InvalidReference { x: f64, y: f64 },
}

/// Reference point of the angular sort, taken from the first loaded point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Origin {
    pub x: f64,
    pub y: f64,
}

impl Origin {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Origin at the XY projection of the cloud's first point.
    pub fn from_cloud(cloud: &PointCloud) -> Result<Self, SortingError> {
        cloud
            .first()
            .map(|p| Self::new(p.x, p.y))
            .ok_or(SortingError::EmptyCloud)
    }
}

/// Direction of zero angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceVector {
    x: f64,
    y: f64,
}

impl ReferenceVector {
    pub fn new(x: f64, y: f64) -> Result<Self, SortingError> {
        if !(x.is_finite() && y.is_finite()) || x.hypot(y) == 0.0 {
            return Err(SortingError::InvalidReference { x, y });
        }
        Ok(Self { x, y })
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.y
    }
}

impl Default for ReferenceVector {
    fn default() -> Self {
        Self { x: 0.0, y: 1.0 }
    }
}

impl TryFrom<[f64; 2]> for ReferenceVector {
    type Error = SortingError;

    fn try_from(v: [f64; 2]) -> Result<Self, Self::Error> {
        Self::new(v[0], v[1])
    }
}

/// Sort key of a single point: angle first, distance second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngularKey {
    /// Clockwise angle in `[0, 2*PI)`, or `-PI` for the origin itself
    pub angle: f64,
    /// Distance from the origin in the XY plane
    pub distance: f64,
}

impl AngularKey {
    /// Total order on (angle, distance).
    #[inline]
    pub fn cmp_total(&self, other: &Self) -> Ordering {
        self.angle
            .total_cmp(&other.angle)
            .then_with(|| self.distance.total_cmp(&other.distance))
    }
}

/// Compute the sort key of `point` relative to `origin` and `reference`.
pub fn angular_key(point: &Point3D, origin: Origin, reference: ReferenceVector) -> AngularKey {
    let vx = point.x - origin.x;
    let vy = point.y - origin.y;
    let length = vx.hypot(vy);

    if length == 0.0 {
        return AngularKey {
            angle: -PI,
            distance: 0.0,
        };
    }

    let nx = vx / length;
    let ny = vy / length;
    let dot = nx * reference.x + ny * reference.y;
    let cross = reference.y * nx - reference.x * ny;

    let mut angle = cross.atan2(dot);
    if angle < 0.0 {
        angle += 2.0 * PI;
    } else if angle == 0.0 {
        // atan2 may yield -0.0, which total_cmp orders before +0.0
        angle = 0.0;
    }

    AngularKey {
        angle,
        distance: length,
    }
}

/// Order `cloud` by (angle, distance) around `origin`.
///
/// The sort is stable, so points with identical keys (for example several
/// copies of the origin, or points differing only in z) keep their input
/// order. Empty input yields an empty cloud.
pub fn angular_sort(cloud: &PointCloud, origin: Origin, reference: ReferenceVector) -> PointCloud {
    let keys: Vec<AngularKey> = cloud
        .as_slice()
        .par_iter()
        .map(|p| angular_key(p, origin, reference))
        .collect();

    let mut order: Vec<usize> = (0..cloud.len()).collect();
    order.sort_by(|&a, &b| keys[a].cmp_total(&keys[b]));

    order.into_iter().map(|i| cloud[i]).collect()
}

/// Select the origin from the cloud's first point and sort around it.
pub fn sort_from_first_point(
    cloud: &PointCloud,
    reference: ReferenceVector,
) -> Result<(Origin, PointCloud), SortingError> {
    let origin = Origin::from_cloud(cloud)?;
    Ok((origin, angular_sort(cloud, origin, reference)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn cloud(points: &[(f64, f64, f64)]) -> PointCloud {
        points.iter().map(|&p| Point3D::from(p)).collect()
    }

    #[test]
    fn test_end_to_end_example() {
        let raw = cloud(&[(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (0.0, 1.0, 0.0), (-1.0, 0.0, 0.0)]);
        let (origin, sorted) = sort_from_first_point(&raw, ReferenceVector::default()).unwrap();

        assert_eq!(origin, Origin::new(0.0, 0.0));
        assert_eq!(
            sorted,
            cloud(&[(0.0, 0.0, 0.0), (0.0, 1.0, 0.0), (1.0, 0.0, 0.0), (-1.0, 0.0, 0.0)])
        );
    }

    #[test]
    fn test_angle_values() {
        let origin = Origin::new(0.0, 0.0);
        let reference = ReferenceVector::default();

        let at_origin = angular_key(&Point3D::new(0.0, 0.0, 9.0), origin, reference);
        assert_eq!(at_origin.angle, -PI);
        assert_eq!(at_origin.distance, 0.0);

        let up = angular_key(&Point3D::new(0.0, 2.0, 0.0), origin, reference);
        assert_relative_eq!(up.angle, 0.0);
        assert_relative_eq!(up.distance, 2.0);

        let right = angular_key(&Point3D::new(1.0, 0.0, 0.0), origin, reference);
        assert_relative_eq!(right.angle, FRAC_PI_2);

        let left = angular_key(&Point3D::new(-1.0, 0.0, 0.0), origin, reference);
        assert_relative_eq!(left.angle, 3.0 * FRAC_PI_2);
    }

    #[test]
    fn test_origin_sorts_before_zero_angle() {
        let raw = cloud(&[(0.0, 1.0, 0.0), (0.0, 0.0, 0.0)]);
        let sorted = angular_sort(&raw, Origin::new(0.0, 0.0), ReferenceVector::default());
        assert_eq!(sorted[0], Point3D::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_distance_breaks_ties() {
        let raw = cloud(&[(0.0, 3.0, 0.0), (0.0, 1.0, 0.0), (0.0, 2.0, 0.0)]);
        let sorted = angular_sort(&raw, Origin::new(0.0, 0.0), ReferenceVector::default());
        let ys: Vec<f64> = sorted.iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_equal_keys_keep_input_order() {
        let raw = cloud(&[(0.0, 0.0, 1.0), (1.0, 1.0, 5.0), (0.0, 0.0, 2.0), (1.0, 1.0, 4.0)]);
        let sorted = angular_sort(&raw, Origin::new(0.0, 0.0), ReferenceVector::default());
        let zs: Vec<f64> = sorted.iter().map(|p| p.z).collect();
        assert_eq!(zs, vec![1.0, 2.0, 5.0, 4.0]);
    }

    #[test]
    fn test_sorted_is_monotonic_permutation() {
        let raw: PointCloud = (0..500)
            .map(|i| {
                let t = i as f64 * 0.731;
                Point3D::new(t.cos() * (1.0 + (i % 7) as f64), t.sin() * 2.0, i as f64)
            })
            .collect();
        let origin = Origin::from_cloud(&raw).unwrap();
        let reference = ReferenceVector::new(0.3, 0.8).unwrap();

        let sorted = angular_sort(&raw, origin, reference);
        assert_eq!(sorted.len(), raw.len());

        for pair in sorted.as_slice().windows(2) {
            let a = angular_key(&pair[0], origin, reference);
            let b = angular_key(&pair[1], origin, reference);
            assert!(a.angle <= b.angle);
            if a.angle == b.angle {
                assert!(a.distance <= b.distance);
            }
        }

        // z is unique per input point, so sorting z recovers the multiset check
        let mut zs: Vec<f64> = sorted.iter().map(|p| p.z).collect();
        zs.sort_by(|a, b| a.total_cmp(b));
        let expected: Vec<f64> = (0..500).map(|i| i as f64).collect();
        assert_eq!(zs, expected);
    }

    #[test]
    fn test_sort_is_deterministic() {
        let raw: PointCloud = (0..100)
            .map(|i| Point3D::new(((i * 37) % 11) as f64 - 5.0, ((i * 13) % 7) as f64 - 3.0, 0.0))
            .collect();
        let origin = Origin::new(0.5, 0.5);
        let a = angular_sort(&raw, origin, ReferenceVector::default());
        let b = angular_sort(&raw, origin, ReferenceVector::default());
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_cloud() {
        let empty = PointCloud::new();
        assert!(matches!(Origin::from_cloud(&empty), Err(SortingError::EmptyCloud)));
        assert!(angular_sort(&empty, Origin::new(0.0, 0.0), ReferenceVector::default()).is_empty());
    }

    #[test]
    fn test_invalid_reference() {
        assert!(ReferenceVector::new(0.0, 0.0).is_err());
        assert!(ReferenceVector::new(f64::NAN, 1.0).is_err());
        assert!(ReferenceVector::try_from([1.0, 0.0]).is_ok());
    }
}
