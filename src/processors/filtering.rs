//! Bounding-box filtering of loaded points.

use crate::config::BoundingBox;
use crate::core::loaders::{Point3D, PointCloud};

impl BoundingBox {
    /// Returns true if `point` lies strictly inside the box on every axis.
    #[inline]
    pub fn contains(&self, point: &Point3D) -> bool {
        (point.x > self.x_min && point.x < self.x_max)
            && (point.y > self.y_min && point.y < self.y_max)
            && (point.z > self.z_min && point.z < self.z_max)
    }
}

/// Keep the points inside `bounds`, preserving input order.
///
/// Points with NaN coordinates never satisfy the strict comparisons and are
/// dropped.
pub fn filter_cloud<I>(points: I, bounds: &BoundingBox) -> PointCloud
where
    I: IntoIterator<Item = Point3D>,
{
    points.into_iter().filter(|p| bounds.contains(p)).collect()
}

/// Count how many points fall outside `bounds`.
pub fn count_rejected(points: &[Point3D], bounds: &BoundingBox) -> usize {
    points.iter().filter(|p| !bounds.contains(p)).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> BoundingBox {
        BoundingBox::new((-1.0, 1.0), (-1.0, 1.0), (-1.0, 1.0))
    }

    #[test]
    fn test_filter_example() {
        let raw = vec![
            Point3D::new(0.0, 0.0, 0.0),
            Point3D::new(2.0, 0.0, 0.0),
            Point3D::new(0.0, 0.5, 0.0),
        ];

        let filtered = filter_cloud(raw, &unit_box());

        assert_eq!(
            filtered.into_points(),
            vec![Point3D::new(0.0, 0.0, 0.0), Point3D::new(0.0, 0.5, 0.0)]
        );
    }

    #[test]
    fn test_bounds_are_exclusive() {
        let bounds = unit_box();
        assert!(!bounds.contains(&Point3D::new(1.0, 0.0, 0.0)));
        assert!(!bounds.contains(&Point3D::new(0.0, -1.0, 0.0)));
        assert!(!bounds.contains(&Point3D::new(0.0, 0.0, 1.0)));
        assert!(bounds.contains(&Point3D::new(0.999, -0.999, 0.0)));
    }

    #[test]
    fn test_nan_is_rejected() {
        assert!(!unit_box().contains(&Point3D::new(f64::NAN, 0.0, 0.0)));
    }

    #[test]
    fn test_filter_is_exact_subset() {
        let bounds = unit_box();
        let raw: Vec<Point3D> = (0..200)
            .map(|i| {
                let t = i as f64 * 0.137;
                Point3D::new(t.sin() * 1.5, t.cos() * 1.2, (t * 0.5).sin())
            })
            .collect();

        let filtered = filter_cloud(raw.clone(), &bounds);
        let expected: Vec<Point3D> = raw.iter().copied().filter(|p| bounds.contains(p)).collect();

        assert!(filtered.iter().all(|p| bounds.contains(p)));
        assert_eq!(filtered.as_slice(), expected.as_slice());
        assert_eq!(filtered.len() + count_rejected(&raw, &bounds), raw.len());
    }

    #[test]
    fn test_filter_all_rejected() {
        let raw = vec![Point3D::new(5.0, 5.0, 5.0)];
        assert!(filter_cloud(raw, &unit_box()).is_empty());
    }
}
