//! Data loaders for point cloud CSV files.
//!
//! The input format is plain CSV with exactly three numeric fields per
//! record (`x, y, z`). A header row is only skipped when requested through
//! [`InputConfig::has_header`]. Any malformed record aborts the whole load.

use std::fs::File;
use std::io::{BufReader, Read};
use std::ops::Index;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};
use thiserror::Error;

use crate::config::{BoundingBox, InputConfig};
use crate::processors::filtering::filter_cloud;

/// Errors that can occur during file loading.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Line {line}: expected 3 fields (x, y, z), found {found}")]
    FieldCount { line: u64, found: usize },

    #[error("Line {line}: {message}")]
    Parse { line: u64, message: String },
}

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

/// A single sample in 3-D space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3D {
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Returns the coordinates as an `[x, y, z]` array.
    #[inline]
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f64; 3]> for Point3D {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<(f64, f64, f64)> for Point3D {
    fn from(v: (f64, f64, f64)) -> Self {
        Self::new(v.0, v.1, v.2)
    }
}

/// Ordered sequence of 3-D points.
///
/// The order carries meaning: insertion order for a freshly loaded cloud,
/// traversal order once it has been through the angular sort.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    points: Vec<Point3D>,
}

impl PointCloud {
    /// Creates a new empty point cloud.
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Creates a new point cloud with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    /// Creates a point cloud from existing points, keeping their order.
    pub fn from_points(points: Vec<Point3D>) -> Self {
        Self { points }
    }

    /// Returns the number of points in the cloud.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the point cloud is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Point3D> {
        self.points.get(index)
    }

    #[inline]
    pub fn first(&self) -> Option<&Point3D> {
        self.points.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point3D> {
        self.points.iter()
    }

    pub fn as_slice(&self) -> &[Point3D] {
        &self.points
    }

    /// Adds a point to the cloud.
    #[inline]
    pub fn push(&mut self, point: Point3D) {
        self.points.push(point);
    }

    pub fn into_points(self) -> Vec<Point3D> {
        self.points
    }
}

impl Index<usize> for PointCloud {
    type Output = Point3D;

    fn index(&self, index: usize) -> &Point3D {
        &self.points[index]
    }
}

impl FromIterator<Point3D> for PointCloud {
    fn from_iter<I: IntoIterator<Item = Point3D>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PointCloud {
    type Item = &'a Point3D;
    type IntoIter = std::slice::Iter<'a, Point3D>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl IntoIterator for PointCloud {
    type Item = Point3D;
    type IntoIter = std::vec::IntoIter<Point3D>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

fn parse_field(field: &str, axis: &str, line: u64) -> Result<f64> {
    field.parse::<f64>().map_err(|_| LoaderError::Parse {
        line,
        message: format!("invalid {} value: {:?}", axis, field),
    })
}

/// Parse `x, y, z` records from any reader.
///
/// Every record must hold exactly three numeric fields; the first record
/// that does not fails the whole read. Blank lines are ignored.
pub fn read_points<R: Read>(reader: R, options: &InputConfig) -> Result<Vec<Point3D>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(options.has_header)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut points = Vec::new();

    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());

        if record.len() != 3 {
            return Err(LoaderError::FieldCount {
                line,
                found: record.len(),
            });
        }

        let x = parse_field(&record[0], "x", line)?;
        let y = parse_field(&record[1], "y", line)?;
        let z = parse_field(&record[2], "z", line)?;

        points.push(Point3D::new(x, y, z));
    }

    Ok(points)
}

/// Load every point of a CSV file, in file order.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or any record is malformed.
pub fn load_points_csv<P: AsRef<Path>>(path: P, options: &InputConfig) -> Result<Vec<Point3D>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoaderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_points(BufReader::new(file), options)
}

/// Load a CSV file and keep only the points strictly inside `bounds`.
///
/// An empty result is not an error; downstream stages decide whether they
/// can work with it.
pub fn load_filtered_csv<P: AsRef<Path>>(
    path: P,
    bounds: &BoundingBox,
    options: &InputConfig,
) -> Result<PointCloud> {
    let path = path.as_ref();
    let raw = load_points_csv(path, options)?;
    let total = raw.len();
    let cloud = filter_cloud(raw, bounds);

    log::info!(
        "{}: kept {} of {} points inside bounds",
        path.display(),
        cloud.len(),
        total
    );

    Ok(cloud)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_point_cloud_operations() {
        let mut cloud = PointCloud::new();
        assert!(cloud.is_empty());
        assert_eq!(cloud.len(), 0);

        cloud.push(Point3D::new(1.0, 2.0, 3.0));
        cloud.push(Point3D::new(4.0, 5.0, 6.0));

        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud[1], Point3D::new(4.0, 5.0, 6.0));
        assert_eq!(cloud.first().map(|p| p.to_array()), Some([1.0, 2.0, 3.0]));
    }

    #[test]
    fn test_read_points_headerless() {
        let data = "0.1,0.2,0.3\n-1.5, 2 ,3e-2\n";
        let points = read_points(data.as_bytes(), &InputConfig::default()).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0], Point3D::new(0.1, 0.2, 0.3));
        assert_eq!(points[1], Point3D::new(-1.5, 2.0, 0.03));
    }

    #[test]
    fn test_read_points_with_header() {
        let data = "x,y,z\n1,2,3\n";
        let options = InputConfig { has_header: true };
        let points = read_points(data.as_bytes(), &options).unwrap();
        assert_eq!(points, vec![Point3D::new(1.0, 2.0, 3.0)]);
    }

    #[test]
    fn test_header_without_flag_is_parse_error() {
        let data = "x,y,z\n1,2,3\n";
        let err = read_points(data.as_bytes(), &InputConfig::default()).unwrap_err();
        assert!(matches!(err, LoaderError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_wrong_field_count_fails_whole_load() {
        let data = "1,2,3\n4,5\n6,7,8\n";
        let err = read_points(data.as_bytes(), &InputConfig::default()).unwrap_err();
        match err {
            LoaderError::FieldCount { line, found } => {
                assert_eq!(line, 2);
                assert_eq!(found, 2);
            }
            other => panic!("Expected FieldCount error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_field_fails() {
        let data = "1,2,3\n4,abc,6\n";
        let err = read_points(data.as_bytes(), &InputConfig::default()).unwrap_err();
        assert!(matches!(err, LoaderError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_empty_input_is_empty_cloud() {
        let points = read_points("".as_bytes(), &InputConfig::default()).unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn test_load_filtered_csv() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "0,0,0").unwrap();
        writeln!(file, "2,0,0").unwrap();
        writeln!(file, "0,0.5,0").unwrap();
        file.flush().unwrap();

        let bounds = BoundingBox::new((-1.0, 1.0), (-1.0, 1.0), (-1.0, 1.0));
        let cloud = load_filtered_csv(file.path(), &bounds, &InputConfig::default()).unwrap();

        assert_eq!(
            cloud.into_points(),
            vec![Point3D::new(0.0, 0.0, 0.0), Point3D::new(0.0, 0.5, 0.0)]
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_points_csv("/definitely/not/here.csv", &InputConfig::default()).unwrap_err();
        assert!(matches!(err, LoaderError::Io { .. }));
    }
}
