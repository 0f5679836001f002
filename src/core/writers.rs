//! Exporters for point sequences.
//!
//! - CSV with an `x,y,z` header and six decimals per coordinate
//! - ASCII PLY where every vertex of a series shares one RGB color
//!
//! Parent directories of the target are created on demand.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::loaders::{Point3D, PointCloud};
use super::transforms::Channels;

/// Export failures, tagged with the path involved.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("cannot create directory {}: {source}", path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot create {}: {source}", path.display())]
    CreateFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("write to {} failed: {source}", path.display())]
    WriteFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV export to {} failed: {source}", path.display())]
    CsvError {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

pub type Result<T> = std::result::Result<T, WriteError>;

/// Open `path` for buffered writing, creating missing parent directories.
fn open_output(path: &Path) -> Result<BufWriter<File>> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            fs::create_dir_all(dir).map_err(|source| WriteError::CreateDirectory {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        _ => {}
    }

    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| WriteError::CreateFile {
            path: path.to_path_buf(),
            source,
        })
}

fn write_xyz_rows<I>(path: &Path, points: I) -> Result<()>
where
    I: IntoIterator<Item = Point3D>,
{
    let mut out = csv::Writer::from_writer(open_output(path)?);
    let csv_err = |source| WriteError::CsvError {
        path: path.to_path_buf(),
        source,
    };

    out.write_record(["x", "y", "z"]).map_err(csv_err)?;
    for Point3D { x, y, z } in points {
        out.write_record([format!("{x:.6}"), format!("{y:.6}"), format!("{z:.6}")])
            .map_err(csv_err)?;
    }

    out.flush().map_err(|source| WriteError::WriteFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a point sequence to CSV, keeping the cloud's order.
///
/// # Example
///
/// ```no_run
/// use cloud_path_pipeline::core::loaders::PointCloud;
/// use cloud_path_pipeline::core::writers::write_points_csv;
/// use std::path::Path;
///
/// let cloud = PointCloud::default();
/// write_points_csv(Path::new("sorted.csv"), &cloud).unwrap();
/// ```
pub fn write_points_csv(path: &Path, cloud: &PointCloud) -> Result<()> {
    write_xyz_rows(path, cloud.iter().copied())
}

/// Write smoothed channels to CSV, one row per index.
pub fn write_channels_csv(path: &Path, channels: &Channels) -> Result<()> {
    write_xyz_rows(path, (0..channels.len()).filter_map(|i| channels.point(i)))
}

/// Write a cloud to ASCII PLY, painting every vertex with `color`.
pub fn write_ply(path: &Path, cloud: &PointCloud, color: [u8; 3]) -> Result<()> {
    let mut out = open_output(path)?;
    let io_err = |source| WriteError::WriteFile {
        path: path.to_path_buf(),
        source,
    };

    writeln!(out, "ply").map_err(io_err)?;
    writeln!(out, "format ascii 1.0").map_err(io_err)?;
    writeln!(out, "element vertex {}", cloud.len()).map_err(io_err)?;
    for axis in ["x", "y", "z"] {
        writeln!(out, "property float {axis}").map_err(io_err)?;
    }
    for channel in ["red", "green", "blue"] {
        writeln!(out, "property uchar {channel}").map_err(io_err)?;
    }
    writeln!(out, "end_header").map_err(io_err)?;

    let [r, g, b] = color;
    for p in cloud {
        writeln!(out, "{:.6} {:.6} {:.6} {r} {g} {b}", p.x, p.y, p.z).map_err(io_err)?;
    }

    out.flush().map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn triangle() -> PointCloud {
        PointCloud::from_points(vec![
            Point3D::new(1.0, 4.0, 7.0),
            Point3D::new(2.0, 5.0, 8.0),
            Point3D::new(3.0, 6.0, 9.0),
        ])
    }

    fn read_lines(path: &Path) -> Vec<String> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn points_csv_has_header_and_fixed_precision() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sorted.csv");

        write_points_csv(&path, &triangle()).unwrap();

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "x,y,z");
        assert_eq!(lines[1], "1.000000,4.000000,7.000000");
    }

    #[test]
    fn channels_csv_rows_follow_index() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("smoothed.csv");
        let channels = Channels::from_xyz(vec![0.5, 1.5], vec![2.0, 3.0], vec![-1.0, 0.0]).unwrap();

        write_channels_csv(&path, &channels).unwrap();

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], "1.500000,3.000000,0.000000");
    }

    #[test]
    fn ply_header_and_colored_vertices() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sorted.ply");

        write_ply(&path, &triangle(), [0, 0, 255]).unwrap();

        let lines = read_lines(&path);
        assert_eq!(lines[0], "ply");
        assert_eq!(lines[2], "element vertex 3");
        assert_eq!(lines[3], "property float x");
        assert_eq!(lines[8], "property uchar blue");
        assert_eq!(lines[9], "end_header");
        assert_eq!(lines[10], "1.000000 4.000000 7.000000 0 0 255");
        assert_eq!(lines.len(), 13);
    }

    #[test]
    fn nested_output_directories_are_created() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run").join("exports").join("sorted.csv");

        write_points_csv(&path, &triangle()).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn empty_cloud_writes_header_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");

        write_points_csv(&path, &PointCloud::new()).unwrap();

        assert_eq!(read_lines(&path), vec!["x,y,z".to_string()]);
    }
}
