//! Core data types and I/O operations.

pub mod loaders;
pub mod transforms;
pub mod writers;

pub use loaders::{LoaderError, Point3D, PointCloud};
pub use transforms::Channels;
pub use writers::{write_channels_csv, write_ply, write_points_csv, WriteError};
