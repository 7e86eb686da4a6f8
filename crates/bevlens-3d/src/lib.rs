#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Oriented 3D boxes and their corner conventions.
pub mod boxes;

/// I/O utilities for writing 3D data.
pub mod io;

/// Point cloud container.
pub mod pointcloud;

/// Projection of points and boxes into camera images.
pub mod projection;

/// Homogeneous transforms between LiDAR, camera and image frames.
pub mod transforms;
