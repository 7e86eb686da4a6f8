use bevlens_3d::{
    boxes::{BoxError, BoxMode},
    io::obj::ObjError,
    pointcloud::PointCloudError,
    transforms::TransformError,
};

use crate::{config::ConfigError, sample::SampleError};

/// An error type for the visualization crate.
#[derive(thiserror::Error, Debug)]
pub enum VizError {
    /// Error from an image buffer operation.
    #[error(transparent)]
    Image(#[from] bevlens_image::ImageError),

    /// Error reading or writing an image file.
    #[error(transparent)]
    Io(#[from] bevlens_io::IoError),

    /// Error writing a mesh file.
    #[error(transparent)]
    Obj(#[from] ObjError),

    /// Error composing a projection.
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// Error building boxes.
    #[error(transparent)]
    Box(#[from] BoxError),

    /// Error building a point cloud.
    #[error(transparent)]
    PointCloud(#[from] PointCloudError),

    /// Error loading a sample.
    #[error(transparent)]
    Sample(#[from] SampleError),

    /// Error loading the configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Error creating an output directory.
    #[error("Failed to manipulate the file. {0}")]
    FileError(#[from] std::io::Error),

    /// The boxes use a different coordinate mode than the painter.
    #[error("Boxes are in {0} coordinates but the painter expects {1}")]
    BoxModeMismatch(BoxMode, BoxMode),

    /// A segmentation label has no palette entry.
    #[error("Label {0} is outside the palette of {1} colors")]
    LabelOutOfPalette(usize, usize),

    /// Per-point labels do not match the number of points.
    #[error("Expected {0} per-point labels, got {1}")]
    LabelCountMismatch(usize, usize),

    /// The display backend failed.
    #[error("Display sink error: {0}")]
    Sink(String),
}
