/// Error types for point cloud construction.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PointCloudError {
    /// A point row needs at least x, y and z.
    #[error("Point dimension {0} is smaller than 3")]
    InvalidDimension(usize),

    /// The flat buffer is not a whole number of rows.
    #[error("Buffer of length {0} is not a multiple of the point dimension {1}")]
    RaggedBuffer(usize, usize),

    /// Per-point attributes do not match the number of points.
    #[error("Expected {0} per-point values, got {1}")]
    LengthMismatch(usize, usize),
}

/// A point cloud in the LiDAR frame with optional colors and extra attributes.
///
/// Rows with exactly 6 values are read as `x y z r g b`; any other row width keeps the
/// values after `x y z` as extra attributes (e.g. reflectance).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointCloud {
    // The points in the point cloud.
    points: Vec<[f64; 3]>,
    // The colors of the points.
    colors: Option<Vec<[u8; 3]>>,
    // Extra per-point scalars, row-major with `extra_dims` values per point.
    extra: Vec<f64>,
    extra_dims: usize,
}

impl PointCloud {
    /// Create a new point cloud from points and colors (optional).
    pub fn new(points: Vec<[f64; 3]>, colors: Option<Vec<[u8; 3]>>) -> Result<Self, PointCloudError> {
        if let Some(c) = colors.as_ref() {
            if c.len() != points.len() {
                return Err(PointCloudError::LengthMismatch(points.len(), c.len()));
            }
        }
        Ok(Self {
            points,
            colors,
            extra: Vec::new(),
            extra_dims: 0,
        })
    }

    /// Create a point cloud from a flat row-major buffer with `dim` values per point.
    ///
    /// Color fields are truncated to integers and saturated to `[0, 255]`.
    ///
    /// Example:
    ///
    /// ```
    /// use bevlens_3d::pointcloud::PointCloud;
    ///
    /// let cloud = PointCloud::from_rows(&[1.0, 2.0, 3.0, 0.5, 4.0, 5.0, 6.0, 0.7], 4).unwrap();
    /// assert_eq!(cloud.len(), 2);
    /// assert_eq!(cloud.extra(1), Some(&[0.7][..]));
    /// assert!(cloud.colors().is_none());
    /// ```
    pub fn from_rows(data: &[f64], dim: usize) -> Result<Self, PointCloudError> {
        if dim < 3 {
            return Err(PointCloudError::InvalidDimension(dim));
        }
        if data.len() % dim != 0 {
            return Err(PointCloudError::RaggedBuffer(data.len(), dim));
        }

        let points = data.chunks_exact(dim).map(|r| [r[0], r[1], r[2]]).collect();

        if dim == 6 {
            let colors = data
                .chunks_exact(dim)
                .map(|r| [r[3], r[4], r[5]].map(|c| c.trunc().clamp(0.0, 255.0) as u8))
                .collect();
            return Self::new(points, Some(colors));
        }

        let extra = data
            .chunks_exact(dim)
            .flat_map(|r| r[3..].iter().copied())
            .collect();
        Ok(Self {
            points,
            colors: None,
            extra,
            extra_dims: dim - 3,
        })
    }

    /// Get the number of points in the point cloud.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the point cloud is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get as reference the points in the point cloud.
    pub fn points(&self) -> &[[f64; 3]] {
        &self.points
    }

    /// Get as reference the colors of the points in the point cloud.
    pub fn colors(&self) -> Option<&[[u8; 3]]> {
        self.colors.as_deref()
    }

    /// Number of extra scalar attributes per point.
    pub fn extra_dims(&self) -> usize {
        self.extra_dims
    }

    /// Extra attributes of point `i`.
    pub fn extra(&self, i: usize) -> Option<&[f64]> {
        if self.extra_dims == 0 || i >= self.len() {
            return None;
        }
        Some(&self.extra[i * self.extra_dims..(i + 1) * self.extra_dims])
    }

    /// Replace the colors of the points.
    pub fn with_colors(mut self, colors: Vec<[u8; 3]>) -> Result<Self, PointCloudError> {
        if colors.len() != self.points.len() {
            return Err(PointCloudError::LengthMismatch(self.points.len(), colors.len()));
        }
        self.colors = Some(colors);
        Ok(self)
    }

    /// Keep the points whose mask entry is `true`.
    pub fn select(&self, mask: &[bool]) -> Result<Self, PointCloudError> {
        if mask.len() != self.len() {
            return Err(PointCloudError::LengthMismatch(self.len(), mask.len()));
        }
        let keep = |i: &usize| mask[*i];
        let idx: Vec<usize> = (0..self.len()).filter(keep).collect();

        Ok(Self {
            points: idx.iter().map(|&i| self.points[i]).collect(),
            colors: self
                .colors
                .as_ref()
                .map(|c| idx.iter().map(|&i| c[i]).collect()),
            extra: idx
                .iter()
                .flat_map(|&i| self.extra(i).unwrap_or(&[]).iter().copied())
                .collect(),
            extra_dims: self.extra_dims,
        })
    }
}
