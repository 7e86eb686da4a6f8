use glam::{DMat4, DVec4};

use crate::boxes::BOX_EDGES;

/// Default minimum homogeneous depth for a point to be considered in front of the camera.
pub const DEFAULT_MIN_DEPTH: f64 = 1e-5;

/// A composed 4x4 transform from homogeneous 3D coordinates to homogeneous pixel
/// coordinates `(u·d, v·d, d, 1)`, before the perspective division.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionMatrix(DMat4);

impl ProjectionMatrix {
    /// Wrap a homogeneous matrix.
    pub fn new(matrix: DMat4) -> Self {
        Self(matrix)
    }

    /// Create the matrix from row-major values.
    pub fn from_rows(rows: [[f64; 4]; 4]) -> Self {
        Self(DMat4::from_cols_array_2d(&rows).transpose())
    }

    /// The identity projection.
    pub fn identity() -> Self {
        Self(DMat4::IDENTITY)
    }

    /// The wrapped matrix.
    pub fn matrix(&self) -> DMat4 {
        self.0
    }

    /// Row-major values.
    pub fn to_rows(&self) -> [[f64; 4]; 4] {
        self.0.transpose().to_cols_array_2d()
    }

    /// Transform a point into homogeneous pixel coordinates `[u·d, v·d, d]`.
    #[inline]
    pub fn transform(&self, p: [f64; 3]) -> [f64; 3] {
        let q = self.0 * DVec4::new(p[0], p[1], p[2], 1.0);
        [q.x, q.y, q.z]
    }

    /// Project a single point and decide its visibility.
    ///
    /// A point with depth at or below `bounds.min_depth` is invisible and gets a NaN
    /// pixel; it never lands on screen regardless of the pixel math.
    pub fn project_point(&self, p: [f64; 3], bounds: &ProjectionBounds) -> ProjectedPoint {
        let [x, y, depth] = self.transform(p);
        if depth.is_nan() || depth <= bounds.min_depth {
            return ProjectedPoint {
                uv: [f64::NAN, f64::NAN],
                depth,
                visible: false,
            };
        }
        let uv = [x / depth, y / depth];
        ProjectedPoint {
            uv,
            depth,
            visible: bounds.contains(uv),
        }
    }
}

/// The raster area and depth threshold used to decide visibility.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionBounds {
    /// Image width in pixels.
    pub width: f64,
    /// Image height in pixels.
    pub height: f64,
    /// Minimum depth for a point to count as in front of the camera.
    pub min_depth: f64,
}

impl ProjectionBounds {
    /// Bounds for an image of the given size with the default depth threshold.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width: width as f64,
            height: height as f64,
            min_depth: DEFAULT_MIN_DEPTH,
        }
    }

    /// Override the minimum depth.
    pub fn with_min_depth(mut self, min_depth: f64) -> Self {
        self.min_depth = min_depth;
        self
    }

    /// Whether a pixel falls inside `[0, width) x [0, height)`.
    #[inline]
    pub fn contains(&self, uv: [f64; 2]) -> bool {
        uv[0] >= 0.0 && uv[0] < self.width && uv[1] >= 0.0 && uv[1] < self.height
    }
}

/// A projected point with its pixel, depth and visibility flag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    /// Pixel coordinates, NaN when the point is behind the camera.
    pub uv: [f64; 2],
    /// Homogeneous depth before the division.
    pub depth: f64,
    /// In front of the camera and inside the image.
    pub visible: bool,
}

impl ProjectedPoint {
    /// The pixel, only when visible.
    pub fn pixel(&self) -> Option<[f64; 2]> {
        self.visible.then_some(self.uv)
    }
}

/// A box edge whose two endpoints are both visible.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedEdge {
    /// Corner indices of the edge endpoints.
    pub corners: (usize, usize),
    /// Pixel of the first endpoint.
    pub start: [f64; 2],
    /// Pixel of the second endpoint.
    pub end: [f64; 2],
}

/// Project a set of points.
///
/// Example:
///
/// ```
/// use bevlens_3d::projection::{project_points, ProjectionBounds, ProjectionMatrix};
///
/// let points = vec![[0.5, 0.5, 1.0], [0.5, 0.5, -1.0]];
/// let projected = project_points(&points, &ProjectionMatrix::identity(), &ProjectionBounds::new(1, 1));
/// assert!(projected[0].visible);
/// assert!(!projected[1].visible);
/// ```
pub fn project_points(
    points: &[[f64; 3]],
    matrix: &ProjectionMatrix,
    bounds: &ProjectionBounds,
) -> Vec<ProjectedPoint> {
    points
        .iter()
        .map(|p| matrix.project_point(*p, bounds))
        .collect()
}

/// Project the 8 corners of a box and keep the edges whose both endpoints are visible.
///
/// Edges with a single visible endpoint are dropped entirely; no partial segment is
/// clipped against the image or the camera plane.
pub fn project_box_edges(
    corners: &[[f64; 3]; 8],
    matrix: &ProjectionMatrix,
    bounds: &ProjectionBounds,
) -> Vec<ProjectedEdge> {
    let projected = corners.map(|c| matrix.project_point(c, bounds));

    BOX_EDGES
        .iter()
        .filter_map(|&(a, b)| match (projected[a].pixel(), projected[b].pixel()) {
            (Some(start), Some(end)) => Some(ProjectedEdge {
                corners: (a, b),
                start,
                end,
            }),
            _ => None,
        })
        .collect()
}
