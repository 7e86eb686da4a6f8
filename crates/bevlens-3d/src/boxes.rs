use std::str::FromStr;

use glam::{DMat3, DVec3};

use crate::transforms::heading_to_rotation;

/// The 12 edges of a box as pairs of corner indices, see [`Box3d::corners`].
pub const BOX_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (0, 3),
    (0, 4),
    (1, 2),
    (1, 5),
    (3, 2),
    (3, 7),
    (4, 5),
    (4, 7),
    (2, 6),
    (5, 6),
    (6, 7),
];

// unit cube corners; bit order (x, y, z), corners 0-3 on the -x face
const UNIT_CORNERS: [[f64; 3]; 8] = [
    [0.0, 0.0, 0.0],
    [0.0, 0.0, 1.0],
    [0.0, 1.0, 1.0],
    [0.0, 1.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 0.0, 1.0],
    [1.0, 1.0, 1.0],
    [1.0, 1.0, 0.0],
];

/// Error types for box collections.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BoxError {
    /// The box coordinate mode is not one of lidar, camera or depth.
    #[error("Unsupported box mode: {0}")]
    UnsupportedMode(String),

    /// A box row does not carry the 7 required values.
    #[error("Box row has {0} values, expected at least 7")]
    InvalidRow(usize),

    /// Per-box attributes do not match the number of boxes.
    #[error("Expected {0} {1}, got {2}")]
    LengthMismatch(usize, &'static str, usize),
}

/// Coordinate system a set of boxes is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxMode {
    /// LiDAR frame: x forward, y left, z up, heading about z.
    #[default]
    Lidar,
    /// Camera frame: x right, y down, z forward, heading about y, extents (l, h, w).
    Camera,
    /// Depth frame: x right, y forward, z up, heading about z.
    Depth,
}

impl FromStr for BoxMode {
    type Err = BoxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lidar" => Ok(BoxMode::Lidar),
            "camera" => Ok(BoxMode::Camera),
            "depth" => Ok(BoxMode::Depth),
            _ => Err(BoxError::UnsupportedMode(s.to_string())),
        }
    }
}

impl std::fmt::Display for BoxMode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            BoxMode::Lidar => "lidar",
            BoxMode::Camera => "camera",
            BoxMode::Depth => "depth",
        };
        write!(f, "{name}")
    }
}

impl BoxMode {
    /// Index of the vertical axis and the extent measured along it.
    fn vertical_axis(&self) -> usize {
        match self {
            BoxMode::Lidar | BoxMode::Depth => 2,
            BoxMode::Camera => 1,
        }
    }
}

/// Vertical reference point of a box center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoxOrigin {
    /// Center of the bottom face, as produced by detection heads and datasets.
    #[default]
    BottomCenter,
    /// Geometric centroid.
    GravityCenter,
}

/// An oriented 3D box: center, extents and heading about the vertical axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Box3d {
    /// Box center (x, y, z); which point of the box depends on the [`BoxOrigin`].
    pub center: [f64; 3],
    /// Extents along the box's own x, y and z axes.
    pub extents: [f64; 3],
    /// Heading in radians, 0 along +x and π/2 along +y.
    pub heading: f64,
}

impl Box3d {
    /// Create a new box.
    pub fn new(center: [f64; 3], extents: [f64; 3], heading: f64) -> Self {
        Self {
            center,
            extents,
            heading,
        }
    }

    /// Create a box from `(x, y, z, l, w, h, heading)`.
    pub fn from_array(v: [f64; 7]) -> Self {
        Self::new([v[0], v[1], v[2]], [v[3], v[4], v[5]], v[6])
    }

    /// Create a box from a row of at least 7 values; trailing values such as velocities
    /// are ignored.
    pub fn from_slice(v: &[f64]) -> Result<Self, BoxError> {
        match v {
            [x, y, z, l, w, h, heading, ..] => Ok(Self::new([*x, *y, *z], [*l, *w, *h], *heading)),
            _ => Err(BoxError::InvalidRow(v.len())),
        }
    }

    /// The box as `(x, y, z, l, w, h, heading)`.
    pub fn to_array(&self) -> [f64; 7] {
        let [x, y, z] = self.center;
        let [l, w, h] = self.extents;
        [x, y, z, l, w, h, self.heading]
    }

    /// The 8 corners of the box.
    ///
    /// Corner `i` follows [`BOX_EDGES`]: corners 0-3 lie on the -x face of the box and
    /// 4-7 on the +x face; in LiDAR/depth mode 0, 3, 4, 7 are the bottom corners.
    pub fn corners(&self, mode: BoxMode, origin: BoxOrigin) -> [[f64; 3]; 8] {
        let extents = DVec3::from_array(self.extents);
        let center = DVec3::from_array(self.center);

        let (offset, rotation) = match mode {
            BoxMode::Lidar | BoxMode::Depth => {
                let dz = match origin {
                    BoxOrigin::BottomCenter => 0.0,
                    BoxOrigin::GravityCenter => 0.5,
                };
                (DVec3::new(0.5, 0.5, dz), heading_to_rotation(self.heading))
            }
            BoxMode::Camera => {
                // y points down, the bottom face sits at the largest y
                let dy = match origin {
                    BoxOrigin::BottomCenter => 1.0,
                    BoxOrigin::GravityCenter => 0.5,
                };
                (DVec3::new(0.5, dy, 0.5), DMat3::from_rotation_y(self.heading))
            }
        };

        UNIT_CORNERS.map(|unit| {
            let local = (DVec3::from_array(unit) - offset) * extents;
            (rotation * local + center).to_array()
        })
    }

    fn to_gravity_center(self, mode: BoxMode) -> Self {
        let axis = mode.vertical_axis();
        let mut out = self;
        match mode {
            BoxMode::Lidar | BoxMode::Depth => out.center[axis] += self.extents[axis] / 2.0,
            BoxMode::Camera => out.center[axis] -= self.extents[axis] / 2.0,
        }
        out
    }
}

/// An ordered collection of boxes with optional per-box labels and scores.
///
/// The collection records the coordinate mode and the vertical origin convention, so the
/// bottom-center to gravity-center conversion happens at most once.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Boxes3d {
    boxes: Vec<Box3d>,
    labels: Option<Vec<usize>>,
    scores: Option<Vec<f64>>,
    mode: BoxMode,
    origin: BoxOrigin,
}

impl Boxes3d {
    /// Create a collection of boxes.
    pub fn new(boxes: Vec<Box3d>, mode: BoxMode, origin: BoxOrigin) -> Self {
        Self {
            boxes,
            labels: None,
            scores: None,
            mode,
            origin,
        }
    }

    /// Create a collection from `(x, y, z, l, w, h, heading, ..)` rows.
    pub fn from_rows<R: AsRef<[f64]>>(
        rows: &[R],
        mode: BoxMode,
        origin: BoxOrigin,
    ) -> Result<Self, BoxError> {
        let boxes = rows
            .iter()
            .map(|r| Box3d::from_slice(r.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(boxes, mode, origin))
    }

    /// Attach per-box class labels.
    pub fn with_labels(mut self, labels: Vec<usize>) -> Result<Self, BoxError> {
        if labels.len() != self.boxes.len() {
            return Err(BoxError::LengthMismatch(
                self.boxes.len(),
                "labels",
                labels.len(),
            ));
        }
        self.labels = Some(labels);
        Ok(self)
    }

    /// Attach per-box confidence scores.
    pub fn with_scores(mut self, scores: Vec<f64>) -> Result<Self, BoxError> {
        if scores.len() != self.boxes.len() {
            return Err(BoxError::LengthMismatch(
                self.boxes.len(),
                "scores",
                scores.len(),
            ));
        }
        self.scores = Some(scores);
        Ok(self)
    }

    /// Number of boxes.
    #[inline]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Check if the collection is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// The boxes.
    pub fn boxes(&self) -> &[Box3d] {
        &self.boxes
    }

    /// The per-box labels, if any.
    pub fn labels(&self) -> Option<&[usize]> {
        self.labels.as_deref()
    }

    /// The per-box scores, if any.
    pub fn scores(&self) -> Option<&[f64]> {
        self.scores.as_deref()
    }

    /// The coordinate mode.
    pub fn mode(&self) -> BoxMode {
        self.mode
    }

    /// The vertical origin convention.
    pub fn origin(&self) -> BoxOrigin {
        self.origin
    }

    /// Convert bottom-center boxes to gravity-center boxes.
    ///
    /// The vertical coordinate moves by half the box height (up in LiDAR/depth frames,
    /// towards negative y in the camera frame). Boxes already at their gravity center are
    /// returned unchanged.
    pub fn into_gravity_center(mut self) -> Self {
        if self.origin == BoxOrigin::GravityCenter {
            return self;
        }
        let mode = self.mode;
        self.boxes
            .iter_mut()
            .for_each(|b| *b = b.to_gravity_center(mode));
        self.origin = BoxOrigin::GravityCenter;
        self
    }

    /// Keep the boxes with a score of at least `min_score`; collections without scores are
    /// returned unchanged.
    pub fn filter_by_score(self, min_score: f64) -> Self {
        let Some(scores) = self.scores.clone() else {
            return self;
        };
        let idx: Vec<usize> = (0..scores.len())
            .filter(|&i| scores[i] >= min_score)
            .collect();

        Self {
            boxes: idx.iter().map(|&i| self.boxes[i]).collect(),
            labels: self
                .labels
                .as_ref()
                .map(|l| idx.iter().map(|&i| l[i]).collect()),
            scores: Some(idx.iter().map(|&i| scores[i]).collect()),
            mode: self.mode,
            origin: self.origin,
        }
    }

    /// Corners of every box, in collection order.
    pub fn corners(&self) -> Vec<[[f64; 3]; 8]> {
        self.boxes
            .iter()
            .map(|b| b.corners(self.mode, self.origin))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_box_mode_from_str() {
        assert_eq!("lidar".parse::<BoxMode>(), Ok(BoxMode::Lidar));
        assert_eq!("camera".parse::<BoxMode>(), Ok(BoxMode::Camera));
        assert_eq!("depth".parse::<BoxMode>(), Ok(BoxMode::Depth));
        assert_eq!(
            "radar".parse::<BoxMode>(),
            Err(BoxError::UnsupportedMode("radar".to_string()))
        );
        assert_eq!(BoxMode::Camera.to_string(), "camera");
    }

    #[test]
    fn test_from_slice() -> Result<(), BoxError> {
        let b = Box3d::from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 0.5, 9.0, 9.0])?;
        assert_eq!(b.to_array(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 0.5]);
        assert_eq!(
            Box3d::from_slice(&[1.0, 2.0]),
            Err(BoxError::InvalidRow(2))
        );
        Ok(())
    }

    #[test]
    fn test_gravity_center_is_additive() {
        for h in [0.1, 1.0, 1.7, 3.25, 12.0] {
            let boxes = Boxes3d::new(
                vec![Box3d::new([0.0, 0.0, 0.0], [1.0, 1.0, h], 0.0)],
                BoxMode::Lidar,
                BoxOrigin::BottomCenter,
            );
            let converted = boxes.into_gravity_center();
            assert_eq!(converted.boxes()[0].center[2], h / 2.0);
            assert_eq!(converted.origin(), BoxOrigin::GravityCenter);

            // a second call does not move the boxes again
            let again = converted.clone().into_gravity_center();
            assert_eq!(again, converted);
        }
    }

    #[test]
    fn test_gravity_center_camera_moves_up() {
        let boxes = Boxes3d::new(
            vec![Box3d::new([1.0, 1.5, 10.0], [4.0, 1.6, 2.0], 0.0)],
            BoxMode::Camera,
            BoxOrigin::BottomCenter,
        )
        .into_gravity_center();
        assert_relative_eq!(boxes.boxes()[0].center[1], 0.7);
    }

    #[test]
    fn test_lidar_corners() {
        let b = Box3d::new([1.0, 2.0, 0.0], [4.0, 2.0, 1.5], 0.0);
        let c = b.corners(BoxMode::Lidar, BoxOrigin::BottomCenter);
        assert_eq!(c[0], [-1.0, 1.0, 0.0]);
        assert_eq!(c[6], [3.0, 3.0, 1.5]);

        let g = b.corners(BoxMode::Lidar, BoxOrigin::GravityCenter);
        assert_eq!(g[0], [-1.0, 1.0, -0.75]);
        assert_eq!(g[6], [3.0, 3.0, 0.75]);
    }

    #[test]
    fn test_lidar_corners_heading() {
        let b = Box3d::new([0.0, 0.0, 0.0], [4.0, 2.0, 1.0], FRAC_PI_2);
        let c = b.corners(BoxMode::Lidar, BoxOrigin::BottomCenter);
        // the long side now runs along y
        assert_relative_eq!(c[4][0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(c[4][1], 2.0, epsilon = 1e-12);
        assert_relative_eq!(c[6][0], -1.0, epsilon = 1e-12);
        assert_relative_eq!(c[6][1], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_camera_corners() {
        let b = Box3d::new([0.0, 2.0, 10.0], [4.0, 1.5, 2.0], 0.0);
        let c = b.corners(BoxMode::Camera, BoxOrigin::BottomCenter);
        // the box extends upwards (negative y) from the bottom face
        let ys: Vec<f64> = c.iter().map(|p| p[1]).collect();
        assert_relative_eq!(ys.iter().cloned().fold(f64::MIN, f64::max), 2.0);
        assert_relative_eq!(ys.iter().cloned().fold(f64::MAX, f64::min), 0.5);
        assert_eq!(c[0], [-2.0, 0.5, 9.0]);
    }

    #[test]
    fn test_edges_have_unit_length_on_cube() {
        let b = Box3d::new([3.0, -1.0, 0.0], [1.0, 1.0, 1.0], 0.7);
        let c = b.corners(BoxMode::Depth, BoxOrigin::GravityCenter);
        for (a, bb) in BOX_EDGES {
            let d = DVec3::from_array(c[a]).distance(DVec3::from_array(c[bb]));
            assert_relative_eq!(d, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_labels_length_mismatch() {
        let boxes = Boxes3d::new(vec![Box3d::default(); 2], BoxMode::Lidar, BoxOrigin::BottomCenter);
        assert_eq!(
            boxes.with_labels(vec![1]),
            Err(BoxError::LengthMismatch(2, "labels", 1))
        );
    }

    #[test]
    fn test_filter_by_score() -> Result<(), BoxError> {
        let rows = [
            [0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0],
            [1.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0],
            [2.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0],
        ];
        let boxes = Boxes3d::from_rows(&rows, BoxMode::Lidar, BoxOrigin::BottomCenter)?
            .with_labels(vec![0, 1, 2])?
            .with_scores(vec![0.9, 0.1, 0.5])?
            .filter_by_score(0.3);
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes.labels(), Some(&[0, 2][..]));
        assert_eq!(boxes.boxes()[1].center[0], 2.0);
        Ok(())
    }
}
