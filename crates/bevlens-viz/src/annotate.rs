use bevlens_3d::{
    boxes::{BoxMode, Boxes3d},
    pointcloud::PointCloud,
    projection::{project_box_edges, ProjectionBounds, ProjectionMatrix},
};
use bevlens_image::Image;
use bevlens_imgproc::{
    colormap::Colormap,
    draw::{draw_filled_circle, draw_line},
    text::put_text,
};
use serde::{Deserialize, Serialize};

use crate::error::VizError;

/// Default ground-truth box color (RGB).
pub const GT_COLOR: [u8; 3] = [255, 102, 61];

/// Default prediction box color (RGB).
pub const PRED_COLOR: [u8; 3] = [72, 101, 241];

/// Default camera label color (RGB).
pub const LABEL_COLOR: [u8; 3] = [255, 0, 0];

/// A list of class colors indexed by label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette(Vec<[u8; 3]>);

impl Palette {
    /// Create a palette from explicit colors.
    pub fn new(colors: Vec<[u8; 3]>) -> Self {
        Self(colors)
    }

    /// `num_classes` colors spread evenly over the hue colormap.
    pub fn from_hues(num_classes: usize) -> Self {
        let cmap = Colormap::hsv();
        let n = num_classes.max(1);
        Self(
            (0..num_classes)
                .map(|i| cmap.get((i * 255 / n) as u8))
                .collect(),
        )
    }

    /// Number of colors.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the palette has no colors.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The color of `label`, if the palette has one.
    pub fn get(&self, label: usize) -> Option<[u8; 3]> {
        self.0.get(label).copied()
    }
}

/// Line style of a box pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxStyle {
    /// Line color for every box, or for boxes whose label has no palette entry.
    pub color: [u8; 3],
    /// Line thickness in pixels.
    pub thickness: usize,
    /// Per-label colors, used when the boxes carry labels.
    pub palette: Option<Palette>,
}

impl BoxStyle {
    /// A plain style with a single color.
    pub fn with_color(color: [u8; 3]) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    /// The default ground-truth style.
    pub fn ground_truth() -> Self {
        Self::with_color(GT_COLOR)
    }

    /// The default prediction style.
    pub fn prediction() -> Self {
        Self::with_color(PRED_COLOR)
    }

    fn color_for(&self, label: Option<usize>) -> [u8; 3] {
        match (&self.palette, label) {
            (Some(palette), Some(label)) => palette.get(label).unwrap_or(self.color),
            _ => self.color,
        }
    }
}

impl Default for BoxStyle {
    fn default() -> Self {
        Self {
            color: GT_COLOR,
            thickness: 1,
            palette: None,
        }
    }
}

/// Marker style of projected points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointStyle {
    /// Marker radius in pixels.
    pub radius: i64,
    /// Points farther than this depth are not drawn.
    pub max_depth: Option<f64>,
}

impl Default for PointStyle {
    fn default() -> Self {
        Self {
            radius: 1,
            max_depth: None,
        }
    }
}

/// Placement and look of the camera label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelStyle {
    /// Baseline-left position of the text (x, y).
    pub offset: [i64; 2],
    /// Pixels per font unit.
    pub scale: usize,
    /// Text color.
    pub color: [u8; 3],
    /// Stroke width in pixels.
    pub thickness: usize,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            offset: [15, 40],
            scale: 3,
            color: LABEL_COLOR,
            thickness: 2,
        }
    }
}

// boxes and points share the same rounding so they line up on screen
#[inline]
fn nearest_pixel(uv: [f64; 2]) -> (i64, i64) {
    (uv[0].round() as i64, uv[1].round() as i64)
}

/// Draws 3D box wireframes for one box coordinate mode.
///
/// The mode is fixed at construction; boxes in another mode are rejected instead of being
/// drawn with the wrong corner convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxPainter {
    mode: BoxMode,
}

impl BoxPainter {
    /// Create a painter for boxes in `mode`.
    pub fn new(mode: BoxMode) -> Self {
        Self { mode }
    }

    /// The coordinate mode this painter draws.
    pub fn mode(&self) -> BoxMode {
        self.mode
    }

    /// Draw the visible edges of every box, in input order.
    ///
    /// # Arguments
    ///
    /// * `img` - The image to draw on.
    /// * `boxes` - The boxes, in the painter's mode.
    /// * `matrix` - The projection from the box frame to the image.
    /// * `bounds` - The image bounds and depth threshold.
    /// * `style` - Colors and line thickness.
    ///
    /// # Returns
    ///
    /// The number of edges drawn.
    pub fn draw(
        &self,
        img: &mut Image<u8, 3>,
        boxes: &Boxes3d,
        matrix: &ProjectionMatrix,
        bounds: &ProjectionBounds,
        style: &BoxStyle,
    ) -> Result<usize, VizError> {
        if boxes.mode() != self.mode {
            return Err(VizError::BoxModeMismatch(boxes.mode(), self.mode));
        }

        let mut drawn = 0;
        for (i, b) in boxes.boxes().iter().enumerate() {
            let color = style.color_for(boxes.labels().map(|l| l[i]));
            let corners = b.corners(self.mode, boxes.origin());
            for edge in project_box_edges(&corners, matrix, bounds) {
                draw_line(
                    img,
                    nearest_pixel(edge.start),
                    nearest_pixel(edge.end),
                    color,
                    style.thickness,
                );
                drawn += 1;
            }
        }

        Ok(drawn)
    }
}

/// Draw the visible points as filled markers colored by depth.
///
/// # Returns
///
/// The number of points drawn.
pub fn draw_points(
    img: &mut Image<u8, 3>,
    cloud: &PointCloud,
    matrix: &ProjectionMatrix,
    bounds: &ProjectionBounds,
    style: &PointStyle,
    cmap: &Colormap,
) -> usize {
    let mut drawn = 0;
    for p in cloud.points() {
        let projected = matrix.project_point(*p, bounds);
        let Some([u, v]) = projected.pixel() else {
            continue;
        };
        if style.max_depth.is_some_and(|d| projected.depth > d) {
            continue;
        }
        draw_filled_circle(
            img,
            nearest_pixel([u, v]),
            style.radius,
            cmap.depth_color(projected.depth),
        );
        drawn += 1;
    }
    drawn
}

/// Draw `text` at the label offset.
pub fn draw_label(img: &mut Image<u8, 3>, text: &str, style: &LabelStyle) {
    put_text(
        img,
        text,
        (style.offset[0], style.offset[1]),
        style.scale,
        style.color,
        style.thickness,
    );
}
