use std::path::{Path, PathBuf};

use bevlens_3d::{boxes::BoxMode, projection::DEFAULT_MIN_DEPTH};
use bevlens_image::ImageSize;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    annotate::{BoxStyle, LabelStyle, Palette, PointStyle},
    layout::{CameraLayout, CameraSlot, DEFAULT_SLOT_SIZE},
};

/// Error types for configuration loading.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Error reading the config file.
    #[error("Failed to read config file. {0}")]
    FileError(#[from] std::io::Error),

    /// Error parsing the config file.
    #[error("Failed to parse config. {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Extra settings of a box pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxOverlay {
    /// Skip boxes scoring below this value; boxes without scores are kept.
    pub min_score: Option<f64>,
}

/// Extra settings of the point pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointOverlay {
    /// Cameras to draw points on; every camera when unset.
    pub cameras: Option<Vec<String>>,
}

impl PointOverlay {
    /// Whether points are drawn on `camera`.
    pub fn applies_to(&self, camera: &str) -> bool {
        self.cameras
            .as_ref()
            .is_none_or(|cams| cams.iter().any(|c| c == camera))
    }
}

/// Extra settings of the camera label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelOverlay {
    /// Append `_<sample id>` to the camera name; the rendering path decides when unset.
    pub with_sample_id: Option<bool>,
}

/// One drawing pass over a camera view; passes run in list order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Overlay {
    /// Ground-truth box wireframes.
    GtBoxes(BoxOverlay),
    /// Predicted box wireframes.
    PredBoxes(BoxOverlay),
    /// Depth-colored LiDAR points.
    Points(PointOverlay),
    /// Camera name text.
    CameraLabel(LabelOverlay),
}

/// Arrangement of camera views in the mosaic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayoutConfig {
    /// Front pair over side pair.
    #[default]
    PlusFour,
    /// Front, side and rear pairs.
    PlusSix,
    /// Explicit slots.
    Custom {
        /// Camera placements.
        slots: Vec<CameraSlot>,
        /// Width of columns without images.
        #[serde(default = "default_slot_width")]
        slot_width: usize,
        /// Height of rows without images.
        #[serde(default = "default_slot_height")]
        slot_height: usize,
    },
}

fn default_slot_width() -> usize {
    DEFAULT_SLOT_SIZE.width
}

fn default_slot_height() -> usize {
    DEFAULT_SLOT_SIZE.height
}

impl LayoutConfig {
    /// Build the layout.
    pub fn build(&self) -> CameraLayout {
        match self {
            LayoutConfig::PlusFour => CameraLayout::plus_four(),
            LayoutConfig::PlusSix => CameraLayout::plus_six(),
            LayoutConfig::Custom {
                slots,
                slot_width,
                slot_height,
            } => CameraLayout::new(
                slots.clone(),
                ImageSize {
                    width: *slot_width,
                    height: *slot_height,
                },
            ),
        }
    }
}

/// A box style as written in a config file; unset fields keep the pass default.
#[derive(Deserialize)]
struct BoxStylePatch {
    color: Option<[u8; 3]>,
    thickness: Option<usize>,
    palette: Option<Palette>,
}

impl BoxStylePatch {
    fn apply(self, base: BoxStyle) -> BoxStyle {
        BoxStyle {
            color: self.color.unwrap_or(base.color),
            thickness: self.thickness.unwrap_or(base.thickness),
            palette: self.palette.or(base.palette),
        }
    }
}

fn gt_style<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BoxStyle, D::Error> {
    Ok(BoxStylePatch::deserialize(deserializer)?.apply(BoxStyle::ground_truth()))
}

fn pred_style<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BoxStyle, D::Error> {
    Ok(BoxStylePatch::deserialize(deserializer)?.apply(BoxStyle::prediction()))
}

/// Visualization settings.
///
/// Every field has a default, so `{}` is a valid config.
///
/// Example:
///
/// ```
/// use bevlens_viz::config::{LayoutConfig, Overlay, VizConfig};
///
/// let config: VizConfig = serde_json::from_str(r#"{
///     "layout": {"type": "plus_six"},
///     "overlays": [{"type": "PredBoxes", "min_score": 0.3}, {"type": "CameraLabel"}]
/// }"#).unwrap();
///
/// assert_eq!(config.layout, LayoutConfig::PlusSix);
/// assert_eq!(config.overlays.len(), 2);
/// assert!(matches!(config.overlays[1], Overlay::CameraLabel(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VizConfig {
    /// Coordinate mode of the boxes to draw.
    pub box_mode: BoxMode,
    /// Ground-truth box style.
    #[serde(deserialize_with = "gt_style")]
    pub gt: BoxStyle,
    /// Prediction box style.
    #[serde(deserialize_with = "pred_style")]
    pub pred: BoxStyle,
    /// Point marker style.
    pub points: PointStyle,
    /// Camera label style.
    pub label: LabelStyle,
    /// Minimum depth for a point to count as in front of a camera.
    pub min_depth: f64,
    /// Mosaic layout.
    pub layout: LayoutConfig,
    /// Drawing passes, in order.
    pub overlays: Vec<Overlay>,
    /// Send rendered results to the display sink.
    pub show: bool,
    /// Directory for written files, when any.
    pub out_dir: Option<PathBuf>,
}

impl Default for VizConfig {
    fn default() -> Self {
        Self {
            box_mode: BoxMode::Lidar,
            gt: BoxStyle::ground_truth(),
            pred: BoxStyle::prediction(),
            points: PointStyle::default(),
            label: LabelStyle::default(),
            min_depth: DEFAULT_MIN_DEPTH,
            layout: LayoutConfig::default(),
            overlays: vec![
                Overlay::GtBoxes(BoxOverlay::default()),
                Overlay::PredBoxes(BoxOverlay::default()),
                Overlay::Points(PointOverlay::default()),
                Overlay::CameraLabel(LabelOverlay::default()),
            ],
            show: false,
            out_dir: None,
        }
    }
}

impl VizConfig {
    /// Load a config from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str(&text)?;
        log::debug!("loaded config from {}", path.as_ref().display());
        Ok(config)
    }
}
