use bevlens_image::ImageSize;
use serde::{Deserialize, Serialize};

/// Camera names in the order the detection pipeline stacks them.
pub const CAMERA_NAMES: [&str; 6] = [
    "front_left_camera",
    "front_right_camera",
    "side_left_camera",
    "side_right_camera",
    "rear_left_camera",
    "rear_right_camera",
];

/// Default size of an empty mosaic slot.
pub const DEFAULT_SLOT_SIZE: ImageSize = ImageSize {
    width: 960,
    height: 540,
};

/// A camera assigned to a (row, column) slot of the mosaic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraSlot {
    /// Camera name.
    pub camera: String,
    /// Mosaic row.
    pub row: usize,
    /// Mosaic column.
    pub col: usize,
}

impl CameraSlot {
    /// Create a slot.
    pub fn new(camera: impl Into<String>, row: usize, col: usize) -> Self {
        Self {
            camera: camera.into(),
            row,
            col,
        }
    }
}

/// Static mapping from camera name to mosaic slot.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraLayout {
    slots: Vec<CameraSlot>,
    slot_size: ImageSize,
    rows: usize,
    cols: usize,
}

impl CameraLayout {
    /// Create a layout from explicit slots.
    ///
    /// When a camera name appears twice, the later slot replaces the earlier one.
    pub fn new(slots: Vec<CameraSlot>, slot_size: ImageSize) -> Self {
        let mut unique: Vec<CameraSlot> = Vec::with_capacity(slots.len());
        for slot in slots {
            match unique.iter_mut().find(|s| s.camera == slot.camera) {
                Some(existing) => {
                    log::warn!("camera {} assigned twice in the layout", slot.camera);
                    *existing = slot;
                }
                None => unique.push(slot),
            }
        }

        let rows = unique.iter().map(|s| s.row + 1).max().unwrap_or(0);
        let cols = unique.iter().map(|s| s.col + 1).max().unwrap_or(0);

        Self {
            slots: unique,
            slot_size,
            rows,
            cols,
        }
    }

    /// Front cameras on the first row, side cameras on the second.
    pub fn plus_four() -> Self {
        Self::new(
            CAMERA_NAMES[..4]
                .iter()
                .enumerate()
                .map(|(i, name)| CameraSlot::new(*name, i / 2, i % 2))
                .collect(),
            DEFAULT_SLOT_SIZE,
        )
    }

    /// [`CameraLayout::plus_four`] with the rear cameras on a third row.
    pub fn plus_six() -> Self {
        Self::new(
            CAMERA_NAMES
                .iter()
                .enumerate()
                .map(|(i, name)| CameraSlot::new(*name, i / 2, i % 2))
                .collect(),
            DEFAULT_SLOT_SIZE,
        )
    }

    /// The slot of `camera`, as (row, column).
    pub fn slot(&self, camera: &str) -> Option<(usize, usize)> {
        self.slots
            .iter()
            .find(|s| s.camera == camera)
            .map(|s| (s.row, s.col))
    }

    /// All slots.
    pub fn slots(&self) -> &[CameraSlot] {
        &self.slots
    }

    /// Size used for rows and columns holding no image.
    pub fn slot_size(&self) -> ImageSize {
        self.slot_size
    }

    /// Number of mosaic rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of mosaic columns.
    pub fn cols(&self) -> usize {
        self.cols
    }
}
