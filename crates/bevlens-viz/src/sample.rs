use std::path::{Path, PathBuf};

use bevlens_3d::{
    boxes::{BoxError, BoxMode, BoxOrigin, Boxes3d},
    pointcloud::{PointCloud, PointCloudError},
    projection::ProjectionMatrix,
    transforms::{compose_lidar_to_image, Extrinsic, ImageAugmentation, Intrinsic, SceneAugmentation},
};
use bevlens_image::{ops::saturate_to_u8, Image, ImageError, ImageSize};
use bevlens_io::{png::read_image_png_rgb8, IoError};
use serde::{de::DeserializeOwned, Deserialize};

use crate::layout::CAMERA_NAMES;

/// Error types for loading detection samples.
#[derive(thiserror::Error, Debug)]
pub enum SampleError {
    /// Error reading the sample file.
    #[error("Failed to read sample file. {0}")]
    FileError(#[from] std::io::Error),

    /// Error parsing the sample.
    #[error("Failed to parse sample. {0}")]
    ParseError(#[from] serde_json::Error),

    /// `img_inputs` has neither 7 nor 8 entries.
    #[error("img_inputs has {0} entries, expected 7 or 8")]
    ImgInputsArity(usize),

    /// A per-camera input does not have one entry per camera.
    #[error("Expected {0} {1} (one per camera), got {2}")]
    CameraCountMismatch(usize, &'static str, usize),

    /// A matrix has an unsupported shape.
    #[error("Matrix {0} has shape {1}x{2}")]
    InvalidMatrixShape(&'static str, usize, usize),

    /// An image tensor is not shaped (3, height, width).
    #[error("Image tensor has shape {0:?}, expected [3, height, width]")]
    InvalidTensorShape(Vec<usize>),

    /// Error building an image buffer.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Error reading an image file.
    #[error(transparent)]
    ImageIo(#[from] IoError),

    /// Error building the point cloud.
    #[error(transparent)]
    PointCloud(#[from] PointCloudError),

    /// Error building the boxes.
    #[error(transparent)]
    Box(#[from] BoxError),
}

/// Where a camera image comes from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ImageSource {
    /// A PNG file, relative paths resolved against the sample file's directory.
    Path(PathBuf),
    /// A channel-first float tensor with values in `[0, 255]`.
    Tensor {
        /// Tensor shape, `[3, height, width]`.
        shape: Vec<usize>,
        /// Row-major tensor values.
        data: Vec<f32>,
    },
}

impl ImageSource {
    /// Decode the image as RGB8.
    pub fn load(&self, base_dir: &Path) -> Result<Image<u8, 3>, SampleError> {
        match self {
            ImageSource::Path(path) => Ok(read_image_png_rgb8(base_dir.join(path))?),
            ImageSource::Tensor { shape, data } => {
                let &[3, height, width] = shape.as_slice() else {
                    return Err(SampleError::InvalidTensorShape(shape.clone()));
                };
                let planar = Image::<f32, 3>::from_chw(ImageSize { width, height }, data)?;
                Ok(saturate_to_u8(&planar)?)
            }
        }
    }
}

/// Channel order of the stored display images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorOrder {
    /// Red first.
    #[default]
    Rgb,
    /// Blue first, as written by OpenCV-based pipelines.
    Bgr,
}

/// The camera inputs of a BEVDet-style sample.
///
/// Serialized as a 7 or 8 element array
/// `(imgs, rots, trans, intrins, post_rots, post_trans, bda_rot[, img_feature])`; the
/// trailing image feature entry is ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct ImgInputs {
    /// Network input images, possibly empty when display images are given separately.
    pub images: Vec<ImageSource>,
    /// LiDAR to camera rigid transforms, one per camera.
    pub extrinsics: Vec<Extrinsic>,
    /// Camera matrices, one per camera.
    pub intrinsics: Vec<Intrinsic>,
    /// Image augmentations, one per camera.
    pub image_augs: Vec<ImageAugmentation>,
    /// Scene augmentation shared by all cameras.
    pub scene_aug: SceneAugmentation,
}

fn entry<T: DeserializeOwned>(value: &serde_json::Value) -> Result<T, SampleError> {
    Ok(T::deserialize(value)?)
}

fn intrinsic_from_rows(rows: &[Vec<f64>]) -> Result<Intrinsic, SampleError> {
    let cols = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|r| r.len() != cols) {
        return Err(SampleError::InvalidMatrixShape("intrins", rows.len(), cols));
    }
    match (rows.len(), cols) {
        (3, 3) => Ok(Intrinsic::from_mat3(std::array::from_fn(|i| {
            std::array::from_fn(|j| rows[i][j])
        }))),
        (4, 4) => Ok(Intrinsic::from_mat4(std::array::from_fn(|i| {
            std::array::from_fn(|j| rows[i][j])
        }))),
        (r, c) => Err(SampleError::InvalidMatrixShape("intrins", r, c)),
    }
}

impl ImgInputs {
    /// Parse the raw `img_inputs` entries.
    pub fn from_values(values: &[serde_json::Value]) -> Result<Self, SampleError> {
        let [imgs, rots, trans, intrins, post_rots, post_trans, bda_rot, ..] = values else {
            return Err(SampleError::ImgInputsArity(values.len()));
        };
        if values.len() > 8 {
            return Err(SampleError::ImgInputsArity(values.len()));
        }

        let rots: Vec<[[f64; 3]; 3]> = entry(rots)?;
        let num_cams = rots.len();
        let check = |name: &'static str, len: usize| {
            if len == num_cams {
                Ok(())
            } else {
                Err(SampleError::CameraCountMismatch(num_cams, name, len))
            }
        };

        let images: Option<Vec<ImageSource>> = entry(imgs)?;
        let images = images.unwrap_or_default();
        if !images.is_empty() {
            check("imgs", images.len())?;
        }

        let trans: Vec<[f64; 3]> = entry(trans)?;
        check("trans", trans.len())?;
        let intrins: Vec<Vec<Vec<f64>>> = entry(intrins)?;
        check("intrins", intrins.len())?;
        let post_rots: Vec<[[f64; 3]; 3]> = entry(post_rots)?;
        check("post_rots", post_rots.len())?;
        let post_trans: Vec<[f64; 3]> = entry(post_trans)?;
        check("post_trans", post_trans.len())?;
        let bda_rot: [[f64; 3]; 3] = entry(bda_rot)?;

        Ok(Self {
            images,
            extrinsics: rots
                .iter()
                .zip(&trans)
                .map(|(r, t)| Extrinsic::new(*r, *t))
                .collect(),
            intrinsics: intrins
                .iter()
                .map(|k| intrinsic_from_rows(k))
                .collect::<Result<_, _>>()?,
            image_augs: post_rots
                .iter()
                .zip(&post_trans)
                .map(|(r, t)| ImageAugmentation::from_post_rot_trans(*r, *t))
                .collect(),
            scene_aug: SceneAugmentation::new(bda_rot),
        })
    }

    /// Number of cameras.
    pub fn num_cameras(&self) -> usize {
        self.extrinsics.len()
    }
}

#[derive(Deserialize)]
struct PointsRecord {
    dim: usize,
    data: Vec<f64>,
}

#[derive(Deserialize)]
struct RawSample {
    sample_idx: String,
    #[serde(default)]
    box_mode: BoxMode,
    #[serde(default)]
    box_origin: BoxOrigin,
    #[serde(default)]
    color_order: ColorOrder,
    points: Option<PointsRecord>,
    gt_boxes_3d: Option<Vec<Vec<f64>>>,
    gt_labels_3d: Option<Vec<usize>>,
    pred_boxes_3d: Option<Vec<Vec<f64>>>,
    pred_scores_3d: Option<Vec<f64>>,
    pred_labels_3d: Option<Vec<usize>>,
    camera_names: Option<Vec<String>>,
    img_inputs: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    raw_img: Vec<ImageSource>,
    #[serde(default)]
    canvas: Vec<ImageSource>,
}

fn build_boxes(
    rows: Option<Vec<Vec<f64>>>,
    labels: Option<Vec<usize>>,
    scores: Option<Vec<f64>>,
    mode: BoxMode,
    origin: BoxOrigin,
) -> Result<Option<Boxes3d>, BoxError> {
    let Some(rows) = rows else {
        return Ok(None);
    };
    let mut boxes = Boxes3d::from_rows(&rows, mode, origin)?;
    if let Some(labels) = labels {
        boxes = boxes.with_labels(labels)?;
    }
    if let Some(scores) = scores {
        boxes = boxes.with_scores(scores)?;
    }
    Ok(Some(boxes))
}

/// One camera ready for rendering: its display image and LiDAR to image projection.
#[derive(Debug, Clone)]
pub struct CameraView {
    /// Camera name.
    pub name: String,
    /// The image to draw on.
    pub image: Image<u8, 3>,
    /// LiDAR to pixel projection of this camera.
    pub projection: ProjectionMatrix,
}

/// A detection sample: LiDAR points, boxes and the multi-camera inputs.
///
/// The JSON form carries `sample_idx`, optional `points` (`{"dim": n, "data": [..]}`),
/// `gt_boxes_3d` / `pred_boxes_3d` rows of `(x, y, z, l, w, h, heading, ..)` with their
/// labels and scores, `img_inputs`, and the display images `canvas` and `raw_img`.
#[derive(Debug, Clone)]
pub struct SampleRecord {
    /// Sample identifier, typically the LiDAR file name.
    pub sample_idx: String,
    /// LiDAR points.
    pub points: Option<PointCloud>,
    /// Ground-truth boxes.
    pub gt_boxes: Option<Boxes3d>,
    /// Predicted boxes.
    pub pred_boxes: Option<Boxes3d>,
    /// Camera names, one per camera.
    pub camera_names: Vec<String>,
    /// Camera geometry and network inputs.
    pub img_inputs: Option<ImgInputs>,
    /// Undistorted, non-augmented images as channel-first tensors.
    pub raw_img: Vec<ImageSource>,
    /// Augmented display images.
    pub canvas: Vec<ImageSource>,
    /// Channel order of every image source.
    pub color_order: ColorOrder,
    base_dir: PathBuf,
}

impl SampleRecord {
    /// Parse a sample from JSON text; relative image paths resolve against `base_dir`.
    pub fn from_json_str(text: &str, base_dir: impl Into<PathBuf>) -> Result<Self, SampleError> {
        let raw: RawSample = serde_json::from_str(text)?;

        let points = raw
            .points
            .map(|p| PointCloud::from_rows(&p.data, p.dim))
            .transpose()?;
        let gt_boxes = build_boxes(
            raw.gt_boxes_3d,
            raw.gt_labels_3d,
            None,
            raw.box_mode,
            raw.box_origin,
        )?;
        let pred_boxes = build_boxes(
            raw.pred_boxes_3d,
            raw.pred_labels_3d,
            raw.pred_scores_3d,
            raw.box_mode,
            raw.box_origin,
        )?;
        let img_inputs = raw
            .img_inputs
            .as_deref()
            .map(ImgInputs::from_values)
            .transpose()?;

        let num_cams = img_inputs
            .as_ref()
            .map(ImgInputs::num_cameras)
            .unwrap_or(raw.canvas.len().max(raw.raw_img.len()));
        let camera_names = match raw.camera_names {
            Some(names) => {
                if names.len() != num_cams {
                    return Err(SampleError::CameraCountMismatch(
                        num_cams,
                        "camera_names",
                        names.len(),
                    ));
                }
                names
            }
            None => (0..num_cams)
                .map(|i| match CAMERA_NAMES.get(i) {
                    Some(name) => name.to_string(),
                    None => format!("camera_{i}"),
                })
                .collect(),
        };

        Ok(Self {
            sample_idx: raw.sample_idx,
            points,
            gt_boxes,
            pred_boxes,
            camera_names,
            img_inputs,
            raw_img: raw.raw_img,
            canvas: raw.canvas,
            color_order: raw.color_order,
            base_dir: base_dir.into(),
        })
    }

    /// Load a sample from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SampleError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let sample = Self::from_json_str(&text, base_dir)?;
        log::debug!(
            "loaded sample {} with {} cameras",
            sample.sample_idx,
            sample.camera_names.len()
        );
        Ok(sample)
    }

    /// The sample identifier without its file extension.
    ///
    /// ```
    /// use bevlens_viz::sample::SampleRecord;
    ///
    /// let sample = SampleRecord::from_json_str(r#"{"sample_idx": "000042.bin"}"#, ".").unwrap();
    /// assert_eq!(sample.sample_id(), "000042");
    /// ```
    pub fn sample_id(&self) -> &str {
        self.sample_idx
            .split('.')
            .next()
            .unwrap_or(&self.sample_idx)
    }

    /// Directory that relative image paths resolve against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// The display images, in camera order.
    ///
    /// `canvas` is preferred, then `raw_img`, then the network input images.
    pub fn display_images(&self) -> Result<Vec<Image<u8, 3>>, SampleError> {
        let (sources, _) = self.display_sources();
        sources
            .iter()
            .map(|src| {
                let mut img = src.load(&self.base_dir)?;
                if self.color_order == ColorOrder::Bgr {
                    img.swap_rb();
                }
                Ok(img)
            })
            .collect()
    }

    // the sources shown and whether they went through the image augmentation
    fn display_sources(&self) -> (&[ImageSource], bool) {
        if !self.canvas.is_empty() {
            (&self.canvas, true)
        } else if !self.raw_img.is_empty() {
            (&self.raw_img, false)
        } else {
            match &self.img_inputs {
                Some(inputs) => (&inputs.images, true),
                None => (&self.canvas, true),
            }
        }
    }

    /// Compose the per-camera projections and pair them with the display images.
    ///
    /// The image augmentation is part of the projection for `canvas` and network input
    /// images only; `raw_img` images are shown as captured. A singular scene augmentation skips the whole sample and a singular image
    /// augmentation skips its camera; both are logged as warnings.
    pub fn camera_views(&self) -> Result<Vec<CameraView>, SampleError> {
        let Some(inputs) = &self.img_inputs else {
            log::warn!("sample {} has no img_inputs", self.sample_idx);
            return Ok(Vec::new());
        };

        if let Err(e) = inputs.scene_aug.inverse_mat4() {
            log::warn!("skipping sample {}: {e}", self.sample_idx);
            return Ok(Vec::new());
        }

        let images = self.display_images()?;
        if images.len() != inputs.num_cameras() {
            return Err(SampleError::CameraCountMismatch(
                inputs.num_cameras(),
                "display images",
                images.len(),
            ));
        }

        let (_, augmented) = self.display_sources();
        let mut views = Vec::with_capacity(images.len());
        for (i, image) in images.into_iter().enumerate() {
            let name = self.camera_names.get(i).ok_or(SampleError::CameraCountMismatch(
                inputs.num_cameras(),
                "camera_names",
                self.camera_names.len(),
            ))?;
            let image_aug = augmented.then_some(&inputs.image_augs[i]);
            let projection = match compose_lidar_to_image(
                &inputs.extrinsics[i],
                &inputs.intrinsics[i],
                Some(&inputs.scene_aug),
                image_aug,
            ) {
                Ok(m) => m,
                Err(e) => {
                    log::warn!("skipping camera {name} of sample {}: {e}", self.sample_idx);
                    continue;
                }
            };
            views.push(CameraView {
                name: name.clone(),
                image,
                projection,
            });
        }

        Ok(views)
    }
}
