use glam::{DMat2, DMat3, DMat4, DVec2, DVec3, DVec4};

use crate::projection::ProjectionMatrix;

/// Smallest determinant magnitude accepted for an invertible augmentation.
pub const DEGENERATE_DET_EPS: f64 = 1e-12;

/// Error types for transform composition.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TransformError {
    /// The transform is singular and cannot be inverted.
    #[error("Degenerate {0} transform (determinant {1:e})")]
    Degenerate(&'static str, f64),

    /// The transform contains NaN or infinite values.
    #[error("Non-finite values in {0} transform")]
    NonFinite(&'static str),
}

fn mat3_from_rows(rows: &[[f64; 3]; 3]) -> DMat3 {
    DMat3::from_cols_array_2d(rows).transpose()
}

fn mat4_from_rows(rows: &[[f64; 4]; 4]) -> DMat4 {
    DMat4::from_cols_array_2d(rows).transpose()
}

/// Rotation about the vertical Z axis for a box heading.
///
/// The Z axis is left fixed; a heading of 0 points along +X and a heading of π/2
/// points along +Y.
///
/// Example:
///
/// ```
/// use bevlens_3d::transforms::heading_to_rotation;
///
/// let rot = heading_to_rotation(std::f64::consts::FRAC_PI_2);
/// let v = rot * glam::DVec3::X;
/// assert!((v - glam::DVec3::Y).length() < 1e-12);
/// ```
pub fn heading_to_rotation(heading: f64) -> DMat3 {
    DMat3::from_rotation_z(heading)
}

/// Rigid transform from the LiDAR frame to a camera frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extrinsic {
    rotation: DMat3,
    translation: DVec3,
}

impl Extrinsic {
    /// Create an extrinsic from a row-major rotation and a translation.
    pub fn new(rotation: [[f64; 3]; 3], translation: [f64; 3]) -> Self {
        Self {
            rotation: mat3_from_rows(&rotation),
            translation: DVec3::from_array(translation),
        }
    }

    /// The identity transform, LiDAR and camera frames coincide.
    pub fn identity() -> Self {
        Self {
            rotation: DMat3::IDENTITY,
            translation: DVec3::ZERO,
        }
    }

    /// Create an extrinsic from a row-major homogeneous 4x4 matrix.
    ///
    /// The bottom row is ignored.
    pub fn from_mat4(rows: [[f64; 4]; 4]) -> Self {
        let m = mat4_from_rows(&rows);
        Self {
            rotation: DMat3::from_mat4(m),
            translation: m.w_axis.truncate(),
        }
    }

    /// The rotation part.
    pub fn rotation(&self) -> DMat3 {
        self.rotation
    }

    /// The translation part.
    pub fn translation(&self) -> DVec3 {
        self.translation
    }

    /// Embed the rigid transform into a homogeneous 4x4 matrix.
    pub fn to_mat4(&self) -> DMat4 {
        let mut m = DMat4::from_mat3(self.rotation);
        m.w_axis = self.translation.extend(1.0);
        m
    }
}

/// Camera intrinsic projection, camera frame to homogeneous pixel coordinates.
///
/// A 3x3 matrix is padded to 4x4 with identity so that the third output row keeps the
/// camera depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intrinsic(DMat4);

impl Intrinsic {
    /// Create an intrinsic from a row-major 3x3 camera matrix.
    pub fn from_mat3(rows: [[f64; 3]; 3]) -> Self {
        Self(DMat4::from_mat3(mat3_from_rows(&rows)))
    }

    /// Create an intrinsic from a row-major 4x4 (already homogeneous) matrix.
    pub fn from_mat4(rows: [[f64; 4]; 4]) -> Self {
        Self(mat4_from_rows(&rows))
    }

    /// Create a pinhole intrinsic from focal lengths and principal point in pixels.
    pub fn from_pinhole(fx: f64, fy: f64, cx: f64, cy: f64) -> Self {
        Self::from_mat3([[fx, 0.0, cx], [0.0, fy, cy], [0.0, 0.0, 1.0]])
    }

    /// The identity intrinsic.
    pub fn identity() -> Self {
        Self(DMat4::IDENTITY)
    }

    /// The homogeneous 4x4 matrix.
    pub fn to_mat4(&self) -> DMat4 {
        self.0
    }
}

/// Scene-level bird's-eye-view augmentation applied to points and boxes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneAugmentation(DMat3);

impl SceneAugmentation {
    /// Create the augmentation from a row-major 3x3 matrix.
    pub fn new(rows: [[f64; 3]; 3]) -> Self {
        Self(mat3_from_rows(&rows))
    }

    /// Build the rotation, scale and flip augmentation in the order the training
    /// pipeline applies it: rotate about Z, scale, then flip along x and/or y.
    pub fn from_rot_scale_flip(angle: f64, scale: f64, flip_dx: bool, flip_dy: bool) -> Self {
        let rot = DMat3::from_rotation_z(angle);
        let scale = DMat3::from_diagonal(DVec3::splat(scale));
        let flip = DMat3::from_diagonal(DVec3::new(
            if flip_dx { -1.0 } else { 1.0 },
            if flip_dy { -1.0 } else { 1.0 },
            1.0,
        ));
        Self(flip * scale * rot)
    }

    /// The 3x3 matrix.
    pub fn matrix(&self) -> DMat3 {
        self.0
    }

    /// Apply the augmentation to a point.
    pub fn apply(&self, p: [f64; 3]) -> [f64; 3] {
        (self.0 * DVec3::from_array(p)).to_array()
    }

    /// Inverse of the augmentation embedded in a homogeneous 4x4 matrix.
    pub fn inverse_mat4(&self) -> Result<DMat4, TransformError> {
        if !self.0.is_finite() {
            return Err(TransformError::NonFinite("scene augmentation"));
        }
        let det = self.0.determinant();
        if det.abs() < DEGENERATE_DET_EPS {
            return Err(TransformError::Degenerate("scene augmentation", det));
        }
        Ok(DMat4::from_mat3(self.0.inverse()))
    }
}

/// Per-camera 2D affine image augmentation (crop, resize, flip, rotate).
///
/// Maps original pixel coordinates `p` to augmented ones `A p + t`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageAugmentation {
    linear: DMat2,
    translation: DVec2,
}

impl ImageAugmentation {
    /// Create an augmentation from a row-major 2x2 linear part and a translation.
    pub fn new(linear: [[f64; 2]; 2], translation: [f64; 2]) -> Self {
        Self {
            linear: DMat2::from_cols_array_2d(&linear).transpose(),
            translation: DVec2::from_array(translation),
        }
    }

    /// Create the augmentation from the `post_rot` (3x3) and `post_tran` (3) pair produced
    /// by image augmentation pipelines. Only the planar part is used.
    pub fn from_post_rot_trans(post_rot: [[f64; 3]; 3], post_tran: [f64; 3]) -> Self {
        Self::new(
            [
                [post_rot[0][0], post_rot[0][1]],
                [post_rot[1][0], post_rot[1][1]],
            ],
            [post_tran[0], post_tran[1]],
        )
    }

    /// The identity augmentation.
    pub fn identity() -> Self {
        Self {
            linear: DMat2::IDENTITY,
            translation: DVec2::ZERO,
        }
    }

    /// Apply the augmentation to a pixel coordinate.
    pub fn apply(&self, uv: [f64; 2]) -> [f64; 2] {
        (self.linear * DVec2::from_array(uv) + self.translation).to_array()
    }

    fn check(&self) -> Result<f64, TransformError> {
        if !self.linear.is_finite() || !self.translation.is_finite() {
            return Err(TransformError::NonFinite("image augmentation"));
        }
        let det = self.linear.determinant();
        if det.abs() < DEGENERATE_DET_EPS {
            return Err(TransformError::Degenerate("image augmentation", det));
        }
        Ok(det)
    }

    /// The inverse augmentation.
    pub fn inverse(&self) -> Result<Self, TransformError> {
        self.check()?;
        let linear = self.linear.inverse();
        Ok(Self {
            linear,
            translation: -(linear * self.translation),
        })
    }

    /// Embed the affine into a 4x4 matrix acting on homogeneous pixel coordinates
    /// `(u·d, v·d, d, 1)`.
    ///
    /// The translation goes into the depth column so that it survives the perspective
    /// division: `(A (u,v) d + t d) / d = A (u,v) + t`.
    pub fn to_mat4(&self) -> DMat4 {
        let a = self.linear;
        let t = self.translation;
        DMat4::from_cols(
            DVec4::new(a.x_axis.x, a.x_axis.y, 0.0, 0.0),
            DVec4::new(a.y_axis.x, a.y_axis.y, 0.0, 0.0),
            DVec4::new(t.x, t.y, 1.0, 0.0),
            DVec4::W,
        )
    }
}

/// Compose the single LiDAR to image transform for one camera.
///
/// The result is `image_aug × intrinsic × extrinsic × inverse(scene_aug)`, mapping
/// homogeneous (augmented) LiDAR coordinates to homogeneous pixel coordinates before
/// the perspective division.
///
/// # Errors
///
/// Returns [`TransformError::Degenerate`] when one of the augmentations is singular and
/// [`TransformError::NonFinite`] when any input or the product is not finite. The caller
/// is expected to skip rendering of the affected frame.
///
/// Example:
///
/// ```
/// use bevlens_3d::transforms::{compose_lidar_to_image, Extrinsic, Intrinsic};
///
/// let proj = compose_lidar_to_image(
///     &Extrinsic::identity(),
///     &Intrinsic::from_pinhole(100.0, 100.0, 50.0, 50.0),
///     None,
///     None,
/// ).unwrap();
/// let uvd = proj.transform([0.0, 0.0, 2.0]);
/// assert_eq!(uvd, [100.0, 100.0, 2.0]);
/// ```
pub fn compose_lidar_to_image(
    extrinsic: &Extrinsic,
    intrinsic: &Intrinsic,
    scene_aug: Option<&SceneAugmentation>,
    image_aug: Option<&ImageAugmentation>,
) -> Result<ProjectionMatrix, TransformError> {
    let scene_inv = match scene_aug {
        Some(aug) => aug.inverse_mat4()?,
        None => DMat4::IDENTITY,
    };

    let post = match image_aug {
        Some(aug) => {
            aug.check()?;
            aug.to_mat4()
        }
        None => DMat4::IDENTITY,
    };

    let lidar2img = post * intrinsic.to_mat4() * extrinsic.to_mat4() * scene_inv;
    if !lidar2img.is_finite() {
        return Err(TransformError::NonFinite("lidar to image"));
    }

    Ok(ProjectionMatrix::new(lidar2img))
}
