use crate::{Image, ImageError};

/// Convert a floating point image in the `[0, 255]` range to `u8`, saturating out of
/// range values and rounding to the nearest integer.
///
/// Tensor pipelines often hand over decoded camera images as `f32` planes; this is the
/// step that makes them drawable.
pub fn saturate_to_u8<const C: usize>(src: &Image<f32, C>) -> Result<Image<u8, C>, ImageError> {
    let data = src
        .as_slice()
        .iter()
        .map(|&v| if v.is_nan() { 0 } else { v.round().clamp(0.0, 255.0) as u8 })
        .collect();
    Image::new(src.size(), data)
}
