/// An error type for the image module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when channel and shape are not valid.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when a pixel coordinate falls outside the image.
    #[error("Pixel index ({0}, {1}) out of bounds ({2}x{3})")]
    PixelIndexOutOfBounds(usize, usize, usize, usize),
}
