use crate::error::ImageError;

/// Image size in pixels
///
/// A struct to represent the size of an image in pixels.
///
/// # Examples
///
/// ```
/// use bevlens_image::ImageSize;
///
/// let image_size = ImageSize {
///   width: 960,
///   height: 540,
/// };
///
/// assert_eq!(image_size.width, 960);
/// assert_eq!(image_size.height, 540);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ImageSize {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
}

impl ImageSize {
    /// Number of pixels covered by this size.
    pub fn area(&self) -> usize {
        self.width * self.height
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ImageSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

impl From<[usize; 2]> for ImageSize {
    fn from(size: [usize; 2]) -> Self {
        ImageSize {
            width: size[0],
            height: size[1],
        }
    }
}

impl From<ImageSize> for [u32; 2] {
    fn from(size: ImageSize) -> Self {
        [size.width as u32, size.height as u32]
    }
}

/// Represents an image with interleaved pixel data.
///
/// The pixels are stored row-major with shape (H, W, C), where H is the height of the
/// image, W the width and C the number of channels. The buffer is owned by the image;
/// drawing stages borrow it mutably for the duration of a call.
#[derive(Clone, Debug, PartialEq)]
pub struct Image<T, const CHANNELS: usize> {
    size: ImageSize,
    data: Vec<T>,
}

impl<T, const CHANNELS: usize> Image<T, CHANNELS> {
    /// Create a new image from pixel data.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the image in pixels.
    /// * `data` - The pixel data of the image, interleaved (H, W, C).
    ///
    /// # Errors
    ///
    /// If the length of the pixel data does not match the image size, an error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use bevlens_image::{Image, ImageSize};
    ///
    /// let image = Image::<u8, 3>::new(
    ///     ImageSize {
    ///         width: 10,
    ///         height: 20,
    ///     },
    ///     vec![0u8; 10 * 20 * 3],
    /// ).unwrap();
    ///
    /// assert_eq!(image.size().width, 10);
    /// assert_eq!(image.size().height, 20);
    /// assert_eq!(image.num_channels(), 3);
    /// ```
    pub fn new(size: ImageSize, data: Vec<T>) -> Result<Self, ImageError> {
        if data.len() != size.area() * CHANNELS {
            return Err(ImageError::InvalidChannelShape(
                data.len(),
                size.area() * CHANNELS,
            ));
        }

        Ok(Self { size, data })
    }

    /// Create a new image with the given size filled with a single value.
    ///
    /// # Examples
    ///
    /// ```
    /// use bevlens_image::{Image, ImageSize};
    ///
    /// let image = Image::<u8, 3>::from_size_val(
    ///     ImageSize { width: 10, height: 20 },
    ///     0u8,
    /// ).unwrap();
    ///
    /// assert_eq!(image.as_slice().len(), 10 * 20 * 3);
    /// ```
    pub fn from_size_val(size: ImageSize, val: T) -> Result<Self, ImageError>
    where
        T: Clone,
    {
        Image::new(size, vec![val; size.area() * CHANNELS])
    }

    /// Create an image from planar (C, H, W) data, as produced by tensor pipelines.
    ///
    /// The planes are interleaved into the (H, W, C) layout used by the rest of the crate.
    ///
    /// # Examples
    ///
    /// ```
    /// use bevlens_image::{Image, ImageSize};
    ///
    /// // two pixels, planes R = [1, 2], G = [3, 4], B = [5, 6]
    /// let image = Image::<u8, 3>::from_chw(
    ///     ImageSize { width: 2, height: 1 },
    ///     &[1, 2, 3, 4, 5, 6],
    /// ).unwrap();
    ///
    /// assert_eq!(image.as_slice(), &[1, 3, 5, 2, 4, 6]);
    /// ```
    pub fn from_chw(size: ImageSize, planes: &[T]) -> Result<Self, ImageError>
    where
        T: Copy,
    {
        let plane_len = size.area();
        if planes.len() != plane_len * CHANNELS {
            return Err(ImageError::InvalidChannelShape(
                planes.len(),
                plane_len * CHANNELS,
            ));
        }

        let data = (0..plane_len)
            .flat_map(|i| (0..CHANNELS).map(move |c| planes[c * plane_len + i]))
            .collect();

        Image::new(size, data)
    }

    /// Get the size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Get the number of columns of the image.
    pub fn cols(&self) -> usize {
        self.size.width
    }

    /// Get the number of rows of the image.
    pub fn rows(&self) -> usize {
        self.size.height
    }

    /// Get the width of the image in pixels.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Get the height of the image in pixels.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Get the number of channels in the image.
    pub fn num_channels(&self) -> usize {
        CHANNELS
    }

    /// Get the pixel data as an interleaved slice.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Get the pixel data as a mutable interleaved slice.
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Get all channels of the pixel at the given coordinates.
    pub fn pixel(&self, x: usize, y: usize) -> Result<&[T], ImageError> {
        if x >= self.width() || y >= self.height() {
            return Err(ImageError::PixelIndexOutOfBounds(
                x,
                y,
                self.width(),
                self.height(),
            ));
        }
        let start = (y * self.width() + x) * CHANNELS;
        Ok(&self.data[start..start + CHANNELS])
    }
}

impl<T: Copy> Image<T, 3> {
    /// Swap the first and last channel, e.g. BGR to RGB.
    pub fn swap_rb(&mut self) {
        self.data.chunks_exact_mut(3).for_each(|px| px.swap(0, 2));
    }
}

#[cfg(test)]
mod tests {
    use crate::image::{Image, ImageError, ImageSize};

    #[test]
    fn image_size() {
        let image_size = ImageSize {
            width: 10,
            height: 20,
        };
        assert_eq!(image_size.width, 10);
        assert_eq!(image_size.height, 20);
        assert_eq!(image_size.area(), 200);
    }

    #[test]
    fn image_smoke() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::new(
            ImageSize {
                width: 10,
                height: 20,
            },
            vec![0u8; 10 * 20 * 3],
        )?;
        assert_eq!(image.size().width, 10);
        assert_eq!(image.size().height, 20);
        assert_eq!(image.num_channels(), 3);

        Ok(())
    }

    #[test]
    fn image_wrong_length() {
        let res = Image::<u8, 3>::new(
            ImageSize {
                width: 2,
                height: 2,
            },
            vec![0u8; 5],
        );
        assert_eq!(res, Err(ImageError::InvalidChannelShape(5, 12)));
    }

    #[test]
    fn image_from_chw() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let planes = vec![
            // R
            10u8, 11,
            12, 13,
            // G
            20, 21,
            22, 23,
            // B
            30, 31,
            32, 33,
        ];
        let image = Image::<u8, 3>::from_chw(
            ImageSize {
                width: 2,
                height: 2,
            },
            &planes,
        )?;
        assert_eq!(image.pixel(1, 0)?, &[11, 21, 31]);
        assert_eq!(image.pixel(0, 1)?, &[12, 22, 32]);
        assert_eq!(image.pixel(1, 1)?, &[13, 23, 33]);
        Ok(())
    }

    #[test]
    fn image_pixel_bounds() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::from_size_val(
            ImageSize {
                width: 2,
                height: 1,
            },
            7,
        )?;
        assert_eq!(image.pixel(1, 0)?, &[7, 7, 7]);
        assert_eq!(
            image.pixel(2, 0),
            Err(ImageError::PixelIndexOutOfBounds(2, 0, 2, 1))
        );
        Ok(())
    }

    #[test]
    fn image_swap_rb() -> Result<(), ImageError> {
        let mut image = Image::<u8, 3>::new(
            ImageSize {
                width: 1,
                height: 1,
            },
            vec![1, 2, 3],
        )?;
        image.swap_rb();
        assert_eq!(image.as_slice(), &[3, 2, 1]);
        Ok(())
    }
}
