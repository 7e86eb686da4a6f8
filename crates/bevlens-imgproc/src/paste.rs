use bevlens_image::{Image, ImageError};
use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::{ParallelSlice, ParallelSliceMut},
};

/// Copy `src` into `dst` with its top-left corner at `(x, y)`.
///
/// # Arguments
///
/// * `src` - The image to copy.
/// * `dst` - The destination canvas.
/// * `x` - The column of the destination where the first source column lands.
/// * `y` - The row of the destination where the first source row lands.
///
/// # Errors
///
/// Returns an error when the source does not fit entirely inside the destination.
///
/// # Examples
///
/// ```rust
/// use bevlens_image::{Image, ImageSize};
/// use bevlens_imgproc::paste::paste_image;
///
/// let tile = Image::<_, 1>::new(ImageSize { width: 2, height: 2 }, vec![1u8, 2, 3, 4]).unwrap();
/// let mut canvas = Image::<_, 1>::from_size_val(ImageSize { width: 3, height: 3 }, 0u8).unwrap();
///
/// paste_image(&tile, &mut canvas, 1, 1).unwrap();
///
/// assert_eq!(canvas.as_slice(), &[0u8, 0, 0, 0, 1, 2, 0, 3, 4]);
/// ```
pub fn paste_image<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    x: usize,
    y: usize,
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync,
{
    if x + src.cols() > dst.cols() || y + src.rows() > dst.rows() {
        return Err(ImageError::PixelIndexOutOfBounds(
            x + src.cols(),
            y + src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }
    if src.cols() == 0 || src.rows() == 0 {
        return Ok(());
    }

    let dst_stride = dst.cols() * C;
    let src_stride = src.cols() * C;
    let rows = &mut dst.as_slice_mut()[y * dst_stride..(y + src.rows()) * dst_stride];

    rows.par_chunks_exact_mut(dst_stride)
        .zip(src.as_slice().par_chunks_exact(src_stride))
        .for_each(|(dst_row, src_row)| {
            dst_row[x * C..x * C + src_stride].copy_from_slice(src_row);
        });

    Ok(())
}

#[cfg(test)]
mod tests {
    use bevlens_image::{Image, ImageError, ImageSize};

    #[test]
    fn test_paste_rgb() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let tile = Image::<_, 3>::new(
            ImageSize { width: 1, height: 2 },
            vec![
                1u8, 2, 3,
                4u8, 5, 6,
            ],
        )?;
        let mut canvas = Image::<u8, 3>::from_size_val(
            ImageSize {
                width: 2,
                height: 3,
            },
            0,
        )?;

        super::paste_image(&tile, &mut canvas, 1, 1)?;

        #[rustfmt::skip]
        let expected = vec![
            0u8, 0, 0, 0, 0, 0,
            0u8, 0, 0, 1, 2, 3,
            0u8, 0, 0, 4, 5, 6,
        ];
        assert_eq!(canvas.as_slice(), &expected);

        Ok(())
    }

    #[test]
    fn test_paste_out_of_bounds() -> Result<(), ImageError> {
        let tile = Image::<u8, 1>::from_size_val(
            ImageSize {
                width: 2,
                height: 2,
            },
            1,
        )?;
        let mut canvas = Image::<u8, 1>::from_size_val(
            ImageSize {
                width: 3,
                height: 3,
            },
            0,
        )?;
        let res = super::paste_image(&tile, &mut canvas, 2, 0);
        assert_eq!(res, Err(ImageError::PixelIndexOutOfBounds(4, 2, 3, 3)));
        assert!(canvas.as_slice().iter().all(|&v| v == 0));
        Ok(())
    }
}
