use bevlens_image::{Image, ImageSize};
use bevlens_imgproc::paste::paste_image;

use crate::{error::VizError, layout::CameraLayout};

/// Compose named camera views into one mosaic following `layout`.
///
/// Each column is as wide as its widest image and each row as tall as its tallest image;
/// rows and columns without images take the layout's slot size. Images are pasted at the
/// top-left of their slot and the remaining area stays black. Views whose camera has no
/// slot are skipped, and when a camera appears twice the later view wins.
///
/// # Arguments
///
/// * `views` - The camera name and image of each view.
/// * `layout` - The camera to slot mapping.
///
/// # Returns
///
/// The mosaic image. The result does not depend on the order of `views`, apart from
/// duplicated camera names.
///
/// Example:
///
/// ```
/// use bevlens_image::{Image, ImageSize};
/// use bevlens_viz::{compositor::compose_mosaic, layout::{CameraLayout, CameraSlot}};
///
/// let layout = CameraLayout::new(
///     vec![CameraSlot::new("left", 0, 0), CameraSlot::new("right", 0, 1)],
///     ImageSize { width: 4, height: 2 },
/// );
/// let left = Image::<u8, 3>::from_size_val(ImageSize { width: 3, height: 2 }, 9).unwrap();
///
/// let mosaic = compose_mosaic(&[("left", &left)], &layout).unwrap();
/// assert_eq!(mosaic.width(), 3 + 4);
/// assert_eq!(mosaic.height(), 2);
/// ```
pub fn compose_mosaic(
    views: &[(&str, &Image<u8, 3>)],
    layout: &CameraLayout,
) -> Result<Image<u8, 3>, VizError> {
    // one image per slot, later duplicates replace earlier ones
    let mut placed: Vec<(usize, usize, &Image<u8, 3>)> = Vec::with_capacity(views.len());
    for &(name, img) in views {
        let Some((row, col)) = layout.slot(name) else {
            log::warn!("camera {name} has no slot in the layout, skipping");
            continue;
        };
        match placed.iter_mut().find(|(r, c, _)| (*r, *c) == (row, col)) {
            Some(existing) => {
                log::warn!("camera {name} given twice, keeping the last image");
                existing.2 = img;
            }
            None => placed.push((row, col, img)),
        }
    }

    let slot_size = layout.slot_size();
    let mut col_widths = vec![0usize; layout.cols()];
    let mut row_heights = vec![0usize; layout.rows()];
    for (row, col, img) in &placed {
        col_widths[*col] = col_widths[*col].max(img.width());
        row_heights[*row] = row_heights[*row].max(img.height());
    }
    col_widths
        .iter_mut()
        .filter(|w| **w == 0)
        .for_each(|w| *w = slot_size.width);
    row_heights
        .iter_mut()
        .filter(|h| **h == 0)
        .for_each(|h| *h = slot_size.height);

    let offsets = |sizes: &[usize]| -> Vec<usize> {
        sizes
            .iter()
            .scan(0, |acc, s| {
                let start = *acc;
                *acc += s;
                Some(start)
            })
            .collect()
    };
    let col_x = offsets(&col_widths);
    let row_y = offsets(&row_heights);

    let mut mosaic = Image::from_size_val(
        ImageSize {
            width: col_widths.iter().sum(),
            height: row_heights.iter().sum(),
        },
        0u8,
    )?;

    for (row, col, img) in placed {
        paste_image(img, &mut mosaic, col_x[col], row_y[row])?;
    }

    log::debug!(
        "composed {}x{} mosaic of size {}",
        layout.rows(),
        layout.cols(),
        mosaic.size()
    );

    Ok(mosaic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{CameraSlot, DEFAULT_SLOT_SIZE};

    fn solid(width: usize, height: usize, val: u8) -> Image<u8, 3> {
        Image::from_size_val(ImageSize { width, height }, val).unwrap()
    }

    #[test]
    fn test_plus_four_full() -> Result<(), VizError> {
        let layout = CameraLayout::plus_four();
        let (a, b, c, d) = (solid(4, 2, 1), solid(4, 2, 2), solid(4, 2, 3), solid(4, 2, 4));
        let mosaic = compose_mosaic(
            &[
                ("front_left_camera", &a),
                ("front_right_camera", &b),
                ("side_left_camera", &c),
                ("side_right_camera", &d),
            ],
            &layout,
        )?;

        assert_eq!(mosaic.size(), ImageSize { width: 8, height: 4 });
        assert_eq!(mosaic.pixel(0, 0)?, &[1, 1, 1]);
        assert_eq!(mosaic.pixel(4, 0)?, &[2, 2, 2]);
        assert_eq!(mosaic.pixel(3, 2)?, &[3, 3, 3]);
        assert_eq!(mosaic.pixel(7, 3)?, &[4, 4, 4]);
        Ok(())
    }

    #[test]
    fn test_missing_camera_is_black() -> Result<(), VizError> {
        let layout = CameraLayout::plus_four();
        let a = solid(10, 6, 200);
        let mosaic = compose_mosaic(&[("front_left_camera", &a)], &layout)?;

        // empty column and row fall back to the slot size
        assert_eq!(mosaic.width(), 10 + DEFAULT_SLOT_SIZE.width);
        assert_eq!(mosaic.height(), 6 + DEFAULT_SLOT_SIZE.height);
        assert_eq!(mosaic.pixel(9, 5)?, &[200, 200, 200]);
        assert_eq!(mosaic.pixel(10, 0)?, &[0, 0, 0]);
        assert_eq!(mosaic.pixel(0, 6)?, &[0, 0, 0]);
        Ok(())
    }

    #[test]
    fn test_uneven_sizes() -> Result<(), VizError> {
        let layout = CameraLayout::new(
            vec![
                CameraSlot::new("a", 0, 0),
                CameraSlot::new("b", 0, 1),
                CameraSlot::new("c", 1, 0),
            ],
            ImageSize {
                width: 1,
                height: 1,
            },
        );
        let (a, b, c) = (solid(2, 3, 1), solid(4, 1, 2), solid(5, 2, 3));
        let mosaic = compose_mosaic(&[("a", &a), ("b", &b), ("c", &c)], &layout)?;

        // columns [5, 4], rows [3, 2]
        assert_eq!(mosaic.size(), ImageSize { width: 9, height: 5 });
        assert_eq!(mosaic.pixel(2, 0)?, &[0, 0, 0]);
        assert_eq!(mosaic.pixel(5, 0)?, &[2, 2, 2]);
        assert_eq!(mosaic.pixel(5, 1)?, &[0, 0, 0]);
        assert_eq!(mosaic.pixel(4, 4)?, &[3, 3, 3]);
        Ok(())
    }

    #[test]
    fn test_order_independent() -> Result<(), VizError> {
        let layout = CameraLayout::plus_six();
        let imgs: Vec<Image<u8, 3>> = (0..6).map(|i| solid(3, 2, i as u8 * 40)).collect();
        let views: Vec<(&str, &Image<u8, 3>)> = crate::layout::CAMERA_NAMES
            .iter()
            .copied()
            .zip(imgs.iter())
            .collect();
        let mut reversed = views.clone();
        reversed.reverse();

        assert_eq!(
            compose_mosaic(&views, &layout)?,
            compose_mosaic(&reversed, &layout)?
        );
        Ok(())
    }

    #[test]
    fn test_unknown_and_duplicate() -> Result<(), VizError> {
        let layout = CameraLayout::plus_four();
        let (a, b, x) = (solid(2, 2, 10), solid(2, 2, 20), solid(2, 2, 99));
        let mosaic = compose_mosaic(
            &[
                ("front_left_camera", &a),
                ("lidar_top", &x),
                ("front_left_camera", &b),
            ],
            &layout,
        )?;
        assert_eq!(mosaic.pixel(0, 0)?, &[20, 20, 20]);
        assert!(!mosaic.as_slice().contains(&99));
        Ok(())
    }
}
