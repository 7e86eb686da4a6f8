use bevlens_image::Image;
use std::cmp::{max, min};

/// Set a pixel's color, ignoring coordinates outside the image.
#[inline]
pub(crate) fn set_pixel<const C: usize>(img: &mut Image<u8, C>, x: i64, y: i64, color: [u8; C]) {
    if x < 0 || y < 0 || x >= img.cols() as i64 || y >= img.rows() as i64 {
        return;
    }
    let start = (y as usize * img.cols() + x as usize) * C;
    img.as_slice_mut()[start..start + C].copy_from_slice(&color);
}

// Square brush covering `thickness` pixels per side around (x, y).
#[inline]
fn stamp<const C: usize>(img: &mut Image<u8, C>, x: i64, y: i64, color: [u8; C], thickness: usize) {
    if thickness <= 1 {
        set_pixel(img, x, y, color);
        return;
    }
    let lo = -((thickness as i64 - 1) / 2);
    let hi = thickness as i64 / 2;
    for j in lo..=hi {
        for i in lo..=hi {
            set_pixel(img, x + i, y + j, color);
        }
    }
}

/// Draws a line on an image inplace using Bresenham's line algorithm.
///
/// Pixels falling outside the image are skipped, so endpoints may lie off-canvas.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `p0` - The start point of the line as a tuple of (x, y).
/// * `p1` - The end point of the line as a tuple of (x, y).
/// * `color` - The color of the line as an array of `C` elements.
/// * `thickness` - The side of the square brush in pixels.
pub fn draw_line<const C: usize>(
    img: &mut Image<u8, C>,
    p0: (i64, i64),
    p1: (i64, i64),
    color: [u8; C],
    thickness: usize,
) {
    let (mut x0, mut y0) = p0;
    let (x1, y1) = p1;

    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };

    let mut err = dx - dy;

    loop {
        stamp(img, x0, y0, color, thickness);

        if x0 == x1 && y0 == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Draws a filled disk of the given radius; radius 0 sets a single pixel.
pub fn draw_filled_circle<const C: usize>(
    img: &mut Image<u8, C>,
    center: (i64, i64),
    radius: i64,
    color: [u8; C],
) {
    let (cx, cy) = center;
    let r2 = radius * radius;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= r2 {
                set_pixel(img, cx + dx, cy + dy, color);
            }
        }
    }
}

/// Draws a filled rectangle on an image inplace.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `top_left` - The top-left corner coordinates (x, y), inclusive.
/// * `bottom_right` - The bottom-right corner coordinates (x, y), exclusive.
/// * `color` - The fill color of the rectangle.
pub fn draw_filled_rect<const C: usize>(
    img: &mut Image<u8, C>,
    top_left: (i64, i64),
    bottom_right: (i64, i64),
    color: [u8; C],
) {
    let (x_start, y_start) = top_left;
    let (x_end, y_end) = bottom_right;

    // clamp to image bounds
    let x_min = max(0, min(x_start, x_end));
    let y_min = max(0, min(y_start, y_end));
    let x_max = min(img.cols() as i64, max(x_start, x_end));
    let y_max = min(img.rows() as i64, max(y_start, y_end));

    for y in y_min..y_max {
        for x in x_min..x_max {
            set_pixel(img, x, y, color);
        }
    }
}
