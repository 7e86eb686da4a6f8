// Piecewise-linear control points (x, value) of the cyclic hue map, per channel.
const HSV_RED: [(f64, f64); 10] = [
    (0.0, 1.0),
    (0.158730, 1.0),
    (0.174603, 0.96875),
    (0.333333, 0.03125),
    (0.349206, 0.0),
    (0.666667, 0.0),
    (0.682540, 0.0),
    (0.841270, 0.96875),
    (0.857143, 1.0),
    (1.0, 1.0),
];

const HSV_GREEN: [(f64, f64); 7] = [
    (0.0, 0.0),
    (0.158730, 0.9375),
    (0.174603, 1.0),
    (0.507937, 1.0),
    (0.666667, 0.0625),
    (0.682540, 0.0),
    (1.0, 0.0),
];

const HSV_BLUE: [(f64, f64); 7] = [
    (0.0, 0.0),
    (0.333333, 0.0),
    (0.349206, 0.0625),
    (0.507937, 1.0),
    (0.841270, 1.0),
    (0.857143, 0.9375),
    (1.0, 0.09375),
];

fn interpolate(points: &[(f64, f64)], x: f64) -> f64 {
    for w in points.windows(2) {
        let ((x0, y0), (x1, y1)) = (w[0], w[1]);
        if x <= x1 {
            return y0 + (y1 - y0) * (x - x0) / (x1 - x0);
        }
    }
    points.last().map_or(0.0, |p| p.1)
}

/// A 256-entry RGB lookup table.
#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    lut: [[u8; 3]; 256],
}

impl Colormap {
    /// The cyclic hue colormap: red, yellow, green, cyan, blue, magenta and back to red.
    ///
    /// Example:
    ///
    /// ```
    /// use bevlens_imgproc::colormap::Colormap;
    ///
    /// let cmap = Colormap::hsv();
    /// assert_eq!(cmap.get(0), [255, 0, 0]);
    /// ```
    pub fn hsv() -> Self {
        let mut lut = [[0u8; 3]; 256];
        for (i, entry) in lut.iter_mut().enumerate() {
            let x = i as f64 / 255.0;
            *entry = [&HSV_RED[..], &HSV_GREEN[..], &HSV_BLUE[..]]
                .map(|ch| (interpolate(ch, x) * 255.0).round().clamp(0.0, 255.0) as u8);
        }
        Self { lut }
    }

    /// The color at index `i`.
    #[inline]
    pub fn get(&self, i: u8) -> [u8; 3] {
        self.lut[i as usize]
    }

    /// Color for a point at the given depth, `lut[clamp(640 / depth, 0, 255)]`.
    ///
    /// Near points take the high end of the table, points beyond 640 units the first entry.
    pub fn depth_color(&self, depth: f64) -> [u8; 3] {
        let index = (640.0 / depth).clamp(0.0, 255.0);
        // NaN depth saturates to 0
        self.get(index as u8)
    }
}

impl Default for Colormap {
    fn default() -> Self {
        Self::hsv()
    }
}
