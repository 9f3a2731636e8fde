use nalgebra::Point2;

/// Borrowed interleaved RGB frame.
#[derive(Clone, Copy, Debug)]
pub struct RgbImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major RGB, len = w*h*3
}

/// Owned interleaved RGB frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl RgbImage {
    /// Frame filled with a single colour.
    pub fn filled(width: usize, height: usize, rgb: [u8; 3]) -> Self {
        let mut data = Vec::with_capacity(width * height * 3);
        for _ in 0..width * height {
            data.extend_from_slice(&rgb);
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn view(&self) -> RgbImageView<'_> {
        RgbImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    /// Paint an axis-aligned rectangle `[x0, x1) × [y0, y1)`, clipped to the frame.
    pub fn fill_rect(&mut self, x0: usize, y0: usize, x1: usize, y1: usize, rgb: [u8; 3]) {
        for y in y0.min(self.height)..y1.min(self.height) {
            for x in x0.min(self.width)..x1.min(self.width) {
                let i = (y * self.width + x) * 3;
                self.data[i..i + 3].copy_from_slice(&rgb);
            }
        }
    }
}

impl RgbImageView<'_> {
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let i = (y * self.width + x) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// `true` when the buffer length matches `width * height * 3`.
    pub fn is_consistent(&self) -> bool {
        self.width
            .checked_mul(self.height)
            .and_then(|n| n.checked_mul(3))
            .is_some_and(|n| n == self.data.len())
    }
}

/// Mean RGB over the axis-aligned square of side `2 * radius` centred on `center`,
/// clipped to the frame. Returns `None` when nothing of the square lies inside.
pub fn mean_color_in_square(
    img: &RgbImageView<'_>,
    center: Point2<f64>,
    radius: f64,
) -> Option<[f32; 3]> {
    if !center.x.is_finite() || !center.y.is_finite() || !img.is_consistent() {
        return None;
    }
    let x0 = (center.x - radius).floor().max(0.0);
    let y0 = (center.y - radius).floor().max(0.0);
    let x1 = (center.x + radius).ceil().min(img.width as f64);
    let y1 = (center.y + radius).ceil().min(img.height as f64);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }

    let (x0, y0, x1, y1) = (x0 as usize, y0 as usize, x1 as usize, y1 as usize);
    let mut sum = [0u64; 3];
    for y in y0..y1 {
        for x in x0..x1 {
            let px = img.pixel(x, y);
            sum[0] += px[0] as u64;
            sum[1] += px[1] as u64;
            sum[2] += px[2] as u64;
        }
    }
    let n = ((x1 - x0) * (y1 - y0)) as f32;
    Some(sum.map(|s| s as f32 / n))
}
