//! Backdrop segmentation.

use gridsight_core::RgbImageView;
use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::morphology::open;
use serde::{Deserialize, Serialize};

/// Inclusive HSV box, OpenCV scale: hue in `[0, 180)`, saturation and value in `[0, 255]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HsvRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl Default for HsvRange {
    /// A saturated yellow mat.
    fn default() -> Self {
        Self {
            lower: [20, 100, 100],
            upper: [30, 255, 255],
        }
    }
}

impl HsvRange {
    #[inline]
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|c| self.lower[c] <= hsv[c] && hsv[c] <= self.upper[c])
    }
}

/// RGB to HSV on the OpenCV 8-bit scale (hue halved to fit a byte).
pub fn rgb_to_hsv(rgb: [u8; 3]) -> [u8; 3] {
    let [r, g, b] = rgb.map(f32::from);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let s = if max > 0.0 { delta / max * 255.0 } else { 0.0 };
    let mut h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / delta
    } else if max == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    if h < 0.0 {
        h += 360.0;
    }

    [
        ((h / 2.0).round() as u8).min(179),
        s.round() as u8,
        max as u8,
    ]
}

/// 255 where the pixel colour lies inside `backdrop`, 0 elsewhere.
pub fn backdrop_mask(frame: &RgbImageView<'_>, backdrop: &HsvRange) -> GrayImage {
    GrayImage::from_fn(frame.width as u32, frame.height as u32, |x, y| {
        let inside = backdrop.contains(rgb_to_hsv(frame.pixel(x as usize, y as usize)));
        Luma([if inside { 255 } else { 0 }])
    })
}

/// Foreground mask: the backdrop mask opened with an L∞ structuring element of
/// `radius` (removes backdrop specks and thin gaps), then inverted.
pub fn foreground_mask(frame: &RgbImageView<'_>, backdrop: &HsvRange, radius: u8) -> GrayImage {
    let mask = backdrop_mask(frame, backdrop);
    let mut opened = if radius > 0 {
        open(&mask, Norm::LInf, radius)
    } else {
        mask
    };
    image::imageops::invert(&mut opened);
    opened
}
