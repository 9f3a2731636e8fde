use crate::contour::{bounding_box, contains, min_enclosing_circle, perimeter, polygon_moments};
use crate::mask::{foreground_mask, HsvRange};
use gridsight_core::{Cell, ColorThresholds, RgbImageView};
use image::GrayImage;
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::point::Point;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoosePieceParams {
    /// Colour of the mat the pieces rest on.
    pub backdrop: HsvRange,
    /// L∞ radius of the opening applied to the backdrop mask.
    pub morph_radius: u8,
    /// Contours shorter than this (pixels) are noise.
    pub min_perimeter: f64,
    /// Accepted bounding-box `width / height`, inclusive.
    pub aspect_range: [f64; 2],
    /// Upper bound (exclusive) on enclosing-circle area over contour area.
    pub max_circle_ratio: f64,
    pub thresholds: ColorThresholds,
}

impl Default for LoosePieceParams {
    fn default() -> Self {
        Self {
            backdrop: HsvRange::default(),
            morph_radius: 10,
            min_perimeter: 200.0,
            aspect_range: [0.95, 1.05],
            max_circle_ratio: 1.5,
            thresholds: ColorThresholds::default(),
        }
    }
}

/// Measurements of one foreground blob that passed the size filter.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PieceCandidate {
    pub center: Point2<f64>,
    pub perimeter: f64,
    pub aspect: f64,
    pub circle_ratio: f64,
    pub mean: [f32; 3],
    pub color: Cell,
}

/// Piece centers in image pixels, unordered.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LoosePieces {
    pub black: Vec<Point2<f64>>,
    pub white: Vec<Point2<f64>>,
}

impl LoosePieces {
    pub fn of(&self, color: Cell) -> &[Point2<f64>] {
        match color {
            Cell::Black => &self.black,
            Cell::White => &self.white,
            Cell::Empty => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.black.is_empty() && self.white.is_empty()
    }
}

/// Finds round black and white pieces lying off the board on a uniform mat.
#[derive(Clone, Debug, Default)]
pub struct LoosePieceLocator {
    params: LoosePieceParams,
}

impl LoosePieceLocator {
    pub fn new(params: LoosePieceParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &LoosePieceParams {
        &self.params
    }

    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
    pub fn locate(&self, frame: &RgbImageView<'_>) -> LoosePieces {
        let mut out = LoosePieces::default();
        for cand in self.candidates(frame) {
            match cand.color {
                Cell::Black => out.black.push(cand.center),
                Cell::White => out.white.push(cand.center),
                Cell::Empty => log::debug!(
                    "dropping dead-zone blob at {:?}, mean {:?}",
                    cand.center,
                    cand.mean
                ),
            }
        }
        out
    }

    /// Outer contours that pass the perimeter and shape filters, with their
    /// measurements. Blobs whose colour is in the dead zone are included.
    pub fn candidates(&self, frame: &RgbImageView<'_>) -> Vec<PieceCandidate> {
        if !frame.is_consistent() || frame.width == 0 || frame.height == 0 {
            return Vec::new();
        }
        let fg = foreground_mask(frame, &self.params.backdrop, self.params.morph_radius);
        let contours: Vec<Contour<i32>> = find_contours(&fg);

        contours
            .iter()
            .filter(|c| c.border_type == BorderType::Outer)
            .filter_map(|c| self.measure(frame, &fg, &c.points))
            .collect()
    }

    fn measure(
        &self,
        frame: &RgbImageView<'_>,
        fg: &GrayImage,
        points: &[Point<i32>],
    ) -> Option<PieceCandidate> {
        let perimeter = perimeter(points);
        if perimeter < self.params.min_perimeter {
            return None;
        }
        let (x0, y0, w, h) = bounding_box(points)?;
        let aspect = w as f64 / h as f64;
        let [lo, hi] = self.params.aspect_range;
        if !(lo..=hi).contains(&aspect) {
            return None;
        }
        let moments = polygon_moments(points);
        let center = moments.centroid()?;
        let (_, radius) = min_enclosing_circle(points)?;
        let circle_ratio = std::f64::consts::PI * radius * radius / moments.m00;
        if circle_ratio >= self.params.max_circle_ratio {
            log::trace!("blob at {center:?} rejected, circle ratio {circle_ratio:.2}");
            return None;
        }
        let mean = mean_inside(frame, fg, points, (x0, y0, w, h))?;

        Some(PieceCandidate {
            center,
            perimeter,
            aspect,
            circle_ratio,
            mean,
            color: self.params.thresholds.classify(mean),
        })
    }
}

/// Mean RGB over foreground pixels whose centers fall inside the polygon.
fn mean_inside(
    frame: &RgbImageView<'_>,
    fg: &GrayImage,
    points: &[Point<i32>],
    (x0, y0, w, h): (i32, i32, i32, i32),
) -> Option<[f32; 3]> {
    let mut sum = [0u64; 3];
    let mut n = 0u64;
    for y in y0.max(0)..(y0 + h).min(frame.height as i32) {
        for x in x0.max(0)..(x0 + w).min(frame.width as i32) {
            if fg.get_pixel(x as u32, y as u32)[0] == 0 || !contains(points, x as f64, y as f64) {
                continue;
            }
            let px = frame.pixel(x as usize, y as usize);
            for c in 0..3 {
                sum[c] += px[c] as u64;
            }
            n += 1;
        }
    }
    (n > 0).then(|| sum.map(|s| s as f32 / n as f32))
}
