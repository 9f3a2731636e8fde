//! Cell centers of the 3x3 grid.

use crate::calibration::CanonicalRect;
use crate::state::BOARD_CELLS;
use gridsight_core::Homography;
use nalgebra::Point2;

/// Cell-center positions along each axis, as a fraction of the board extent.
pub const CELL_FRACTIONS: [f64; 3] = [1.0 / 6.0, 3.0 / 6.0, 5.0 / 6.0];

/// Cell centers in the rectified frame, row-major from the top-left.
pub fn canonical_cell_centers(canonical: &CanonicalRect) -> [Point2<f64>; BOARD_CELLS] {
    let mut out = [Point2::origin(); BOARD_CELLS];
    for (row, fy) in CELL_FRACTIONS.iter().enumerate() {
        for (col, fx) in CELL_FRACTIONS.iter().enumerate() {
            out[row * 3 + col] = Point2::new(fx * canonical.width, fy * canonical.height);
        }
    }
    out
}

/// Cell centers projected back into the image. `None` if any center maps to infinity.
pub fn project_cell_centers(
    rect_to_img: &Homography,
    canonical: &CanonicalRect,
) -> Option<[Point2<f64>; BOARD_CELLS]> {
    let mut out = [Point2::origin(); BOARD_CELLS];
    for (dst, src) in out.iter_mut().zip(canonical_cell_centers(canonical)) {
        *dst = rect_to_img.try_apply(src)?;
    }
    Some(out)
}
