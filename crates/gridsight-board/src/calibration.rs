use crate::error::CalibrationError;
use crate::grid::project_cell_centers;
use crate::state::BOARD_CELLS;
use gridsight_core::{homography_from_4pt, CoordinateChain, Homography, WorkspaceMap};
use gridsight_fiducial::Quad;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Quads whose smallest corner triangle covers less than this fraction of the
/// squared longest side are treated as collinear.
const MIN_RELATIVE_AREA: f64 = 1e-6;
const MIN_ABS_DET: f64 = 1e-9;

/// Size of the rectified board in canonical units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalRect {
    pub width: f64,
    pub height: f64,
}

impl Default for CanonicalRect {
    fn default() -> Self {
        Self {
            width: 1230.0,
            height: 1000.0,
        }
    }
}

impl CanonicalRect {
    /// `(0,0) (W,0) (W,H) (0,H)`, matching the quad's TL, TR, BR, BL order.
    pub fn corners(&self) -> [Point2<f64>; 4] {
        [
            Point2::new(0.0, 0.0),
            Point2::new(self.width, 0.0),
            Point2::new(self.width, self.height),
            Point2::new(0.0, self.height),
        ]
    }
}

/// A solved board calibration. Immutable once built; the pipeline swaps
/// whole calibrations rather than editing one in place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub quad: Quad,
    pub img_to_rect: Homography,
    pub rect_to_img: Homography,
    pub canonical: CanonicalRect,
    /// Cell centers in image pixels, row-major.
    pub cell_centers: [Point2<f64>; BOARD_CELLS],
}

impl Calibration {
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
    pub fn solve(quad: Quad, canonical: CanonicalRect) -> Result<Self, CalibrationError> {
        let area = quad.min_relative_triangle_area();
        if !area.is_finite() || area < MIN_RELATIVE_AREA {
            log::debug!("quad rejected, relative corner area {area:.3e}");
            return Err(CalibrationError::DegenerateHomography);
        }

        let img_to_rect = homography_from_4pt(&quad.corners, &canonical.corners())
            .ok_or(CalibrationError::DegenerateHomography)?;
        let det = img_to_rect.determinant();
        if !det.is_finite() || det.abs() < MIN_ABS_DET {
            log::debug!("homography rejected, det {det:.3e}");
            return Err(CalibrationError::DegenerateHomography);
        }
        let rect_to_img = img_to_rect
            .inverse()
            .ok_or(CalibrationError::DegenerateHomography)?;
        let cell_centers = project_cell_centers(&rect_to_img, &canonical)
            .ok_or(CalibrationError::DegenerateHomography)?;

        Ok(Self {
            quad,
            img_to_rect,
            rect_to_img,
            canonical,
            cell_centers,
        })
    }

    pub fn chain(&self, workspace: WorkspaceMap) -> CoordinateChain {
        CoordinateChain {
            img_to_rect: self.img_to_rect,
            rect_to_img: self.rect_to_img,
            workspace,
        }
    }
}
