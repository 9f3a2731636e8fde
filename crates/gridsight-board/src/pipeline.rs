use crate::calibration::Calibration;
use crate::classify::classify_cells;
use crate::error::{CalibrationError, ClassificationError, CoordinateError};
use crate::params::BoardParams;
use crate::state::BoardState;
use gridsight_core::{CoordinateFrame, RgbImageView, WorkspaceMapError};
use gridsight_fiducial::{build_quad, MarkerDetection, MarkerDetector};
use nalgebra::Point2;
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Calibrate-once, classify-many board reader.
///
/// The stored calibration is only ever replaced by a successful solve, and
/// readers get it as an [`Arc`] snapshot.
#[derive(Debug, Default)]
pub struct BoardPipeline {
    params: BoardParams,
    calibration: Option<Arc<Calibration>>,
}

impl BoardPipeline {
    /// Fails when the workspace map cannot be inverted.
    pub fn new(params: BoardParams) -> Result<Self, WorkspaceMapError> {
        params.workspace.validate()?;
        Ok(Self {
            params,
            calibration: None,
        })
    }

    #[inline]
    pub fn params(&self) -> &BoardParams {
        &self.params
    }

    #[inline]
    pub fn calibration(&self) -> Option<&Calibration> {
        self.calibration.as_deref()
    }

    pub fn snapshot(&self) -> Option<Arc<Calibration>> {
        self.calibration.clone()
    }

    /// Solve a calibration from one frame's marker detections and store it.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, detections), fields(n = detections.len()))
    )]
    pub fn calibrate_from_markers(
        &mut self,
        detections: &[MarkerDetection],
    ) -> Result<Arc<Calibration>, CalibrationError> {
        let quad = build_quad(detections, &self.params.quad)?;
        let calibration = Arc::new(Calibration::solve(quad, self.params.canonical)?);
        log::debug!("calibrated, center cell at {:?}", calibration.cell_centers[4]);
        self.calibration = Some(Arc::clone(&calibration));
        Ok(calibration)
    }

    pub fn calibrate<D>(
        &mut self,
        frame: &RgbImageView<'_>,
        detector: &D,
    ) -> Result<Arc<Calibration>, CalibrationError>
    where
        D: MarkerDetector + ?Sized,
    {
        let detections = detector.detect(frame);
        self.calibrate_from_markers(&detections)
    }

    /// Classify the nine cells with the current calibration.
    pub fn board_state(&self, frame: &RgbImageView<'_>) -> Result<BoardState, ClassificationError> {
        let calibration = self
            .calibration
            .as_ref()
            .ok_or(ClassificationError::NotCalibrated)?;
        classify_cells(frame, &calibration.cell_centers, &self.params.classify)
    }

    /// Recalibrate from `frame` if its markers allow, then read the board.
    ///
    /// A failed recalibration keeps the previous calibration.
    pub fn poll<D>(
        &mut self,
        frame: &RgbImageView<'_>,
        detector: &D,
    ) -> Result<BoardState, ClassificationError>
    where
        D: MarkerDetector + ?Sized,
    {
        if let Err(e) = self.calibrate(frame, detector) {
            log::warn!("recalibration failed ({e}), keeping previous calibration");
        }
        self.board_state(frame)
    }

    /// Map `p` between any two frames. Legs that touch the image need a calibration.
    pub fn transform(
        &self,
        p: Point2<f64>,
        from: CoordinateFrame,
        to: CoordinateFrame,
    ) -> Result<Point2<f64>, CoordinateError> {
        let workspace = &self.params.workspace;
        if from != CoordinateFrame::Image && to != CoordinateFrame::Image {
            let rect = match from {
                CoordinateFrame::RobotWorkspace => workspace.robot_to_rect(p),
                _ => p,
            };
            return Ok(match to {
                CoordinateFrame::RobotWorkspace => workspace.rect_to_robot(rect),
                _ => rect,
            });
        }

        let calibration = self
            .calibration
            .as_ref()
            .ok_or(CoordinateError::NotCalibrated)?;
        calibration
            .chain(*workspace)
            .transform(p, from, to)
            .ok_or(CoordinateError::ProjectionAtInfinity)
    }

    pub fn to_robot_coord(
        &self,
        p: Point2<f64>,
        from: CoordinateFrame,
    ) -> Result<Point2<f64>, CoordinateError> {
        self.transform(p, from, CoordinateFrame::RobotWorkspace)
    }
}
