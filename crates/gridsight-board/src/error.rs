use gridsight_fiducial::QuadError;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    #[error(transparent)]
    Quad(#[from] QuadError),
    #[error("board quad is degenerate, no usable homography")]
    DegenerateHomography,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ClassificationError {
    #[error("board is not calibrated")]
    NotCalibrated,
    #[error("cell {cell} mean colour {mean:?} is neither black nor white")]
    ClassificationAmbiguous { cell: usize, mean: [f32; 3] },
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateError {
    #[error("board is not calibrated")]
    NotCalibrated,
    #[error("point projects to infinity")]
    ProjectionAtInfinity,
}
