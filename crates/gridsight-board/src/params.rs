use crate::calibration::CanonicalRect;
use crate::classify::DeadZonePolicy;
use gridsight_core::{ColorThresholds, WorkspaceMap};
use gridsight_fiducial::QuadParams;
use serde::{Deserialize, Serialize};

/// Per-cell colour sampling.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyParams {
    /// Half side of the square sampling window, in image pixels.
    pub sample_radius: f64,
    pub thresholds: ColorThresholds,
    pub dead_zone: DeadZonePolicy,
}

impl Default for ClassifyParams {
    fn default() -> Self {
        Self {
            sample_radius: 20.0,
            thresholds: ColorThresholds::default(),
            dead_zone: DeadZonePolicy::Empty,
        }
    }
}

/// Everything the board pipeline needs besides the frames themselves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardParams {
    pub quad: QuadParams,
    pub canonical: CanonicalRect,
    pub classify: ClassifyParams,
    pub workspace: WorkspaceMap,
}
