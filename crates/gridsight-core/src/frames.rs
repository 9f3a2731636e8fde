//! Coordinate frames and the transforms chaining them.
//!
//! `Image` is camera pixels, `RectifiedBoard` is the canonical rectangle the
//! fiducial quad is warped into, `RobotWorkspace` is gantry millimetres.

use crate::Homography;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateFrame {
    Image,
    RectifiedBoard,
    RobotWorkspace,
}

impl fmt::Display for CoordinateFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CoordinateFrame::Image => "image",
            CoordinateFrame::RectifiedBoard => "rectified_board",
            CoordinateFrame::RobotWorkspace => "robot_workspace",
        };
        f.write_str(name)
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum WorkspaceMapError {
    #[error("workspace scale must be finite and non-zero (scale_x={scale_x}, scale_y={scale_y})")]
    InvalidScale { scale_x: f64, scale_y: f64 },
}

/// Affine map from the rectified board to the robot workspace.
///
/// `robot.x = offset_x + scale_x * rect.x`
/// `robot.y = offset_y - scale_y * rect.y` (image rows grow downwards, robot Y grows away).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceMap {
    pub scale_x: f64,
    pub scale_y: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for WorkspaceMap {
    fn default() -> Self {
        Self {
            scale_x: 0.1,
            scale_y: 0.1,
            offset_x: 16.0,
            offset_y: 240.0,
        }
    }
}

impl WorkspaceMap {
    pub fn validate(&self) -> Result<(), WorkspaceMapError> {
        let ok = |s: f64| s.is_finite() && s != 0.0;
        if ok(self.scale_x) && ok(self.scale_y) {
            Ok(())
        } else {
            Err(WorkspaceMapError::InvalidScale {
                scale_x: self.scale_x,
                scale_y: self.scale_y,
            })
        }
    }

    #[inline]
    pub fn rect_to_robot(&self, p: Point2<f64>) -> Point2<f64> {
        Point2::new(
            self.offset_x + self.scale_x * p.x,
            self.offset_y - self.scale_y * p.y,
        )
    }

    #[inline]
    pub fn robot_to_rect(&self, p: Point2<f64>) -> Point2<f64> {
        Point2::new(
            (p.x - self.offset_x) / self.scale_x,
            (self.offset_y - p.y) / self.scale_y,
        )
    }
}

/// Transforms between all three frames for one calibration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordinateChain {
    pub img_to_rect: Homography,
    pub rect_to_img: Homography,
    pub workspace: WorkspaceMap,
}

impl CoordinateChain {
    /// Map `p` from `from` into `to`. `None` when a projective leg sends the
    /// point to infinity.
    pub fn transform(
        &self,
        p: Point2<f64>,
        from: CoordinateFrame,
        to: CoordinateFrame,
    ) -> Option<Point2<f64>> {
        use CoordinateFrame::*;
        let rect = match from {
            Image => self.img_to_rect.try_apply(p)?,
            RectifiedBoard => p,
            RobotWorkspace => self.workspace.robot_to_rect(p),
        };
        match to {
            Image => self.rect_to_img.try_apply(rect),
            RectifiedBoard => Some(rect),
            RobotWorkspace => Some(self.workspace.rect_to_robot(rect)),
        }
    }
}
