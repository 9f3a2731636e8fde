//! Board-state acquisition for a camera-observed 3×3 game board.
//!
//! Stages, leaves first:
//! - homography calibration from the fiducial quad ([`Calibration`]),
//! - projection of the nine canonical cell centers into the image ([`project_cell_centers`]),
//! - per-cell colour classification ([`classify_cells`]),
//! - diffing successive board states into a move decision ([`reconcile`]).
//!
//! [`BoardPipeline`] owns the calibration and wires the stages together.
//! The [`game`] module adds win detection and an explicit turn state machine
//! on top of reconciled board states.

mod calibration;
mod classify;
mod error;
pub mod game;
mod grid;
mod params;
mod pipeline;
mod reconcile;
mod state;

pub use calibration::{CanonicalRect, Calibration};
pub use classify::{classify_cells, DeadZonePolicy};
pub use error::{CalibrationError, ClassificationError, CoordinateError};
pub use grid::{canonical_cell_centers, project_cell_centers, CELL_FRACTIONS};
pub use params::{BoardParams, ClassifyParams};
pub use pipeline::BoardPipeline;
pub use reconcile::{diff_cells, reconcile, CellChange, Reconciliation};
pub use state::{BoardState, InvalidLength, ParseBoardError, BOARD_CELLS};

pub use gridsight_core::{Cell, CoordinateFrame};
