use crate::error::ClassificationError;
use crate::params::ClassifyParams;
use crate::state::{BoardState, BOARD_CELLS};
use gridsight_core::{mean_color_in_square, Cell, RgbImageView};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// What to do with a sample whose mean is neither black nor white.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadZonePolicy {
    /// Read the cell as empty.
    #[default]
    Empty,
    /// Fail with [`ClassificationError::ClassificationAmbiguous`].
    Reject,
}

/// Classify every cell from the mean colour around its image-space center.
///
/// Windows that fall entirely outside the frame read as empty under either policy,
/// as does every cell of a frame whose buffer does not match its dimensions.
pub fn classify_cells(
    frame: &RgbImageView<'_>,
    centers: &[Point2<f64>; BOARD_CELLS],
    params: &ClassifyParams,
) -> Result<BoardState, ClassificationError> {
    if !frame.is_consistent() {
        log::warn!(
            "frame buffer holds {} bytes, expected {}x{}x3; reading an empty board",
            frame.data.len(),
            frame.width,
            frame.height
        );
        return Ok(BoardState::EMPTY);
    }
    let mut cells = [Cell::Empty; BOARD_CELLS];
    for (i, center) in centers.iter().enumerate() {
        let Some(mean) = mean_color_in_square(frame, *center, params.sample_radius) else {
            log::debug!("cell {i} sample window is outside the frame");
            continue;
        };
        let cell = params.thresholds.classify(mean);
        if params.dead_zone == DeadZonePolicy::Reject && params.thresholds.is_dead_zone(mean) {
            return Err(ClassificationError::ClassificationAmbiguous { cell: i, mean });
        }
        cells[i] = cell;
    }
    Ok(BoardState::new(cells))
}
