use gridsight_core::Cell;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;
use std::str::FromStr;

/// Number of cells on the board.
pub const BOARD_CELLS: usize = 9;

/// A board-state vector had the wrong number of cells.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("board state must have {BOARD_CELLS} cells, got {got}")]
pub struct InvalidLength {
    pub got: usize,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseBoardError {
    #[error(transparent)]
    Length(#[from] InvalidLength),
    #[error("invalid cell symbol {0:?} (expected '.', 'B' or 'W')")]
    Symbol(char),
}

/// Occupancy of the nine cells, row-major from the top-left cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Cell>", into = "Vec<Cell>")]
pub struct BoardState([Cell; BOARD_CELLS]);

impl BoardState {
    pub const EMPTY: BoardState = BoardState([Cell::Empty; BOARD_CELLS]);

    pub fn new(cells: [Cell; BOARD_CELLS]) -> Self {
        Self(cells)
    }

    #[inline]
    pub fn cells(&self) -> &[Cell; BOARD_CELLS] {
        &self.0
    }

    /// Copy with `cell` set to `value`. Out-of-range indices leave the board unchanged.
    pub fn with(mut self, cell: usize, value: Cell) -> Self {
        if let Some(slot) = self.0.get_mut(cell) {
            *slot = value;
        }
        self
    }

    pub fn count(&self, value: Cell) -> usize {
        self.0.iter().filter(|&&c| c == value).count()
    }
}

impl Index<usize> for BoardState {
    type Output = Cell;

    fn index(&self, index: usize) -> &Cell {
        &self.0[index]
    }
}

impl TryFrom<&[Cell]> for BoardState {
    type Error = InvalidLength;

    fn try_from(cells: &[Cell]) -> Result<Self, Self::Error> {
        let arr: [Cell; BOARD_CELLS] = cells
            .try_into()
            .map_err(|_| InvalidLength { got: cells.len() })?;
        Ok(Self(arr))
    }
}

impl TryFrom<Vec<Cell>> for BoardState {
    type Error = InvalidLength;

    fn try_from(cells: Vec<Cell>) -> Result<Self, Self::Error> {
        Self::try_from(cells.as_slice())
    }
}

impl From<BoardState> for Vec<Cell> {
    fn from(state: BoardState) -> Self {
        state.0.to_vec()
    }
}

impl FromStr for BoardState {
    type Err = ParseBoardError;

    /// Parse nine symbols (`.`, `B`, `W`); whitespace and `|` separators are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cells = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '|')
            .map(|c| Cell::from_symbol(c).ok_or(ParseBoardError::Symbol(c)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(BoardState::try_from(cells)?)
    }
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cell in &self.0 {
            write!(f, "{}", cell.symbol())?;
        }
        Ok(())
    }
}
