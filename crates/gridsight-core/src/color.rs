//! Piece colours and the three-way brightness classification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Content of one board cell, or the colour of a loose piece.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cell {
    #[default]
    Empty,
    Black,
    White,
}

impl Cell {
    #[inline]
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    /// The other piece colour; `Empty` maps to itself.
    pub fn opponent(self) -> Cell {
        match self {
            Cell::Black => Cell::White,
            Cell::White => Cell::Black,
            Cell::Empty => Cell::Empty,
        }
    }

    /// Single-character symbol used in compact board strings.
    pub fn symbol(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Black => 'B',
            Cell::White => 'W',
        }
    }

    pub fn from_symbol(c: char) -> Option<Cell> {
        match c {
            '.' | '0' | '-' => Some(Cell::Empty),
            'B' | 'b' => Some(Cell::Black),
            'W' | 'w' => Some(Cell::White),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Cell::Empty => "empty",
            Cell::Black => "black",
            Cell::White => "white",
        };
        f.write_str(name)
    }
}

/// Hard per-channel thresholds on a mean RGB colour.
///
/// Means at or above `white_min` on every channel are white, means at or below
/// `black_max` on every channel are black. Everything in between is the dead
/// zone and reads as [`Cell::Empty`]: an ambiguous colour means "no piece".
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorThresholds {
    pub white_min: [f32; 3],
    pub black_max: [f32; 3],
}

impl Default for ColorThresholds {
    fn default() -> Self {
        Self {
            white_min: [200.0; 3],
            black_max: [50.0; 3],
        }
    }
}

impl ColorThresholds {
    pub fn classify(&self, mean: [f32; 3]) -> Cell {
        if (0..3).all(|c| mean[c] >= self.white_min[c]) {
            Cell::White
        } else if (0..3).all(|c| mean[c] <= self.black_max[c]) {
            Cell::Black
        } else {
            Cell::Empty
        }
    }

    /// `true` when `mean` falls between the black and white thresholds.
    pub fn is_dead_zone(&self, mean: [f32; 3]) -> bool {
        self.classify(mean) == Cell::Empty
    }
}
