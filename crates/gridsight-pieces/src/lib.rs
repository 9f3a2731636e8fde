//! Loose-piece locator: finds black and white pieces resting on a uniform
//! backdrop outside the board.
//!
//! The frame is segmented against the backdrop colour in HSV, cleaned with a
//! morphological opening and inverted. Outer contours of the remaining blobs
//! are kept when they are long enough, roughly square in extent and close to
//! circular. Each survivor is reported at its area centroid and classified
//! with the same colour thresholds as the board cells.

mod contour;
mod locate;
mod mask;

pub use contour::{min_enclosing_circle, polygon_moments, Moments};
pub use locate::{LoosePieceLocator, LoosePieceParams, LoosePieces, PieceCandidate};
pub use mask::{backdrop_mask, foreground_mask, rgb_to_hsv, HsvRange};
