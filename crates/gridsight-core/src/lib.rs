//! Core types and utilities for the gridsight board-vision pipeline.
//!
//! This crate is intentionally small and purely geometric. It does *not*
//! depend on any camera, marker decoder or concrete image library.

mod color;
mod frames;
mod homography;
mod image;
mod logger;

pub use color::{Cell, ColorThresholds};
pub use frames::{CoordinateChain, CoordinateFrame, WorkspaceMap, WorkspaceMapError};
pub use homography::{homography_from_4pt, Homography};
pub use image::{mean_color_in_square, RgbImage, RgbImageView};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
