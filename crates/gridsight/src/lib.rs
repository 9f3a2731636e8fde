//! High-level facade crate for the `gridsight-*` workspace.
//!
//! This crate provides:
//! - stable re-exports of the pipeline crates,
//! - JSON configuration for the whole pipeline ([`config`]),
//! - a latest-frame handoff between a capture thread and the pipeline ([`capture`]),
//! - (feature `image`) helpers that run the pipeline on `image::RgbImage` frames.
//!
//! ## Quickstart
//!
//! ```no_run
//! use gridsight::board::BoardPipeline;
//! use gridsight::config::GridsightConfig;
//! use gridsight::detect::{load_rgb, rgb_view};
//! use gridsight::fiducial::MarkerDetection;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = GridsightConfig::load_json("gridsight.json")?;
//! let frame = load_rgb("frame.png")?;
//! let markers: Vec<MarkerDetection> = Vec::new(); // from your marker decoder
//!
//! let mut pipeline = BoardPipeline::new(cfg.board)?;
//! let state = pipeline.poll(&rgb_view(&frame), markers.as_slice())?;
//! println!("board: {state}");
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `gridsight::core`: cells, colour thresholds, homographies, frames, image views.
//! - `gridsight::fiducial`: marker detections and the board quad.
//! - `gridsight::board`: calibration, cell classification, reconciliation, game FSM.
//! - `gridsight::pieces`: loose-piece location on the backdrop.
//! - `gridsight::detect` (feature `image`): image loading and piece location in robot coordinates.

pub use gridsight_board as board;
pub use gridsight_core as core;
pub use gridsight_fiducial as fiducial;
pub use gridsight_pieces as pieces;

pub use gridsight_board::{BoardPipeline, BoardState, Reconciliation};
pub use gridsight_core::{Cell, CoordinateFrame};

pub mod capture;
pub mod config;

#[cfg(feature = "image")]
pub mod detect;

/// Install a `tracing` subscriber and route `log` records into it.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let _ = tracing_log::LogTracer::init();
    gridsight_core::init_tracing(json);
}
