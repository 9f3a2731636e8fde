//! Fiducial marker detections and the board quad built from them.
//!
//! This crate does **not** decode markers. A decoder (AprilTag, ArUco, ...)
//! plugs in through [`MarkerDetector`] and hands over one [`MarkerDetection`]
//! per tag: its id, four corners in arbitrary order and its center.
//!
//! [`build_quad`] picks the four layout markers out of a frame's detections,
//! rejects decode noise by marker size, and returns the board quad ordered
//! top-left, top-right, bottom-right, bottom-left.

mod marker;
mod quad;

pub use marker::{MarkerDetection, MarkerDetector};
pub use quad::{
    build_quad, sort_corners_by_angle, MarkerSizeBounds, Quad, QuadError, QuadLayout, QuadParams,
    QuadRole,
};
