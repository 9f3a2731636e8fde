use crate::MarkerDetection;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Corner role of a layout marker; the discriminant is the index into the
/// angle-sorted corner list and into [`Quad::corners`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuadRole {
    TopLeft = 0,
    TopRight = 1,
    BottomRight = 2,
    BottomLeft = 3,
}

impl QuadRole {
    pub const ALL: [QuadRole; 4] = [
        QuadRole::TopLeft,
        QuadRole::TopRight,
        QuadRole::BottomRight,
        QuadRole::BottomLeft,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Which marker id sits at which board corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuadLayout {
    pub top_left: u32,
    pub top_right: u32,
    pub bottom_right: u32,
    pub bottom_left: u32,
}

impl Default for QuadLayout {
    fn default() -> Self {
        Self {
            top_left: 24,
            top_right: 26,
            bottom_right: 21,
            bottom_left: 29,
        }
    }
}

impl QuadLayout {
    pub fn id(&self, role: QuadRole) -> u32 {
        match role {
            QuadRole::TopLeft => self.top_left,
            QuadRole::TopRight => self.top_right,
            QuadRole::BottomRight => self.bottom_right,
            QuadRole::BottomLeft => self.bottom_left,
        }
    }
}

/// Accepted marker extent in pixels, inclusive on both ends.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerSizeBounds {
    /// Minimum `[width, height]`.
    pub min: [f64; 2],
    /// Maximum `[width, height]`.
    pub max: [f64; 2],
}

impl Default for MarkerSizeBounds {
    fn default() -> Self {
        Self {
            min: [30.0, 30.0],
            max: [200.0, 200.0],
        }
    }
}

impl MarkerSizeBounds {
    pub fn contains(&self, width: f64, height: f64) -> bool {
        (self.min[0]..=self.max[0]).contains(&width)
            && (self.min[1]..=self.max[1]).contains(&height)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadParams {
    pub layout: QuadLayout,
    pub size: MarkerSizeBounds,
}

/// Board quad in image space, ordered TL, TR, BR, BL.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub corners: [Point2<f64>; 4],
}

impl Quad {
    #[inline]
    pub fn corner(&self, role: QuadRole) -> Point2<f64> {
        self.corners[role.index()]
    }

    /// Smallest triangle area over every triple of corners, relative to the
    /// squared longest side. Zero for collinear triples.
    pub fn min_relative_triangle_area(&self) -> f64 {
        let c = &self.corners;
        let mut longest = 0.0_f64;
        for i in 0..4 {
            for j in (i + 1)..4 {
                longest = longest.max((c[i] - c[j]).norm_squared());
            }
        }
        if longest <= 0.0 || !longest.is_finite() {
            return 0.0;
        }
        const TRIPLES: [[usize; 3]; 4] = [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];
        TRIPLES
            .iter()
            .map(|&[a, b, d]| {
                let u = c[b] - c[a];
                let v = c[d] - c[a];
                0.5 * (u.x * v.y - u.y * v.x).abs() / longest
            })
            .fold(f64::INFINITY, f64::min)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum QuadError {
    #[error("board markers missing: {missing:?}")]
    MarkerSetIncomplete { missing: Vec<u32> },
    #[error("marker {id} size {width:.1}x{height:.1} px is outside the accepted range")]
    MarkerSizeOutOfRange { id: u32, width: f64, height: f64 },
}

/// Sort four corners by their angle around the centroid (`atan2(dy, dx)`,
/// ascending, stable on ties).
///
/// With image Y pointing down and a roughly upright marker this yields
/// TL, TR, BR, BL. The order is only meaningful for a fixed, non-rotating
/// camera mount.
pub fn sort_corners_by_angle(corners: &[Point2<f64>; 4]) -> [Point2<f64>; 4] {
    let cx = corners.iter().map(|p| p.x).sum::<f64>() / 4.0;
    let cy = corners.iter().map(|p| p.y).sum::<f64>() / 4.0;
    let mut keyed: Vec<(f64, Point2<f64>)> = corners
        .iter()
        .map(|p| ((p.y - cy).atan2(p.x - cx), *p))
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    [keyed[0].1, keyed[1].1, keyed[2].1, keyed[3].1]
}

/// Build the board quad from one frame's detections.
///
/// Detections outside the size window are discarded first. A layout id with
/// no detection at all makes the set incomplete; a layout id seen only at an
/// implausible size is reported as out of range. For duplicate ids the first
/// in-range detection wins.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(detections, params), fields(n = detections.len()))
)]
pub fn build_quad(detections: &[MarkerDetection], params: &QuadParams) -> Result<Quad, QuadError> {
    let mut missing = Vec::new();
    let mut rejected = None;
    let mut picked: [Option<&MarkerDetection>; 4] = [None; 4];

    for role in QuadRole::ALL {
        let id = params.layout.id(role);
        let mut seen = false;
        for det in detections.iter().filter(|d| d.id == id) {
            seen = true;
            let (w, h) = det.extent();
            if params.size.contains(w, h) {
                picked[role.index()] = Some(det);
                break;
            }
            log::debug!("marker {id} rejected by size: {w:.1}x{h:.1}");
            rejected.get_or_insert(QuadError::MarkerSizeOutOfRange {
                id,
                width: w,
                height: h,
            });
        }
        if !seen {
            missing.push(id);
        }
    }

    if !missing.is_empty() {
        return Err(QuadError::MarkerSetIncomplete { missing });
    }

    let mut corners = [Point2::origin(); 4];
    for role in QuadRole::ALL {
        let Some(det) = picked[role.index()] else {
            return Err(rejected.unwrap_or(QuadError::MarkerSetIncomplete {
                missing: vec![params.layout.id(role)],
            }));
        };
        corners[role.index()] = sort_corners_by_angle(&det.corners)[role.index()];
    }

    Ok(Quad { corners })
}
