use gridsight_core::RgbImageView;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// One decoded fiducial marker, in image pixel coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerDetection {
    pub id: u32,
    /// Marker corners, in whatever order the decoder produced them.
    pub corners: [Point2<f64>; 4],
    pub center: Point2<f64>,
}

impl MarkerDetection {
    /// Build a detection whose center is the corner centroid.
    pub fn from_corners(id: u32, corners: [Point2<f64>; 4]) -> Self {
        let cx = corners.iter().map(|p| p.x).sum::<f64>() / 4.0;
        let cy = corners.iter().map(|p| p.y).sum::<f64>() / 4.0;
        Self {
            id,
            corners,
            center: Point2::new(cx, cy),
        }
    }

    /// Axis-aligned bounding extent `(width, height)` of the corners.
    pub fn extent(&self) -> (f64, f64) {
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in &self.corners {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        (max_x - min_x, max_y - min_y)
    }
}

/// External marker decoder: one call per frame.
pub trait MarkerDetector {
    fn detect(&self, frame: &RgbImageView<'_>) -> Vec<MarkerDetection>;
}

impl<F> MarkerDetector for F
where
    F: Fn(&RgbImageView<'_>) -> Vec<MarkerDetection>,
{
    fn detect(&self, frame: &RgbImageView<'_>) -> Vec<MarkerDetection> {
        self(frame)
    }
}

/// A fixed list of detections, returned for every frame.
impl MarkerDetector for [MarkerDetection] {
    fn detect(&self, _frame: &RgbImageView<'_>) -> Vec<MarkerDetection> {
        self.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_ignores_corner_order() {
        let det = MarkerDetection::from_corners(
            7,
            [
                Point2::new(140.0, 60.0),
                Point2::new(100.0, 20.0),
                Point2::new(100.0, 60.0),
                Point2::new(140.0, 20.0),
            ],
        );
        assert_eq!(det.extent(), (40.0, 40.0));
        assert_eq!(det.center, Point2::new(120.0, 40.0));
    }

    #[test]
    fn serializes_points_as_pairs() {
        let det = MarkerDetection::from_corners(3, [Point2::new(0.0, 0.0); 4]);
        let json = serde_json::to_value(&det).unwrap();
        assert_eq!(json["corners"][0], serde_json::json!([0.0, 0.0]));
        let back: MarkerDetection = serde_json::from_value(json).unwrap();
        assert_eq!(back, det);
    }
}
