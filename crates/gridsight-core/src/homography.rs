use nalgebra::{Matrix3, Point2, SMatrix, SVector, Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// Homogeneous coordinates with `|w|` below this are treated as points at infinity.
const W_EPS: f64 = 1e-12;

/// A planar projective transform `p_dst ~ H * p_src`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    pub fn from_array(rows: [[f64; 3]; 3]) -> Self {
        Self::new(Matrix3::from_row_slice(&[
            rows[0][0], rows[0][1], rows[0][2], rows[1][0], rows[1][1], rows[1][2], rows[2][0],
            rows[2][1], rows[2][2],
        ]))
    }

    pub fn to_array(&self) -> [[f64; 3]; 3] {
        [
            [self.h[(0, 0)], self.h[(0, 1)], self.h[(0, 2)]],
            [self.h[(1, 0)], self.h[(1, 1)], self.h[(1, 2)]],
            [self.h[(2, 0)], self.h[(2, 1)], self.h[(2, 2)]],
        ]
    }

    /// Map a point, returning `None` when it lands on the line at infinity.
    #[inline]
    pub fn try_apply(&self, p: Point2<f64>) -> Option<Point2<f64>> {
        let v = self.h * Vector3::new(p.x, p.y, 1.0);
        let w = v[2];
        if !w.is_finite() || w.abs() < W_EPS {
            return None;
        }
        Some(Point2::new(v[0] / w, v[1] / w))
    }

    /// Map a point with an unchecked homogeneous divide.
    #[inline]
    pub fn apply(&self, p: Point2<f64>) -> Point2<f64> {
        let v = self.h * Vector3::new(p.x, p.y, 1.0);
        Point2::new(v[0] / v[2], v[1] / v[2])
    }

    pub fn determinant(&self) -> f64 {
        self.h.determinant()
    }

    pub fn inverse(&self) -> Option<Self> {
        self.h.try_inverse().map(Self::new)
    }
}

/// Similarity that moves four points to their centroid and scales them to a
/// mean distance of sqrt(2) (Hartley conditioning).
struct Conditioning {
    t: Matrix3<f64>,
    points: [Point2<f64>; 4],
}

impl Conditioning {
    fn of(pts: &[Point2<f64>; 4]) -> Self {
        let centroid = Point2::from(pts.iter().map(|p| p.coords).sum::<Vector2<f64>>() / 4.0);
        let spread = pts.iter().map(|p| (p - centroid).norm()).sum::<f64>() / 4.0;
        let s = if spread > 1e-12 {
            std::f64::consts::SQRT_2 / spread
        } else {
            1.0
        };
        let t = Matrix3::new(
            s, 0.0, -s * centroid.x, //
            0.0, s, -s * centroid.y, //
            0.0, 0.0, 1.0,
        );
        let points = pts.map(|p| Point2::from((p - centroid) * s));
        Self { t, points }
    }
}

/// Compute H such that: dst ~ H * src (projective), using 4 point correspondences.
///
/// Corner order must be consistent between `src` and `dst`. Returns `None`
/// when the linear system is singular (e.g. collinear input).
pub fn homography_from_4pt(src: &[Point2<f64>; 4], dst: &[Point2<f64>; 4]) -> Option<Homography> {
    // Eight unknowns with h33 fixed to 1. Each pair (x, y) -> (u, v) gives
    //   h11 x + h12 y + h13 - h31 x u - h32 y u = u
    //   h21 x + h22 y + h23 - h31 x v - h32 y v = v
    let src_c = Conditioning::of(src);
    let dst_c = Conditioning::of(dst);

    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();
    for (k, (p, q)) in src_c.points.iter().zip(&dst_c.points).enumerate() {
        let (x, y) = (p.x, p.y);
        for (row, target, offset) in [(2 * k, q.x, 0), (2 * k + 1, q.y, 3)] {
            a[(row, offset)] = x;
            a[(row, offset + 1)] = y;
            a[(row, offset + 2)] = 1.0;
            a[(row, 6)] = -x * target;
            a[(row, 7)] = -y * target;
            b[row] = target;
        }
    }

    let x = a.lu().solve(&b)?;
    if x.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let hn = Matrix3::<f64>::new(
        x[0], x[1], x[2], //
        x[3], x[4], x[5], //
        x[6], x[7], 1.0,
    );

    let h = dst_c.t.try_inverse()? * hn * src_c.t;
    let scale = h[(2, 2)];
    if !scale.is_finite() || scale.abs() < W_EPS {
        return None;
    }
    Some(Homography::new(h / scale))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Point2<f64>, b: Point2<f64>, tol: f64) {
        let dx = (a.x - b.x).abs();
        let dy = (a.y - b.y).abs();
        assert!(
            dx < tol && dy < tol,
            "expected ({:.6},{:.6}) ~ ({:.6},{:.6}) within {}",
            a.x,
            a.y,
            b.x,
            b.y,
            tol
        );
    }

    #[test]
    fn inverse_round_trips_points() {
        let h = Homography::new(Matrix3::new(
            1.2, 0.1, 5.0, //
            -0.05, 0.9, 3.0, //
            0.001, 0.0005, 1.0,
        ));
        let inv = h.inverse().expect("invertible");

        for p in [
            Point2::new(0.0, 0.0),
            Point2::new(50.0, -20.0),
            Point2::new(320.0, 200.0),
        ] {
            let q = h.apply(p);
            let back = inv.apply(q);
            assert_close(back, p, 1e-9);
        }
    }

    #[test]
    fn four_point_solve_recovers_h() {
        let ground_truth = Homography::new(Matrix3::new(
            0.8, 0.05, 120.0, //
            -0.02, 1.1, 80.0, //
            0.0009, -0.0004, 1.0,
        ));

        let rect = [
            Point2::new(0.0, 0.0),
            Point2::new(180.0, 0.0),
            Point2::new(180.0, 130.0),
            Point2::new(0.0, 130.0),
        ];
        let dst = rect.map(|p| ground_truth.apply(p));

        let recovered = homography_from_4pt(&rect, &dst).expect("recoverable");

        for p in [
            Point2::new(0.0, 0.0),
            Point2::new(60.0, 40.0),
            Point2::new(150.0, 120.0),
        ] {
            assert_close(recovered.apply(p), ground_truth.apply(p), 1e-6);
        }
    }

    #[test]
    fn collinear_source_has_no_solution() {
        let src = [
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(20.0, 0.0),
            Point2::new(30.0, 0.0),
        ];
        let dst = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        assert!(homography_from_4pt(&src, &dst).is_none());
    }

    #[test]
    fn point_at_infinity_is_rejected() {
        let h = Homography::from_array([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]]);
        assert!(h.try_apply(Point2::new(0.0, 5.0)).is_none());
        assert!(h.try_apply(Point2::new(2.0, 5.0)).is_some());
    }

    #[test]
    fn array_round_trip() {
        let rows = [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];
        assert_eq!(Homography::from_array(rows).to_array(), rows);
    }
}
