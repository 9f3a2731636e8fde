//! Shape measurements on traced contours.

use imageproc::geometry::{arc_length, convex_hull};
use imageproc::point::Point;
use nalgebra::Point2;

/// Zeroth and first polygon moments of a closed contour.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl Moments {
    /// Area-weighted centroid; `None` for a zero-area contour.
    pub fn centroid(&self) -> Option<Point2<f64>> {
        if self.m00.abs() <= f64::EPSILON {
            return None;
        }
        Some(Point2::new(self.m10 / self.m00, self.m01 / self.m00))
    }
}

/// Moments of the polygon through `points` (Green's theorem). Orientation
/// is normalised so `m00` is the non-negative area.
pub fn polygon_moments(points: &[Point<i32>]) -> Moments {
    let n = points.len();
    let (mut a, mut cx, mut cy) = (0.0, 0.0, 0.0);
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        let (x0, y0, x1, y1) = (p.x as f64, p.y as f64, q.x as f64, q.y as f64);
        let cross = x0 * y1 - x1 * y0;
        a += cross;
        cx += (x0 + x1) * cross;
        cy += (y0 + y1) * cross;
    }
    let sign = if a < 0.0 { -1.0 } else { 1.0 };
    Moments {
        m00: sign * a / 2.0,
        m10: sign * cx / 6.0,
        m01: sign * cy / 6.0,
    }
}

/// Bounding box `(x0, y0, width, height)` in whole pixels, both ends inclusive.
pub fn bounding_box(points: &[Point<i32>]) -> Option<(i32, i32, i32, i32)> {
    let first = points.first()?;
    let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
    for p in points {
        x0 = x0.min(p.x);
        y0 = y0.min(p.y);
        x1 = x1.max(p.x);
        y1 = y1.max(p.y);
    }
    Some((x0, y0, x1 - x0 + 1, y1 - y0 + 1))
}

pub fn perimeter(points: &[Point<i32>]) -> f64 {
    arc_length(points, true)
}

/// Smallest circle `(center, radius)` enclosing every point.
pub fn min_enclosing_circle(points: &[Point<i32>]) -> Option<(Point2<f64>, f64)> {
    let hull: Vec<Point2<f64>> = convex_hull(points)
        .into_iter()
        .map(|p| Point2::new(p.x as f64, p.y as f64))
        .collect();
    let first = *hull.first()?;

    let mut circle = (first, 0.0);
    for i in 1..hull.len() {
        if encloses(circle, hull[i]) {
            continue;
        }
        circle = (hull[i], 0.0);
        for j in 0..i {
            if encloses(circle, hull[j]) {
                continue;
            }
            circle = circle_from_two(hull[i], hull[j]);
            for k in 0..j {
                if !encloses(circle, hull[k]) {
                    circle = circle_from_three(hull[i], hull[j], hull[k])
                        .unwrap_or_else(|| widest_pair(hull[i], hull[j], hull[k]));
                }
            }
        }
    }
    Some(circle)
}

fn encloses((c, r): (Point2<f64>, f64), p: Point2<f64>) -> bool {
    (p - c).norm() <= r + 1e-7
}

fn circle_from_two(a: Point2<f64>, b: Point2<f64>) -> (Point2<f64>, f64) {
    let c = nalgebra::center(&a, &b);
    (c, (a - c).norm())
}

fn circle_from_three(a: Point2<f64>, b: Point2<f64>, c: Point2<f64>) -> Option<(Point2<f64>, f64)> {
    let (bx, by) = (b.x - a.x, b.y - a.y);
    let (cx, cy) = (c.x - a.x, c.y - a.y);
    let d = 2.0 * (bx * cy - by * cx);
    if d.abs() < 1e-12 {
        return None;
    }
    let b2 = bx * bx + by * by;
    let c2 = cx * cx + cy * cy;
    let ux = (cy * b2 - by * c2) / d;
    let uy = (bx * c2 - cx * b2) / d;
    Some((Point2::new(a.x + ux, a.y + uy), (ux * ux + uy * uy).sqrt()))
}

// Collinear triple: the circle on the two farthest points covers all three.
fn widest_pair(a: Point2<f64>, b: Point2<f64>, c: Point2<f64>) -> (Point2<f64>, f64) {
    [circle_from_two(a, b), circle_from_two(a, c), circle_from_two(b, c)]
        .into_iter()
        .fold((a, 0.0), |best, cand| if cand.1 > best.1 { cand } else { best })
}

/// Even-odd test of the pixel center `(x, y)` against the contour polygon.
pub fn contains(points: &[Point<i32>], x: f64, y: f64) -> bool {
    let n = points.len();
    let mut inside = false;
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let (xi, yi) = (points[i].x as f64, points[i].y as f64);
        let (xj, yj) = (points[j].x as f64, points[j].y as f64);
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn square(x0: i32, y0: i32, side: i32) -> Vec<Point<i32>> {
        vec![
            Point::new(x0, y0),
            Point::new(x0 + side, y0),
            Point::new(x0 + side, y0 + side),
            Point::new(x0, y0 + side),
        ]
    }

    #[test]
    fn moments_ignore_orientation() {
        let cw = square(10, 20, 10);
        let mut ccw = cw.clone();
        ccw.reverse();
        for pts in [cw, ccw] {
            let m = polygon_moments(&pts);
            assert_abs_diff_eq!(m.m00, 100.0, epsilon = 1e-9);
            let c = m.centroid().unwrap();
            assert_abs_diff_eq!(c.x, 15.0, epsilon = 1e-9);
            assert_abs_diff_eq!(c.y, 25.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn flat_contour_has_no_centroid() {
        let line = vec![Point::new(0, 0), Point::new(10, 0), Point::new(20, 0)];
        assert!(polygon_moments(&line).centroid().is_none());
    }

    #[test]
    fn enclosing_circle_of_square_passes_through_corners() {
        let (c, r) = min_enclosing_circle(&square(0, 0, 10)).unwrap();
        assert_abs_diff_eq!(c.x, 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(c.y, 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(r, 50f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn enclosing_circle_of_triangle() {
        let pts = vec![Point::new(0, 0), Point::new(8, 0), Point::new(4, 3)];
        let (c, r) = min_enclosing_circle(&pts).unwrap();
        // Obtuse at the apex: the longest side is the diameter.
        assert_abs_diff_eq!(c.x, 4.0, epsilon = 1e-9);
        assert_abs_diff_eq!(c.y, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(r, 4.0, epsilon = 1e-9);
    }

    #[test]
    fn bbox_and_perimeter() {
        let sq = square(3, 4, 9);
        assert_eq!(bounding_box(&sq), Some((3, 4, 10, 10)));
        assert_abs_diff_eq!(perimeter(&sq), 36.0, epsilon = 1e-9);
        assert_eq!(bounding_box(&[]), None);
    }

    #[test]
    fn point_in_polygon() {
        let sq = square(0, 0, 10);
        assert!(contains(&sq, 5.0, 5.0));
        assert!(!contains(&sq, 15.0, 5.0));
        assert!(!contains(&sq, 5.0, -1.0));
    }
}
