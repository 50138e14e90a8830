//! Closed planar rings.

use serde::{Deserialize, Serialize};
use tessel_kernel_math::{Point2, Tolerance};

/// A closed polygon ring. The last point connects back to the first and
/// is not repeated.
///
/// Positive (counter-clockwise) rings bound material; negative
/// (clockwise) rings are holes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polygon {
    /// Vertices of the ring in order.
    pub points: Vec<Point2>,
}

impl Polygon {
    /// Create a new polygon from points.
    pub fn new(points: Vec<Point2>) -> Self {
        Self { points }
    }

    /// Build a ring from raw `[x, y]` pairs.
    pub fn from_coords(coords: &[[f64; 2]]) -> Self {
        Self::new(coords.iter().map(|c| Point2::new(c[0], c[1])).collect())
    }

    /// Raw `[x, y]` pairs, the inverse of [`Polygon::from_coords`].
    pub fn to_coords(&self) -> Vec<[f64; 2]> {
        self.points.iter().map(|p| [p.x, p.y]).collect()
    }

    /// Check if the polygon is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Directed edges `(from, to)` including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Point2, Point2)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    /// Signed area of the polygon.
    /// Positive for counter-clockwise, negative for clockwise.
    pub fn signed_area(&self) -> f64 {
        if self.points.len() < 3 {
            return 0.0;
        }
        self.edges().map(|(a, b)| a.x * b.y - b.x * a.y).sum::<f64>() / 2.0
    }

    /// Absolute area.
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Is the polygon counter-clockwise?
    pub fn is_ccw(&self) -> bool {
        self.signed_area() > 0.0
    }

    /// Reverse the winding order.
    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    /// Ensure counter-clockwise winding.
    pub fn ensure_ccw(&mut self) {
        if !self.is_ccw() {
            self.reverse();
        }
    }

    /// Ensure clockwise winding.
    pub fn ensure_cw(&mut self) {
        if self.is_ccw() {
            self.reverse();
        }
    }

    /// Copy wound counter-clockwise, as an outer boundary.
    pub fn ccw_positive(&self) -> Self {
        let mut p = self.clone();
        p.ensure_ccw();
        p
    }

    /// Copy wound clockwise, as a hole.
    pub fn cw_negative(&self) -> Self {
        let mut p = self.clone();
        p.ensure_cw();
        p
    }

    /// Perimeter length.
    pub fn perimeter(&self) -> f64 {
        if self.points.len() < 2 {
            return 0.0;
        }
        self.edges().map(|(a, b)| (b - a).norm()).sum()
    }

    /// Area centroid, or the vertex average for degenerate rings.
    pub fn centroid(&self) -> Point2 {
        if self.points.is_empty() {
            return Point2::origin();
        }
        let area = self.signed_area();
        if area.abs() < f64::EPSILON {
            let n = self.points.len() as f64;
            let sum = self
                .points
                .iter()
                .fold(Point2::origin(), |acc, p| Point2::new(acc.x + p.x, acc.y + p.y));
            return Point2::new(sum.x / n, sum.y / n);
        }
        let (mut cx, mut cy) = (0.0, 0.0);
        for (a, b) in self.edges() {
            let cross = a.x * b.y - b.x * a.y;
            cx += (a.x + b.x) * cross;
            cy += (a.y + b.y) * cross;
        }
        Point2::new(cx / (6.0 * area), cy / (6.0 * area))
    }

    /// Even-odd point containment. Points on the boundary may go either way.
    pub fn contains_point(&self, p: &Point2) -> bool {
        let mut inside = false;
        for (a, b) in self.edges() {
            if (a.y > p.y) != (b.y > p.y) {
                let x = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if p.x < x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Copy without consecutive duplicate points (including the closing pair).
    pub fn without_duplicate_points(&self, tol: &Tolerance) -> Self {
        let mut points: Vec<Point2> = Vec::with_capacity(self.points.len());
        for p in &self.points {
            if points.last().map_or(true, |q| !tol.points_equal_2d(p, q)) {
                points.push(*p);
            }
        }
        while points.len() > 1 && tol.points_equal_2d(&points[0], &points[points.len() - 1]) {
            points.pop();
        }
        Self::new(points)
    }
}

/// Sum of signed areas: outer rings add, holes subtract.
pub fn total_area(polygons: &[Polygon]) -> f64 {
    polygons.iter().map(Polygon::signed_area).sum()
}

/// Sum of ring perimeters.
pub fn total_perimeter(polygons: &[Polygon]) -> f64 {
    polygons.iter().map(Polygon::perimeter).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(x: f64, y: f64, size: f64) -> Polygon {
        Polygon::from_coords(&[[x, y], [x + size, y], [x + size, y + size], [x, y + size]])
    }

    #[test]
    fn test_signed_area_and_winding() {
        let mut p = square(0.0, 0.0, 2.0);
        assert_relative_eq!(p.signed_area(), 4.0);
        assert!(p.is_ccw());
        p.reverse();
        assert_relative_eq!(p.signed_area(), -4.0);
        p.ensure_ccw();
        assert!(p.is_ccw());
        assert!(!p.cw_negative().is_ccw());
    }

    #[test]
    fn test_perimeter_and_centroid() {
        let p = square(1.0, 1.0, 2.0);
        assert_relative_eq!(p.perimeter(), 8.0);
        let c = p.centroid();
        assert_relative_eq!(c.x, 2.0);
        assert_relative_eq!(c.y, 2.0);
    }

    #[test]
    fn test_contains_point() {
        let p = square(0.0, 0.0, 2.0);
        assert!(p.contains_point(&Point2::new(1.0, 1.0)));
        assert!(!p.contains_point(&Point2::new(3.0, 1.0)));
    }

    #[test]
    fn test_without_duplicate_points() {
        let p = Polygon::from_coords(&[[0.0, 0.0], [1.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]);
        let clean = p.without_duplicate_points(&Tolerance::DEFAULT);
        assert_eq!(clean.len(), 3);
    }

    #[test]
    fn test_total_area_subtracts_holes() {
        let outer = square(0.0, 0.0, 4.0);
        let hole = square(1.0, 1.0, 2.0).cw_negative();
        assert_relative_eq!(total_area(&[outer, hole]), 12.0);
    }
}
