//! Directed planar segments and segment intersection.

use tessel_kernel_math::{Point2, Tolerance, Vec2};

/// A directed segment between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    /// Start point.
    pub from: Point2,
    /// End point.
    pub to: Point2,
}

impl Line {
    /// Segment `from → to`.
    pub fn new(from: Point2, to: Point2) -> Self {
        Self { from, to }
    }

    /// Direction vector `to - from`.
    pub fn vector(&self) -> Vec2 {
        self.to - self.from
    }

    /// Segment length.
    pub fn length(&self) -> f64 {
        self.vector().norm()
    }

    /// `dy / dx`; infinite for vertical lines.
    pub fn slope(&self) -> f64 {
        let v = self.vector();
        if v.x == 0.0 {
            f64::INFINITY
        } else {
            v.y / v.x
        }
    }

    /// Where the supporting line crosses `x = 0`; `None` when vertical.
    pub fn y_intercept(&self) -> Option<f64> {
        if self.is_vertical() {
            None
        } else {
            Some(self.from.y - self.slope() * self.from.x)
        }
    }

    /// Both endpoints share an x.
    pub fn is_vertical(&self) -> bool {
        self.from.x == self.to.x
    }

    /// Both endpoints share a y.
    pub fn is_horizontal(&self) -> bool {
        self.from.y == self.to.y
    }

    /// Y of the supporting line at `x`; `None` for vertical lines.
    pub fn y_given_x(&self, x: f64) -> Option<f64> {
        self.y_intercept().map(|b| self.slope() * x + b)
    }

    /// X of the supporting line at `y`; `None` for horizontal lines.
    pub fn x_given_y(&self, y: f64) -> Option<f64> {
        if self.is_horizontal() {
            return None;
        }
        let v = self.vector();
        Some(self.from.x + (y - self.from.y) * v.x / v.y)
    }
}

/// How two segments meet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentIntersection {
    /// Disjoint.
    None,
    /// A single shared point, snapped to an endpoint when within tolerance.
    Point(Point2),
    /// Collinear overlap between two distinct points.
    Overlap(Point2, Point2),
}

/// Lexicographic (x, then y) order used by the sweep.
pub(crate) fn lex_less(a: &Point2, b: &Point2) -> bool {
    a.x < b.x || (a.x == b.x && a.y < b.y)
}

/// Intersect segments `a1-a2` and `b1-b2`.
///
/// Collinearity uses [`Tolerance::collinear`]. Crossing points within
/// tolerance of an endpoint are returned as that exact endpoint, so
/// splitting never creates slivers.
pub fn line_intercept(a1: &Point2, a2: &Point2, b1: &Point2, b2: &Point2, tol: &Tolerance) -> SegmentIntersection {
    let va = a2 - a1;
    let vb = b2 - b1;
    let len_a = va.norm();
    let len_b = vb.norm();
    if len_a < tol.linear || len_b < tol.linear {
        return SegmentIntersection::None;
    }

    if tol.collinear(a1, a2, b1) && tol.collinear(a1, a2, b2) {
        return collinear_overlap(a1, a2, b1, b2, tol);
    }

    let kross = va.x * vb.y - va.y * vb.x;
    if kross == 0.0 {
        return SegmentIntersection::None;
    }
    let e = b1 - a1;
    let s = (e.x * vb.y - e.y * vb.x) / kross;
    let t = (e.x * va.y - e.y * va.x) / kross;
    let eps_a = tol.linear / len_a;
    let eps_b = tol.linear / len_b;
    if s < -eps_a || s > 1.0 + eps_a || t < -eps_b || t > 1.0 + eps_b {
        return SegmentIntersection::None;
    }

    let p = a1 + va * s;
    for end in [a1, a2, b1, b2] {
        if tol.points_equal_2d(&p, end) {
            return SegmentIntersection::Point(*end);
        }
    }
    SegmentIntersection::Point(p)
}

fn collinear_overlap(a1: &Point2, a2: &Point2, b1: &Point2, b2: &Point2, tol: &Tolerance) -> SegmentIntersection {
    let (al, ar) = if lex_less(a1, a2) { (a1, a2) } else { (a2, a1) };
    let (bl, br) = if lex_less(b1, b2) { (b1, b2) } else { (b2, b1) };
    let start = if lex_less(al, bl) { bl } else { al };
    let end = if lex_less(ar, br) { ar } else { br };
    if tol.points_equal_2d(start, end) {
        return SegmentIntersection::Point(*start);
    }
    if lex_less(end, start) {
        return SegmentIntersection::None;
    }
    SegmentIntersection::Overlap(*start, *end)
}

/// True when `p` lies on segment `a-b` within tolerance, endpoints included.
pub fn is_point_on_segment(a: &Point2, b: &Point2, p: &Point2, tol: &Tolerance) -> bool {
    if !tol.collinear(a, b, p) {
        return false;
    }
    let v = b - a;
    let len_sq = v.norm_squared();
    if len_sq == 0.0 {
        return tol.points_equal_2d(a, p);
    }
    let t = (p - a).dot(&v) / len_sq;
    let slack = tol.linear / len_sq.sqrt();
    (-slack..=1.0 + slack).contains(&t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn test_slope_and_intercepts() {
        let l = Line::new(p(0.0, 1.0), p(2.0, 5.0));
        assert_relative_eq!(l.slope(), 2.0);
        assert_relative_eq!(l.y_intercept().unwrap(), 1.0);
        assert_relative_eq!(l.y_given_x(3.0).unwrap(), 7.0);
        assert_relative_eq!(l.x_given_y(3.0).unwrap(), 1.0);
        assert!(Line::new(p(1.0, 0.0), p(1.0, 3.0)).is_vertical());
        assert!(Line::new(p(1.0, 0.0), p(1.0, 3.0)).y_intercept().is_none());
    }

    #[test]
    fn test_crossing() {
        let tol = Tolerance::DEFAULT;
        let hit = line_intercept(&p(0.0, 0.0), &p(2.0, 2.0), &p(0.0, 2.0), &p(2.0, 0.0), &tol);
        assert_eq!(hit, SegmentIntersection::Point(p(1.0, 1.0)));
    }

    #[test]
    fn test_touch_snaps_to_endpoint() {
        let tol = Tolerance::DEFAULT;
        let hit = line_intercept(&p(0.0, 0.0), &p(2.0, 0.0), &p(1.0, 1e-9), &p(1.0, 3.0), &tol);
        assert_eq!(hit, SegmentIntersection::Point(p(1.0, 1e-9)));
    }

    #[test]
    fn test_disjoint_and_parallel() {
        let tol = Tolerance::DEFAULT;
        assert_eq!(
            line_intercept(&p(0.0, 0.0), &p(1.0, 0.0), &p(0.0, 1.0), &p(1.0, 1.0), &tol),
            SegmentIntersection::None
        );
        assert_eq!(
            line_intercept(&p(0.0, 0.0), &p(1.0, 1.0), &p(2.0, 0.0), &p(3.0, -5.0), &tol),
            SegmentIntersection::None
        );
    }

    #[test]
    fn test_collinear_overlap() {
        let tol = Tolerance::DEFAULT;
        let hit = line_intercept(&p(0.0, 0.0), &p(3.0, 0.0), &p(4.0, 0.0), &p(1.0, 0.0), &tol);
        assert_eq!(hit, SegmentIntersection::Overlap(p(1.0, 0.0), p(3.0, 0.0)));
        let touch = line_intercept(&p(0.0, 0.0), &p(1.0, 0.0), &p(1.0, 0.0), &p(2.0, 0.0), &tol);
        assert_eq!(touch, SegmentIntersection::Point(p(1.0, 0.0)));
    }

    #[test]
    fn test_point_on_segment() {
        let tol = Tolerance::DEFAULT;
        assert!(is_point_on_segment(&p(0.0, 0.0), &p(4.0, 4.0), &p(2.0, 2.0), &tol));
        assert!(is_point_on_segment(&p(0.0, 0.0), &p(4.0, 4.0), &p(4.0, 4.0), &tol));
        assert!(!is_point_on_segment(&p(0.0, 0.0), &p(4.0, 4.0), &p(5.0, 5.0), &tol));
        assert!(!is_point_on_segment(&p(0.0, 0.0), &p(4.0, 4.0), &p(2.0, 2.5), &tol));
    }
}
