//! Fuzzy ring simplification.

use tessel_kernel_math::Tolerance;

use crate::polygon::Polygon;

/// Maximum relative area change a simplification may cause.
const AREA_CONFIDENCE: f64 = 1e-3;

/// Simplify every ring in a set with the given tolerance.
pub fn simplify(polygons: &[Polygon], tol: &Tolerance) -> Vec<Polygon> {
    polygons.iter().map(|p| simplify_polygon(p, tol)).collect()
}

/// Remove negligible edges and merge collinear runs of a ring.
///
/// A point is dropped when the edge reaching it is shorter than
/// `tol.linear` or when it lies on the line through its neighbours.
/// Rings with fewer than four points are returned as they are, and so is
/// any ring whose area the simplification would change by more than
/// 0.1% or reduce to nothing.
pub fn simplify_polygon(polygon: &Polygon, tol: &Tolerance) -> Polygon {
    if polygon.len() < 4 {
        return polygon.clone();
    }
    let mut points = polygon.points.clone();
    let mut i = 0;
    let mut unchanged = 0;
    while points.len() >= 3 && unchanged < points.len() {
        let n = points.len();
        let (a, b, c) = (points[i % n], points[(i + 1) % n], points[(i + 2) % n]);
        if tol.points_equal_2d(&a, &b) || tol.collinear(&a, &c, &b) {
            points.remove((i + 1) % n);
            unchanged = 0;
            i = i.min(points.len().saturating_sub(1));
        } else {
            i = (i + 1) % n;
            unchanged += 1;
        }
    }

    let simplified = Polygon::new(points);
    let before = polygon.signed_area();
    let after = simplified.signed_area();
    if simplified.len() < 3 || tol.is_zero(after) || (before - after).abs() > (before * AREA_CONFIDENCE).abs() {
        return polygon.clone();
    }
    simplified
}
