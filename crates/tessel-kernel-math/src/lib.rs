#![warn(missing_docs)]

//! Math types for the tessel geometry kernel.
//!
//! Thin wrappers around nalgebra providing the points, vectors and
//! planes shared by the polygon Boolean engine and the mesh slicer,
//! plus the fuzzy comparisons every algorithm above agrees on.

use nalgebra::{Unit, Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A point in the plane.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in 2D space.
pub type Vec2 = Vector2<f64>;

/// Twice the signed area of the triangle `a, b, c`.
///
/// Positive when the points turn counter-clockwise.
pub fn cross_2d(a: &Point2, b: &Point2, c: &Point2) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Counter-clockwise angle from `from` to `to`, in `[0, 2π)`.
pub fn ccw_angle(from: &Vec2, to: &Vec2) -> f64 {
    let cross = from.x * to.y - from.y * to.x;
    let dot = from.dot(to);
    let angle = cross.atan2(dot);
    if angle < 0.0 {
        angle + std::f64::consts::TAU
    } else {
        angle
    }
}

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// Linear distance tolerance.
    pub linear: f64,
    /// Angular tolerance in radians.
    pub angular: f64,
}

impl Tolerance {
    /// Default tolerances (1e-6 linear, 1e-9 rad angular).
    pub const DEFAULT: Self = Self {
        linear: 1e-6,
        angular: 1e-9,
    };

    /// Tolerance with the given linear epsilon and the default angular one.
    pub fn linear(linear: f64) -> Self {
        Self {
            linear,
            ..Self::DEFAULT
        }
    }

    /// Check if two points are coincident within tolerance.
    pub fn points_equal(&self, a: &Point3, b: &Point3) -> bool {
        (a - b).norm() < self.linear
    }

    /// Check if two planar points are coincident within tolerance.
    pub fn points_equal_2d(&self, a: &Point2, b: &Point2) -> bool {
        (a - b).norm() < self.linear
    }

    /// Check if a scalar distance is effectively zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }

    /// Check if two angles are effectively equal (in radians).
    pub fn angles_equal(&self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.angular
    }

    /// The single collinearity predicate used across the kernel.
    ///
    /// `c` is collinear with the line through `a` and `b` when its
    /// perpendicular distance to that line is below `linear`. A
    /// degenerate `a, b` reduces to a point-equality test against `c`.
    pub fn collinear(&self, a: &Point2, b: &Point2, c: &Point2) -> bool {
        let length = (b - a).norm();
        if length < self.linear {
            return self.points_equal_2d(a, c);
        }
        (cross_2d(a, b, c) / length).abs() < self.linear
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// An oriented plane `{ p : normal · p = distance }`.
///
/// The positive side is the half-space the normal points into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// Unit normal.
    pub normal: Dir3,
    /// Signed distance from the origin along the normal.
    pub distance: f64,
}

impl Plane {
    /// Plane with the given unit normal and offset.
    pub fn new(normal: Dir3, distance: f64) -> Self {
        Self { normal, distance }
    }

    /// Plane through `point` with the given normal.
    pub fn from_point_normal(point: &Point3, normal: Dir3) -> Self {
        let distance = normal.dot(&point.coords);
        Self { normal, distance }
    }

    /// Plane from a raw normal, or `None` when the normal has no length.
    pub fn try_from_raw(normal: Vec3, distance: f64) -> Option<Self> {
        Dir3::try_new(normal, f64::EPSILON).map(|n| Self::new(n, distance))
    }

    /// Signed distance of `p` from the plane. Positive on the normal side.
    pub fn signed_distance(&self, p: &Point3) -> f64 {
        self.normal.dot(&p.coords) - self.distance
    }

    /// An orthonormal in-plane basis `(u, v)` with `u × v = normal`.
    pub fn basis(&self) -> (Vec3, Vec3) {
        let n = self.normal.into_inner();
        let helper = if n.x.abs() < 0.9 { Vec3::x() } else { Vec3::y() };
        let u = helper.cross(&n).normalize();
        let v = n.cross(&u);
        (u, v)
    }

    /// Project a point onto the plane's 2D coordinate frame.
    pub fn project(&self, p: &Point3) -> Point2 {
        let (u, v) = self.basis();
        Point2::new(u.dot(&p.coords), v.dot(&p.coords))
    }

    /// Lift planar coordinates back onto the plane.
    pub fn lift(&self, p: &Point2) -> Point3 {
        let (u, v) = self.basis();
        Point3::from(u * p.x + v * p.y + self.normal.into_inner() * self.distance)
    }

    /// Point where the segment `a → b` crosses the plane, found by
    /// interpolating the endpoint distances `da` and `db`.
    ///
    /// Returns `None` unless the endpoints lie strictly on opposite sides.
    pub fn segment_intersection(&self, a: &Point3, da: f64, b: &Point3, db: f64) -> Option<Point3> {
        if (da > 0.0) == (db > 0.0) || da == 0.0 || db == 0.0 {
            return None;
        }
        let t = da / (da - db);
        Some(a + (b - a) * t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_tolerance_points_equal() {
        let tol = Tolerance::DEFAULT;
        let a = Point3::new(1.0, 2.0, 3.0);
        let b = Point3::new(1.0 + 1e-7, 2.0, 3.0);
        assert!(tol.points_equal(&a, &b));
        let c = Point3::new(1.001, 2.0, 3.0);
        assert!(!tol.points_equal(&a, &c));
    }

    #[test]
    fn test_collinear_uses_perpendicular_distance() {
        let tol = Tolerance::linear(1e-3);
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1000.0, 0.0);
        assert!(tol.collinear(&a, &b, &Point2::new(500.0, 5e-4)));
        assert!(!tol.collinear(&a, &b, &Point2::new(500.0, 2e-3)));
        // far beyond the segment still counts: this is a line test
        assert!(tol.collinear(&a, &b, &Point2::new(-50.0, 0.0)));
    }

    #[test]
    fn test_collinear_degenerate_base() {
        let tol = Tolerance::DEFAULT;
        let a = Point2::new(1.0, 1.0);
        assert!(tol.collinear(&a, &a, &Point2::new(1.0, 1.0)));
        assert!(!tol.collinear(&a, &a, &Point2::new(2.0, 1.0)));
    }

    #[test]
    fn test_ccw_angle_range() {
        let x = Vec2::new(1.0, 0.0);
        assert_relative_eq!(ccw_angle(&x, &Vec2::new(0.0, 1.0)), FRAC_PI_2);
        assert_relative_eq!(ccw_angle(&x, &Vec2::new(-1.0, 0.0)), PI);
        assert_relative_eq!(ccw_angle(&x, &Vec2::new(0.0, -1.0)), 3.0 * FRAC_PI_2);
        assert_relative_eq!(ccw_angle(&x, &x), 0.0);
    }

    #[test]
    fn test_plane_signed_distance() {
        let plane = Plane::new(Dir3::new_normalize(Vec3::z()), 2.0);
        assert_relative_eq!(plane.signed_distance(&Point3::new(5.0, -3.0, 5.0)), 3.0);
        assert_relative_eq!(plane.signed_distance(&Point3::new(0.0, 0.0, 0.0)), -2.0);
    }

    #[test]
    fn test_plane_from_point_normal() {
        let n = Dir3::new_normalize(Vec3::new(1.0, 1.0, 0.0));
        let p = Point3::new(1.0, 1.0, 7.0);
        let plane = Plane::from_point_normal(&p, n);
        assert!(plane.signed_distance(&p).abs() < 1e-12);
        assert_relative_eq!(plane.distance, 2.0_f64.sqrt());
    }

    #[test]
    fn test_try_from_raw_rejects_zero_normal() {
        assert!(Plane::try_from_raw(Vec3::zeros(), 1.0).is_none());
        let plane = Plane::try_from_raw(Vec3::new(0.0, 0.0, 4.0), 1.0).unwrap();
        assert_relative_eq!(plane.normal.z, 1.0);
    }

    #[test]
    fn test_basis_is_right_handed() {
        for n in [Vec3::x(), Vec3::y(), Vec3::z(), Vec3::new(1.0, -2.0, 0.5)] {
            let plane = Plane::new(Dir3::new_normalize(n), 0.0);
            let (u, v) = plane.basis();
            assert!(u.dot(&v).abs() < 1e-12);
            assert!((u.cross(&v) - plane.normal.into_inner()).norm() < 1e-12);
        }
    }

    #[test]
    fn test_project_lift() {
        let plane = Plane::new(Dir3::new_normalize(Vec3::new(0.0, 1.0, 1.0)), 3.0);
        let p2 = Point2::new(2.5, -1.0);
        let p3 = plane.lift(&p2);
        assert!(plane.signed_distance(&p3).abs() < 1e-12);
        let back = plane.project(&p3);
        assert!((back - p2).norm() < 1e-12);
    }

    #[test]
    fn test_segment_intersection() {
        let plane = Plane::new(Dir3::new_normalize(Vec3::z()), 0.0);
        let a = Point3::new(0.0, 0.0, -1.0);
        let b = Point3::new(4.0, 0.0, 3.0);
        let hit = plane
            .segment_intersection(&a, plane.signed_distance(&a), &b, plane.signed_distance(&b))
            .unwrap();
        assert_relative_eq!(hit.x, 1.0);
        assert!(hit.z.abs() < 1e-12);

        let c = Point3::new(0.0, 0.0, 2.0);
        assert!(plane.segment_intersection(&b, 3.0, &c, 2.0).is_none());
    }
}
