//! Cutting planar shapes with a straight line.

use tessel_kernel_math::{Point2, Vec2};

use crate::boolean::{boolean_operation, BooleanOp, BooleanSettings};
use crate::error::{PolygonError, Result};
use crate::path::ResultPath;
use crate::polygon::Polygon;

/// The two halves of a shape cut by a line.
#[derive(Debug, Clone, Default)]
pub struct LineSlice {
    /// Part with `p · direction <= distance`.
    pub before: Vec<ResultPath>,
    /// Part with `p · direction >= distance`.
    pub beyond: Vec<ResultPath>,
}

/// Cut `shape` by the line of points `p` with `p · direction == distance`.
///
/// Both halves come back closed and nested like any Boolean result. A
/// positive `offset` moves the cut away from each returned half, so
/// `before` extends to `distance + offset` and `beyond` starts at
/// `distance - offset`; a negative one leaves a gap between them.
pub fn slice_on_line(
    shape: &[Polygon],
    direction: Vec2,
    distance: f64,
    offset: f64,
    settings: &BooleanSettings,
) -> Result<LineSlice> {
    let norm = direction.norm();
    if norm <= settings.tolerance {
        return Err(PolygonError::InvalidDirection { direction });
    }
    let dir = direction / norm;
    let distance = distance / norm;

    let reach = shape
        .iter()
        .flat_map(|p| p.points.iter())
        .map(|p| p.coords.norm())
        .fold(0.0_f64, f64::max);
    let extent = 2.0 * (reach + distance.abs() + offset.abs()) + 1.0;

    let before = half_plane(dir, distance + offset, -1.0, extent);
    let beyond = half_plane(dir, distance - offset, 1.0, extent);
    Ok(LineSlice {
        before: boolean_operation(shape, &[before], BooleanOp::Intersection, settings)?,
        beyond: boolean_operation(shape, &[beyond], BooleanOp::Intersection, settings)?,
    })
}

/// A rectangle standing in for the half-plane on `side` of the line,
/// large enough to cover everything within `extent` of the origin.
fn half_plane(dir: Vec2, distance: f64, side: f64, extent: f64) -> Polygon {
    let along = Vec2::new(-dir.y, dir.x) * extent;
    let on_line = Point2::from(dir * distance);
    let far = on_line + dir * (side * extent);
    let mut rect = Polygon::new(vec![on_line - along, on_line + along, far + along, far - along]);
    rect.ensure_ccw();
    rect
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn area(paths: &[ResultPath]) -> f64 {
        paths.iter().map(|p| p.polygon.signed_area()).sum()
    }

    fn square(size: f64) -> Vec<Polygon> {
        vec![Polygon::from_coords(&[[0.0, 0.0], [size, 0.0], [size, size], [0.0, size]])]
    }

    #[test]
    fn test_vertical_cut_splits_area() {
        let cut = slice_on_line(&square(4.0), Vec2::new(1.0, 0.0), 1.0, 0.0, &BooleanSettings::default()).unwrap();
        assert_relative_eq!(area(&cut.before), 4.0, epsilon = 1e-9);
        assert_relative_eq!(area(&cut.beyond), 12.0, epsilon = 1e-9);
        assert!(cut.before.iter().all(|p| p.polygon.points.iter().all(|q| q.x <= 1.0 + 1e-9)));
    }

    #[test]
    fn test_diagonal_cut_through_hole() {
        let mut shape = square(10.0);
        shape.push(Polygon::from_coords(&[[4.0, 4.0], [4.0, 6.0], [6.0, 6.0], [6.0, 4.0]]));
        let dir = Vec2::new(1.0, 1.0);
        // the line x + y = 10 passes through the centre of the hole
        let cut = slice_on_line(&shape, dir, 10.0, 0.0, &BooleanSettings::default()).unwrap();
        assert_relative_eq!(area(&cut.before), 48.0, epsilon = 1e-9);
        assert_relative_eq!(area(&cut.beyond), 48.0, epsilon = 1e-9);
    }

    #[test]
    fn test_offset_moves_cut_away_from_each_half() {
        let cut = slice_on_line(&square(4.0), Vec2::new(0.0, 1.0), 2.0, 0.5, &BooleanSettings::default()).unwrap();
        assert_relative_eq!(area(&cut.before), 10.0, epsilon = 1e-9);
        assert_relative_eq!(area(&cut.beyond), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_line_missing_shape() {
        let cut = slice_on_line(&square(1.0), Vec2::new(1.0, 0.0), 5.0, 0.0, &BooleanSettings::default()).unwrap();
        assert_relative_eq!(area(&cut.before), 1.0, epsilon = 1e-9);
        assert!(cut.beyond.is_empty());
    }

    #[test]
    fn test_zero_direction_is_rejected() {
        let err = slice_on_line(&square(1.0), Vec2::zeros(), 0.0, 0.0, &BooleanSettings::default()).unwrap_err();
        assert!(matches!(err, PolygonError::InvalidDirection { .. }));
    }
}
