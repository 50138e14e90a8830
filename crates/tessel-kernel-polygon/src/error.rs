//! Error types for planar polygon operations.

use tessel_kernel_math::Point2;
use thiserror::Error;

use crate::boolean::BooleanOp;

/// Errors raised when an invariant of the Boolean sweep or of
/// triangulation is violated.
///
/// These indicate malformed input (self-intersections beyond tolerance)
/// or an algorithm bug, never degenerate-but-valid geometry, which is
/// filtered silently.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PolygonError {
    /// A right event reached the sweep line without its left partner in it.
    #[error("{op:?}: sweep line lost the segment ending at ({}, {})", point.x, point.y)]
    SweepLineCorrupted {
        /// Operation being computed.
        op: BooleanOp,
        /// Right endpoint of the missing segment.
        point: Point2,
    },

    /// One event of a result segment was collected without its partner.
    #[error("{op:?}: result segment at ({}, {}) is missing its partner event", point.x, point.y)]
    UnpairedResultEvent {
        /// Operation being computed.
        op: BooleanOp,
        /// Point of the orphaned event.
        point: Point2,
    },

    /// A result point is touched by an odd number of segment ends.
    #[error("{op:?}: point ({}, {}) appears {count} times in the result", point.x, point.y)]
    OddPointCount {
        /// Operation being computed.
        op: BooleanOp,
        /// Offending point.
        point: Point2,
        /// Number of result events at that point.
        count: usize,
    },

    /// Path reconstruction reached a point with no unused continuation.
    #[error("{op:?}: path {path_id} cannot be closed at ({}, {})", point.x, point.y)]
    PathNotClosed {
        /// Operation being computed.
        op: BooleanOp,
        /// Path under construction.
        path_id: usize,
        /// Dead-end point.
        point: Point2,
    },

    /// A cutting direction had no length.
    #[error("cutting direction ({}, {}) has zero length", direction.x, direction.y)]
    InvalidDirection {
        /// The rejected direction.
        direction: tessel_kernel_math::Vec2,
    },

    /// Settings failed validation.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Ear clipping could not reduce a ring.
    #[error("triangulation failed with {remaining} vertices left")]
    TriangulationFailed {
        /// Vertices still unclipped.
        remaining: usize,
    },
}

/// Result type for polygon operations.
pub type Result<T> = std::result::Result<T, PolygonError>;
