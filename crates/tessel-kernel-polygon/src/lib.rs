#![warn(missing_docs)]

//! Planar polygon Booleans for the tessel kernel.
//!
//! The heart of this crate is a plane-sweep Boolean engine: subject and
//! clip polygon sets are decomposed into sweep events, processed left to
//! right with crossings and overlaps split on the fly, and the edges that
//! survive the chosen operation are stitched back into simple rings with
//! nesting depth and parent bookkeeping.
//!
//! # Example
//!
//! ```
//! use tessel_kernel_polygon::{intersection, Polygon};
//!
//! let a = Polygon::from_coords(&[[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]]);
//! let b = Polygon::from_coords(&[[1.0, 1.0], [3.0, 1.0], [3.0, 3.0], [1.0, 3.0]]);
//! let result = intersection(&[a], &[b]).unwrap();
//! assert!((result[0].area() - 1.0).abs() < 1e-9);
//! ```

pub mod boolean;
pub mod error;
pub mod line;
pub mod path;
pub mod polygon;
pub mod simplify;
pub mod slice_line;
pub mod sweep;
pub mod triangulate;

pub use boolean::{
    boolean, boolean_batch, boolean_operation, difference, intersection, union, xor, BooleanOp, BooleanSettings,
};
pub use error::{PolygonError, Result};
pub use line::{is_point_on_segment, line_intercept, Line, SegmentIntersection};
pub use path::{nest_rings, ResultPath};
pub use polygon::{total_area, total_perimeter, Polygon};
pub use simplify::{simplify, simplify_polygon};
pub use slice_line::{slice_on_line, LineSlice};
pub use triangulate::triangulate;
