//! Error types for the slicer.

use tessel_kernel_math::Point3;
use tessel_kernel_mesh::{MeshError, VertexId};
use tessel_kernel_polygon::PolygonError;
use thiserror::Error;

/// Errors that can occur while slicing a solid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SliceError {
    /// Capping a loop failed.
    #[error(transparent)]
    Polygon(#[from] PolygonError),

    /// Mesh surgery failed.
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// A contact element ended up in no loop, or in more than one.
    #[error("contact element {index} is referenced by {count} loops")]
    UnreferencedContactElement {
        /// Element index.
        index: usize,
        /// Number of loops referring to it.
        count: usize,
    },

    /// No seed ordering closes another loop.
    #[error("no contact loop can be closed; {remaining} contact elements left")]
    LoopClosureExhausted {
        /// Elements not in any loop.
        remaining: usize,
    },

    /// The faces around a contact vertex do not fall apart into a negative
    /// and a positive fan.
    #[error("contact vertex {vertex:?} at ({}, {}, {}) cannot be separated", position.x, position.y, position.z)]
    InseparableVertex {
        /// The vertex.
        vertex: VertexId,
        /// Its position.
        position: Point3,
    },

    /// A contact segment is not bordered by one face on each side.
    #[error("contact segment {start:?} -> {end:?} lacks a split face")]
    MissingSplitFace {
        /// Start vertex of the segment.
        start: VertexId,
        /// End vertex of the segment.
        end: VertexId,
    },

    /// Invalid slice settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

/// Result type for slicer operations.
pub type Result<T> = std::result::Result<T, SliceError>;
