//! Error types for mesh construction and mutation.

use thiserror::Error;

use crate::solid::{FaceId, VertexId};

/// Errors raised while building or editing a [`crate::TessellatedSolid`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// A triangle refers to a vertex that does not exist.
    #[error("triangle {triangle} refers to vertex {index}, but the mesh has {len} vertices")]
    IndexOutOfRange {
        /// Triangle index in the input.
        triangle: usize,
        /// Offending vertex index.
        index: usize,
        /// Number of vertices supplied.
        len: usize,
    },

    /// Two faces traverse the same edge in the same direction.
    #[error("edge {from:?} -> {to:?} is already owned on that side")]
    EdgeOwnershipConflict {
        /// Start of the contested edge.
        from: VertexId,
        /// End of the contested edge.
        to: VertexId,
    },

    /// A face was given the same vertex twice.
    #[error("face repeats vertex {0:?}")]
    DegenerateFace(VertexId),

    /// A handle no longer refers to a live vertex.
    #[error("vertex {0:?} does not exist")]
    MissingVertex(VertexId),

    /// A handle no longer refers to a live face.
    #[error("face {0:?} does not exist")]
    MissingFace(FaceId),

    /// The face does not use the vertex it was asked to replace.
    #[error("face {face:?} does not use vertex {vertex:?}")]
    VertexNotInFace {
        /// Face being edited.
        face: FaceId,
        /// Vertex expected in it.
        vertex: VertexId,
    },

    /// The mesh has no faces.
    #[error("mesh is empty")]
    EmptyMesh,
}

/// Result type for mesh operations.
pub type Result<T> = std::result::Result<T, MeshError>;
