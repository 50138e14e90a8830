#![warn(missing_docs)]

//! Triangle mesh topology for the tessel kernel.
//!
//! [`TessellatedSolid`] keeps vertices, edges and faces in slotmap arenas
//! with full adjacency, so faces can be split, removed and rewired while a
//! plane cut is in progress. [`MeshData`] is the flat indexed form meshes
//! are read from and written back to.

pub mod data;
pub mod error;
pub mod primitives;
pub mod solid;

pub use data::MeshData;
pub use error::{MeshError, Result};
pub use primitives::{cube, cuboid, prism};
pub use solid::{Curvature, Edge, EdgeId, Face, FaceId, TessellatedSolid, Vertex, VertexId};
