#![warn(missing_docs)]

//! Plane slicing of tessellated solids.
//!
//! A cut runs in stages over one mutable mesh: find where the plane meets
//! the solid, split the faces it crosses, give each side its own copy of
//! the vertices on the cut, cap both sides, then flood-fill the pieces
//! apart.
//!
//! # Example
//!
//! ```
//! use tessel_kernel_math::{Dir3, Plane, Vec3};
//! use tessel_kernel_mesh::{cube, TessellatedSolid};
//! use tessel_slicer::{slice_on_flat, SliceSettings};
//!
//! let mut mesh = TessellatedSolid::from_data(&cube(10.0)).unwrap();
//! let plane = Plane::new(Dir3::new_normalize(Vec3::z()), 0.0);
//! let result = slice_on_flat(&mut mesh, &plane, &SliceSettings::default()).unwrap();
//! assert_eq!(result.positive.len(), 1);
//! assert!((result.positive[0].volume() - 500.0).abs() < 1e-9);
//! ```

pub mod contact;
pub mod error;
pub mod slice;

pub use contact::{define_contact, ContactData, ContactElement, ContactType, ContactVertex, Loop};
pub use error::{Result, SliceError};
pub use slice::{
    cap_loops, divide_up_contact, duplicate_vertices_at_contact, partition, slice_on_flat, slice_on_flats,
};

use serde::{Deserialize, Serialize};
use tessel_kernel_mesh::{MeshData, TessellatedSolid};

/// Slicing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliceSettings {
    /// Vertices closer to the plane than this lie on it.
    pub tolerance: f64,
    /// Close contact chains that cannot be closed by the mesh, as happens
    /// on open meshes.
    pub close_open_loops: bool,
}

impl Default for SliceSettings {
    fn default() -> Self {
        Self {
            tolerance: 0.002,
            close_open_loops: false,
        }
    }
}

impl SliceSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(SliceError::InvalidSettings("tolerance must be positive".into()));
        }
        Ok(())
    }
}

/// The pieces of a sliced solid.
#[derive(Debug, Clone, Default)]
pub struct SliceResult {
    /// Pieces on the side the plane normal points to.
    pub positive: Vec<TessellatedSolid>,
    /// Pieces on the other side.
    pub negative: Vec<TessellatedSolid>,
    /// Contact loops of the cut; empty when the plane missed.
    pub loops: Vec<Loop>,
}

impl SliceResult {
    /// Positive pieces as triangle lists.
    pub fn positive_data(&self) -> Vec<MeshData> {
        self.positive.iter().map(TessellatedSolid::to_data).collect()
    }

    /// Negative pieces as triangle lists.
    pub fn negative_data(&self) -> Vec<MeshData> {
        self.negative.iter().map(TessellatedSolid::to_data).collect()
    }

    /// Total volume on each side.
    pub fn volumes(&self) -> (f64, f64) {
        let sum = |solids: &[TessellatedSolid]| solids.iter().map(TessellatedSolid::volume).sum();
        (sum(&self.positive), sum(&self.negative))
    }
}
