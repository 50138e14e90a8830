//! Plain vertex/triangle interchange format.

use serde::{Deserialize, Serialize};
use tessel_kernel_math::Point3;

/// Indexed triangle list, the form meshes enter and leave the kernel in.
///
/// Triangles are counter-clockwise seen from outside the solid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    /// Vertex positions.
    pub vertices: Vec<[f64; 3]>,
    /// Vertex index triplets.
    pub triangles: Vec<[usize; 3]>,
}

impl MeshData {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Position of vertex `i`.
    pub fn point(&self, i: usize) -> Point3 {
        let [x, y, z] = self.vertices[i];
        Point3::new(x, y, z)
    }

    /// Merge another mesh into this one.
    pub fn merge(&mut self, other: &MeshData) {
        let offset = self.vertices.len();
        self.vertices.extend_from_slice(&other.vertices);
        self.triangles
            .extend(other.triangles.iter().map(|t| [t[0] + offset, t[1] + offset, t[2] + offset]));
    }

    /// Enclosed volume by the divergence theorem; positive for outward
    /// winding. Triangles with out-of-range indices are ignored.
    pub fn volume(&self) -> f64 {
        let n = self.vertices.len();
        self.triangles
            .iter()
            .filter(|t| t.iter().all(|&i| i < n))
            .map(|t| {
                let (a, b, c) = (self.point(t[0]), self.point(t[1]), self.point(t[2]));
                a.coords.dot(&b.coords.cross(&c.coords))
            })
            .sum::<f64>()
            / 6.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_merge_offsets_indices() {
        let mut a = crate::primitives::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let b = crate::primitives::cuboid(Point3::new(5.0, 0.0, 0.0), Point3::new(7.0, 1.0, 1.0));
        a.merge(&b);
        assert_eq!(a.num_vertices(), 16);
        assert_eq!(a.num_triangles(), 24);
        assert!(a.triangles[12..].iter().all(|t| t.iter().all(|&i| i >= 8)));
        assert_relative_eq!(a.volume(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_json_round_trip_shape() {
        let data = MeshData {
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            triangles: vec![[0, 1, 2]],
        };
        let text = serde_json::to_string(&data).unwrap();
        assert!(text.contains("\"triangles\":[[0,1,2]]"));
        let back: MeshData = serde_json::from_str(&text).unwrap();
        assert_eq!(back, data);
    }
}
