//! Triangle mesh topology in a slotmap arena.
//!
//! Vertices, edges and faces live in three arenas and refer to one another
//! only through handles. Every edge is shared by at most two faces: the
//! *owned* face traverses it `from → to`, the *other* face `to → from`.
//! An empty slot marks an open boundary.

use std::collections::{HashMap, HashSet};

use slotmap::{new_key_type, SlotMap};
use tessel_kernel_math::{Point3, Tolerance, Vec3};
use tracing::{debug, trace};

use crate::data::MeshData;
use crate::error::{MeshError, Result};

new_key_type! {
    /// Handle to a mesh vertex.
    pub struct VertexId;
    /// Handle to a mesh edge.
    pub struct EdgeId;
    /// Handle to a mesh face.
    pub struct FaceId;
}

/// Dihedral classification of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Curvature {
    /// The solid bulges outward across the edge.
    Convex,
    /// The solid folds inward across the edge.
    Concave,
    /// Coplanar neighbours.
    SaddleOrFlat,
    /// The edge lacks one of its two faces.
    #[default]
    Undefined,
}

/// A mesh vertex.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// Position in space.
    pub position: Point3,
    /// Incident edges.
    pub edges: Vec<EdgeId>,
    /// Incident faces.
    pub faces: Vec<FaceId>,
}

/// An undirected mesh edge with its two bordering faces.
#[derive(Debug, Clone)]
pub struct Edge {
    /// Start vertex, in the owned face's winding.
    pub from: VertexId,
    /// End vertex.
    pub to: VertexId,
    /// Face that traverses the edge `from → to`.
    pub owned_face: Option<FaceId>,
    /// Face that traverses the edge `to → from`.
    pub other_face: Option<FaceId>,
    /// Dihedral classification, refreshed whenever a face is attached or
    /// detached.
    pub curvature: Curvature,
}

impl Edge {
    /// Faces bordering the edge.
    pub fn faces(&self) -> impl Iterator<Item = FaceId> {
        self.owned_face.into_iter().chain(self.other_face)
    }

    /// The face across the edge from `face`.
    pub fn other_face(&self, face: FaceId) -> Option<FaceId> {
        if self.owned_face == Some(face) {
            self.other_face
        } else if self.other_face == Some(face) {
            self.owned_face
        } else {
            None
        }
    }

    /// Whether `v` is one of the endpoints.
    pub fn has_vertex(&self, v: VertexId) -> bool {
        self.from == v || self.to == v
    }

    /// One of the two face slots is empty.
    pub fn is_boundary(&self) -> bool {
        self.owned_face.is_none() || self.other_face.is_none()
    }
}

/// A triangular face, counter-clockwise about its normal.
#[derive(Debug, Clone)]
pub struct Face {
    /// Corners in winding order.
    pub vertices: [VertexId; 3],
    /// `edges[k]` joins `vertices[k]` and `vertices[(k + 1) % 3]`.
    pub edges: [EdgeId; 3],
    /// Unit normal, or zero for a degenerate triangle.
    pub normal: Vec3,
    /// Triangle area.
    pub area: f64,
}

impl Face {
    /// Corner index of `v`.
    pub fn position_of(&self, v: VertexId) -> Option<usize> {
        self.vertices.iter().position(|&x| x == v)
    }
}

/// A triangle mesh with full vertex/edge/face adjacency.
#[derive(Debug, Clone, Default)]
pub struct TessellatedSolid {
    /// Vertex arena.
    pub vertices: SlotMap<VertexId, Vertex>,
    /// Edge arena.
    pub edges: SlotMap<EdgeId, Edge>,
    /// Face arena.
    pub faces: SlotMap<FaceId, Face>,
}

impl TessellatedSolid {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the topology of an indexed triangle list.
    ///
    /// Triangles repeating a vertex index are skipped. Two triangles
    /// winding the same edge the same way are rejected.
    pub fn from_data(data: &MeshData) -> Result<Self> {
        let mut solid = Self::new();
        let ids: Vec<VertexId> = (0..data.num_vertices())
            .map(|i| solid.add_vertex(data.point(i)))
            .collect();

        for (triangle, t) in data.triangles.iter().enumerate() {
            if let Some(&index) = t.iter().find(|&&i| i >= ids.len()) {
                return Err(MeshError::IndexOutOfRange {
                    triangle,
                    index,
                    len: ids.len(),
                });
            }
            if t[0] == t[1] || t[1] == t[2] || t[2] == t[0] {
                trace!(triangle, "skipping triangle with a repeated vertex");
                continue;
            }
            solid.add_face([ids[t[0]], ids[t[1]], ids[t[2]]])?;
        }
        debug!(
            vertices = solid.num_vertices(),
            edges = solid.num_edges(),
            faces = solid.num_faces(),
            "mesh topology built"
        );
        Ok(solid)
    }

    /// Export the faces as an indexed triangle list. Vertices not used by
    /// any face are dropped.
    pub fn to_data(&self) -> MeshData {
        let faces: Vec<FaceId> = self.faces.keys().collect();
        self.subset_data(&faces)
    }

    /// Export a subset of faces as an indexed triangle list.
    pub fn subset_data(&self, faces: &[FaceId]) -> MeshData {
        let mut data = MeshData::new();
        let mut index: HashMap<VertexId, usize> = HashMap::new();
        for face in faces.iter().filter_map(|&f| self.faces.get(f)) {
            let triangle = face.vertices.map(|v| {
                *index.entry(v).or_insert_with(|| {
                    let p = self.vertices[v].position;
                    data.vertices.push([p.x, p.y, p.z]);
                    data.vertices.len() - 1
                })
            });
            data.triangles.push(triangle);
        }
        data
    }

    /// A standalone mesh made of the given faces.
    pub fn extract(&self, faces: &[FaceId]) -> Result<Self> {
        Self::from_data(&self.subset_data(faces))
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Number of faces.
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// No faces.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Position of a vertex.
    pub fn position(&self, v: VertexId) -> Option<Point3> {
        self.vertices.get(v).map(|x| x.position)
    }

    /// Insert a free-standing vertex.
    pub fn add_vertex(&mut self, position: Point3) -> VertexId {
        self.vertices.insert(Vertex {
            position,
            edges: Vec::new(),
            faces: Vec::new(),
        })
    }

    /// Insert a triangle, attaching it to existing edges where they have a
    /// free slot on the matching side and creating the rest.
    pub fn add_face(&mut self, vertices: [VertexId; 3]) -> Result<FaceId> {
        for (k, &v) in vertices.iter().enumerate() {
            if !self.vertices.contains_key(v) {
                return Err(MeshError::MissingVertex(v));
            }
            if vertices[(k + 1) % 3] == v {
                return Err(MeshError::DegenerateFace(v));
            }
        }
        let corners = vertices.map(|v| self.vertices[v].position);
        let (normal, area) = normal_and_area(&corners);
        let face = self.faces.insert(Face {
            vertices,
            edges: [EdgeId::default(); 3],
            normal,
            area,
        });

        for k in 0..3 {
            match self.link(face, vertices[k], vertices[(k + 1) % 3]) {
                Ok(e) => self.faces[face].edges[k] = e,
                Err(err) => {
                    for j in 0..k {
                        let e = self.faces[face].edges[j];
                        self.unlink(face, e);
                    }
                    self.faces.remove(face);
                    return Err(err);
                }
            }
        }
        for v in vertices {
            self.vertices[v].faces.push(face);
        }
        Ok(face)
    }

    /// Remove a face. Edges left without any face are removed with it.
    pub fn remove_face(&mut self, face: FaceId) -> Result<()> {
        let removed = self.faces.remove(face).ok_or(MeshError::MissingFace(face))?;
        for e in removed.edges {
            self.unlink(face, e);
        }
        for v in removed.vertices {
            self.vertices[v].faces.retain(|&f| f != face);
        }
        Ok(())
    }

    /// Swap corner `from` of `face` for the vertex `to`, rewiring the two
    /// edges at that corner.
    pub fn reassign_vertex(&mut self, face: FaceId, from: VertexId, to: VertexId) -> Result<()> {
        let corner = {
            let f = self.faces.get(face).ok_or(MeshError::MissingFace(face))?;
            if f.position_of(to).is_some() {
                return Err(MeshError::DegenerateFace(to));
            }
            f.position_of(from)
                .ok_or(MeshError::VertexNotInFace { face, vertex: from })?
        };
        if !self.vertices.contains_key(to) {
            return Err(MeshError::MissingVertex(to));
        }

        let touching = [(corner + 2) % 3, corner];
        for k in touching {
            let e = self.faces[face].edges[k];
            self.unlink(face, e);
        }
        self.faces[face].vertices[corner] = to;
        for k in touching {
            let (a, b) = (self.faces[face].vertices[k], self.faces[face].vertices[(k + 1) % 3]);
            let e = self.link(face, a, b)?;
            self.faces[face].edges[k] = e;
        }
        self.vertices[from].faces.retain(|&f| f != face);
        self.vertices[to].faces.push(face);
        Ok(())
    }

    /// Edges joining `a` and `b`, in either direction.
    pub fn edges_between(&self, a: VertexId, b: VertexId) -> Vec<EdgeId> {
        self.vertices.get(a).map_or_else(Vec::new, |v| {
            v.edges
                .iter()
                .copied()
                .filter(|&e| self.edges[e].has_vertex(b))
                .collect()
        })
    }

    /// First edge joining `a` and `b`.
    pub fn edge_between(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.edges_between(a, b).into_iter().next()
    }

    /// Faces sharing an edge with `face`.
    pub fn face_neighbors(&self, face: FaceId) -> impl Iterator<Item = FaceId> + '_ {
        self.faces
            .get(face)
            .into_iter()
            .flat_map(|f| f.edges.iter())
            .filter_map(move |&e| self.edges.get(e).and_then(|edge| edge.other_face(face)))
    }

    /// Faces reachable from `start` across shared edges, skipping any
    /// already in `visited`.
    pub fn flood_fill(&self, start: FaceId, visited: &mut HashSet<FaceId>) -> Vec<FaceId> {
        let mut component = Vec::new();
        let mut stack = vec![start];
        while let Some(face) = stack.pop() {
            if !self.faces.contains_key(face) || !visited.insert(face) {
                continue;
            }
            component.push(face);
            stack.extend(self.face_neighbors(face));
        }
        component
    }

    /// Face sets of the edge-connected pieces of the mesh.
    pub fn connected_components(&self) -> Vec<Vec<FaceId>> {
        let mut visited = HashSet::new();
        let mut components = Vec::new();
        for face in self.faces.keys() {
            if !visited.contains(&face) {
                components.push(self.flood_fill(face, &mut visited));
            }
        }
        components
    }

    /// One mesh per edge-connected piece.
    pub fn split_into_solids(&self) -> Result<Vec<Self>> {
        self.connected_components()
            .iter()
            .map(|faces| self.extract(faces))
            .collect()
    }

    /// Enclosed volume; positive for outward winding.
    pub fn volume(&self) -> f64 {
        self.faces
            .values()
            .map(|f| {
                let [a, b, c] = f.vertices.map(|v| self.vertices[v].position.coords);
                a.dot(&b.cross(&c))
            })
            .sum::<f64>()
            / 6.0
    }

    /// Total face area.
    pub fn surface_area(&self) -> f64 {
        self.faces.values().map(|f| f.area).sum()
    }

    /// Centre of mass of the enclosed volume, or the mean vertex position
    /// when the mesh encloses none.
    pub fn centroid(&self) -> Point3 {
        let mut volume = 0.0;
        let mut moment = Vec3::zeros();
        for f in self.faces.values() {
            let [a, b, c] = f.vertices.map(|v| self.vertices[v].position.coords);
            let v6 = a.dot(&b.cross(&c));
            volume += v6;
            moment += (a + b + c) * (v6 / 4.0);
        }
        if volume.abs() > f64::EPSILON {
            return Point3::from(moment / volume);
        }
        let n = self.vertices.len().max(1) as f64;
        let sum = self.vertices.values().fold(Vec3::zeros(), |acc, v| acc + v.position.coords);
        Point3::from(sum / n)
    }

    /// Every edge has a face on both sides.
    pub fn is_watertight(&self) -> bool {
        !self.faces.is_empty() && self.edges.values().all(|e| !e.is_boundary())
    }

    /// Attach `face`, which traverses `a → b`, to a matching edge.
    fn link(&mut self, face: FaceId, a: VertexId, b: VertexId) -> Result<EdgeId> {
        let mut taken = false;
        let mut slot = None;
        for &e in &self.vertices[a].edges {
            let edge = &self.edges[e];
            if edge.from == a && edge.to == b {
                if edge.owned_face.is_none() {
                    slot = Some((e, true));
                    break;
                }
                taken = true;
            } else if edge.from == b && edge.to == a {
                if edge.other_face.is_none() {
                    slot = Some((e, false));
                    break;
                }
                taken = true;
            }
        }

        let e = match slot {
            Some((e, true)) => {
                self.edges[e].owned_face = Some(face);
                e
            }
            Some((e, false)) => {
                self.edges[e].other_face = Some(face);
                e
            }
            None if taken => return Err(MeshError::EdgeOwnershipConflict { from: a, to: b }),
            None => {
                let e = self.edges.insert(Edge {
                    from: a,
                    to: b,
                    owned_face: Some(face),
                    other_face: None,
                    curvature: Curvature::Undefined,
                });
                self.vertices[a].edges.push(e);
                self.vertices[b].edges.push(e);
                e
            }
        };
        self.edges[e].curvature = self.classify(e);
        Ok(e)
    }

    /// Detach `face` from edge `e`, dropping the edge once it has no faces.
    fn unlink(&mut self, face: FaceId, e: EdgeId) {
        let Some(edge) = self.edges.get_mut(e) else {
            return;
        };
        if edge.owned_face == Some(face) {
            edge.owned_face = None;
        }
        if edge.other_face == Some(face) {
            edge.other_face = None;
        }
        if edge.owned_face.is_none() && edge.other_face.is_none() {
            let (from, to) = (edge.from, edge.to);
            self.edges.remove(e);
            for v in [from, to] {
                if let Some(vertex) = self.vertices.get_mut(v) {
                    vertex.edges.retain(|&x| x != e);
                }
            }
        } else {
            edge.curvature = Curvature::Undefined;
        }
    }

    /// Sign of `(n_owned × n_other) · (to - from)`.
    fn classify(&self, e: EdgeId) -> Curvature {
        let edge = &self.edges[e];
        let (Some(owned), Some(other)) = (edge.owned_face, edge.other_face) else {
            return Curvature::Undefined;
        };
        let dir = self.vertices[edge.to].position - self.vertices[edge.from].position;
        let length = dir.norm();
        if length == 0.0 {
            return Curvature::Undefined;
        }
        let turn = self.faces[owned].normal.cross(&self.faces[other].normal).dot(&dir) / length;
        if turn.abs() < Tolerance::DEFAULT.angular {
            Curvature::SaddleOrFlat
        } else if turn > 0.0 {
            Curvature::Convex
        } else {
            Curvature::Concave
        }
    }
}

fn normal_and_area(corners: &[Point3; 3]) -> (Vec3, f64) {
    let n = (corners[1] - corners[0]).cross(&(corners[2] - corners[0]));
    let double_area = n.norm();
    if double_area == 0.0 {
        (Vec3::zeros(), 0.0)
    } else {
        (n / double_area, double_area / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{cube, cuboid, prism};
    use approx::assert_relative_eq;
    use tessel_kernel_polygon::Polygon;

    #[test]
    fn test_cube_topology() {
        let solid = TessellatedSolid::from_data(&cube(10.0)).unwrap();
        assert_eq!(solid.num_vertices(), 8);
        assert_eq!(solid.num_faces(), 12);
        assert_eq!(solid.num_edges(), 18);
        assert!(solid.is_watertight());
        assert_relative_eq!(solid.volume(), 1000.0, epsilon = 1e-9);
        assert_relative_eq!(solid.surface_area(), 600.0, epsilon = 1e-9);
        let c = solid.centroid();
        assert!(c.coords.norm() < 1e-12);
    }

    #[test]
    fn test_cube_edges_are_convex_or_flat() {
        let solid = TessellatedSolid::from_data(&cube(2.0)).unwrap();
        let convex = solid.edges.values().filter(|e| e.curvature == Curvature::Convex).count();
        let flat = solid
            .edges
            .values()
            .filter(|e| e.curvature == Curvature::SaddleOrFlat)
            .count();
        assert_eq!(convex, 12);
        assert_eq!(flat, 6);
    }

    #[test]
    fn test_l_prism_has_one_concave_edge() {
        let outline = Polygon::from_coords(&[[0.0, 0.0], [4.0, 0.0], [4.0, 1.0], [1.0, 1.0], [1.0, 3.0], [0.0, 3.0]]);
        let solid = TessellatedSolid::from_data(&prism(&outline, &[], 0.0, 2.0).unwrap()).unwrap();
        assert!(solid.is_watertight());
        assert_relative_eq!(solid.volume(), 12.0, epsilon = 1e-9);
        let concave = solid.edges.values().filter(|e| e.curvature == Curvature::Concave).count();
        assert_eq!(concave, 1);
    }

    #[test]
    fn test_remove_face_opens_mesh() {
        let mut solid = TessellatedSolid::from_data(&cube(1.0)).unwrap();
        let face = solid.faces.keys().next().unwrap();
        solid.remove_face(face).unwrap();
        assert_eq!(solid.num_faces(), 11);
        assert_eq!(solid.num_edges(), 18);
        assert!(!solid.is_watertight());
        assert_eq!(solid.edges.values().filter(|e| e.is_boundary()).count(), 3);
        assert!(matches!(solid.remove_face(face), Err(MeshError::MissingFace(_))));
    }

    #[test]
    fn test_orphan_edges_are_dropped() {
        let mut solid = TessellatedSolid::new();
        let a = solid.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = solid.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let c = solid.add_vertex(Point3::new(0.0, 1.0, 0.0));
        let f = solid.add_face([a, b, c]).unwrap();
        assert_eq!(solid.num_edges(), 3);
        assert_relative_eq!(solid.faces[f].area, 0.5);
        assert_relative_eq!(solid.faces[f].normal.z, 1.0);
        solid.remove_face(f).unwrap();
        assert_eq!(solid.num_edges(), 0);
        assert!(solid.vertices[a].edges.is_empty());
    }

    #[test]
    fn test_same_winding_twice_is_rejected() {
        let data = MeshData {
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]],
            triangles: vec![[0, 1, 2], [0, 1, 3]],
        };
        let err = TessellatedSolid::from_data(&data).unwrap_err();
        assert!(matches!(err, MeshError::EdgeOwnershipConflict { .. }));
    }

    #[test]
    fn test_bad_index_and_degenerate_triangles() {
        let data = MeshData {
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            triangles: vec![[0, 1, 1], [0, 1, 2]],
        };
        let solid = TessellatedSolid::from_data(&data).unwrap();
        assert_eq!(solid.num_faces(), 1);

        let bad = MeshData {
            vertices: data.vertices.clone(),
            triangles: vec![[0, 1, 7]],
        };
        assert_eq!(
            TessellatedSolid::from_data(&bad).unwrap_err(),
            MeshError::IndexOutOfRange {
                triangle: 0,
                index: 7,
                len: 3
            }
        );
    }

    #[test]
    fn test_reassign_vertex_rewires_edges() {
        let mut solid = TessellatedSolid::from_data(&cube(2.0)).unwrap();
        let v = solid.vertices.keys().next().unwrap();
        let copy = solid.add_vertex(solid.vertices[v].position);
        let faces = solid.vertices[v].faces.clone();
        for f in faces {
            solid.reassign_vertex(f, v, copy).unwrap();
        }
        assert!(solid.vertices[v].faces.is_empty());
        assert!(solid.vertices[v].edges.is_empty());
        assert!(solid.is_watertight());
        assert_relative_eq!(solid.volume(), 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_reassign_vertex_requires_corner() {
        let mut solid = TessellatedSolid::from_data(&cube(2.0)).unwrap();
        let face = solid.faces.keys().next().unwrap();
        let stranger = solid.add_vertex(Point3::origin());
        let err = solid.reassign_vertex(face, stranger, stranger).unwrap_err();
        assert!(matches!(err, MeshError::VertexNotInFace { .. }));
    }

    #[test]
    fn test_split_into_solids() {
        let mut data = cuboid(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        data.merge(&cuboid(Point3::new(3.0, 0.0, 0.0), Point3::new(5.0, 1.0, 1.0)));
        let solid = TessellatedSolid::from_data(&data).unwrap();
        let mut volumes: Vec<f64> = solid.split_into_solids().unwrap().iter().map(|s| s.volume()).collect();
        volumes.sort_by(f64::total_cmp);
        assert_eq!(volumes.len(), 2);
        assert_relative_eq!(volumes[0], 1.0, epsilon = 1e-9);
        assert_relative_eq!(volumes[1], 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_to_data_drops_unused_vertices() {
        let mut solid = TessellatedSolid::from_data(&cube(1.0)).unwrap();
        solid.add_vertex(Point3::new(9.0, 9.0, 9.0));
        let data = solid.to_data();
        assert_eq!(data.num_vertices(), 8);
        assert_relative_eq!(data.volume(), 1.0, epsilon = 1e-9);
    }
}
