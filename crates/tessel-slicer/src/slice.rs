//! Cutting a solid in two along a plane.
//!
//! The stages must run in order over the same mesh and contact data:
//! [`divide_up_contact`], [`duplicate_vertices_at_contact`],
//! [`cap_loops`], then [`partition`]. [`slice_on_flat`] runs them all.

use std::collections::{BTreeMap, HashMap, HashSet};

use rayon::prelude::*;
use tessel_kernel_math::Plane;
use tessel_kernel_mesh::{FaceId, MeshError, TessellatedSolid, VertexId};
use tessel_kernel_polygon::{nest_rings, triangulate, Polygon};
use tracing::{debug, warn};

use crate::contact::{define_contact, ContactData, ContactType, Side};
use crate::error::{Result, SliceError};
use crate::{SliceResult, SliceSettings};

/// Cut `mesh` along `plane` into closed pieces on either side.
///
/// The mesh is consumed by the surgery; on success it holds every piece,
/// separated. When the plane does not cut the solid, the whole mesh goes to
/// the side its centroid lies on and is left untouched.
pub fn slice_on_flat(mesh: &mut TessellatedSolid, plane: &Plane, settings: &SliceSettings) -> Result<SliceResult> {
    if mesh.is_empty() {
        return Err(MeshError::EmptyMesh.into());
    }
    let mut contact = define_contact(mesh, plane, settings)?;

    if contact.loops.is_empty() {
        let side = plane.signed_distance(&mesh.centroid());
        debug!(side, "plane does not cut the solid");
        let whole = vec![mesh.clone()];
        return Ok(if side >= 0.0 {
            SliceResult {
                positive: whole,
                ..Default::default()
            }
        } else {
            SliceResult {
                negative: whole,
                ..Default::default()
            }
        });
    }

    divide_up_contact(mesh, &mut contact)?;
    let duplicates = duplicate_vertices_at_contact(mesh, &mut contact)?;
    cap_loops(mesh, &contact, &duplicates)?;
    let (positive, negative) = partition(mesh, &contact)?;
    debug!(
        positive = positive.len(),
        negative = negative.len(),
        "solid sliced"
    );
    Ok(SliceResult {
        positive,
        negative,
        loops: contact.loops,
    })
}

/// Slice independent copies of `mesh` along each plane in parallel.
pub fn slice_on_flats(mesh: &TessellatedSolid, planes: &[Plane], settings: &SliceSettings) -> Vec<Result<SliceResult>> {
    planes
        .par_iter()
        .map(|plane| slice_on_flat(&mut mesh.clone(), plane, settings))
        .collect()
}

/// Split every face the plane crosses so each contact element becomes a
/// mesh edge.
///
/// A vertex is created at every cached split point. A face crossed through
/// a corner becomes two triangles, a face crossed through two edges three.
/// Afterwards every real element knows its edge and the faces bordering it
/// on each side.
pub fn divide_up_contact(mesh: &mut TessellatedSolid, contact: &mut ContactData) -> Result<()> {
    for (&e, &p) in &contact.split_points {
        let v = mesh.add_vertex(p);
        contact.split_vertices.insert(e, v);
        contact.distances.insert(v, 0.0);
    }

    for index in 0..contact.elements.len() {
        let element = &contact.elements[index];
        if element.contact_type == ContactType::AlongEdge || !element.is_real() {
            continue;
        }
        let Some(face) = element.face else {
            continue;
        };
        let (start, end) = endpoints(contact, index)?;
        split_face(mesh, contact, face, start, end)?;
    }

    for index in 0..contact.elements.len() {
        if !contact.elements[index].is_real() {
            continue;
        }
        let (start, end) = endpoints(contact, index)?;
        let [edge] = mesh.edges_between(start, end)[..] else {
            return Err(SliceError::MissingSplitFace { start, end });
        };
        let mut positive = None;
        let mut negative = None;
        for f in mesh.edges[edge].faces() {
            match contact.side_of(mesh, f) {
                Side::Positive => positive = Some(f),
                Side::Negative => negative = Some(f),
                Side::InPlane | Side::Crossing => {}
            }
        }

        let element = &mut contact.elements[index];
        element.edge = Some(edge);
        if element.contact_type != ContactType::AlongEdge {
            let (Some(positive), Some(negative)) = (positive, negative) else {
                return Err(SliceError::MissingSplitFace { start, end });
            };
            element.split_face_positive = Some(positive);
            element.split_face_negative = Some(negative);
        }
    }
    debug!(
        vertices = mesh.num_vertices(),
        faces = mesh.num_faces(),
        "crossed faces divided"
    );
    Ok(())
}

/// Mesh vertices at both ends of an element.
fn endpoints(contact: &ContactData, index: usize) -> Result<(VertexId, VertexId)> {
    let element = &contact.elements[index];
    match (contact.vertex_of(element.start), contact.vertex_of(element.end)) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(SliceError::UnreferencedContactElement { index, count: 0 }),
    }
}

/// Replace `face` by triangles on either side of the chord `start → end`.
fn split_face(
    mesh: &mut TessellatedSolid,
    contact: &ContactData,
    face: FaceId,
    start: VertexId,
    end: VertexId,
) -> Result<()> {
    let f = mesh.faces.get(face).ok_or(MeshError::MissingFace(face))?;
    let mut ring = Vec::with_capacity(5);
    for k in 0..3 {
        ring.push(f.vertices[k]);
        if let Some(&v) = contact.split_vertices.get(&f.edges[k]) {
            ring.push(v);
        }
    }
    let (Some(i), Some(j)) = (
        ring.iter().position(|&v| v == start),
        ring.iter().position(|&v| v == end),
    ) else {
        return Err(SliceError::MissingSplitFace { start, end });
    };

    mesh.remove_face(face)?;
    let n = ring.len();
    let walk = |from: usize, to: usize| -> Vec<VertexId> {
        (0..=(to + n - from) % n).map(|k| ring[(from + k) % n]).collect()
    };
    for part in [walk(i, j), walk(j, i)] {
        for k in 1..part.len() - 1 {
            mesh.add_face([part[0], part[k], part[k + 1]])?;
        }
    }
    Ok(())
}

/// Give the positive side its own copy of every vertex on the cut.
///
/// Around each contact vertex, the faces reachable from a negative split
/// face without crossing a contact edge keep the vertex; all others are
/// moved to a new vertex at the same position. Returns the copy made for
/// each contact vertex.
pub fn duplicate_vertices_at_contact(
    mesh: &mut TessellatedSolid,
    contact: &mut ContactData,
) -> Result<HashMap<VertexId, VertexId>> {
    let contact_edges: HashSet<_> = contact
        .elements
        .iter()
        .filter(|e| e.is_real())
        .filter_map(|e| e.edge)
        .collect();
    let mut around: BTreeMap<VertexId, Vec<FaceId>> = BTreeMap::new();
    for element in contact.elements.iter().filter(|e| e.is_real()) {
        for cv in [element.start, element.end] {
            if let Some(v) = contact.vertex_of(cv) {
                around.entry(v).or_default().extend(element.split_face_negative);
            }
        }
    }

    let mut moves = Vec::with_capacity(around.len());
    let mut duplicates = HashMap::with_capacity(around.len());
    for (&v, seeds) in &around {
        let position = mesh.vertices[v].position;
        let mut stay = HashSet::new();
        let mut stack = seeds.clone();
        while let Some(f) = stack.pop() {
            if stay.contains(&f) {
                continue;
            }
            if matches!(contact.side_of(mesh, f), Side::Positive | Side::Crossing) {
                return Err(SliceError::InseparableVertex { vertex: v, position });
            }
            stay.insert(f);
            for &e in &mesh.faces[f].edges {
                let edge = &mesh.edges[e];
                if contact_edges.contains(&e) || !edge.has_vertex(v) {
                    continue;
                }
                stack.extend(edge.other_face(f));
            }
        }

        let moving: Vec<FaceId> = mesh.vertices[v]
            .faces
            .iter()
            .copied()
            .filter(|f| !stay.contains(f))
            .collect();
        let copy = mesh.add_vertex(position);
        contact.distances.insert(copy, 0.0);
        duplicates.insert(v, copy);
        moves.push((v, copy, moving));
    }

    for (v, copy, faces) in moves {
        for f in faces {
            mesh.reassign_vertex(f, v, copy)?;
        }
    }
    for index in 0..contact.elements.len() {
        let start = contact.vertex_of(contact.elements[index].start);
        contact.elements[index].duplicate_vertex = start.and_then(|v| duplicates.get(&v).copied());
    }
    debug!(vertices = duplicates.len(), "contact vertices duplicated");
    Ok(duplicates)
}

/// Close both sides of the cut with triangulated caps.
///
/// Loops are nested by containment; each outer loop is triangulated with
/// the loops directly inside it as holes. The negative side's cap faces
/// along the plane normal on the original vertices, the positive side's
/// faces against it on the duplicates. Returns the number of faces added.
pub fn cap_loops(
    mesh: &mut TessellatedSolid,
    contact: &ContactData,
    duplicates: &HashMap<VertexId, VertexId>,
) -> Result<usize> {
    let rings: Vec<Vec<VertexId>> = contact
        .loops
        .iter()
        .map(|l| {
            l.elements
                .iter()
                .filter_map(|&i| contact.vertex_of(contact.elements[i].start))
                .collect()
        })
        .collect();
    let polygons: Vec<Polygon> = contact.loops.iter().map(|l| l.polygon.clone()).collect();
    let nesting = nest_rings(polygons.clone());
    let duplicate = |v: VertexId| duplicates.get(&v).copied().ok_or(MeshError::MissingVertex(v));

    let mut added = 0;
    for (i, outer) in nesting.iter().enumerate() {
        if outer.is_hole() {
            continue;
        }
        let holes: Vec<usize> = nesting
            .iter()
            .enumerate()
            .filter(|(_, r)| r.depth == outer.depth + 1 && r.parent == Some(i))
            .map(|(j, _)| j)
            .collect();
        let hole_polygons: Vec<Polygon> = holes.iter().map(|&j| polygons[j].clone()).collect();
        let ids: Vec<VertexId> = rings[i]
            .iter()
            .chain(holes.iter().flat_map(|&j| rings[j].iter()))
            .copied()
            .collect();

        for [a, b, c] in triangulate(&polygons[i], &hole_polygons)? {
            let (a, b, c) = (ids[a], ids[b], ids[c]);
            mesh.add_face([a, b, c])?;
            mesh.add_face([duplicate(c)?, duplicate(b)?, duplicate(a)?])?;
            added += 2;
        }
    }
    debug!(faces = added, loops = rings.len(), "cut capped");
    Ok(added)
}

/// Flood-fill the separated mesh into pieces on either side of the plane.
///
/// Each piece is grown from the split faces of the contact elements.
/// Pieces not touching the cut are placed by the side of their centroid.
pub fn partition(
    mesh: &TessellatedSolid,
    contact: &ContactData,
) -> Result<(Vec<TessellatedSolid>, Vec<TessellatedSolid>)> {
    let mut visited = HashSet::new();
    let (mut positive, mut negative) = (Vec::new(), Vec::new());
    for element in contact.elements.iter().filter(|e| e.is_real()) {
        for (seed, side) in [
            (element.split_face_positive, &mut positive),
            (element.split_face_negative, &mut negative),
        ] {
            let Some(seed) = seed else {
                continue;
            };
            let component = mesh.flood_fill(seed, &mut visited);
            if !component.is_empty() {
                side.push(mesh.extract(&component)?);
            }
        }
    }

    let stray: Vec<FaceId> = mesh.faces.keys().filter(|f| !visited.contains(f)).collect();
    for face in stray {
        let component = mesh.flood_fill(face, &mut visited);
        if component.is_empty() {
            continue;
        }
        let piece = mesh.extract(&component)?;
        let side = contact.plane.signed_distance(&piece.centroid());
        warn!(faces = component.len(), side, "piece does not touch the cut");
        if side >= 0.0 {
            positive.push(piece);
        } else {
            negative.push(piece);
        }
    }
    Ok((positive, negative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tessel_kernel_math::{Dir3, Point3, Vec3};
    use tessel_kernel_mesh::{cube, cuboid, prism, MeshData};

    fn plane(normal: [f64; 3], distance: f64) -> Plane {
        Plane::new(Dir3::new_normalize(Vec3::new(normal[0], normal[1], normal[2])), distance)
    }

    fn solid(data: &MeshData) -> TessellatedSolid {
        TessellatedSolid::from_data(data).unwrap()
    }

    fn l_prism() -> TessellatedSolid {
        let outline = Polygon::from_coords(&[[0.0, 0.0], [4.0, 0.0], [4.0, 1.0], [1.0, 1.0], [1.0, 3.0], [0.0, 3.0]]);
        solid(&prism(&outline, &[], 0.0, 2.0).unwrap())
    }

    fn tube() -> TessellatedSolid {
        let outer = Polygon::from_coords(&[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]]);
        let hole = Polygon::from_coords(&[[3.0, 3.0], [7.0, 3.0], [7.0, 7.0], [3.0, 7.0]]);
        solid(&prism(&outer, &[hole], 0.0, 5.0).unwrap())
    }

    /// Two boxes stacked at z = 0 sharing a ring of vertices, walls split
    /// at the seam.
    fn stacked_box() -> MeshData {
        let mut vertices = Vec::new();
        for z in [-5.0, 0.0, 5.0] {
            for y in [-5.0, 5.0] {
                for x in [-5.0, 5.0] {
                    vertices.push([x, y, z]);
                }
            }
        }
        let at = |x: usize, y: usize, z: usize| x + 2 * y + 4 * z;
        let mut triangles = Vec::new();
        let mut quad = |a, b, c, d| {
            triangles.push([a, b, c]);
            triangles.push([a, c, d]);
        };
        quad(at(0, 0, 0), at(0, 1, 0), at(1, 1, 0), at(1, 0, 0));
        quad(at(0, 0, 2), at(1, 0, 2), at(1, 1, 2), at(0, 1, 2));
        let ring = [(0, 0), (1, 0), (1, 1), (0, 1)];
        for z in 0..2 {
            for k in 0..4 {
                let ((x0, y0), (x1, y1)) = (ring[k], ring[(k + 1) % 4]);
                quad(at(x0, y0, z), at(x1, y1, z), at(x1, y1, z + 1), at(x0, y0, z + 1));
            }
        }
        MeshData { vertices, triangles }
    }

    fn assert_cut(mesh: &mut TessellatedSolid, plane: &Plane, positive: &[f64], negative: &[f64]) -> SliceResult {
        let result = slice_on_flat(mesh, plane, &SliceSettings::default()).unwrap();
        let volumes = |solids: &[TessellatedSolid]| {
            let mut v: Vec<f64> = solids.iter().map(TessellatedSolid::volume).collect();
            v.sort_by(|a, b| b.total_cmp(a));
            v
        };
        let (pv, nv) = (volumes(&result.positive), volumes(&result.negative));
        assert_eq!(pv.len(), positive.len(), "positive pieces {pv:?}");
        assert_eq!(nv.len(), negative.len(), "negative pieces {nv:?}");
        for (got, want) in pv.iter().zip(positive).chain(nv.iter().zip(negative)) {
            assert_relative_eq!(*got, *want, epsilon = 1e-6);
        }
        for piece in result.positive.iter().chain(&result.negative) {
            assert!(piece.is_watertight());
        }
        result
    }

    #[test]
    fn test_cube_cut_in_half() {
        let mut mesh = solid(&cube(10.0));
        let result = assert_cut(&mut mesh, &plane([0.0, 0.0, 1.0], 0.0), &[500.0], &[500.0]);
        assert_eq!(result.loops.len(), 1);
        assert_relative_eq!(result.loops[0].area, 100.0, epsilon = 1e-9);
        for piece in result.positive {
            assert!(piece.vertices.values().all(|v| v.position.z >= -1e-12));
        }
    }

    #[test]
    fn test_stage_by_stage_topology() {
        let mut mesh = solid(&cube(10.0));
        let cut = plane([0.0, 0.0, 1.0], 0.0);
        let mut contact = define_contact(&mesh, &cut, &SliceSettings::default()).unwrap();

        divide_up_contact(&mut mesh, &mut contact).unwrap();
        // eight crossed wall triangles become three each
        assert_eq!(mesh.num_faces(), 28);
        assert_eq!(mesh.num_vertices(), 16);
        assert!(mesh.is_watertight());
        assert!(contact
            .elements
            .iter()
            .all(|e| e.edge.is_some() && e.split_face_positive.is_some() && e.split_face_negative.is_some()));

        let duplicates = duplicate_vertices_at_contact(&mut mesh, &mut contact).unwrap();
        assert_eq!(duplicates.len(), 8);
        assert_eq!(mesh.num_vertices(), 24);
        assert!(!mesh.is_watertight());
        assert!(contact.elements.iter().all(|e| e.duplicate_vertex.is_some()));

        let added = cap_loops(&mut mesh, &contact, &duplicates).unwrap();
        assert_eq!(added, 12);
        assert!(mesh.is_watertight());
        assert_eq!(mesh.connected_components().len(), 2);

        let (positive, negative) = partition(&mesh, &contact).unwrap();
        assert_eq!((positive.len(), negative.len()), (1, 1));
    }

    #[test]
    fn test_unmarked_contact_edge_makes_vertex_inseparable() {
        let mut mesh = solid(&cube(10.0));
        let cut = plane([0.0, 0.0, 1.0], 0.0);
        let mut contact = define_contact(&mesh, &cut, &SliceSettings::default()).unwrap();
        divide_up_contact(&mut mesh, &mut contact).unwrap();

        // without its edge the flood around either end leaks to the positive side
        let ends = [contact.elements[0].start, contact.elements[0].end].map(|cv| contact.vertex_of(cv).unwrap());
        contact.elements[0].edge = None;
        let faces = mesh.num_faces();

        let err = duplicate_vertices_at_contact(&mut mesh, &mut contact).unwrap_err();
        let SliceError::InseparableVertex { vertex, position } = err else {
            panic!("expected an inseparable vertex");
        };
        assert!(ends.contains(&vertex));
        assert_relative_eq!(position.z, 0.0, epsilon = 1e-12);
        assert_eq!(mesh.num_faces(), faces);
    }

    #[test]
    fn test_plane_above_and_below_is_a_no_op() {
        let mut mesh = solid(&cube(10.0));
        let result = assert_cut(&mut mesh, &plane([0.0, 0.0, 1.0], -20.0), &[1000.0], &[]);
        assert!(result.loops.is_empty());
        assert_eq!(mesh.num_faces(), 12);
        assert_cut(&mut mesh, &plane([0.0, 0.0, 1.0], 20.0), &[], &[1000.0]);
    }

    #[test]
    fn test_plane_through_a_face_routes_whole_mesh() {
        let mut mesh = solid(&cube(10.0));
        assert_cut(&mut mesh, &plane([0.0, 0.0, 1.0], 5.0), &[], &[1000.0]);
        assert_cut(&mut mesh, &plane([0.0, 0.0, 1.0], -5.0), &[1000.0], &[]);
    }

    #[test]
    fn test_l_prism_cuts_conserve_volume() {
        let r = std::f64::consts::FRAC_1_SQRT_2;
        assert_cut(&mut l_prism(), &plane([0.0, 0.0, 1.0], 0.7), &[7.8], &[4.2]);
        assert_cut(&mut l_prism(), &plane([1.0, 0.0, 0.0], 0.5), &[9.0], &[3.0]);
        assert_cut(&mut l_prism(), &plane([0.0, 1.0, 0.0], 2.0), &[2.0], &[10.0]);
        let mut mesh = l_prism();
        let result = slice_on_flat(&mut mesh, &plane([r, r, 0.0], 1.3), &SliceSettings::default()).unwrap();
        let (p, n) = result.volumes();
        assert_relative_eq!(p + n, 12.0, epsilon = 1e-6);
        assert!(p > 0.0 && n > 0.0);
    }

    #[test]
    fn test_cut_along_concave_ledge() {
        assert_cut(&mut l_prism(), &plane([0.0, 1.0, 0.0], 1.0), &[4.0], &[8.0]);
        assert_cut(&mut l_prism(), &plane([1.0, 0.0, 0.0], 1.0), &[6.0], &[6.0]);
        assert_cut(&mut l_prism(), &plane([0.0, -1.0, 0.0], -1.0), &[8.0], &[4.0]);
    }

    #[test]
    fn test_cube_cut_through_edges_and_corners() {
        let r = std::f64::consts::FRAC_1_SQRT_2;
        assert_cut(&mut solid(&cube(10.0)), &plane([r, r, 0.0], 0.0), &[500.0], &[500.0]);
        assert_cut(&mut solid(&cube(10.0)), &plane([r, -r, 0.0], 0.0), &[500.0], &[500.0]);
        let mut mesh = solid(&cube(10.0));
        let result = slice_on_flat(&mut mesh, &plane([1.0, 1.0, 1.0], 0.3), &SliceSettings::default()).unwrap();
        let (p, n) = result.volumes();
        assert_relative_eq!(p + n, 1000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_tube_cut_across_and_along_hole_wall() {
        let result = assert_cut(&mut tube(), &plane([0.0, 0.0, 1.0], 2.5), &[210.0], &[210.0]);
        assert_eq!(result.loops.iter().filter(|l| l.is_positive).count(), 1);
        assert_eq!(result.loops.iter().filter(|l| !l.is_positive).count(), 1);
        assert_cut(&mut tube(), &plane([1.0, 0.0, 0.0], 5.0), &[210.0], &[210.0]);
        assert_cut(&mut tube(), &plane([1.0, 0.0, 0.0], 3.0), &[270.0], &[150.0]);
    }

    #[test]
    fn test_disjoint_pieces_are_routed_by_centroid() {
        let mut data = cube(10.0);
        data.merge(&cuboid(Point3::new(20.0, 20.0, 10.0), Point3::new(22.0, 22.0, 12.0)));
        assert_cut(&mut solid(&data), &plane([0.0, 0.0, 1.0], 0.0), &[500.0, 8.0], &[500.0]);
    }

    #[test]
    fn test_cut_through_vertex_ring() {
        let mut mesh = solid(&stacked_box());
        assert_relative_eq!(mesh.volume(), 1000.0, epsilon = 1e-9);
        assert_cut(&mut mesh, &plane([0.0, 0.0, 1.0], 0.0), &[500.0], &[500.0]);
        assert_cut(&mut solid(&stacked_box()), &plane([0.0, 0.0, -1.0], 0.0), &[500.0], &[500.0]);
    }

    #[test]
    fn test_open_mesh_needs_artificial_closure() {
        let mut data = cube(10.0);
        // drop the +x wall
        data.triangles.remove(6);
        data.triangles.remove(6);
        let mesh = solid(&data);
        let cut = plane([0.0, 0.0, 1.0], 0.0);

        let err = define_contact(&mesh, &cut, &SliceSettings::default()).unwrap_err();
        assert!(matches!(err, SliceError::LoopClosureExhausted { remaining: 6 }));

        let settings = SliceSettings {
            close_open_loops: true,
            ..Default::default()
        };
        let contact = define_contact(&mesh, &cut, &settings).unwrap();
        assert!(!contact.loops.is_empty());
        assert!(contact
            .elements
            .iter()
            .any(|e| e.contact_type == ContactType::Artificial));
        let referenced: usize = contact.loops.iter().map(|l| l.elements.len()).sum();
        assert_eq!(referenced, contact.elements.len());
    }

    #[test]
    fn test_empty_mesh_and_bad_settings() {
        let mut empty = TessellatedSolid::new();
        let cut = plane([0.0, 0.0, 1.0], 0.0);
        assert_eq!(
            slice_on_flat(&mut empty, &cut, &SliceSettings::default()).unwrap_err(),
            SliceError::Mesh(MeshError::EmptyMesh)
        );
        let settings = SliceSettings {
            tolerance: -1.0,
            ..Default::default()
        };
        let err = slice_on_flat(&mut solid(&cube(1.0)), &cut, &settings).unwrap_err();
        assert!(matches!(err, SliceError::InvalidSettings(_)));
    }

    #[test]
    fn test_parallel_slices() {
        let mesh = solid(&cube(10.0));
        let planes: Vec<Plane> = [-2.5, 0.0, 2.5].iter().map(|&d| plane([0.0, 0.0, 1.0], d)).collect();
        let results = slice_on_flats(&mesh, &planes, &SliceSettings::default());
        let positive: Vec<f64> = results.into_iter().map(|r| r.unwrap().volumes().0).collect();
        assert_relative_eq!(positive[0], 750.0, epsilon = 1e-6);
        assert_relative_eq!(positive[1], 500.0, epsilon = 1e-6);
        assert_relative_eq!(positive[2], 250.0, epsilon = 1e-6);
        assert_eq!(mesh.num_faces(), 12);
    }
}
