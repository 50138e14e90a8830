//! Where a plane meets a solid: contact elements and the loops they form.
//!
//! Contact definition only reads the mesh. Points where the plane crosses
//! an edge are cached per edge as [`ContactVertex::OnEdge`] and turned
//! into real vertices later, by [`crate::slice::divide_up_contact`].

use std::collections::{BTreeMap, HashMap, HashSet};

use slotmap::SecondaryMap;
use tessel_kernel_math::{ccw_angle, Plane, Point2, Point3, Tolerance, Vec3};
use tessel_kernel_mesh::{Curvature, EdgeId, FaceId, TessellatedSolid, VertexId};
use tessel_kernel_polygon::Polygon;
use tracing::{debug, trace};

use crate::error::{Result, SliceError};
use crate::SliceSettings;

/// An endpoint of a contact element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContactVertex {
    /// An existing vertex lying on the plane.
    OnPlane(VertexId),
    /// The point where the plane crosses an edge.
    OnEdge(EdgeId),
}

/// How a contact element meets the mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactType {
    /// Crosses a face from one of its corners to the opposite edge.
    ThroughVertex,
    /// Crosses a face from one edge to another.
    ThroughFace,
    /// Runs along an existing edge lying in the plane.
    AlongEdge,
    /// Closes an open loop; no mesh geometry backs it.
    Artificial,
}

/// A directed segment in the cutting plane.
///
/// Elements are oriented so the solid's cross-section lies to their left,
/// seen from the positive side of the plane.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactElement {
    /// Start point.
    pub start: ContactVertex,
    /// End point.
    pub end: ContactVertex,
    /// Kind of contact.
    pub contact_type: ContactType,
    /// Face the element crosses.
    pub face: Option<FaceId>,
    /// Mesh edge lying along the element: the in-plane edge for
    /// [`ContactType::AlongEdge`], the new edge once a crossed face has
    /// been divided.
    pub edge: Option<EdgeId>,
    /// Face bordering the element on the positive side.
    pub split_face_positive: Option<FaceId>,
    /// Face bordering the element on the negative side.
    pub split_face_negative: Option<FaceId>,
    /// Copy of the start vertex that the positive side keeps.
    pub duplicate_vertex: Option<VertexId>,
}

impl ContactElement {
    fn new(start: ContactVertex, end: ContactVertex, contact_type: ContactType) -> Self {
        Self {
            start,
            end,
            contact_type,
            face: None,
            edge: None,
            split_face_positive: None,
            split_face_negative: None,
            duplicate_vertex: None,
        }
    }

    /// Mesh edge the start point lies on.
    pub fn start_edge(&self) -> Option<EdgeId> {
        match self.start {
            ContactVertex::OnEdge(e) => Some(e),
            ContactVertex::OnPlane(_) => None,
        }
    }

    /// Mesh edge the end point lies on.
    pub fn end_edge(&self) -> Option<EdgeId> {
        match self.end {
            ContactVertex::OnEdge(e) => Some(e),
            ContactVertex::OnPlane(_) => None,
        }
    }

    /// Backed by mesh geometry.
    pub fn is_real(&self) -> bool {
        self.contact_type != ContactType::Artificial
    }
}

/// A closed chain of contact elements.
#[derive(Debug, Clone, PartialEq)]
pub struct Loop {
    /// Indices into [`ContactData::elements`], in traversal order.
    pub elements: Vec<usize>,
    /// Counter-clockwise about the plane normal: an outer boundary of the
    /// cross-section rather than a hole.
    pub is_positive: bool,
    /// Signed area in the plane.
    pub area: f64,
    /// Length of the loop.
    pub perimeter: f64,
    /// The loop projected into the plane's 2D frame.
    pub polygon: Polygon,
}

/// Everything [`define_contact`] learns about a plane and a solid.
#[derive(Debug, Clone)]
pub struct ContactData {
    /// The cutting plane.
    pub plane: Plane,
    /// All contact elements, including any artificial closures.
    pub elements: Vec<ContactElement>,
    /// Closed loops over [`Self::elements`].
    pub loops: Vec<Loop>,
    /// Faces lying in the plane.
    pub in_plane_faces: Vec<FaceId>,
    /// Crossing points of straddling edges.
    pub split_points: BTreeMap<EdgeId, Point3>,
    /// Mesh vertices created at the split points.
    pub split_vertices: HashMap<EdgeId, VertexId>,
    /// Signed vertex distances, snapped to zero within tolerance.
    pub distances: SecondaryMap<VertexId, f64>,
}

impl ContactData {
    /// Loops bounding the cross-section from outside.
    pub fn positive_loops(&self) -> impl Iterator<Item = &Loop> {
        self.loops.iter().filter(|l| l.is_positive)
    }

    /// Loops bounding holes in the cross-section.
    pub fn negative_loops(&self) -> impl Iterator<Item = &Loop> {
        self.loops.iter().filter(|l| !l.is_positive)
    }

    /// Total area of the cross-section.
    pub fn section_area(&self) -> f64 {
        self.loops.iter().map(|l| l.area).sum()
    }

    /// Snapped distance of a vertex from the plane.
    pub fn distance(&self, v: VertexId) -> f64 {
        self.distances.get(v).copied().unwrap_or(0.0)
    }

    /// Mesh vertex standing for a contact point, once it exists.
    pub fn vertex_of(&self, cv: ContactVertex) -> Option<VertexId> {
        match cv {
            ContactVertex::OnPlane(v) => Some(v),
            ContactVertex::OnEdge(e) => self.split_vertices.get(&e).copied(),
        }
    }

    /// Position of a contact point.
    pub fn position_of(&self, mesh: &TessellatedSolid, cv: ContactVertex) -> Option<Point3> {
        match cv {
            ContactVertex::OnPlane(v) => mesh.position(v),
            ContactVertex::OnEdge(e) => self.split_points.get(&e).copied(),
        }
    }

    /// Which side of the plane a face is on.
    pub(crate) fn side_of(&self, mesh: &TessellatedSolid, face: FaceId) -> Side {
        let Some(f) = mesh.faces.get(face) else {
            return Side::InPlane;
        };
        let (mut above, mut below) = (false, false);
        for &v in &f.vertices {
            let d = self.distance(v);
            above |= d > 0.0;
            below |= d < 0.0;
        }
        match (above, below) {
            (true, true) => Side::Crossing,
            (true, false) => Side::Positive,
            (false, true) => Side::Negative,
            (false, false) => Side::InPlane,
        }
    }
}

/// Position of a face relative to the plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Positive,
    Negative,
    InPlane,
    Crossing,
}

/// Intersect a plane with a solid.
///
/// Emits one contact element per face the plane crosses and one per
/// in-plane edge that separates the two sides, then chains them into
/// loops. The mesh is not modified.
pub fn define_contact(mesh: &TessellatedSolid, plane: &Plane, settings: &SliceSettings) -> Result<ContactData> {
    settings.validate()?;
    let tol = settings.tolerance;
    let normal = plane.normal.into_inner();

    let mut distances = SecondaryMap::with_capacity(mesh.num_vertices());
    for (v, vertex) in &mesh.vertices {
        let d = plane.signed_distance(&vertex.position);
        distances.insert(v, if d.abs() < tol { 0.0 } else { d });
    }

    let mut contact = ContactData {
        plane: *plane,
        elements: Vec::new(),
        loops: Vec::new(),
        in_plane_faces: Vec::new(),
        split_points: BTreeMap::new(),
        split_vertices: HashMap::new(),
        distances,
    };

    for (e, edge) in &mesh.edges {
        let (da, db) = (contact.distance(edge.from), contact.distance(edge.to));
        if da * db < 0.0 {
            let (a, b) = (mesh.vertices[edge.from].position, mesh.vertices[edge.to].position);
            contact.split_points.insert(e, a + (b - a) * (da / (da - db)));
        }
    }

    for (e, edge) in &mesh.edges {
        if contact.distance(edge.from) != 0.0 || contact.distance(edge.to) != 0.0 {
            continue;
        }
        if let Some(element) = along_edge(mesh, &contact, e, normal) {
            contact.elements.push(element);
        }
    }

    for (f, face) in &mesh.faces {
        match contact.side_of(mesh, f) {
            Side::InPlane => {
                contact.in_plane_faces.push(f);
                continue;
            }
            Side::Crossing => {}
            Side::Positive | Side::Negative => continue,
        }
        let mut points = Vec::with_capacity(2);
        let mut contact_type = ContactType::ThroughFace;
        if let Some(&v) = face.vertices.iter().find(|&&v| contact.distance(v) == 0.0) {
            points.push(ContactVertex::OnPlane(v));
            contact_type = ContactType::ThroughVertex;
        }
        points.extend(
            face.edges
                .iter()
                .filter(|e| contact.split_points.contains_key(e))
                .map(|&e| ContactVertex::OnEdge(e)),
        );
        let [a, b] = points[..] else {
            trace!(?f, points = points.len(), "crossing face without two contact points");
            continue;
        };
        let (start, end) = orient(mesh, &contact, a, b, face.normal, normal);
        let mut element = ContactElement::new(start, end, contact_type);
        element.face = Some(f);
        contact.elements.push(element);
    }

    let split_positions = contact_positions(&contact);
    contact.loops = find_loops(mesh, &mut contact.elements, &split_positions, plane, settings)?;
    verify_loops(&contact)?;
    debug!(
        elements = contact.elements.len(),
        loops = contact.loops.len(),
        in_plane_faces = contact.in_plane_faces.len(),
        "contact defined"
    );
    Ok(contact)
}

/// Contact element for an in-plane edge, if it separates the two sides.
///
/// An edge between two faces on opposite sides is a real cut. An edge
/// between an in-plane face and an off-plane one only counts when it is
/// concave; a convex one is just the rim of a flat face.
fn along_edge(mesh: &TessellatedSolid, contact: &ContactData, e: EdgeId, normal: Vec3) -> Option<ContactElement> {
    let edge = &mesh.edges[e];
    let (owned, other) = (edge.owned_face?, edge.other_face?);
    let (s1, s2) = (contact.side_of(mesh, owned), contact.side_of(mesh, other));

    let (positive, negative, facing) = match (s1, s2) {
        (Side::InPlane, Side::InPlane) => return None,
        (Side::InPlane, off) | (off, Side::InPlane) => {
            if edge.curvature != Curvature::Concave {
                return None;
            }
            let (off_face, on_face) = if s1 == Side::InPlane { (other, owned) } else { (owned, other) };
            let facing = mesh.faces[off_face].normal;
            if off == Side::Positive {
                (off_face, on_face, facing)
            } else {
                (on_face, off_face, facing)
            }
        }
        (Side::Positive, Side::Negative) => (owned, other, mesh.faces[owned].normal + mesh.faces[other].normal),
        (Side::Negative, Side::Positive) => (other, owned, mesh.faces[owned].normal + mesh.faces[other].normal),
        _ => return None,
    };

    let (start, end) = orient(
        mesh,
        contact,
        ContactVertex::OnPlane(edge.from),
        ContactVertex::OnPlane(edge.to),
        facing,
        normal,
    );
    let mut element = ContactElement::new(start, end, ContactType::AlongEdge);
    element.edge = Some(e);
    element.split_face_positive = Some(positive);
    element.split_face_negative = Some(negative);
    Some(element)
}

/// Order two contact points so the solid lies to the left.
///
/// `facing` is the outward direction of the surface at the contact. Its
/// in-plane part points out of the cross-section, so the segment must run
/// along `normal × facing`.
fn orient(
    mesh: &TessellatedSolid,
    contact: &ContactData,
    a: ContactVertex,
    b: ContactVertex,
    facing: Vec3,
    normal: Vec3,
) -> (ContactVertex, ContactVertex) {
    let (Some(pa), Some(pb)) = (contact.position_of(mesh, a), contact.position_of(mesh, b)) else {
        return (a, b);
    };
    let outward = facing - normal * facing.dot(&normal);
    if (pb - pa).dot(&normal.cross(&outward)) < 0.0 {
        (b, a)
    } else {
        (a, b)
    }
}

fn contact_positions(contact: &ContactData) -> HashMap<ContactVertex, Point3> {
    contact
        .split_points
        .iter()
        .map(|(&e, &p)| (ContactVertex::OnEdge(e), p))
        .collect()
}

/// Chain elements into closed loops.
///
/// Each loop grows from the first unused element by following
/// end-to-start matches, preferring the candidate reached by the smallest
/// counter-clockwise turn. A seed that cannot be closed is retried later;
/// once every remaining seed has failed in a row the contact is declared
/// unclosable, unless open chains may be closed artificially.
fn find_loops(
    mesh: &TessellatedSolid,
    elements: &mut Vec<ContactElement>,
    split_positions: &HashMap<ContactVertex, Point3>,
    plane: &Plane,
    settings: &SliceSettings,
) -> Result<Vec<Loop>> {
    let position = |cv: ContactVertex| -> Point3 {
        match cv {
            ContactVertex::OnPlane(v) => mesh.vertices[v].position,
            ContactVertex::OnEdge(_) => split_positions.get(&cv).copied().unwrap_or_else(Point3::origin),
        }
    };
    let flat = |cv: ContactVertex| -> Point2 { plane.project(&position(cv)) };
    let tol = Tolerance::linear(settings.tolerance);

    let mut by_start: HashMap<ContactVertex, Vec<usize>> = HashMap::new();
    for (i, element) in elements.iter().enumerate() {
        by_start.entry(element.start).or_default().push(i);
    }
    let mut used = vec![false; elements.len()];

    let mut unused: Vec<usize> = (0..elements.len()).collect();
    let mut loops = Vec::new();
    let mut fails = 0;
    while let Some(&seed) = unused.first() {
        let seed_start = elements[seed].start;
        let mut chain = vec![seed];
        let mut in_chain = HashSet::from([seed]);
        let closed = loop {
            let current = &elements[chain[chain.len() - 1]];
            if current.end == seed_start {
                break true;
            }
            let mut candidates: Vec<usize> = by_start
                .get(&current.end)
                .into_iter()
                .flatten()
                .copied()
                .filter(|i| !used[*i] && !in_chain.contains(i))
                .collect();
            if candidates.is_empty() {
                // exact matches failed; this rescan is linear in the unused elements
                let here = position(current.end);
                if tol.points_equal(&here, &position(seed_start)) {
                    break true;
                }
                candidates = unused
                    .iter()
                    .copied()
                    .filter(|i| !in_chain.contains(i) && tol.points_equal(&position(elements[*i].start), &here))
                    .collect();
            }
            if candidates.is_empty() {
                break false;
            }
            if candidates.len() > 1 {
                let here = flat(current.end);
                let heading = here - flat(current.start);
                let turn = |i: usize| ccw_angle(&heading, &(flat(elements[i].end) - here));
                candidates.sort_by(|&a, &b| turn(a).total_cmp(&turn(b)).then(a.cmp(&b)));
            }
            chain.push(candidates[0]);
            in_chain.insert(candidates[0]);
        };

        if !closed && !settings.close_open_loops {
            fails += 1;
            trace!(seed, fails, chain = chain.len(), "loop seed failed to close");
            if fails > unused.len() {
                return Err(SliceError::LoopClosureExhausted {
                    remaining: unused.len(),
                });
            }
            unused.rotate_left(1);
            continue;
        }

        unused.retain(|i| !in_chain.contains(i));
        for &i in &chain {
            used[i] = true;
        }
        if !closed {
            let last = elements[chain[chain.len() - 1]].end;
            trace!(seed, chain = chain.len(), "closing open loop artificially");
            elements.push(ContactElement::new(last, seed_start, ContactType::Artificial));
            chain.push(elements.len() - 1);
        }
        fails = 0;

        let polygon = Polygon::new(chain.iter().map(|&i| flat(elements[i].start)).collect());
        let area = polygon.signed_area();
        let perimeter = chain
            .iter()
            .map(|&i| (position(elements[i].end) - position(elements[i].start)).norm())
            .sum();
        loops.push(Loop {
            elements: chain,
            is_positive: area > 0.0,
            area,
            perimeter,
            polygon,
        });
    }
    Ok(loops)
}

/// Every element belongs to exactly one loop.
fn verify_loops(contact: &ContactData) -> Result<()> {
    let mut count = vec![0usize; contact.elements.len()];
    for l in &contact.loops {
        for &i in &l.elements {
            count[i] += 1;
        }
    }
    match count.iter().position(|&c| c != 1) {
        Some(index) => Err(SliceError::UnreferencedContactElement {
            index,
            count: count[index],
        }),
        None => Ok(()),
    }
}
