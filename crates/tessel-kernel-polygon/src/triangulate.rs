//! Ear-clipping triangulation of rings with holes.

use tessel_kernel_math::{cross_2d, Point2};

use crate::error::{PolygonError, Result};
use crate::line::{line_intercept, SegmentIntersection};
use crate::polygon::Polygon;

/// Triangulate an outer ring with holes.
///
/// Indices refer to the concatenation of `outer.points` followed by each
/// hole's points in order. Triangles are counter-clockwise regardless of
/// how the input rings are wound.
pub fn triangulate(outer: &Polygon, holes: &[Polygon]) -> Result<Vec<[usize; 3]>> {
    let mut verts: Vec<Point2> = outer.points.clone();
    let mut poly_indices: Vec<usize> = (0..outer.len()).collect();
    if !outer.is_ccw() {
        poly_indices.reverse();
    }

    // Track where each inner loop starts, rightmost holes first
    let mut hole_rings: Vec<Vec<usize>> = Vec::with_capacity(holes.len());
    for hole in holes {
        let start = verts.len();
        verts.extend_from_slice(&hole.points);
        if hole.len() < 3 {
            continue;
        }
        let mut ring: Vec<usize> = (start..start + hole.len()).collect();
        if hole.is_ccw() {
            ring.reverse();
        }
        hole_rings.push(ring);
    }
    hole_rings.sort_by(|a, b| {
        let max_x = |r: &Vec<usize>| r.iter().map(|&i| verts[i].x).fold(f64::MIN, f64::max);
        max_x(b).total_cmp(&max_x(a))
    });

    for ring in &hole_rings {
        poly_indices = bridge_hole(&verts, &poly_indices, ring);
    }

    ear_clip_triangulate(&verts, &poly_indices)
}

/// Splice `ring` into `poly` through the shortest bridge that crosses no
/// existing edge.
fn bridge_hole(verts: &[Point2], poly: &[usize], ring: &[usize]) -> Vec<usize> {
    // (dist, inner_idx, outer_poly_idx)
    let mut candidates: Vec<(f64, usize, usize)> = Vec::with_capacity(ring.len() * poly.len());
    for (i, &inner) in ring.iter().enumerate() {
        for (j, &outer) in poly.iter().enumerate() {
            candidates.push(((verts[outer] - verts[inner]).norm_squared(), i, j));
        }
    }
    candidates.sort_by(|a, b| a.0.total_cmp(&b.0));

    let visible = candidates
        .iter()
        .find(|&&(_, i, j)| bridge_is_clear(verts, poly, ring, ring[i], poly[j]))
        .or_else(|| candidates.first());
    let Some(&(_, best_inner, best_outer)) = visible else {
        return poly.to_vec();
    };

    // poly[..=outer] + hole from the bridge vertex + back across the bridge + rest
    let hole: Vec<usize> = (0..ring.len()).map(|k| ring[(best_inner + k) % ring.len()]).collect();
    let mut merged = Vec::with_capacity(poly.len() + ring.len() + 2);
    merged.extend_from_slice(&poly[..=best_outer]);
    merged.extend_from_slice(&hole);
    merged.push(hole[0]);
    merged.push(poly[best_outer]);
    merged.extend_from_slice(&poly[best_outer + 1..]);
    merged
}

fn bridge_is_clear(verts: &[Point2], poly: &[usize], ring: &[usize], inner: usize, outer: usize) -> bool {
    let tol = tessel_kernel_math::Tolerance::DEFAULT;
    let (a, b) = (verts[inner], verts[outer]);
    let crosses = |loop_: &[usize]| {
        (0..loop_.len()).any(|k| {
            let (p, q) = (loop_[k], loop_[(k + 1) % loop_.len()]);
            if p == inner || q == inner || p == outer || q == outer {
                return false;
            }
            !matches!(line_intercept(&a, &b, &verts[p], &verts[q], &tol), SegmentIntersection::None)
        })
    };
    !crosses(poly) && !crosses(ring)
}

/// Ear clipping over a simple (possibly bridged) counter-clockwise ring.
fn ear_clip_triangulate(verts: &[Point2], indices: &[usize]) -> Result<Vec<[usize; 3]>> {
    let mut out = Vec::with_capacity(indices.len().saturating_sub(2));
    if indices.len() < 3 {
        return Ok(out);
    }
    let mut remaining: Vec<usize> = indices.to_vec();

    while remaining.len() > 3 {
        let ear = find_ear(verts, &remaining, false).or_else(|| find_ear(verts, &remaining, true));
        match ear {
            Some(i) => {
                let n = remaining.len();
                let (prev, next) = ((i + n - 1) % n, (i + 1) % n);
                if cross_2d(&verts[remaining[prev]], &verts[remaining[i]], &verts[remaining[next]]) > 0.0 {
                    out.push([remaining[prev], remaining[i], remaining[next]]);
                }
                remaining.remove(i);
            }
            None => {
                return Err(PolygonError::TriangulationFailed {
                    remaining: remaining.len(),
                })
            }
        }
    }

    if cross_2d(&verts[remaining[0]], &verts[remaining[1]], &verts[remaining[2]]) > 0.0 {
        out.push([remaining[0], remaining[1], remaining[2]]);
    }
    Ok(out)
}

/// First clippable vertex. With `allow_degenerate`, flat (zero-area)
/// corners also count, which unsticks bridged rings.
fn find_ear(verts: &[Point2], remaining: &[usize], allow_degenerate: bool) -> Option<usize> {
    let n = remaining.len();
    (0..n).find(|&i| {
        let prev = (i + n - 1) % n;
        let next = (i + 1) % n;
        let a = verts[remaining[prev]];
        let b = verts[remaining[i]];
        let c = verts[remaining[next]];

        let cross = cross_2d(&a, &b, &c);
        let is_convex = if allow_degenerate { cross >= 0.0 } else { cross > 0.0 };
        if !is_convex {
            return false;
        }
        if cross == 0.0 {
            return true;
        }
        // no other vertex may sit inside the ear
        (0..n).all(|j| {
            if j == prev || j == i || j == next {
                return true;
            }
            let p = verts[remaining[j]];
            p == a || p == b || p == c || !point_in_triangle_2d(p, a, b, c)
        })
    })
}

/// Check if a point is inside a triangle in 2D using barycentric coordinates.
///
/// Points on the boundary count as inside, so an ear whose diagonal runs
/// through a collinear vertex is rejected.
fn point_in_triangle_2d(p: Point2, a: Point2, b: Point2, c: Point2) -> bool {
    let v0 = c - a;
    let v1 = b - a;
    let v2 = p - a;

    let dot00 = v0.dot(&v0);
    let dot01 = v0.dot(&v1);
    let dot02 = v0.dot(&v2);
    let dot11 = v1.dot(&v1);
    let dot12 = v1.dot(&v2);

    let denom = dot00 * dot11 - dot01 * dot01;
    if denom == 0.0 {
        return false;
    }
    let inv_denom = 1.0 / denom;
    let u = (dot11 * dot02 - dot01 * dot12) * inv_denom;
    let v = (dot00 * dot12 - dot01 * dot02) * inv_denom;

    let eps = 1e-10;
    u >= -eps && v >= -eps && (u + v) <= 1.0 + eps
}
