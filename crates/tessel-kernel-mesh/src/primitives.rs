//! Closed triangle meshes of simple solids.

use tessel_kernel_math::Point3;
use tessel_kernel_polygon::{triangulate, Polygon};

use crate::data::MeshData;

/// Axis-aligned box between two corners.
pub fn cuboid(min: Point3, max: Point3) -> MeshData {
    // x varies fastest, then y, then z
    let mut vertices = Vec::with_capacity(8);
    for z in [min.z, max.z] {
        for y in [min.y, max.y] {
            for x in [min.x, max.x] {
                vertices.push([x, y, z]);
            }
        }
    }
    let quads = [
        [0, 2, 3, 1], // -z
        [4, 5, 7, 6], // +z
        [0, 1, 5, 4], // -y
        [1, 3, 7, 5], // +x
        [3, 2, 6, 7], // +y
        [2, 0, 4, 6], // -x
    ];
    let triangles = quads
        .iter()
        .flat_map(|&[a, b, c, d]| [[a, b, c], [a, c, d]])
        .collect();
    MeshData { vertices, triangles }
}

/// Cube of edge `size` centred on the origin.
pub fn cube(size: f64) -> MeshData {
    let h = size / 2.0;
    cuboid(Point3::new(-h, -h, -h), Point3::new(h, h, h))
}

/// Extrude an outline with holes from `z0` up to `z1`.
///
/// Ring orientation of the input does not matter.
pub fn prism(outline: &Polygon, holes: &[Polygon], z0: f64, z1: f64) -> tessel_kernel_polygon::Result<MeshData> {
    let outer = outline.ccw_positive();
    let holes: Vec<Polygon> = holes.iter().map(Polygon::cw_negative).collect();
    let caps = triangulate(&outer, &holes)?;

    let rings: Vec<&Polygon> = std::iter::once(&outer).chain(holes.iter()).collect();
    let profile: Vec<[f64; 2]> = rings.iter().flat_map(|r| r.to_coords()).collect();
    let n = profile.len();

    let mut vertices: Vec<[f64; 3]> = profile.iter().map(|&[x, y]| [x, y, z0]).collect();
    vertices.extend(profile.iter().map(|&[x, y]| [x, y, z1]));

    let mut triangles: Vec<[usize; 3]> = caps.iter().map(|&[a, b, c]| [c, b, a]).collect();
    triangles.extend(caps.iter().map(|&[a, b, c]| [a + n, b + n, c + n]));

    let mut start = 0;
    for ring in rings {
        let len = ring.len();
        for k in 0..len {
            let (i, j) = (start + k, start + (k + 1) % len);
            triangles.push([i, j, j + n]);
            triangles.push([i, j + n, i + n]);
        }
        start += len;
    }
    Ok(MeshData { vertices, triangles })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solid::TessellatedSolid;
    use approx::assert_relative_eq;

    #[test]
    fn test_cuboid_is_closed_and_outward() {
        let data = cuboid(Point3::new(1.0, 2.0, 3.0), Point3::new(2.0, 4.0, 6.0));
        assert_eq!(data.num_triangles(), 12);
        assert_relative_eq!(data.volume(), 6.0, epsilon = 1e-12);
        assert!(TessellatedSolid::from_data(&data).unwrap().is_watertight());
    }

    #[test]
    fn test_tube() {
        let outer = Polygon::from_coords(&[[0.0, 0.0], [6.0, 0.0], [6.0, 6.0], [0.0, 6.0]]);
        let hole = Polygon::from_coords(&[[2.0, 2.0], [4.0, 2.0], [4.0, 4.0], [2.0, 4.0]]);
        let data = prism(&outer, &[hole], 0.0, 5.0).unwrap();
        assert_relative_eq!(data.volume(), 160.0, epsilon = 1e-9);
        let solid = TessellatedSolid::from_data(&data).unwrap();
        assert!(solid.is_watertight());
        assert_eq!(solid.connected_components().len(), 1);
    }

    #[test]
    fn test_clockwise_outline_is_reoriented() {
        let mut outline = Polygon::from_coords(&[[0.0, 0.0], [2.0, 0.0], [1.0, 2.0]]);
        outline.reverse();
        let data = prism(&outline, &[], -1.0, 1.0).unwrap();
        assert_relative_eq!(data.volume(), 4.0, epsilon = 1e-12);
    }
}
