use super::{IndexBuffer, RenderMesh};
use glamx::{Vec2, Vec3};

// (outward normal, u, v) with u × v = normal so the corners below wind
// counterclockwise seen from outside.
const FACES: [[Vec3; 3]; 6] = [
    [Vec3::X, Vec3::NEG_Z, Vec3::Y],
    [Vec3::NEG_X, Vec3::Z, Vec3::Y],
    [Vec3::Y, Vec3::X, Vec3::NEG_Z],
    [Vec3::NEG_Y, Vec3::X, Vec3::Z],
    [Vec3::Z, Vec3::X, Vec3::Y],
    [Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y],
];

/// Generates a box centered at the origin with the given full extents.
///
/// Each face has its own four vertices so the edges stay sharp under
/// lighting.
///
/// # Example
/// ```no_run
/// # use turntable::procedural::cuboid;
/// # use glamx::Vec3;
/// let unit_box = cuboid(Vec3::ONE);
/// assert_eq!(unit_box.num_triangles(), 12);
/// ```
pub fn cuboid(extents: Vec3) -> RenderMesh {
    let mut coords = Vec::with_capacity(24);
    let mut normals = Vec::with_capacity(24);
    let mut uvs = Vec::with_capacity(24);
    let mut faces = Vec::with_capacity(12);

    for [n, u, v] in FACES {
        let base = coords.len() as u32;

        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            coords.push((n + u * su + v * sv) * 0.5 * extents);
            normals.push(n);
            uvs.push(Vec2::new((su + 1.0) * 0.5, (1.0 - sv) * 0.5));
        }

        faces.push([base, base + 1, base + 2]);
        faces.push([base, base + 2, base + 3]);
    }

    RenderMesh::new(
        coords,
        Some(normals),
        Some(uvs),
        Some(IndexBuffer::Unified(faces)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cuboid_spans_its_extents() {
        let mesh = cuboid(Vec3::new(1.0, 2.0, 3.0));
        let max = mesh.coords.iter().fold(Vec3::splat(f32::MIN), |m, c| m.max(*c));
        let min = mesh.coords.iter().fold(Vec3::splat(f32::MAX), |m, c| m.min(*c));
        assert_eq!(max, Vec3::new(0.5, 1.0, 1.5));
        assert_eq!(min, -max);
    }

    #[test]
    fn cuboid_triangles_face_outward() {
        let mesh = cuboid(Vec3::ONE);
        let normals = mesh.normals.as_ref().unwrap();
        let IndexBuffer::Unified(ref faces) = mesh.indices else {
            panic!("cuboids use a unified index buffer");
        };

        assert_eq!(faces.len(), 12);
        for f in faces {
            let [a, b, c] = f.map(|i| mesh.coords[i as usize]);
            let winding = (b - a).cross(c - a).normalize();
            assert!((winding - normals[f[0] as usize]).length() < 1.0e-6);
            // Outward: the face normal points away from the center.
            assert!(winding.dot(a) > 0.0);
        }
    }
}
