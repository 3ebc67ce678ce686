//! Utilities shared by the mesh generators and loaders.

use glamx::Vec3;

/// Computes smooth per-vertex normals by averaging the normals of the
/// adjacent faces.
///
/// Vertices used by no face, or only by degenerate faces, get a zero normal.
pub fn compute_normals(coordinates: &[Vec3], faces: &[[u32; 3]], normals: &mut Vec<Vec3>) {
    normals.clear();
    normals.resize(coordinates.len(), Vec3::ZERO);

    for f in faces {
        let [a, b, c] = f.map(|i| i as usize);
        let cross = (coordinates[b] - coordinates[a]).cross(coordinates[c] - coordinates[a]);

        // Area weighted: larger faces pull harder.
        normals[a] += cross;
        normals[b] += cross;
        normals[c] += cross;
    }

    for n in normals.iter_mut() {
        *n = n.normalize_or_zero();
    }
}

/// Pushes the two counterclockwise triangles of the quad `ul, ur, dl, dr`.
#[inline]
pub fn push_rectangle_indices(ul: u32, ur: u32, dl: u32, dr: u32, out: &mut Vec<[u32; 3]>) {
    out.push([ul, dl, ur]);
    out.push([dl, dr, ur]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_triangle_normals_follow_the_winding() {
        let coords = [Vec3::ZERO, Vec3::X, Vec3::Y];
        let mut normals = Vec::new();
        compute_normals(&coords, &[[0, 1, 2]], &mut normals);
        assert_eq!(normals, vec![Vec3::Z; 3]);

        compute_normals(&coords, &[[0, 2, 1]], &mut normals);
        assert_eq!(normals, vec![Vec3::NEG_Z; 3]);
    }

    #[test]
    fn unused_vertices_get_zero_normals() {
        let coords = [Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::ONE];
        let mut normals = Vec::new();
        compute_normals(&coords, &[[0, 1, 2]], &mut normals);
        assert_eq!(normals[3], Vec3::ZERO);
    }

    #[test]
    fn rectangle_triangles_are_counterclockwise() {
        // ul(0, 1) ur(1, 1) dl(0, 0) dr(1, 0)
        let coords = [Vec3::Y, Vec3::new(1.0, 1.0, 0.0), Vec3::ZERO, Vec3::X];
        let mut faces = Vec::new();
        push_rectangle_indices(0, 1, 2, 3, &mut faces);

        for f in faces {
            let [a, b, c] = f.map(|i| coords[i as usize]);
            assert!((b - a).cross(c - a).z > 0.0);
        }
    }
}
