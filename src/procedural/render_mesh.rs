use super::utils;
use glamx::{Vec2, Vec3};
use std::collections::HashMap;

/// Different representations of the index buffer.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IndexBuffer {
    /// The vertex, normal, and uvs share the same indices.
    Unified(Vec<[u32; 3]>),
    /// The vertex, normal, and uvs have different indices.
    /// Each element is `[[vertex_idx, normal_idx, uv_idx]; 3]` for the 3 corners.
    Split(Vec<[[u32; 3]; 3]>),
}

/// Geometric description of a mesh, on the CPU.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderMesh {
    /// Coordinates of the mesh vertices.
    pub coords: Vec<Vec3>,
    /// Coordinates of the mesh normals.
    pub normals: Option<Vec<Vec3>>,
    /// Textures coordinates of the mesh.
    pub uvs: Option<Vec<Vec2>>,
    /// Index buffer of the mesh.
    pub indices: IndexBuffer,
}

impl RenderMesh {
    /// Creates a new mesh.
    ///
    /// If no `indices` is provided, every three consecutive vertices form a
    /// triangle.
    pub fn new(
        coords: Vec<Vec3>,
        normals: Option<Vec<Vec3>>,
        uvs: Option<Vec<Vec2>>,
        indices: Option<IndexBuffer>,
    ) -> RenderMesh {
        let indices = indices.unwrap_or_else(|| {
            IndexBuffer::Unified(
                (0..coords.len() as u32 / 3)
                    .map(|i| [i * 3, i * 3 + 1, i * 3 + 2])
                    .collect(),
            )
        });

        RenderMesh {
            coords,
            normals,
            uvs,
            indices,
        }
    }

    /// The number of triangles on this mesh.
    #[inline]
    pub fn num_triangles(&self) -> usize {
        match self.indices {
            IndexBuffer::Unified(ref idx) => idx.len(),
            IndexBuffer::Split(ref idx) => idx.len(),
        }
    }

    /// Recomputes smooth normals from the vertex positions.
    pub fn recompute_normals(&mut self) {
        let coord_idx: Vec<[u32; 3]> = match self.indices {
            IndexBuffer::Unified(ref idx) => idx.clone(),
            IndexBuffer::Split(ref idx) => {
                idx.iter().map(|t| [t[0][0], t[1][0], t[2][0]]).collect()
            }
        };

        let mut normals = Vec::new();
        utils::compute_normals(&self.coords, &coord_idx, &mut normals);
        self.normals = Some(normals);

        // The normals are now indexed like the coordinates.
        if let IndexBuffer::Split(ref mut idx) = self.indices {
            for corner in idx.iter_mut().flatten() {
                corner[1] = corner[0];
            }
        }
    }

    /// Scales each vertex of this mesh.
    ///
    /// Normals are scaled by the inverse factors and renormalized so they
    /// stay perpendicular to the scaled surface.
    pub fn scale_by(&mut self, s: Vec3) {
        for c in self.coords.iter_mut() {
            *c *= s;
        }

        if let Some(ref mut normals) = self.normals {
            let inv_scale = s.recip();
            for n in normals.iter_mut() {
                *n = (*n * inv_scale).normalize_or_zero();
            }
        }
    }

    /// Forces the mesh to use the same index for vertices, normals and uvs.
    ///
    /// Corners sharing the same position, normal and uv triple are merged,
    /// the others are duplicated.
    pub fn unify_index_buffer(&mut self) {
        let IndexBuffer::Split(ref ids) = self.indices else {
            return;
        };

        let mut corner_to_id: HashMap<[u32; 3], u32> = HashMap::new();
        let mut coords = Vec::new();
        let mut normals = self.normals.as_ref().map(|_| Vec::new());
        let mut uvs = self.uvs.as_ref().map(|_| Vec::new());
        let mut triangles = Vec::with_capacity(ids.len());

        for triangle in ids {
            let mut unified = [0u32; 3];

            for (out, corner) in unified.iter_mut().zip(triangle.iter()) {
                *out = *corner_to_id.entry(*corner).or_insert_with(|| {
                    coords.push(self.coords[corner[0] as usize]);
                    if let (Some(dst), Some(src)) = (normals.as_mut(), self.normals.as_ref()) {
                        dst.push(src[corner[1] as usize]);
                    }
                    if let (Some(dst), Some(src)) = (uvs.as_mut(), self.uvs.as_ref()) {
                        dst.push(src[corner[2] as usize]);
                    }
                    coords.len() as u32 - 1
                });
            }

            triangles.push(unified);
        }

        self.coords = coords;
        self.normals = normals;
        self.uvs = uvs;
        self.indices = IndexBuffer::Unified(triangles);
    }

    /// The unified triangles of this mesh, unifying the index buffer first
    /// if needed.
    pub fn unified_triangles(&mut self) -> &[[u32; 3]] {
        self.unify_index_buffer();
        match self.indices {
            IndexBuffer::Unified(ref idx) => idx,
            IndexBuffer::Split(_) => unreachable!("the index buffer was just unified"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split_square() -> RenderMesh {
        RenderMesh::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y],
            Some(vec![Vec3::Z]),
            Some(vec![Vec2::ZERO, Vec2::ONE]),
            Some(IndexBuffer::Split(vec![
                [[0, 0, 0], [1, 0, 1], [2, 0, 1]],
                [[0, 0, 0], [2, 0, 1], [3, 0, 0]],
            ])),
        )
    }

    #[test]
    fn trivial_indices_are_sequential() {
        let mesh = RenderMesh::new(vec![Vec3::ZERO; 6], None, None, None);
        assert_eq!(mesh.indices, IndexBuffer::Unified(vec![[0, 1, 2], [3, 4, 5]]));
    }

    #[test]
    fn unify_merges_identical_corners() {
        let mut mesh = split_square();
        mesh.unify_index_buffer();

        assert_eq!(mesh.coords.len(), 4);
        assert_eq!(mesh.normals.as_ref().map(Vec::len), Some(4));
        assert_eq!(mesh.uvs.as_ref().map(Vec::len), Some(4));
        assert_eq!(
            mesh.indices,
            IndexBuffer::Unified(vec![[0, 1, 2], [0, 2, 3]])
        );
    }

    #[test]
    fn unify_duplicates_corners_with_different_attributes() {
        let mut mesh = split_square();
        if let IndexBuffer::Split(ref mut idx) = mesh.indices {
            // Same position as corner 0 of the first triangle, other uv.
            idx[1][0] = [0, 0, 1];
        }
        mesh.unify_index_buffer();
        assert_eq!(mesh.coords.len(), 5);
    }

    #[test]
    fn recomputed_normals_follow_the_coordinates() {
        let mut mesh = split_square();
        mesh.normals = None;
        mesh.recompute_normals();
        mesh.unify_index_buffer();

        for n in mesh.normals.unwrap() {
            assert!((n - Vec3::Z).length() < 1.0e-6);
        }
    }

    #[test]
    fn scaling_keeps_normals_unit_length() {
        let mut mesh = split_square();
        mesh.scale_by(Vec3::new(2.0, 1.0, 0.5));
        assert_eq!(mesh.coords[2], Vec3::new(2.0, 1.0, 0.0));
        assert!((mesh.normals.unwrap()[0].length() - 1.0).abs() < 1.0e-6);
    }
}
