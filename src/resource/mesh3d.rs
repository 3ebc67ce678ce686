//! Data structure of a scene node geometry.

use crate::procedural::RenderMesh;
use crate::resource::gpu_vector::{BufferType, GpuVec};
use bytemuck::{Pod, Zeroable};
use glamx::{Vec2, Vec3};

/// One interleaved mesh vertex as the shaders read it.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    /// The vertex buffer layout matching `@location(0..3)` of the object shaders.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// A triangle mesh, uploaded to the GPU the first time it is drawn.
///
/// # Relationship with RenderMesh
/// - [`RenderMesh`] is the CPU-side mesh descriptor produced by
///   [`crate::procedural`] and [`crate::loader::parse_obj`].
/// - `GpuMesh3d` holds the interleaved vertices and the buffers built from them.
pub struct GpuMesh3d {
    vertices: GpuVec<Vertex>,
    indices: GpuVec<u32>,
    bounding_radius: f32,
}

impl GpuMesh3d {
    /// Creates a mesh from interleaved vertices and triangle indices.
    pub fn new(vertices: Vec<Vertex>, triangles: Vec<[u32; 3]>) -> GpuMesh3d {
        let bounding_radius = vertices
            .iter()
            .map(|v| Vec3::from(v.position).length())
            .fold(0.0, f32::max);

        GpuMesh3d {
            vertices: GpuVec::new(vertices, BufferType::Array),
            indices: GpuVec::new(triangles.into_flattened(), BufferType::ElementArray),
            bounding_radius,
        }
    }

    /// Converts a CPU mesh, unifying its index buffer.
    ///
    /// Missing normals are computed from the faces, missing uvs are set to
    /// the origin.
    pub fn from_render_mesh(mut mesh: RenderMesh) -> GpuMesh3d {
        mesh.unify_index_buffer();
        if mesh.normals.is_none() {
            mesh.recompute_normals();
        }

        let triangles = mesh.unified_triangles().to_vec();
        let normals = mesh.normals.unwrap_or_default();
        let uvs = mesh.uvs.unwrap_or_default();

        let vertices = mesh
            .coords
            .iter()
            .enumerate()
            .map(|(i, p)| Vertex {
                position: p.to_array(),
                normal: normals.get(i).copied().unwrap_or(Vec3::Z).to_array(),
                uv: uvs.get(i).copied().unwrap_or(Vec2::ZERO).to_array(),
            })
            .collect();

        GpuMesh3d::new(vertices, triangles)
    }

    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn num_indices(&self) -> u32 {
        self.indices.len() as u32
    }

    /// The distance from the local origin to the farthest vertex.
    #[inline]
    pub fn bounding_radius(&self) -> f32 {
        self.bounding_radius
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        self.vertices.data()
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        self.indices.data()
    }

    /// Uploads the mesh if needed and binds it to `pass`.
    ///
    /// Returns the number of indices to draw, or `None` for an empty mesh.
    pub fn bind(&mut self, pass: &mut wgpu::RenderPass<'_>) -> Option<u32> {
        let count = self.num_indices();
        let vertices = self.vertices.ensure_on_gpu()?;
        pass.set_vertex_buffer(0, vertices.slice(..));
        let indices = self.indices.ensure_on_gpu()?;
        pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
        Some(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procedural;

    #[test]
    fn cuboid_meshes_keep_their_flat_normals() {
        let mesh = GpuMesh3d::from_render_mesh(procedural::cuboid(Vec3::ONE));
        assert_eq!(mesh.num_vertices(), 24);
        assert_eq!(mesh.num_indices(), 36);
        assert!(mesh
            .vertices()
            .iter()
            .all(|v| (Vec3::from(v.normal).length() - 1.0).abs() < 1.0e-5));
    }

    #[test]
    fn missing_normals_are_computed() {
        let mesh = RenderMesh::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            None,
            None,
            None,
        );
        let gpu = GpuMesh3d::from_render_mesh(mesh);
        for v in gpu.vertices() {
            assert_eq!(v.normal, [0.0, 0.0, 1.0]);
            assert_eq!(v.uv, [0.0, 0.0]);
        }
    }

    #[test]
    fn bounding_radius_reaches_the_farthest_corner() {
        let mesh = GpuMesh3d::from_render_mesh(procedural::cuboid(Vec3::splat(2.0)));
        assert!((mesh.bounding_radius() - 3.0f32.sqrt()).abs() < 1.0e-5);
    }
}
