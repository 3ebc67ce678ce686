//! GPU resources: meshes, textures, render targets and material parameters.

pub use crate::resource::framebuffer_manager::OffscreenBuffers;
pub use crate::resource::gpu_vector::{BufferType, GpuVec};
pub use crate::resource::material::{Material3d, Shading, Side};
pub use crate::resource::mesh3d::{GpuMesh3d, Vertex};
pub use crate::resource::texture::{CubeTexture, GpuCubeTexture};

mod framebuffer_manager;
mod gpu_vector;
mod material;
mod mesh3d;
mod texture;
