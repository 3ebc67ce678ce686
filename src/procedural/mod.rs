//! Procedural mesh generation.

pub use self::cuboid::cuboid;
pub use self::plane::plane;
pub use self::render_mesh::{IndexBuffer, RenderMesh};

mod cuboid;
mod plane;
mod render_mesh;
pub mod utils;
