//! Built-in materials drawing the scene: lit objects, the shadow map and the
//! cubemap background.

pub use self::object_material::{
    FrameShadow, FrameUniforms, GpuLight, ObjectGpuData, ObjectMaterial, ObjectUniforms,
};
pub use self::shadow_map::{ShadowMap, ShadowSettings};
pub use self::skybox_material::{skybox_inverse_view_proj, SkyboxMaterial};

mod object_material;
mod shadow_map;
mod skybox_material;
