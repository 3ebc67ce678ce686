//! Data structure of a renderable object.

use crate::builtin::ObjectGpuData;
use crate::resource::{GpuMesh3d, Material3d, Side};
use bitflags::bitflags;
use std::cell::RefCell;
use std::rc::Rc;

bitflags! {
    /// How an object takes part in the shadow and culling passes.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct RenderFlags: u8 {
        /// The object is drawn into the shadow map.
        const CAST_SHADOW = 1 << 0;
        /// The object is darkened where the shadow map says it is occluded.
        const RECEIVE_SHADOW = 1 << 1;
        /// Back faces are drawn too.
        const DOUBLE_SIDED = 1 << 2;
    }
}

/// A renderable object: a mesh, its material and its render flags.
///
/// The uniform buffer and bind group are created the first time the object
/// is drawn.
pub struct Object3d {
    mesh: Rc<RefCell<GpuMesh3d>>,
    material: Material3d,
    flags: RenderFlags,
    gpu_data: Option<ObjectGpuData>,
}

impl Object3d {
    /// Creates a new object sharing `mesh`.
    pub fn new(mesh: Rc<RefCell<GpuMesh3d>>, material: Material3d) -> Object3d {
        let mut flags = RenderFlags::empty();
        flags.set(RenderFlags::DOUBLE_SIDED, material.side == Side::Double);

        Object3d {
            mesh,
            material,
            flags,
            gpu_data: None,
        }
    }

    #[inline]
    pub fn mesh(&self) -> &Rc<RefCell<GpuMesh3d>> {
        &self.mesh
    }

    #[inline]
    pub fn material(&self) -> &Material3d {
        &self.material
    }

    /// Replaces the material, keeping the shadow flags.
    pub fn set_material(&mut self, material: Material3d) {
        self.flags
            .set(RenderFlags::DOUBLE_SIDED, material.side == Side::Double);
        self.material = material;
    }

    #[inline]
    pub fn flags(&self) -> RenderFlags {
        self.flags
    }

    #[inline]
    pub fn set_flag(&mut self, flag: RenderFlags, enabled: bool) {
        self.flags.set(flag, enabled);
    }

    #[inline]
    pub fn casts_shadow(&self) -> bool {
        self.flags.contains(RenderFlags::CAST_SHADOW)
    }

    #[inline]
    pub fn receives_shadow(&self) -> bool {
        self.flags.contains(RenderFlags::RECEIVE_SHADOW)
    }

    #[inline]
    pub fn is_double_sided(&self) -> bool {
        self.flags.contains(RenderFlags::DOUBLE_SIDED)
    }

    /// The per-object GPU resources, created by the first draw.
    #[inline]
    pub fn gpu_data(&self) -> Option<&ObjectGpuData> {
        self.gpu_data.as_ref()
    }

    #[inline]
    pub fn gpu_data_mut(&mut self) -> &mut Option<ObjectGpuData> {
        &mut self.gpu_data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color;
    use crate::procedural;
    use glamx::Vec3;

    fn unit_cube() -> Rc<RefCell<GpuMesh3d>> {
        Rc::new(RefCell::new(GpuMesh3d::from_render_mesh(
            procedural::cuboid(Vec3::ONE),
        )))
    }

    #[test]
    fn double_sided_materials_disable_culling() {
        let mut object = Object3d::new(unit_cube(), Material3d::standard(color::WHITE));
        assert!(!object.is_double_sided());

        object.set_material(Material3d::standard(color::WHITE).with_side(Side::Double));
        assert!(object.is_double_sided());
    }

    #[test]
    fn shadow_flags_survive_material_changes() {
        let mut object = Object3d::new(unit_cube(), Material3d::phong(color::WHITE));
        object.set_flag(RenderFlags::CAST_SHADOW, true);
        object.set_material(Material3d::transmissive(color::WHITE));
        assert!(object.casts_shadow());
        assert!(!object.receives_shadow());
        assert!(object.gpu_data().is_none());
    }
}
