//! The pass rendering the scene graph into the composer's first buffer.

use crate::builtin::{FrameShadow, FrameUniforms, ObjectMaterial, ShadowMap, ShadowSettings, SkyboxMaterial};
use crate::camera::Camera3d;
use crate::color::{self, Color};
use crate::light::{LightCollection, LightType};
use crate::resource::OffscreenBuffers;
use crate::scene::{DrawItem, SceneNode3d};

struct ScenePassGpu {
    objects: ObjectMaterial,
    skybox: SkyboxMaterial,
    shadow_map: ShadowMap,
}

/// Renders a scene seen from a camera: shadow map, background, lit objects.
///
/// Pipelines are created at the first render.
pub struct ScenePass {
    shadows_enabled: bool,
    shadow_settings: ShadowSettings,
    clear_color: Color,
    lights: LightCollection,
    draws: Vec<DrawItem>,
    gpu: Option<ScenePassGpu>,
}

impl Default for ScenePass {
    fn default() -> Self {
        ScenePass::new()
    }
}

impl ScenePass {
    /// A pass without shadows, clearing to black.
    pub fn new() -> ScenePass {
        ScenePass {
            shadows_enabled: false,
            shadow_settings: ShadowSettings::default(),
            clear_color: color::BLACK,
            lights: LightCollection::new(),
            draws: Vec::new(),
            gpu: None,
        }
    }

    /// Enables the shadow map of the first shadow casting directional light.
    pub fn with_shadows(mut self, enabled: bool) -> Self {
        self.shadows_enabled = enabled;
        self
    }

    /// Must be called before the first render.
    pub fn with_shadow_settings(mut self, settings: ShadowSettings) -> Self {
        self.shadow_settings = settings;
        self
    }

    /// The color of the pixels no object and no background covers.
    pub fn with_clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    #[inline]
    pub fn shadows_enabled(&self) -> bool {
        self.shadows_enabled
    }

    #[inline]
    pub fn shadow_settings(&self) -> &ShadowSettings {
        &self.shadow_settings
    }

    /// The lights collected by the last render.
    #[inline]
    pub fn lights(&self) -> &LightCollection {
        &self.lights
    }

    /// Renders `scene` into `target`, which must have a depth buffer.
    pub fn render(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        target: &OffscreenBuffers,
        scene: &SceneNode3d,
        camera: &dyn Camera3d,
    ) {
        let Some(depth_view) = target.depth_view() else {
            log::error!("the scene pass needs a render target with a depth buffer");
            return;
        };

        self.lights = LightCollection::new();
        self.draws.clear();
        scene.prepare(&mut self.lights, &mut self.draws);

        let settings = self.shadow_settings;
        let ScenePassGpu {
            objects,
            skybox,
            shadow_map,
        } = self.gpu.get_or_insert_with(|| {
            log::debug!("creating the scene pass pipelines");
            let objects = ObjectMaterial::new(target.format);
            let shadow_map = ShadowMap::new(
                settings,
                objects.frame_bind_group_layout(),
                objects.object_bind_group_layout(),
            );
            ScenePassGpu {
                skybox: SkyboxMaterial::new(target.format),
                objects,
                shadow_map,
            }
        });

        objects.prepare_objects(&self.draws);

        let caster = self.shadows_enabled.then(|| {
            self.lights.lights.iter().position(|l| {
                l.cast_shadow && matches!(l.light_type, LightType::Directional(_))
            })
        });
        let shadow = caster.flatten().map(|caster| {
            let light_view_proj = settings.light_view_proj(&self.lights.lights[caster]);
            shadow_map.render(encoder, &self.draws, light_view_proj);
            FrameShadow {
                light_view_proj,
                caster,
                bias: settings.bias,
            }
        });

        let background = scene.background();
        objects.prepare_environment(background.clone(), shadow_map);
        objects.prepare_frame(&FrameUniforms::new(
            camera,
            &self.lights,
            shadow,
            background.is_some(),
        ));
        if let Some(ref background) = background {
            skybox.prepare(camera, background);
        }

        let clear = self.clear_color;
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene_render_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: clear.r as f64,
                        g: clear.g as f64,
                        b: clear.b as f64,
                        a: clear.a as f64,
                    }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if background.is_some() {
            skybox.render(&mut pass);
        }
        objects.render(&mut pass, &self.draws);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shadows_are_opt_in() {
        let pass = ScenePass::new();
        assert!(!pass.shadows_enabled());
        assert!(pass.with_shadows(true).shadows_enabled());
    }
}
