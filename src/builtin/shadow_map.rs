use crate::builtin::FrameUniforms;
use crate::context::Context;
use crate::light::CollectedLight;
use crate::resource::Vertex;
use crate::scene::DrawItem;
use glamx::{Mat4, Vec3};

/// Resolution and framing of the directional shadow map.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShadowSettings {
    /// Width and height of the depth texture.
    pub map_size: u32,
    /// Depth bias subtracted before comparing against the map.
    pub bias: f32,
    /// Half-size of the orthographic shadow camera, in world units.
    pub extent: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        ShadowSettings {
            map_size: 1024,
            bias: 0.001,
            extent: 5.0,
            near: 0.1,
            far: 50.0,
        }
    }
}

impl ShadowSettings {
    /// The view-projection of the orthographic camera the shadow of `light`
    /// is rendered from.
    ///
    /// The camera sits `extent` units behind the light node, along the light
    /// direction, so geometry slightly above the node still casts.
    pub fn light_view_proj(&self, light: &CollectedLight) -> Mat4 {
        let dir = light.world_direction.try_normalize().unwrap_or(Vec3::NEG_Y);
        let eye = light.world_position - dir * self.extent;
        let up = if dir.dot(Vec3::Y).abs() > 0.99 {
            Vec3::Z
        } else {
            Vec3::Y
        };

        let e = self.extent;
        Mat4::orthographic_rh(-e, e, -e, e, self.near, self.far) * Mat4::look_at_rh(eye, eye + dir, up)
    }
}

/// A depth texture rendered from the shadow casting directional light.
pub struct ShadowMap {
    settings: ShadowSettings,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    pipeline: wgpu::RenderPipeline,
    frame_uniform_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
}

impl ShadowMap {
    /// Creates the depth texture and the depth-only pipeline.
    ///
    /// The layouts are the frame and object layouts of the
    /// [`crate::builtin::ObjectMaterial`], so object bind groups are shared.
    pub fn new(
        settings: ShadowSettings,
        frame_layout: &wgpu::BindGroupLayout,
        object_layout: &wgpu::BindGroupLayout,
    ) -> ShadowMap {
        let ctxt = Context::get();
        let size = settings.map_size.max(1);

        let texture = ctxt.create_texture(&wgpu::TextureDescriptor {
            label: Some("shadow_map_texture"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Context::depth_format(),
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = ctxt.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("shadow_map_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let shader = ctxt.create_shader_module(
            Some("shadow_map_shader"),
            concat!(include_str!("common.wgsl"), include_str!("shadow.wgsl")),
        );
        let pipeline_layout = ctxt.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("shadow_map_pipeline_layout"),
            bind_group_layouts: &[frame_layout, object_layout],
            push_constant_ranges: &[],
        });

        let pipeline = ctxt.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("shadow_map_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: None,
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: Context::depth_format(),
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 2.0,
                    clamp: 0.0,
                },
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let frame_uniform_buffer = ctxt.create_buffer_simple(
            Some("shadow_map_frame_uniforms"),
            std::mem::size_of::<FrameUniforms>() as u64,
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );
        let frame_bind_group = ctxt.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shadow_map_frame_bind_group"),
            layout: frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_uniform_buffer.as_entire_binding(),
            }],
        });

        ShadowMap {
            settings,
            view,
            sampler,
            pipeline,
            frame_uniform_buffer,
            frame_bind_group,
        }
    }

    #[inline]
    pub fn settings(&self) -> &ShadowSettings {
        &self.settings
    }

    /// The depth view sampled by the lit pass.
    #[inline]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// The comparison sampler reading [`Self::view`].
    #[inline]
    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    /// Renders every shadow casting object of `draws` into the map.
    ///
    /// The object uniforms must have been uploaded for this frame.
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, draws: &[DrawItem], light_view_proj: Mat4) {
        let ctxt = Context::get();
        let uniforms = FrameUniforms::from_light(light_view_proj);
        ctxt.write_buffer(&self.frame_uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("shadow_map_pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.frame_bind_group, &[]);

        for item in draws {
            let data = item.node.data();
            let Some(object) = data.object() else {
                continue;
            };
            if !object.casts_shadow() {
                continue;
            }
            let Some(gpu) = object.gpu_data() else {
                continue;
            };

            pass.set_bind_group(1, gpu.bind_group(), &[]);
            let count = object.mesh().borrow_mut().bind(&mut pass);
            if let Some(count) = count {
                pass.draw_indexed(0..count, 0, 0..1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::LightType;
    use approx::assert_relative_eq;

    fn sun_at(position: Vec3) -> CollectedLight {
        CollectedLight {
            light_type: LightType::Directional(Vec3::NEG_Y),
            radiance: Vec3::ONE,
            world_position: position,
            world_direction: Vec3::NEG_Y,
            cast_shadow: true,
        }
    }

    #[test]
    fn the_origin_projects_to_the_center_of_the_map() {
        let settings = ShadowSettings::default();
        let vp = settings.light_view_proj(&sun_at(Vec3::Y));
        let ndc = vp.project_point3(Vec3::ZERO);
        assert_relative_eq!(ndc.x, 0.0, epsilon = 1.0e-5);
        assert_relative_eq!(ndc.y, 0.0, epsilon = 1.0e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn lower_points_are_farther_from_the_light() {
        let settings = ShadowSettings::default();
        let vp = settings.light_view_proj(&sun_at(Vec3::Y));
        let cube_top = vp.project_point3(Vec3::new(0.0, 0.8, 0.0));
        let plane = vp.project_point3(Vec3::new(0.0, -1.0, 0.0));
        assert!(cube_top.z < plane.z);
    }
}
