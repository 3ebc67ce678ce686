use crate::camera::Camera3d;
use crate::context::Context;
use crate::resource::CubeTexture;
use bytemuck::{Pod, Zeroable};
use glamx::{Mat3, Mat4};
use std::cell::RefCell;
use std::rc::Rc;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct SkyboxUniforms {
    inv_view_proj: [[f32; 4]; 4],
}

/// The inverse of the camera projection times its rotation-only view.
///
/// It maps a point of the far plane back to the world direction it is seen
/// along, ignoring where the camera stands.
pub fn skybox_inverse_view_proj(camera: &dyn Camera3d) -> Mat4 {
    let rotation = Mat4::from_mat3(Mat3::from_mat4(camera.view_matrix()));
    (camera.projection_matrix() * rotation).inverse()
}

/// Draws a cubemap behind the scene with a single full-screen triangle.
pub struct SkyboxMaterial {
    texture_bind_group_layout: wgpu::BindGroupLayout,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    source: Option<Rc<RefCell<CubeTexture>>>,
    texture_bind_group: Option<wgpu::BindGroup>,
}

impl SkyboxMaterial {
    pub fn new(color_format: wgpu::TextureFormat) -> SkyboxMaterial {
        let ctxt = Context::get();

        let uniform_bind_group_layout =
            ctxt.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("skybox_uniform_bind_group_layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let texture_bind_group_layout =
            ctxt.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("skybox_texture_bind_group_layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::Cube,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let shader = ctxt.create_shader_module(Some("skybox_shader"), include_str!("skybox.wgsl"));
        let pipeline_layout = ctxt.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("skybox_pipeline_layout"),
            bind_group_layouts: &[&uniform_bind_group_layout, &texture_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = ctxt.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("skybox_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            // Drawn first, without touching the depth buffer.
            depth_stencil: Some(wgpu::DepthStencilState {
                format: Context::depth_format(),
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let uniform_buffer = ctxt.create_buffer_simple(
            Some("skybox_uniforms"),
            std::mem::size_of::<SkyboxUniforms>() as u64,
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );
        let uniform_bind_group = ctxt.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("skybox_uniform_bind_group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        SkyboxMaterial {
            texture_bind_group_layout,
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            source: None,
            texture_bind_group: None,
        }
    }

    /// Uploads the camera and binds `background`, uploading it on first use.
    pub fn prepare(&mut self, camera: &dyn Camera3d, background: &Rc<RefCell<CubeTexture>>) {
        let ctxt = Context::get();
        let uniforms = SkyboxUniforms {
            inv_view_proj: skybox_inverse_view_proj(camera).to_cols_array_2d(),
        };
        ctxt.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        if self
            .source
            .as_ref()
            .is_some_and(|source| Rc::ptr_eq(source, background))
        {
            return;
        }

        let mut texture = background.borrow_mut();
        let gpu = texture.load_to_gpu();
        self.texture_bind_group = Some(ctxt.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("skybox_texture_bind_group"),
            layout: &self.texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&gpu.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&gpu.sampler),
                },
            ],
        }));
        self.source = Some(background.clone());
    }

    /// Draws the background. Does nothing before [`Self::prepare`].
    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>) {
        let Some(ref texture_bind_group) = self.texture_bind_group else {
            return;
        };

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        pass.set_bind_group(1, texture_bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::PerspectiveCamera3d;
    use approx::assert_relative_eq;
    use glamx::{Vec3, Vec4};

    #[test]
    fn the_screen_center_looks_along_the_camera_axis_wherever_the_camera_stands() {
        let mut camera = PerspectiveCamera3d::new(75.0, 1.5, 0.1, 1000.0);
        camera.set_position(Vec3::new(1.0, -1.0, 5.0));
        camera.look_at(Vec3::ZERO);

        let far = skybox_inverse_view_proj(&camera) * Vec4::new(0.0, 0.0, 1.0, 1.0);
        let dir = (far.truncate() / far.w).normalize();
        let expected = (Vec3::ZERO - camera.position()).normalize();
        assert_relative_eq!(dir.dot(expected), 1.0, epsilon = 1.0e-4);
    }
}
