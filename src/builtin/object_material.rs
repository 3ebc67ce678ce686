use crate::builtin::ShadowMap;
use crate::camera::Camera3d;
use crate::color;
use crate::context::Context;
use crate::light::{LightCollection, LightType, MAX_LIGHTS};
use crate::resource::{CubeTexture, GpuCubeTexture, Shading, Vertex};
use crate::scene::{DrawItem, Object3d};
use bytemuck::{Pod, Zeroable};
use glamx::Mat4;
use std::cell::RefCell;
use std::rc::Rc;

/// GPU representation of a single light.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct GpuLight {
    /// xyz: world position, w: kind (1 directional, 2 point).
    pub position: [f32; 4],
    /// xyz: travel direction, w: attenuation radius.
    pub direction: [f32; 4],
    /// rgb: color times intensity.
    pub color: [f32; 4],
}

/// Frame-level uniforms (camera, lights, shadow and environment switches).
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub light_view_proj: [[f32; 4]; 4],
    /// xyz: eye, w: shadow depth bias.
    pub camera_pos: [f32; 4],
    pub ambient: [f32; 4],
    pub lights: [GpuLight; MAX_LIGHTS],
    /// Light count, shadows enabled, environment bound, shadow caster index.
    pub counts: [u32; 4],
}

/// The shadow the frame is lit with.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FrameShadow {
    /// The view-projection of the shadow camera.
    pub light_view_proj: Mat4,
    /// Index of the casting light in the light collection.
    pub caster: usize,
    /// Depth bias subtracted before the comparison.
    pub bias: f32,
}

impl FrameUniforms {
    pub fn new(
        camera: &dyn Camera3d,
        lights: &LightCollection,
        shadow: Option<FrameShadow>,
        has_environment: bool,
    ) -> FrameUniforms {
        let mut gpu_lights = [GpuLight::default(); MAX_LIGHTS];

        for (gpu, light) in gpu_lights.iter_mut().zip(lights.lights.iter()) {
            let (kind, radius) = match light.light_type {
                LightType::Directional(_) => (1.0, 0.0),
                LightType::Point { attenuation_radius } => (2.0, attenuation_radius),
                LightType::Ambient => continue,
            };
            gpu.position = light.world_position.extend(kind).to_array();
            gpu.direction = light.world_direction.extend(radius).to_array();
            gpu.color = light.radiance.extend(1.0).to_array();
        }

        let eye = camera.eye();
        let (light_view_proj, bias, caster, shadows) = match shadow {
            Some(s) => (s.light_view_proj, s.bias, s.caster as u32, 1),
            None => (Mat4::IDENTITY, 0.0, u32::MAX, 0),
        };

        FrameUniforms {
            view_proj: (camera.projection_matrix() * camera.view_matrix()).to_cols_array_2d(),
            light_view_proj: light_view_proj.to_cols_array_2d(),
            camera_pos: [eye.x, eye.y, eye.z, bias],
            ambient: lights.ambient.extend(1.0).to_array(),
            lights: gpu_lights,
            counts: [
                lights.len().min(MAX_LIGHTS) as u32,
                shadows,
                has_environment as u32,
                caster,
            ],
        }
    }

    /// Uniforms for the depth-only pass, seen from the light.
    pub fn from_light(light_view_proj: Mat4) -> FrameUniforms {
        FrameUniforms {
            view_proj: light_view_proj.to_cols_array_2d(),
            ..Zeroable::zeroed()
        }
    }
}

/// Object-level uniforms (transforms and material parameters).
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ObjectUniforms {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub emissive: [f32; 4],
    /// Shading model, shininess, roughness, metalness.
    pub params: [f32; 4],
    /// Transmission, ior, thickness, specular.
    pub physical: [f32; 4],
    /// Receives shadows.
    pub flags: [f32; 4],
}

impl ObjectUniforms {
    pub fn new(world: Mat4, object: &Object3d) -> ObjectUniforms {
        let material = object.material();
        let mut params = [material.shading.model_id() as f32, 0.0, 1.0, 0.0];
        let mut physical = [0.0, 1.0, 0.0, 0.0];

        match material.shading {
            Shading::Phong {
                shininess,
                specular,
            } => {
                params[1] = shininess;
                physical[3] = specular;
            }
            Shading::Standard {
                roughness,
                metalness,
            } => {
                params[2] = roughness;
                params[3] = metalness;
            }
            Shading::Transmissive {
                roughness,
                transmission,
                ior,
                thickness,
            } => {
                params[2] = roughness;
                physical = [transmission, ior, thickness, 0.0];
            }
        }

        ObjectUniforms {
            model: world.to_cols_array_2d(),
            normal_matrix: world.inverse().transpose().to_cols_array_2d(),
            color: color::to_array(material.color),
            emissive: color::to_array(material.emissive),
            params,
            physical,
            flags: [object.receives_shadow() as u32 as f32, 0.0, 0.0, 0.0],
        }
    }
}

/// Per-object GPU resources of the [`ObjectMaterial`].
pub struct ObjectGpuData {
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl ObjectGpuData {
    /// The bind group holding this object's uniforms, bound at group 1.
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

/// The material drawing every lit object of a scene.
///
/// A single pipeline handles the three [`Shading`] models. Bind groups:
/// 0 frame uniforms, 1 object uniforms, 2 environment cubemap and shadow map.
pub struct ObjectMaterial {
    frame_bind_group_layout: wgpu::BindGroupLayout,
    object_bind_group_layout: wgpu::BindGroupLayout,
    env_bind_group_layout: wgpu::BindGroupLayout,
    pipeline_cull: wgpu::RenderPipeline,
    pipeline_no_cull: wgpu::RenderPipeline,
    frame_uniform_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    default_env: CubeTexture,
    env_source: Option<Rc<RefCell<CubeTexture>>>,
    env_bind_group: Option<wgpu::BindGroup>,
}

fn uniform_layout(label: &str) -> wgpu::BindGroupLayout {
    Context::get().create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

impl ObjectMaterial {
    /// Creates the pipelines drawing into targets of `color_format`.
    pub fn new(color_format: wgpu::TextureFormat) -> ObjectMaterial {
        let ctxt = Context::get();

        let frame_bind_group_layout = uniform_layout("object_material_frame_bind_group_layout");
        let object_bind_group_layout = uniform_layout("object_material_object_bind_group_layout");

        let env_bind_group_layout =
            ctxt.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("object_material_env_bind_group_layout"),
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
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Depth,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 3,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                        count: None,
                    },
                ],
            });

        let shader = ctxt.create_shader_module(
            Some("object_material_shader"),
            concat!(include_str!("common.wgsl"), include_str!("object.wgsl")),
        );

        let pipeline_layout = ctxt.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("object_material_pipeline_layout"),
            bind_group_layouts: &[
                &frame_bind_group_layout,
                &object_bind_group_layout,
                &env_bind_group_layout,
            ],
            push_constant_ranges: &[],
        });

        let create_pipeline = |cull_mode: Option<wgpu::Face>, label: &str| {
            ctxt.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex::layout()],
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
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: Context::depth_format(),
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let pipeline_cull = create_pipeline(Some(wgpu::Face::Back), "object_material_pipeline_cull");
        let pipeline_no_cull = create_pipeline(None, "object_material_pipeline_no_cull");

        let frame_uniform_buffer = ctxt.create_buffer_simple(
            Some("object_material_frame_uniforms"),
            std::mem::size_of::<FrameUniforms>() as u64,
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );
        let frame_bind_group = ctxt.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("object_material_frame_bind_group"),
            layout: &frame_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_uniform_buffer.as_entire_binding(),
            }],
        });

        ObjectMaterial {
            frame_bind_group_layout,
            object_bind_group_layout,
            env_bind_group_layout,
            pipeline_cull,
            pipeline_no_cull,
            frame_uniform_buffer,
            frame_bind_group,
            default_env: CubeTexture::black(),
            env_source: None,
            env_bind_group: None,
        }
    }

    /// The layout of group 0, shared with the shadow pass.
    pub fn frame_bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.frame_bind_group_layout
    }

    /// The layout of group 1, shared with the shadow pass.
    pub fn object_bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.object_bind_group_layout
    }

    /// Uploads the frame uniforms.
    pub fn prepare_frame(&self, uniforms: &FrameUniforms) {
        Context::get().write_buffer(&self.frame_uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    /// Uploads the uniforms of every collected object, creating their
    /// buffers on first use.
    pub fn prepare_objects(&self, draws: &[DrawItem]) {
        let ctxt = Context::get();

        for item in draws {
            let mut node = item.node.clone();
            let mut data = node.data_mut();
            let Some(object) = data.object_mut() else {
                continue;
            };

            let uniforms = ObjectUniforms::new(item.world, object);
            let bytes = bytemuck::bytes_of(&uniforms);

            let gpu_data = object.gpu_data_mut();
            if let Some(gpu) = gpu_data.as_ref() {
                ctxt.write_buffer(&gpu.uniform_buffer, 0, bytes);
                continue;
            }

            let uniform_buffer = ctxt.create_buffer_init(
                Some("object_material_object_uniforms"),
                bytes,
                wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            );
            let bind_group = ctxt.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("object_material_object_bind_group"),
                layout: &self.object_bind_group_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });
            *gpu_data = Some(ObjectGpuData {
                uniform_buffer,
                bind_group,
            });
        }
    }

    /// Rebuilds the environment bind group if the scene background changed.
    pub fn prepare_environment(
        &mut self,
        background: Option<Rc<RefCell<CubeTexture>>>,
        shadow_map: &ShadowMap,
    ) {
        let unchanged = match (&self.env_source, &background) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        if unchanged && self.env_bind_group.is_some() {
            return;
        }

        let bind_group = match background {
            Some(ref source) => {
                let mut texture = source.borrow_mut();
                create_env_bind_group(&self.env_bind_group_layout, texture.load_to_gpu(), shadow_map)
            }
            None => create_env_bind_group(
                &self.env_bind_group_layout,
                self.default_env.load_to_gpu(),
                shadow_map,
            ),
        };

        self.env_source = background;
        self.env_bind_group = Some(bind_group);
    }

    /// Draws the collected objects.
    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>, draws: &[DrawItem]) {
        let Some(ref env_bind_group) = self.env_bind_group else {
            log::warn!("objects drawn before their environment was prepared");
            return;
        };

        pass.set_bind_group(0, &self.frame_bind_group, &[]);
        pass.set_bind_group(2, env_bind_group, &[]);

        for item in draws {
            let data = item.node.data();
            let Some(object) = data.object() else {
                continue;
            };
            let Some(gpu) = object.gpu_data() else {
                continue;
            };

            let pipeline = if object.is_double_sided() {
                &self.pipeline_no_cull
            } else {
                &self.pipeline_cull
            };
            pass.set_pipeline(pipeline);
            pass.set_bind_group(1, gpu.bind_group(), &[]);

            let count = object.mesh().borrow_mut().bind(pass);
            if let Some(count) = count {
                pass.draw_indexed(0..count, 0, 0..1);
            }
        }
    }
}

fn create_env_bind_group(
    layout: &wgpu::BindGroupLayout,
    env: &GpuCubeTexture,
    shadow_map: &ShadowMap,
) -> wgpu::BindGroup {
    Context::get().create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("object_material_env_bind_group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&env.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&env.sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::TextureView(shadow_map.view()),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::Sampler(shadow_map.sampler()),
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::PerspectiveCamera3d;
    use crate::light::Light;
    use crate::procedural;
    use crate::resource::{GpuMesh3d, Material3d};
    use crate::scene::RenderFlags;
    use glamx::Vec3;

    #[test]
    fn uniform_blocks_match_the_shader_layout() {
        assert_eq!(std::mem::size_of::<GpuLight>(), 48);
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 560);
        assert_eq!(std::mem::size_of::<ObjectUniforms>(), 208);
    }

    #[test]
    fn frame_uniforms_pack_lights_and_switches() {
        let camera = PerspectiveCamera3d::new(75.0, 1.0, 0.1, 1000.0);
        let mut lights = LightCollection::new();
        lights.add(&Light::ambient(color::WHITE), Vec3::ZERO);
        lights.add(&Light::directional(Vec3::NEG_Y).with_intensity(3.0), Vec3::Y);

        let shadow = FrameShadow {
            light_view_proj: Mat4::IDENTITY,
            caster: 0,
            bias: 0.001,
        };
        let uniforms = FrameUniforms::new(&camera, &lights, Some(shadow), false);

        assert_eq!(uniforms.counts, [1, 1, 0, 0]);
        assert_eq!(uniforms.lights[0].position, [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(uniforms.lights[0].direction, [0.0, -1.0, 0.0, 0.0]);
        assert_eq!(uniforms.lights[0].color, [3.0, 3.0, 3.0, 1.0]);
        assert_eq!(uniforms.ambient, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(uniforms.camera_pos[3], 0.001);
    }

    #[test]
    fn object_uniforms_carry_the_material() {
        let mesh = Rc::new(RefCell::new(GpuMesh3d::from_render_mesh(procedural::cuboid(
            Vec3::ONE,
        ))));
        let mut object = Object3d::new(mesh, Material3d::transmissive(color::WHITE));
        object.set_flag(RenderFlags::RECEIVE_SHADOW, true);

        let uniforms = ObjectUniforms::new(Mat4::from_translation(Vec3::X), &object);
        assert_eq!(uniforms.params[0], 2.0);
        assert_eq!(uniforms.physical[0], 1.0);
        assert_eq!(uniforms.physical[1], 1.5);
        assert_eq!(uniforms.flags[0], 1.0);
        assert_eq!(uniforms.model[3], [1.0, 0.0, 0.0, 1.0]);
    }
}
