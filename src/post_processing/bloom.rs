//! Bloom: bright areas bleed light onto their surroundings.
//!
//! The bright pixels of the frame are extracted at half resolution, blurred
//! at five successively halved resolutions with separable gaussian kernels,
//! and the blurred levels are added back onto the frame.

use crate::context::Context;
use crate::post_processing::fullscreen::{self, FullscreenQuad};
use crate::post_processing::post_processing_effect::{PostProcessingContext, PostProcessingEffect};
use crate::resource::OffscreenBuffers;
use bytemuck::{Pod, Zeroable};

/// Number of blur levels.
pub const BLOOM_LEVELS: usize = 5;
const KERNEL_RADII: [u32; BLOOM_LEVELS] = [3, 5, 7, 9, 11];
const LEVEL_FACTORS: [f32; BLOOM_LEVELS] = [1.0, 0.8, 0.6, 0.4, 0.2];

/// Parameters of the [`BloomPass`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BloomSettings {
    /// Overall intensity of the glow.
    pub strength: f32,
    /// In `[0, 1]`. Higher values give more weight to the widest blur levels.
    pub radius: f32,
    /// Luminance above which a pixel glows.
    pub threshold: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        BloomSettings {
            strength: 1.5,
            radius: 0.4,
            threshold: 0.85,
        }
    }
}

impl BloomSettings {
    /// The weight of each blur level in the final composite.
    pub fn level_weights(&self) -> [f32; BLOOM_LEVELS] {
        LEVEL_FACTORS.map(|f| (f + (1.2 - 2.0 * f) * self.radius) * self.strength)
    }
}

/// The size of each blur level for a frame of `width`x`height`.
pub fn level_sizes(width: u32, height: u32) -> [(u32, u32); BLOOM_LEVELS] {
    let mut size = (width.div_ceil(2).max(1), height.div_ceil(2).max(1));
    std::array::from_fn(|_| {
        let current = size;
        size = (size.0.div_ceil(2).max(1), size.1.div_ceil(2).max(1));
        current
    })
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct BloomParams {
    direction: [f32; 2],
    texel_size: [f32; 2],
    threshold: f32,
    kernel_radius: f32,
    _pad: [f32; 2],
}

impl BloomParams {
    fn blur(direction: [f32; 2], input: (u32, u32), kernel_radius: u32) -> Self {
        BloomParams {
            direction,
            texel_size: [1.0 / input.0 as f32, 1.0 / input.1 as f32],
            threshold: 0.0,
            kernel_radius: kernel_radius as f32,
            _pad: [0.0; 2],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct CompositeParams {
    weights: [[f32; 4]; 2],
}

impl CompositeParams {
    fn new(settings: &BloomSettings) -> Self {
        let w = settings.level_weights();
        CompositeParams {
            weights: [[w[0], w[1], w[2], w[3]], [w[4], 0.0, 0.0, 0.0]],
        }
    }
}

struct BloomPipelines {
    texture_layout: wgpu::BindGroupLayout,
    params_layout: wgpu::BindGroupLayout,
    composite_layout: wgpu::BindGroupLayout,
    bright: wgpu::RenderPipeline,
    blur: wgpu::RenderPipeline,
    composite: wgpu::RenderPipeline,
    bright_params: (wgpu::Buffer, wgpu::BindGroup),
    composite_params: (wgpu::Buffer, wgpu::BindGroup),
    quad: FullscreenQuad,
}

struct BloomLevel {
    horizontal: OffscreenBuffers,
    vertical: OffscreenBuffers,
    horizontal_params: wgpu::BindGroup,
    vertical_params: wgpu::BindGroup,
    // Keeps the uniforms alive while the bind groups are.
    _buffers: [wgpu::Buffer; 2],
}

struct BloomTargets {
    size: (u32, u32),
    bright: OffscreenBuffers,
    levels: Vec<BloomLevel>,
    composite_bind_group: wgpu::BindGroup,
}

/// Adds a glow around the pixels brighter than a threshold.
///
/// The pass blends onto its source buffer and does not swap.
pub struct BloomPass {
    settings: BloomSettings,
    size: (u32, u32),
    pipelines: Option<BloomPipelines>,
    targets: Option<BloomTargets>,
}

impl Default for BloomPass {
    fn default() -> Self {
        BloomPass::new(BloomSettings::default())
    }
}

impl BloomPass {
    pub fn new(settings: BloomSettings) -> BloomPass {
        BloomPass {
            settings,
            size: (1, 1),
            pipelines: None,
            targets: None,
        }
    }

    #[inline]
    pub fn settings(&self) -> &BloomSettings {
        &self.settings
    }

    /// Takes effect at the next draw.
    #[inline]
    pub fn set_settings(&mut self, settings: BloomSettings) {
        self.settings = settings;
    }

    /// The size recorded by the last [`PostProcessingEffect::set_size`].
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }
}

fn create_pipelines(settings: &BloomSettings) -> BloomPipelines {
    let ctxt = Context::get();
    let hdr = Context::hdr_format();

    let texture_layout = fullscreen::texture_bind_group_layout("bloom_texture_bind_group_layout");
    let params_layout = fullscreen::uniform_bind_group_layout("bloom_params_bind_group_layout");

    let mip_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    };
    let composite_layout = ctxt.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("bloom_composite_bind_group_layout"),
        entries: &[
            mip_entry(0),
            mip_entry(1),
            mip_entry(2),
            mip_entry(3),
            mip_entry(4),
            wgpu::BindGroupLayoutEntry {
                binding: 5,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    });

    let blur_shader = ctxt.create_shader_module(
        Some("bloom_blur_shader"),
        concat!(include_str!("fullscreen.wgsl"), include_str!("bloom_blur.wgsl")),
    );
    let composite_shader = ctxt.create_shader_module(
        Some("bloom_composite_shader"),
        concat!(include_str!("fullscreen.wgsl"), include_str!("bloom_composite.wgsl")),
    );

    let bright = fullscreen::fullscreen_pipeline(
        "bloom_bright_pipeline",
        &blur_shader,
        "fs_bright",
        &[&texture_layout, &params_layout],
        hdr,
        None,
    );
    let blur = fullscreen::fullscreen_pipeline(
        "bloom_blur_pipeline",
        &blur_shader,
        "fs_blur",
        &[&texture_layout, &params_layout],
        hdr,
        None,
    );
    let additive = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    };
    let composite = fullscreen::fullscreen_pipeline(
        "bloom_composite_pipeline",
        &composite_shader,
        "fs_main",
        &[&composite_layout, &params_layout],
        hdr,
        Some(wgpu::BlendState {
            color: additive,
            alpha: additive,
        }),
    );

    let bright_params = fullscreen::uniform_bind_group(
        "bloom_bright_params",
        &params_layout,
        bytemuck::bytes_of(&BloomParams {
            threshold: settings.threshold,
            ..Zeroable::zeroed()
        }),
    );
    let composite_params = fullscreen::uniform_bind_group(
        "bloom_composite_params",
        &params_layout,
        bytemuck::bytes_of(&CompositeParams::new(settings)),
    );

    BloomPipelines {
        texture_layout,
        params_layout,
        composite_layout,
        bright,
        blur,
        composite,
        bright_params,
        composite_params,
        quad: FullscreenQuad::new("bloom_quad"),
    }
}

fn create_targets(pipelines: &BloomPipelines, size: (u32, u32)) -> BloomTargets {
    let ctxt = Context::get();
    let sizes = level_sizes(size.0, size.1);
    let bright = OffscreenBuffers::hdr(sizes[0].0, sizes[0].1, false);

    let mut input_size = sizes[0];
    let levels: Vec<BloomLevel> = sizes
        .iter()
        .zip(KERNEL_RADII)
        .map(|(&(w, h), radius)| {
            let (h_buffer, horizontal_params) = fullscreen::uniform_bind_group(
                "bloom_blur_h_params",
                &pipelines.params_layout,
                bytemuck::bytes_of(&BloomParams::blur([1.0, 0.0], input_size, radius)),
            );
            let (v_buffer, vertical_params) = fullscreen::uniform_bind_group(
                "bloom_blur_v_params",
                &pipelines.params_layout,
                bytemuck::bytes_of(&BloomParams::blur([0.0, 1.0], (w, h), radius)),
            );
            input_size = (w, h);

            BloomLevel {
                horizontal: OffscreenBuffers::hdr(w, h, false),
                vertical: OffscreenBuffers::hdr(w, h, false),
                horizontal_params,
                vertical_params,
                _buffers: [h_buffer, v_buffer],
            }
        })
        .collect();

    let mut entries: Vec<wgpu::BindGroupEntry> = levels
        .iter()
        .enumerate()
        .map(|(i, level)| wgpu::BindGroupEntry {
            binding: i as u32,
            resource: wgpu::BindingResource::TextureView(&level.vertical.color_view),
        })
        .collect();
    entries.push(wgpu::BindGroupEntry {
        binding: BLOOM_LEVELS as u32,
        resource: wgpu::BindingResource::Sampler(&bright.sampler),
    });
    let composite_bind_group = ctxt.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("bloom_composite_bind_group"),
        layout: &pipelines.composite_layout,
        entries: &entries,
    });

    BloomTargets {
        size,
        bright,
        levels,
        composite_bind_group,
    }
}

fn fullscreen_step(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    pipeline: &wgpu::RenderPipeline,
    quad: &FullscreenQuad,
    input: &wgpu::BindGroup,
    params: &wgpu::BindGroup,
    output: &wgpu::TextureView,
    load: bool,
) {
    let mut pass = fullscreen::begin_fullscreen_pass(encoder, label, output, load);
    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, input, &[]);
    pass.set_bind_group(1, params, &[]);
    quad.draw(&mut pass);
}

impl PostProcessingEffect for BloomPass {
    fn set_size(&mut self, width: u32, height: u32) {
        self.size = (width.max(1), height.max(1));
    }

    fn needs_swap(&self) -> bool {
        false
    }

    fn draw(&mut self, source: &OffscreenBuffers, context: &mut PostProcessingContext) {
        let ctxt = Context::get();
        let settings = self.settings;
        let pipelines = self.pipelines.get_or_insert_with(|| {
            log::debug!("creating the bloom pipelines");
            create_pipelines(&settings)
        });

        if self.targets.as_ref().is_none_or(|t| t.size != self.size) {
            log::debug!("allocating bloom targets for {}x{}", self.size.0, self.size.1);
            self.targets = Some(create_targets(pipelines, self.size));
        }
        let Some(ref targets) = self.targets else {
            return;
        };

        ctxt.write_buffer(
            &pipelines.bright_params.0,
            0,
            bytemuck::bytes_of(&BloomParams {
                threshold: settings.threshold,
                ..Zeroable::zeroed()
            }),
        );
        ctxt.write_buffer(
            &pipelines.composite_params.0,
            0,
            bytemuck::bytes_of(&CompositeParams::new(&settings)),
        );

        let encoder = &mut *context.encoder;
        let input = |buffers: &OffscreenBuffers| {
            fullscreen::texture_bind_group(
                "bloom_input_bind_group",
                &pipelines.texture_layout,
                &buffers.color_view,
                &buffers.sampler,
            )
        };

        fullscreen_step(
            encoder,
            "bloom_bright_pass",
            &pipelines.bright,
            &pipelines.quad,
            &input(source),
            &pipelines.bright_params.1,
            &targets.bright.color_view,
            false,
        );

        let mut previous = &targets.bright;
        for level in &targets.levels {
            fullscreen_step(
                encoder,
                "bloom_blur_h_pass",
                &pipelines.blur,
                &pipelines.quad,
                &input(previous),
                &level.horizontal_params,
                &level.horizontal.color_view,
                false,
            );
            fullscreen_step(
                encoder,
                "bloom_blur_v_pass",
                &pipelines.blur,
                &pipelines.quad,
                &input(&level.horizontal),
                &level.vertical_params,
                &level.vertical.color_view,
                false,
            );
            previous = &level.vertical;
        }

        fullscreen_step(
            encoder,
            "bloom_composite_pass",
            &pipelines.composite,
            &pipelines.quad,
            &targets.composite_bind_group,
            &pipelines.composite_params.1,
            &source.color_view,
            true,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_weights_favor_the_sharpest_levels() {
        let w = BloomSettings::default().level_weights();
        // mix(1.0, 0.2, 0.4) * 1.5
        assert_relative_eq!(w[0], 1.02, epsilon = 1.0e-6);
        // mix(0.2, 1.0, 0.4) * 1.5
        assert_relative_eq!(w[4], 0.78, epsilon = 1.0e-6);
        assert!(w.windows(2).all(|p| p[0] > p[1]));
    }

    #[test]
    fn levels_halve_down_to_one_pixel() {
        let sizes = level_sizes(1280, 720);
        assert_eq!(sizes[0], (640, 360));
        assert_eq!(sizes[4], (40, 23));

        let tiny = level_sizes(3, 1);
        assert_eq!(tiny, [(2, 1), (1, 1), (1, 1), (1, 1), (1, 1)]);
    }

    #[test]
    fn resizing_is_recorded_until_the_next_draw() {
        let mut bloom = BloomPass::default();
        bloom.set_size(800, 0);
        assert_eq!(bloom.size(), (800, 1));
        assert!(!bloom.needs_swap());
        assert!(bloom.targets.is_none());
    }

    #[test]
    fn uniform_blocks_match_the_shader_layout() {
        assert_eq!(std::mem::size_of::<BloomParams>(), 32);
        assert_eq!(std::mem::size_of::<CompositeParams>(), 32);
    }
}
