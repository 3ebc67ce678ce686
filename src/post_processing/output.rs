//! Final pass mapping HDR colors to the displayable range.

use crate::context::Context;
use crate::post_processing::fullscreen::{self, FullscreenQuad};
use crate::post_processing::post_processing_effect::{PostProcessingContext, PostProcessingEffect};
use crate::resource::OffscreenBuffers;
use bytemuck::{Pod, Zeroable};

/// The curve compressing HDR colors into `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ToneMapping {
    /// Colors are clamped.
    #[default]
    None,
    Reinhard,
    AcesFilmic,
}

impl ToneMapping {
    fn shader_id(self) -> f32 {
        match self {
            ToneMapping::None => 0.0,
            ToneMapping::Reinhard => 1.0,
            ToneMapping::AcesFilmic => 2.0,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct OutputUniforms {
    params: [f32; 4],
}

impl OutputUniforms {
    fn new(tone_mapping: ToneMapping, exposure: f32, format: wgpu::TextureFormat) -> Self {
        // sRGB surfaces encode on write.
        let encode = if format.is_srgb() { 0.0 } else { 1.0 };
        OutputUniforms {
            params: [tone_mapping.shader_id(), exposure, encode, 0.0],
        }
    }
}

struct OutputGpu {
    format: wgpu::TextureFormat,
    pipeline: wgpu::RenderPipeline,
    texture_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    quad: FullscreenQuad,
}

/// Tone maps the HDR frame and encodes it to sRGB for the screen.
///
/// Usually the last effect of an [`crate::post_processing::EffectComposer`].
pub struct OutputPass {
    tone_mapping: ToneMapping,
    exposure: f32,
    gpu: Option<OutputGpu>,
}

impl Default for OutputPass {
    fn default() -> Self {
        OutputPass::new()
    }
}

impl OutputPass {
    pub fn new() -> OutputPass {
        OutputPass {
            tone_mapping: ToneMapping::None,
            exposure: 1.0,
            gpu: None,
        }
    }

    pub fn with_tone_mapping(mut self, tone_mapping: ToneMapping) -> Self {
        self.tone_mapping = tone_mapping;
        self
    }

    pub fn with_exposure(mut self, exposure: f32) -> Self {
        self.exposure = exposure;
        self
    }

    #[inline]
    pub fn tone_mapping(&self) -> ToneMapping {
        self.tone_mapping
    }

    fn create_gpu(&self, format: wgpu::TextureFormat) -> OutputGpu {
        let ctxt = Context::get();

        let texture_layout = fullscreen::texture_bind_group_layout("output_texture_bind_group_layout");
        let uniform_layout = fullscreen::uniform_bind_group_layout("output_uniform_bind_group_layout");

        let shader = ctxt.create_shader_module(
            Some("output_shader"),
            concat!(include_str!("fullscreen.wgsl"), include_str!("output.wgsl")),
        );
        let pipeline = fullscreen::fullscreen_pipeline(
            "output_pipeline",
            &shader,
            "fs_main",
            &[&texture_layout, &uniform_layout],
            format,
            None,
        );

        let uniforms = OutputUniforms::new(self.tone_mapping, self.exposure, format);
        let (uniform_buffer, uniform_bind_group) = fullscreen::uniform_bind_group(
            "output_uniforms",
            &uniform_layout,
            bytemuck::bytes_of(&uniforms),
        );

        OutputGpu {
            format,
            pipeline,
            texture_layout,
            uniform_buffer,
            uniform_bind_group,
            quad: FullscreenQuad::new("output_quad"),
        }
    }
}

impl PostProcessingEffect for OutputPass {
    fn set_size(&mut self, _: u32, _: u32) {}

    fn draw(&mut self, source: &OffscreenBuffers, context: &mut PostProcessingContext) {
        let format = context.output_format;
        if self.gpu.as_ref().is_none_or(|gpu| gpu.format != format) {
            log::debug!("creating the output pass pipeline for {format:?}");
            self.gpu = Some(self.create_gpu(format));
        }
        let Some(ref gpu) = self.gpu else {
            return;
        };

        let uniforms = OutputUniforms::new(self.tone_mapping, self.exposure, format);
        Context::get().write_buffer(&gpu.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let bind_group = fullscreen::texture_bind_group(
            "output_bind_group",
            &gpu.texture_layout,
            &source.color_view,
            &source.sampler,
        );

        let mut pass = fullscreen::begin_fullscreen_pass(
            context.encoder,
            "output_render_pass",
            context.output_view,
            false,
        );
        pass.set_pipeline(&gpu.pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.set_bind_group(1, &gpu.uniform_bind_group, &[]);
        gpu.quad.draw(&mut pass);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_srgb_surfaces_are_encoded_by_the_shader() {
        let linear = OutputUniforms::new(ToneMapping::None, 1.0, wgpu::TextureFormat::Bgra8Unorm);
        let srgb = OutputUniforms::new(ToneMapping::None, 1.0, wgpu::TextureFormat::Bgra8UnormSrgb);
        assert_eq!(linear.params[2], 1.0);
        assert_eq!(srgb.params[2], 0.0);
    }

    #[test]
    fn tone_mapping_is_off_by_default() {
        let pass = OutputPass::default().with_exposure(1.5);
        assert_eq!(pass.tone_mapping(), ToneMapping::None);
        assert_eq!(pass.exposure, 1.5);
        assert!(pass.needs_swap());
    }
}
