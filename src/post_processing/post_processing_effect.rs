//! Trait implemented by every post-processing effect.

use crate::resource::OffscreenBuffers;

/// What an effect draws into.
pub struct PostProcessingContext<'a> {
    /// The command encoder for this frame.
    pub encoder: &'a mut wgpu::CommandEncoder,
    /// The view to write. The screen for the last effect of the chain, the
    /// other HDR buffer otherwise.
    pub output_view: &'a wgpu::TextureView,
    /// The format of `output_view`.
    pub output_format: wgpu::TextureFormat,
}

/// An image-space pass run after the scene was rendered.
pub trait PostProcessingEffect {
    /// Records the size of the frames this effect will process.
    ///
    /// Called when the effect joins a composer and on every resize. GPU
    /// resources depending on the size are reallocated at the next draw.
    fn set_size(&mut self, width: u32, height: u32);

    /// Whether the effect writes `output_view`, making it the input of the
    /// next effect. Effects returning `false` modify `source` in place.
    fn needs_swap(&self) -> bool {
        true
    }

    /// Runs the effect on `source`.
    fn draw(&mut self, source: &OffscreenBuffers, context: &mut PostProcessingContext);
}
