//! Off-screen render targets for the scene pass and the post-processing chain.

use crate::context::Context;

/// wgpu resources for an off-screen render target.
pub struct OffscreenBuffers {
    /// The color texture to render to.
    pub color_texture: wgpu::Texture,
    /// The color texture view.
    pub color_view: wgpu::TextureView,
    /// The depth texture and its view, for targets the scene is drawn into.
    pub depth: Option<(wgpu::Texture, wgpu::TextureView)>,
    /// The sampler reading the color texture in the next pass.
    pub sampler: wgpu::Sampler,
    /// The color format.
    pub format: wgpu::TextureFormat,
    /// Width of the render target.
    pub width: u32,
    /// Height of the render target.
    pub height: u32,
}

impl OffscreenBuffers {
    /// Creates new off-screen buffers with the specified dimensions.
    ///
    /// Zero sizes are bumped to 1 to keep wgpu validation happy.
    pub fn new(
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        create_depth_texture: bool,
    ) -> Self {
        let ctxt = Context::get();

        let width = width.max(1);
        let height = height.max(1);
        let extent = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let color_texture = ctxt.create_texture(&wgpu::TextureDescriptor {
            label: Some("offscreen_color_texture"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let color_view = color_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let depth = create_depth_texture.then(|| {
            let texture = ctxt.create_texture(&wgpu::TextureDescriptor {
                label: Some("offscreen_depth_texture"),
                size: extent,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: Context::depth_format(),
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            });
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            (texture, view)
        });

        let sampler = ctxt.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("offscreen_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        OffscreenBuffers {
            color_texture,
            color_view,
            depth,
            sampler,
            format,
            width,
            height,
        }
    }

    /// An HDR target in [`Context::hdr_format`].
    pub fn hdr(width: u32, height: u32, create_depth_texture: bool) -> Self {
        Self::new(width, height, Context::hdr_format(), create_depth_texture)
    }

    /// The depth view, if this target has one.
    pub fn depth_view(&self) -> Option<&wgpu::TextureView> {
        self.depth.as_ref().map(|(_, view)| view)
    }

    /// Whether reallocating to `width`x`height` would change anything.
    pub fn needs_resize(&self, width: u32, height: u32) -> bool {
        self.width != width.max(1) || self.height != height.max(1)
    }

    /// Recreates the textures if the size changed.
    ///
    /// Returns `true` if a reallocation happened.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if !self.needs_resize(width, height) {
            return false;
        }

        *self = OffscreenBuffers::new(width, height, self.format, self.depth.is_some());
        true
    }
}
