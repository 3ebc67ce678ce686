//! Cube textures sampled by the skybox and by transmissive surfaces.

use crate::context::Context;
use crate::loader::CubemapImages;

/// The wgpu objects of an uploaded cube texture.
pub struct GpuCubeTexture {
    /// The underlying six-layer texture.
    pub texture: wgpu::Texture,
    /// A `Cube` view over the six layers.
    pub view: wgpu::TextureView,
    /// A linear, edge-clamped sampler.
    pub sampler: wgpu::Sampler,
}

/// A cubemap kept on the RAM until its first use on the GPU.
///
/// Faces are stored as sRGB encoded RGBA8 and uploaded as
/// `Rgba8UnormSrgb`, so shaders read linear colors.
pub struct CubeTexture {
    images: CubemapImages,
    gpu: Option<GpuCubeTexture>,
}

impl CubeTexture {
    pub fn new(images: CubemapImages) -> CubeTexture {
        CubeTexture { images, gpu: None }
    }

    /// A 1x1 black cubemap, bound when a scene has no background.
    pub fn black() -> CubeTexture {
        CubeTexture::new(CubemapImages::solid(1, [0, 0, 0, 255]))
    }

    /// The width and height of each face.
    #[inline]
    pub fn size(&self) -> u32 {
        self.images.size
    }

    #[inline]
    pub fn images(&self) -> &CubemapImages {
        &self.images
    }

    #[inline]
    pub fn is_on_gpu(&self) -> bool {
        self.gpu.is_some()
    }

    /// Uploads the six faces if that was not done yet.
    pub fn load_to_gpu(&mut self) -> &GpuCubeTexture {
        let images = &self.images;
        self.gpu.get_or_insert_with(|| upload(images))
    }
}

fn upload(images: &CubemapImages) -> GpuCubeTexture {
    let ctxt = Context::get();
    let size = images.size;

    let texture = ctxt.create_texture(&wgpu::TextureDescriptor {
        label: Some("cube_texture"),
        size: wgpu::Extent3d {
            width: size,
            height: size,
            depth_or_array_layers: 6,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    for (layer, face) in images.faces.iter().enumerate() {
        ctxt.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: 0,
                    y: 0,
                    z: layer as u32,
                },
                aspect: wgpu::TextureAspect::All,
            },
            face,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(size * 4),
                rows_per_image: Some(size),
            },
            wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
        );
    }

    let view = texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some("cube_texture_view"),
        dimension: Some(wgpu::TextureViewDimension::Cube),
        ..Default::default()
    });

    let sampler = ctxt.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("cube_texture_sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    });

    GpuCubeTexture {
        texture,
        view,
        sampler,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_textures_upload_lazily() {
        let tex = CubeTexture::black();
        assert_eq!(tex.size(), 1);
        assert!(!tex.is_on_gpu());
        assert_eq!(tex.images().faces[5], vec![0, 0, 0, 255]);
    }
}
