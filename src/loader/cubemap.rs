//! Cubemap face decoding.

use crate::error::LoadError;
use std::path::PathBuf;

/// File stems of the six faces, in GPU layer order.
pub const CUBEMAP_FACES: [&str; 6] = ["px", "nx", "py", "ny", "pz", "nz"];

/// Six decoded RGBA8 faces of equal square size, ordered `+X, -X, +Y, -Y, +Z, -Z`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CubemapImages {
    /// The width and height of every face.
    pub size: u32,
    /// Tightly packed RGBA8 pixels, one buffer per face.
    pub faces: [Vec<u8>; 6],
}

impl CubemapImages {
    /// A cubemap filled with a single color, mostly useful as a placeholder.
    pub fn solid(size: u32, rgba: [u8; 4]) -> Self {
        let size = size.max(1);
        let face: Vec<u8> = rgba
            .iter()
            .copied()
            .cycle()
            .take((size * size * 4) as usize)
            .collect();

        CubemapImages {
            size,
            faces: std::array::from_fn(|_| face.clone()),
        }
    }
}

/// Decodes six encoded images (PNG, JPEG, ...) into a cubemap.
///
/// `paths` are only used for error messages.
pub fn decode_cubemap(
    encoded: Vec<Vec<u8>>,
    paths: &[PathBuf],
) -> Result<CubemapImages, LoadError> {
    let mut faces: Vec<Vec<u8>> = Vec::with_capacity(6);
    let mut expected = None;

    for (face, bytes) in encoded.iter().enumerate().take(6) {
        let path = paths.get(face).cloned().unwrap_or_default();
        let image = image::load_from_memory(bytes)
            .map_err(|source| LoadError::Image { path, source })?
            .to_rgba8();

        let (width, height) = image.dimensions();
        let size = *expected.get_or_insert(width);
        if width != size || height != size {
            return Err(LoadError::CubemapFace {
                face,
                width,
                height,
                expected: size,
            });
        }

        faces.push(image.into_raw());
    }

    let faces: [Vec<u8>; 6] = faces
        .try_into()
        .map_err(|faces: Vec<Vec<u8>>| LoadError::CubemapFaceCount { found: faces.len() })?;

    Ok(CubemapImages {
        size: expected.unwrap_or(1),
        faces,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, Rgba(color));
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, ImageFormat::Png).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn six_square_faces_decode_in_order() {
        let encoded = (0..6u8).map(|i| png(2, 2, [i, 0, 0, 255])).collect();
        let cubemap = decode_cubemap(encoded, &[]).unwrap();

        assert_eq!(cubemap.size, 2);
        for (i, face) in cubemap.faces.iter().enumerate() {
            assert_eq!(face.len(), 2 * 2 * 4);
            assert_eq!(face[0], i as u8);
        }
    }

    #[test]
    fn mismatched_faces_are_rejected() {
        let mut encoded: Vec<Vec<u8>> = (0..6).map(|_| png(4, 4, [0; 4])).collect();
        encoded[3] = png(4, 2, [0; 4]);

        let err = decode_cubemap(encoded, &[]).unwrap_err();
        assert!(matches!(
            err,
            LoadError::CubemapFace {
                face: 3,
                width: 4,
                height: 2,
                expected: 4
            }
        ));
    }

    #[test]
    fn missing_faces_are_rejected() {
        let encoded = (0..5).map(|_| png(1, 1, [0; 4])).collect();
        assert!(decode_cubemap(encoded, &[]).is_err());
    }

    #[test]
    fn undecodable_bytes_name_the_file() {
        let mut encoded: Vec<Vec<u8>> = (0..6).map(|_| png(1, 1, [0; 4])).collect();
        encoded[0] = b"not an image".to_vec();
        let paths: Vec<PathBuf> = CUBEMAP_FACES.iter().map(|f| PathBuf::from(format!("{f}.png"))).collect();

        let err = decode_cubemap(encoded, &paths).unwrap_err();
        assert!(err.to_string().contains("px.png"));
    }

    #[test]
    fn solid_cubemaps_fill_every_face() {
        let cubemap = CubemapImages::solid(2, [1, 2, 3, 4]);
        assert_eq!(cubemap.faces[5], vec![1, 2, 3, 4, 1, 2, 3, 4, 1, 2, 3, 4, 1, 2, 3, 4]);
    }
}
