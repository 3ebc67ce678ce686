//! Surface parameters of the objects in a scene.

use crate::color::{self, Color};

/// Which faces of a mesh are drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    /// Back faces are culled.
    #[default]
    Front,
    /// Both faces are drawn.
    Double,
}

/// The lighting model of a surface.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Shading {
    /// Lambert diffuse plus a Blinn-Phong highlight.
    Phong {
        /// Exponent of the specular highlight.
        shininess: f32,
        /// Gray level of the specular color.
        specular: f32,
    },
    /// A metallic-roughness surface.
    Standard { roughness: f32, metalness: f32 },
    /// A glass-like surface refracting and reflecting the environment.
    Transmissive {
        roughness: f32,
        /// Fraction of the light going through the surface, in `[0, 1]`.
        transmission: f32,
        /// Index of refraction.
        ior: f32,
        /// Depth of the volume below the surface, in world units.
        thickness: f32,
    },
}

impl Shading {
    /// The index of the shading model in the object shader.
    pub fn model_id(&self) -> u32 {
        match self {
            Shading::Phong { .. } => 0,
            Shading::Standard { .. } => 1,
            Shading::Transmissive { .. } => 2,
        }
    }
}

/// The material of an object: base color, emission, lighting model and culling.
///
/// Colors are linear, see [`color::from_hex`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Material3d {
    pub color: Color,
    pub emissive: Color,
    pub shading: Shading,
    pub side: Side,
}

impl Material3d {
    /// A shiny plastic-like material.
    pub fn phong(color: Color) -> Self {
        Material3d {
            color,
            emissive: color::BLACK,
            shading: Shading::Phong {
                shininess: 30.0,
                specular: color::srgb_to_linear(17.0 / 255.0),
            },
            side: Side::Front,
        }
    }

    /// A fully rough dielectric.
    pub fn standard(color: Color) -> Self {
        Material3d {
            color,
            emissive: color::BLACK,
            shading: Shading::Standard {
                roughness: 1.0,
                metalness: 0.0,
            },
            side: Side::Front,
        }
    }

    /// Clear glass tinted by `color`.
    pub fn transmissive(color: Color) -> Self {
        Material3d {
            color,
            emissive: color::BLACK,
            shading: Shading::Transmissive {
                roughness: 0.05,
                transmission: 1.0,
                ior: 1.5,
                thickness: 0.5,
            },
            side: Side::Front,
        }
    }

    pub fn with_emissive(mut self, emissive: Color) -> Self {
        self.emissive = emissive;
        self
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    pub fn with_shading(mut self, shading: Shading) -> Self {
        self.shading = shading;
        self
    }

    /// Whether this material needs the environment cubemap.
    pub fn samples_environment(&self) -> bool {
        matches!(self.shading, Shading::Transmissive { .. })
    }
}

impl Default for Material3d {
    fn default() -> Self {
        Material3d::standard(color::WHITE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_shading_has_its_own_model() {
        let ids: Vec<u32> = [
            Material3d::phong(color::WHITE),
            Material3d::standard(color::WHITE),
            Material3d::transmissive(color::WHITE),
        ]
        .iter()
        .map(|m| m.shading.model_id())
        .collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn only_transmissive_materials_sample_the_environment() {
        assert!(Material3d::transmissive(color::WHITE).samples_environment());
        assert!(!Material3d::phong(color::WHITE).samples_environment());
    }
}
