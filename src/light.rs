//! Lighting configuration for 3D scenes.
//!
//! Lights are attached to scene nodes. Ambient lights ignore the node
//! transform, directional and point lights take their world position from it.

use crate::color::{self, Color};
use glamx::Vec3;

/// Maximum number of direct lights a frame shades with.
pub const MAX_LIGHTS: usize = 8;

/// The type of light source.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LightType {
    /// Uniform light reaching every surface from every direction.
    Ambient,
    /// Parallel rays travelling along the given direction, like the sun.
    Directional(Vec3),
    /// A point emitting in all directions, fading out at `attenuation_radius`.
    Point {
        /// Distance beyond which the light has no effect.
        attenuation_radius: f32,
    },
}

/// A light source that can be attached to a scene node.
///
/// # Examples
/// ```no_run
/// # use turntable::prelude::*;
/// let fill = Light::ambient(color::from_hex(0xcccccc));
/// let sun = Light::directional(Vec3::NEG_Y)
///     .with_intensity(3.0)
///     .with_shadows(true);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Light {
    /// The type of light.
    pub light_type: LightType,
    /// The linear color of the light.
    pub color: Color,
    /// The intensity multiplier for the light.
    pub intensity: f32,
    /// Whether the light renders a shadow map. Only directional lights do.
    pub cast_shadow: bool,
    /// Whether the light is enabled.
    pub enabled: bool,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            light_type: LightType::Ambient,
            color: color::WHITE,
            intensity: 1.0,
            cast_shadow: false,
            enabled: true,
        }
    }
}

impl Light {
    /// Creates an ambient light of the given color.
    pub fn ambient(color: Color) -> Self {
        Self {
            light_type: LightType::Ambient,
            color,
            ..Default::default()
        }
    }

    /// Creates a directional light shining along `dir`.
    pub fn directional(dir: Vec3) -> Self {
        Self {
            light_type: LightType::Directional(dir.try_normalize().unwrap_or(Vec3::NEG_Y)),
            ..Default::default()
        }
    }

    /// Creates a point light with the given attenuation radius.
    pub fn point(attenuation_radius: f32) -> Self {
        Self {
            light_type: LightType::Point { attenuation_radius },
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }

    /// Sets whether this light casts shadows.
    pub fn with_shadows(mut self, cast_shadow: bool) -> Self {
        self.cast_shadow = cast_shadow;
        self
    }

    /// The color scaled by the intensity, as an RGB vector.
    pub fn radiance(&self) -> Vec3 {
        Vec3::new(self.color.r, self.color.g, self.color.b) * self.intensity
    }
}

/// A direct light collected from the scene tree, in world space.
#[derive(Clone, Debug, PartialEq)]
pub struct CollectedLight {
    /// The type of light. Never [`LightType::Ambient`].
    pub light_type: LightType,
    /// Color times intensity.
    pub radiance: Vec3,
    /// World-space position of the node carrying the light.
    pub world_position: Vec3,
    /// World-space direction the light travels along.
    pub world_direction: Vec3,
    /// Whether the light renders a shadow map.
    pub cast_shadow: bool,
}

/// The lights gathered from the scene tree during the prepare phase.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LightCollection {
    /// The direct lights, at most [`MAX_LIGHTS`].
    pub lights: Vec<CollectedLight>,
    /// The sum of every ambient light.
    pub ambient: Vec3,
}

impl LightCollection {
    pub fn new() -> Self {
        Self {
            lights: Vec::with_capacity(MAX_LIGHTS),
            ambient: Vec3::ZERO,
        }
    }

    /// Adds a light placed by a node at `world_position`.
    ///
    /// Ambient lights are summed. Direct lights past [`MAX_LIGHTS`] are
    /// dropped and `false` is returned.
    pub fn add(&mut self, light: &Light, world_position: Vec3) -> bool {
        if !light.enabled {
            return true;
        }

        let world_direction = match light.light_type {
            LightType::Ambient => {
                self.ambient += light.radiance();
                return true;
            }
            LightType::Directional(dir) => dir,
            LightType::Point { .. } => Vec3::ZERO,
        };

        if self.lights.len() >= MAX_LIGHTS {
            log::warn!("more than {} lights in the scene, ignoring the rest", MAX_LIGHTS);
            return false;
        }

        self.lights.push(CollectedLight {
            light_type: light.light_type.clone(),
            radiance: light.radiance(),
            world_position,
            world_direction,
            cast_shadow: light.cast_shadow,
        });
        true
    }

    /// The first directional light casting shadows, if any.
    pub fn shadow_caster(&self) -> Option<&CollectedLight> {
        self.lights.iter().find(|l| {
            l.cast_shadow && matches!(l.light_type, LightType::Directional(_))
        })
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambient_lights_add_up() {
        let mut lights = LightCollection::new();
        lights.add(&Light::ambient(color::WHITE).with_intensity(0.5), Vec3::ZERO);
        lights.add(&Light::ambient(color::WHITE).with_intensity(0.25), Vec3::X);
        assert_eq!(lights.ambient, Vec3::splat(0.75));
        assert!(lights.is_empty());
    }

    #[test]
    fn extra_direct_lights_are_dropped() {
        let mut lights = LightCollection::new();
        for _ in 0..MAX_LIGHTS {
            assert!(lights.add(&Light::point(10.0), Vec3::ZERO));
        }
        assert!(!lights.add(&Light::point(10.0), Vec3::ZERO));
        assert_eq!(lights.len(), MAX_LIGHTS);
    }

    #[test]
    fn only_directional_lights_cast_shadows() {
        let mut lights = LightCollection::new();
        lights.add(&Light::point(10.0).with_shadows(true), Vec3::Y);
        assert!(lights.shadow_caster().is_none());

        lights.add(&Light::directional(Vec3::NEG_Y).with_shadows(true), Vec3::Y);
        let caster = lights.shadow_caster().expect("directional caster");
        assert_eq!(caster.world_direction, Vec3::NEG_Y);
        assert_eq!(caster.world_position, Vec3::Y);
    }
}
