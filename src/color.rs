//! Colors.
//!
//! Colors are stored in linear space with RGBA components in `[0.0, 1.0]`,
//! which is what the shaders light with. Hexadecimal colors such as
//! `0x00ff00` are sRGB encoded and go through [`from_hex`] to be linearized.

pub use rgb::Rgba;

/// The color type used throughout turntable. Linear RGBA with f32 components.
pub type Color = Rgba<f32>;

/// Black (0, 0, 0)
pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);

/// White (255, 255, 255)
pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);

/// Converts one sRGB encoded channel into linear space.
#[inline]
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Creates an opaque linear color from a `0xRRGGBB` sRGB value.
pub fn from_hex(hex: u32) -> Color {
    let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
    Color::new(channel(16), channel(8), channel(0), 1.0)
}

/// Scales the RGB part of a color, keeping its alpha.
#[inline]
pub fn scaled(color: Color, factor: f32) -> Color {
    Color::new(color.r * factor, color.g * factor, color.b * factor, color.a)
}

/// The color as a `[r, g, b, a]` array, ready for a uniform buffer.
#[inline]
pub fn to_array(color: Color) -> [f32; 4] {
    [color.r, color.g, color.b, color.a]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn primary_hex_colors_stay_saturated() {
        assert_eq!(from_hex(0x00ff00), Color::new(0.0, 1.0, 0.0, 1.0));
        assert_eq!(from_hex(0x0000ff), Color::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(from_hex(0xffffff), WHITE);
    }

    #[test]
    fn gray_hex_colors_are_linearized() {
        let gray = from_hex(0xcccccc);
        assert_relative_eq!(gray.r, 0.603_827_3, epsilon = 1.0e-5);
        assert_eq!(gray.r, gray.g);
        assert_eq!(gray.g, gray.b);
    }
}
