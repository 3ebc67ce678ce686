//! The two showcases: a shadowed spinning cube and a glass monkey.
//!
//! Each showcase owns everything its handlers touch (camera, scene graph,
//! rotation, composer) and is driven by [`crate::app::run_showcase`].

pub use self::cube::CubeScene;
pub use self::monkey::{MonkeyAssets, MonkeyScene};

mod cube;
mod monkey;

use crate::camera::PerspectiveCamera3d;
use crate::color;
use crate::controls::Resizable;
use crate::error::TurntableError;
use crate::light::Light;
use crate::scene::SceneNode3d;
use crate::window::Reveal;
use glamx::Vec3;

/// A scene together with its input handlers, as seen by the frame driver.
pub trait Showcase {
    /// Whether the window stays hidden until [`Reveal::reveal`] is called.
    const STARTS_HIDDEN: bool = false;

    /// Advances the animation by `diff_ms` milliseconds.
    fn time_passed(&mut self, diff_ms: f64) -> Result<(), TurntableError>;

    /// The cursor moved to `(x, y)` pixels on a viewport `viewport_width`
    /// pixels wide.
    fn cursor_moved(&mut self, x: f64, y: f64, viewport_width: u32);

    /// The window was resized. The default ignores it.
    fn resized(&mut self, _width: u32, _height: u32, _surface: &mut dyn Resizable) {}

    /// Picks up finished asset loads. Called between frames.
    fn poll_assets(&mut self, _canvas: &mut dyn Reveal) {}

    /// Renders the current state into `output`.
    fn render(&mut self, output: &wgpu::TextureView, output_format: wgpu::TextureFormat);
}

/// A 75° camera five units in front of the origin.
pub fn default_camera(width: u32, height: u32) -> PerspectiveCamera3d {
    let mut camera =
        PerspectiveCamera3d::new(75.0, width.max(1) as f32 / height.max(1) as f32, 0.1, 1000.0);
    camera.set_position(Vec3::new(0.0, 0.0, 5.0));
    camera
}

/// A light gray ambient and a white shadow casting light shining down from
/// one unit above the origin.
pub fn add_default_lights(scene: &mut SceneNode3d) -> SceneNode3d {
    scene.add_light(Light::ambient(color::from_hex(0xcccccc)));

    let mut sun = scene.add_light(
        Light::directional(Vec3::NEG_Y)
            .with_color(color::from_hex(0xffffff))
            .with_intensity(3.0)
            .with_shadows(true),
    );
    sun.set_position(Vec3::new(0.0, 1.0, 0.0))
}
