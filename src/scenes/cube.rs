use crate::animation::Spin;
use crate::camera::PerspectiveCamera3d;
use crate::color;
use crate::controls::CursorOrbit;
use crate::error::TurntableError;
use crate::post_processing::{EffectComposer, OutputPass, ScenePass};
use crate::resource::Material3d;
use crate::scene::SceneNode3d;
use crate::scenes::{add_default_lights, default_camera, Showcase};
use glamx::Vec3;
use std::f32::consts::FRAC_PI_2;

/// A green cube spinning above a blue floor it casts its shadow on.
pub struct CubeScene {
    scene: SceneNode3d,
    camera: PerspectiveCamera3d,
    cube: SceneNode3d,
    floor: SceneNode3d,
    spin: Spin,
    orbit: CursorOrbit,
    composer: EffectComposer,
}

impl CubeScene {
    /// Builds the scene for a `width`x`height` window.
    pub fn new(width: u32, height: u32) -> CubeScene {
        let mut scene = SceneNode3d::empty();
        add_default_lights(&mut scene);

        let cube = scene
            .add_cube(1.0, 1.0, 1.0, Material3d::phong(color::from_hex(0x00ff00)))
            .set_cast_shadow(true);

        let floor = scene
            .add_plane(3.0, 3.0, 32, 32, Material3d::standard(color::from_hex(0x0000ff)))
            .set_receive_shadow(true)
            .rotate(Vec3::new(-FRAC_PI_2, 0.0, 0.0))
            .translate(Vec3::new(0.0, -1.0, 0.0));

        let mut composer = EffectComposer::new(ScenePass::new().with_shadows(true), width, height);
        composer.add_pass(OutputPass::new());

        CubeScene {
            scene,
            camera: default_camera(width, height),
            cube,
            floor,
            spin: Spin::new(),
            orbit: CursorOrbit::new(),
            composer,
        }
    }

    #[inline]
    pub fn scene(&self) -> &SceneNode3d {
        &self.scene
    }

    #[inline]
    pub fn camera(&self) -> &PerspectiveCamera3d {
        &self.camera
    }

    /// The spinning cube.
    #[inline]
    pub fn cube(&self) -> &SceneNode3d {
        &self.cube
    }

    #[inline]
    pub fn floor(&self) -> &SceneNode3d {
        &self.floor
    }

    #[inline]
    pub fn spin(&self) -> &Spin {
        &self.spin
    }

    #[inline]
    pub fn composer(&self) -> &EffectComposer {
        &self.composer
    }
}

impl Showcase for CubeScene {
    fn time_passed(&mut self, diff_ms: f64) -> Result<(), TurntableError> {
        self.spin.time_passed(diff_ms, Some(&mut self.cube))
    }

    fn cursor_moved(&mut self, x: f64, y: f64, viewport_width: u32) {
        self.orbit.cursor_moved(x, y, viewport_width, &mut self.camera);
    }

    fn render(&mut self, output: &wgpu::TextureView, output_format: wgpu::TextureFormat) {
        self.composer
            .render(&self.scene, &self.camera, output, output_format);
    }
}
