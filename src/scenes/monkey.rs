use std::path::{Path, PathBuf};

use crate::animation::Spin;
use crate::camera::PerspectiveCamera3d;
use crate::color;
use crate::controls::{CursorOrbit, ResizeHandler, Resizable};
use crate::error::TurntableError;
use crate::loader::{self, CubemapImages, Loading, LoadingManager, PendingAsset, CUBEMAP_FACES};
use crate::post_processing::{BloomPass, BloomSettings, EffectComposer, OutputPass, ScenePass};
use crate::procedural::RenderMesh;
use crate::resource::{CubeTexture, Material3d};
use crate::scene::SceneNode3d;
use crate::scenes::{add_default_lights, default_camera, Showcase};
use crate::window::Reveal;

/// Environment variable overriding the directory the monkey assets are
/// read from.
pub const ASSETS_ENV_VAR: &str = "TURNTABLE_ASSETS";

/// Where the monkey showcase finds its files.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonkeyAssets {
    /// A Wavefront OBJ model.
    pub model: PathBuf,
    /// The six skybox faces, ordered `px, nx, py, ny, pz, nz`.
    pub skybox: [PathBuf; 6],
}

impl Default for MonkeyAssets {
    fn default() -> Self {
        MonkeyAssets::in_dir("assets")
    }
}

impl MonkeyAssets {
    /// `monkey.obj` and `skybox/{px,nx,py,ny,pz,nz}.png` under `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        MonkeyAssets {
            model: dir.join("monkey.obj"),
            skybox: CUBEMAP_FACES.map(|face| dir.join("skybox").join(format!("{face}.png"))),
        }
    }

    /// The default layout, under the directory named by `TURNTABLE_ASSETS`
    /// when it is set.
    pub fn from_env() -> Self {
        match std::env::var_os(ASSETS_ENV_VAR) {
            Some(dir) if !dir.is_empty() => MonkeyAssets::in_dir(dir),
            _ => MonkeyAssets::default(),
        }
    }

    /// Starts reading and decoding the model.
    pub fn load_model(&self) -> Loading<RenderMesh> {
        loader::load_async(vec![self.model.clone()], |mut files| {
            let bytes = files.pop().unwrap_or_default();
            loader::parse_obj(&String::from_utf8_lossy(&bytes))
        })
    }

    /// Starts reading and decoding the six skybox faces.
    pub fn load_skybox(&self) -> Loading<CubemapImages> {
        let paths = self.skybox.to_vec();
        loader::load_async(paths.clone(), move |files| loader::decode_cubemap(files, &paths))
    }
}

/// A glass monkey head spinning in front of a skybox, with bloom.
///
/// The model and the skybox load in the background. The canvas stays hidden
/// until both loaded; if either fails it never shows up.
pub struct MonkeyScene {
    scene: SceneNode3d,
    camera: PerspectiveCamera3d,
    monkey: PendingAsset<SceneNode3d>,
    model: Loading<RenderMesh>,
    skybox: Loading<CubemapImages>,
    loading: LoadingManager,
    spin: Spin,
    orbit: CursorOrbit,
    resize: ResizeHandler,
    composer: EffectComposer,
}

impl MonkeyScene {
    /// Builds the scene for a `width`x`height` window and starts loading
    /// `assets`.
    pub fn new(width: u32, height: u32, assets: &MonkeyAssets) -> MonkeyScene {
        log::info!(
            "loading {} and the skybox next to it",
            assets.model.display()
        );
        MonkeyScene::with_loads(width, height, assets.load_model(), assets.load_skybox())
    }

    /// Builds the scene around loads started elsewhere.
    pub fn with_loads(
        width: u32,
        height: u32,
        model: Loading<RenderMesh>,
        skybox: Loading<CubemapImages>,
    ) -> MonkeyScene {
        let mut scene = SceneNode3d::empty();
        add_default_lights(&mut scene);

        let mut loading = LoadingManager::new();
        loading.item_start();
        loading.item_start();

        let mut composer = EffectComposer::new(ScenePass::new().with_shadows(true), width, height);
        composer.add_pass(BloomPass::new(BloomSettings::default()));
        composer.add_pass(OutputPass::new());

        MonkeyScene {
            scene,
            camera: default_camera(width, height),
            monkey: PendingAsset::new(),
            model,
            skybox,
            loading,
            spin: Spin::new(),
            orbit: CursorOrbit::new(),
            resize: ResizeHandler::new(),
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

    /// The monkey, once loaded.
    #[inline]
    pub fn monkey(&self) -> Option<&SceneNode3d> {
        self.monkey.get()
    }

    #[inline]
    pub fn spin(&self) -> &Spin {
        &self.spin
    }

    #[inline]
    pub fn loading(&self) -> &LoadingManager {
        &self.loading
    }

    #[inline]
    pub fn composer(&self) -> &EffectComposer {
        &self.composer
    }

    fn model_loaded(&mut self, mesh: RenderMesh) -> bool {
        let node = SceneNode3d::render_mesh(mesh, Material3d::transmissive(color::WHITE));
        match self.monkey.settle(node) {
            Ok(node) => {
                self.scene.add_child(node.clone());
                log::info!("monkey loaded");
                true
            }
            Err(_) => {
                log::error!("the monkey was already loaded");
                false
            }
        }
    }

    fn skybox_loaded(&mut self, images: CubemapImages) -> bool {
        log::info!("skybox loaded ({0}x{0} faces)", images.size);
        self.scene.set_background(CubeTexture::new(images));
        true
    }
}

impl Showcase for MonkeyScene {
    const STARTS_HIDDEN: bool = true;

    fn time_passed(&mut self, diff_ms: f64) -> Result<(), TurntableError> {
        self.spin.time_passed(diff_ms, self.monkey.get_mut())
    }

    fn cursor_moved(&mut self, x: f64, y: f64, viewport_width: u32) {
        self.orbit.cursor_moved(x, y, viewport_width, &mut self.camera);
    }

    fn resized(&mut self, width: u32, height: u32, surface: &mut dyn Resizable) {
        self.resize
            .resize(width, height, &mut self.camera, &mut [surface, &mut self.composer]);
    }

    fn poll_assets(&mut self, canvas: &mut dyn Reveal) {
        let mut all_loaded = false;

        if let Some(result) = self.model.poll() {
            let success = match result {
                Ok(mesh) => self.model_loaded(mesh),
                Err(e) => {
                    log::error!("failed to load the monkey: {e}");
                    false
                }
            };
            all_loaded |= self.loading.item_end(success);
        }

        if let Some(result) = self.skybox.poll() {
            let success = match result {
                Ok(images) => self.skybox_loaded(images),
                Err(e) => {
                    log::error!("failed to load the skybox: {e}");
                    false
                }
            };
            all_loaded |= self.loading.item_end(success);
        }

        if all_loaded {
            canvas.reveal();
        }
    }

    fn render(&mut self, output: &wgpu::TextureView, output_format: wgpu::TextureFormat) {
        self.composer
            .render(&self.scene, &self.camera, output, output_format);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assets_default_to_the_assets_directory() {
        let assets = MonkeyAssets::in_dir("/data");
        assert_eq!(assets.model, PathBuf::from("/data/monkey.obj"));
        assert_eq!(assets.skybox[0], PathBuf::from("/data/skybox/px.png"));
        assert_eq!(assets.skybox[5], PathBuf::from("/data/skybox/nz.png"));
    }

    #[test]
    fn the_composer_blooms_before_the_output() {
        let (_model, model) = loader::loading_channel();
        let (_skybox, skybox) = loader::loading_channel();
        let scene = MonkeyScene::with_loads(640, 480, model, skybox);
        assert_eq!(scene.composer().num_passes(), 3);
        assert!(scene.monkey().is_none());
        assert_eq!(scene.loading().progress(), (0, 0, 2));
    }
}
