use approx::assert_relative_eq;
use turntable::prelude::*;

#[derive(Default)]
struct Surface {
    size: Option<(u32, u32)>,
    reallocations: usize,
}

impl Resizable for Surface {
    fn resize(&mut self, width: u32, height: u32) {
        if self.size != Some((width, height)) {
            self.size = Some((width, height));
            self.reallocations += 1;
        }
    }
}

#[test]
fn resizing_twice_to_the_same_size_changes_nothing() {
    let mut camera = default_camera(800, 600);
    let mut handler = ResizeHandler::new();
    let mut surface = Surface::default();
    let mut composer = EffectComposer::new(ScenePass::new(), 800, 600);

    assert!(handler.resize(
        1280,
        720,
        &mut camera,
        &mut [&mut surface as &mut dyn Resizable, &mut composer]
    ));
    let after_first = camera;

    assert!(!handler.resize(
        1280,
        720,
        &mut camera,
        &mut [&mut surface as &mut dyn Resizable, &mut composer]
    ));

    assert_eq!(camera, after_first);
    assert_relative_eq!(camera.aspect(), 1280.0 / 720.0);
    assert_eq!(surface.reallocations, 1);
    assert_eq!(composer.size(), (1280, 720));
}

#[test]
fn the_monkey_showcase_follows_the_window() {
    let (_model, model) = loading_channel();
    let (_skybox, skybox) = loading_channel();
    let mut scene = MonkeyScene::with_loads(800, 600, model, skybox);
    let mut surface = Surface::default();

    scene.resized(400, 400, &mut surface);
    scene.resized(400, 400, &mut surface);

    assert_relative_eq!(scene.camera().aspect(), 1.0);
    assert_eq!(scene.composer().size(), (400, 400));
    assert_eq!(surface.reallocations, 1);
}

#[test]
fn the_cube_showcase_ignores_resizes() {
    let mut scene = CubeScene::new(800, 600);
    let mut surface = Surface::default();

    scene.resized(400, 400, &mut surface);

    assert_relative_eq!(scene.camera().aspect(), 800.0 / 600.0);
    assert_eq!(scene.composer().size(), (800, 600));
    assert_eq!(surface.reallocations, 0);
}
