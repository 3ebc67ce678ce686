use turntable::prelude::*;

const TRIANGLE: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

#[derive(Default)]
struct Canvas {
    visible: bool,
    reveals: usize,
}

impl Reveal for Canvas {
    fn reveal(&mut self) {
        self.visible = true;
        self.reveals += 1;
    }

    fn is_revealed(&self) -> bool {
        self.visible
    }
}

#[test]
fn the_canvas_appears_once_everything_loaded() {
    let (model_resolver, model) = loading_channel();
    let (skybox_resolver, skybox) = loading_channel();
    let mut scene = MonkeyScene::with_loads(800, 600, model, skybox);
    let mut canvas = Canvas::default();
    let children_before = scene.scene().num_children();

    // Nothing loaded: the update is a no-op and the canvas stays hidden.
    scene.poll_assets(&mut canvas);
    scene.time_passed(1000.0).unwrap();
    assert!(!canvas.is_revealed());
    assert!(scene.monkey().is_none());
    assert_eq!(*scene.spin(), Spin::new());

    model_resolver.resolve(parse_obj(TRIANGLE));
    scene.poll_assets(&mut canvas);
    assert!(scene.monkey().is_some());
    assert!(!canvas.is_revealed(), "the skybox is still loading");

    skybox_resolver.resolve(Ok(CubemapImages::solid(2, [40, 80, 160, 255])));
    scene.poll_assets(&mut canvas);
    assert!(canvas.is_revealed());
    assert!(scene.loading().is_complete());

    let monkey = scene.monkey().unwrap();
    assert!(scene.scene().has_child(monkey));
    assert_eq!(scene.scene().num_children(), children_before + 1);
    assert!(scene.scene().background().is_some());

    let material = *monkey.data().object().unwrap().material();
    assert!(material.samples_environment());

    // Later polls do not reveal again.
    scene.poll_assets(&mut canvas);
    assert_eq!(canvas.reveals, 1);
}

#[test]
fn the_monkey_spins_once_loaded() {
    let mut scene = MonkeyScene::with_loads(
        800,
        600,
        Loading::settled(parse_obj(TRIANGLE)),
        Loading::settled(Ok(CubemapImages::solid(1, [0, 0, 0, 255]))),
    );
    scene.poll_assets(&mut Canvas::default());

    scene.time_passed(2500.0).unwrap();
    let rotation = scene.monkey().unwrap().rotation();
    approx::assert_relative_eq!(rotation.x, std::f32::consts::FRAC_PI_2, epsilon = 1.0e-5);
    approx::assert_relative_eq!(rotation.y, std::f32::consts::FRAC_PI_2, epsilon = 1.0e-5);
}

#[test]
fn a_failed_load_keeps_the_canvas_hidden() {
    let mut scene = MonkeyScene::with_loads(
        800,
        600,
        Loading::settled(Err(LoadError::Abandoned)),
        Loading::settled(Ok(CubemapImages::solid(1, [0, 0, 0, 255]))),
    );
    let mut canvas = Canvas::default();

    for _ in 0..3 {
        scene.poll_assets(&mut canvas);
    }

    assert!(!canvas.is_revealed());
    assert!(scene.monkey().is_none());
    assert_eq!(scene.loading().progress(), (1, 1, 2));
    assert!(scene.time_passed(16.0).is_ok());
    assert!(scene.time_passed(-16.0).is_err());
}
