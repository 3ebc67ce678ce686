use std::f64::consts::PI;

use approx::assert_relative_eq;
use turntable::prelude::*;

/// A cube showcase whose render step only counts frames.
struct CountingCube {
    scene: CubeScene,
    renders: usize,
}

impl FrameTarget for CountingCube {
    fn time_passed(&mut self, diff_ms: f64) -> Result<(), TurntableError> {
        self.scene.time_passed(diff_ms)
    }

    fn render_frame(&mut self) {
        self.renders += 1;
    }
}

fn running_loop() -> RenderLoop {
    let mut render_loop = RenderLoop::new();
    assert_eq!(render_loop.start(Capability::Available), &LoopState::Running);
    render_loop
}

#[test]
fn the_cube_turns_once_every_ten_seconds() {
    let mut render_loop = running_loop();
    let mut target = CountingCube {
        scene: CubeScene::new(800, 600),
        renders: 0,
    };

    for now in [0.0, 2500.0, 5000.0, 10_000.0] {
        render_loop.frame(now, &mut target).unwrap();
    }

    let spin = target.scene.spin();
    assert_relative_eq!(spin.x(), 2.0 * PI, epsilon = 1.0e-12);
    assert_relative_eq!(spin.y(), 2.0 * PI, epsilon = 1.0e-12);
    assert_eq!(target.renders, 4);
}

#[test]
fn the_first_frame_only_renders() {
    let mut render_loop = running_loop();
    let mut target = CountingCube {
        scene: CubeScene::new(800, 600),
        renders: 0,
    };

    render_loop.frame(123_456.0, &mut target).unwrap();
    assert_eq!(*target.scene.spin(), Spin::new());
    assert_eq!(target.renders, 1);
}

#[test]
fn a_clock_going_backwards_is_fatal() {
    let mut render_loop = running_loop();
    let mut target = CountingCube {
        scene: CubeScene::new(800, 600),
        renders: 0,
    };

    render_loop.frame(50.0, &mut target).unwrap();
    let err = render_loop.frame(40.0, &mut target).unwrap_err();

    assert!(matches!(err, TurntableError::InvariantViolation { .. }));
    assert_eq!(target.renders, 1);
    assert_eq!(*target.scene.spin(), Spin::new());
}

#[test]
fn an_unavailable_platform_degrades_the_loop() {
    let mut render_loop = RenderLoop::new();
    render_loop.start(Capability::Unavailable("no adapter".to_string()));

    let mut target = CountingCube {
        scene: CubeScene::new(800, 600),
        renders: 0,
    };
    assert!(matches!(
        render_loop.frame(0.0, &mut target),
        Err(TurntableError::LoopNotRunning)
    ));
    assert_eq!(render_loop.state(), &LoopState::Degraded("no adapter".to_string()));
}

#[test]
fn a_nan_timestamp_leaves_the_cube_intact() {
    let mut render_loop = running_loop();
    let mut target = CountingCube {
        scene: CubeScene::new(800, 600),
        renders: 0,
    };

    render_loop.frame(0.0, &mut target).unwrap();
    render_loop.frame(f64::NAN, &mut target).unwrap();
    render_loop.frame(2500.0, &mut target).unwrap();

    let spin = target.scene.spin();
    assert_relative_eq!(spin.x(), PI / 2.0, epsilon = 1.0e-12);
    let rotation = target.scene.cube().rotation();
    assert!(rotation.x.is_finite() && rotation.y.is_finite());
    assert_relative_eq!(rotation.x, std::f32::consts::FRAC_PI_2, epsilon = 1.0e-6);
    assert_eq!(target.renders, 3);
}
