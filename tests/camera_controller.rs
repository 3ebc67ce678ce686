use approx::assert_relative_eq;
use turntable::prelude::*;

fn camera() -> PerspectiveCamera3d {
    default_camera(800, 600)
}

#[test]
fn the_viewport_center_faces_the_origin_head_on() {
    let mut camera = camera();
    // Y is normalized by the width too: the center row of a 800 wide
    // viewport is y = 400.
    assert!(CursorOrbit::new().cursor_moved(400.0, 400.0, 800, &mut camera));

    assert_relative_eq!(camera.position().x, 0.0);
    assert_relative_eq!(camera.position().y, 0.0);
    assert_relative_eq!(camera.position().z, 5.0);
    assert_relative_eq!(camera.forward().z, -1.0, epsilon = 1.0e-6);
}

#[test]
fn the_top_left_corner_moves_up_and_left() {
    let mut camera = camera();
    CursorOrbit::new().cursor_moved(0.0, 0.0, 800, &mut camera);

    assert_relative_eq!(camera.position().x, -1.0);
    assert_relative_eq!(camera.position().y, 1.0);
}

#[test]
fn cursor_moves_reach_the_showcase_camera() {
    let mut scene = CubeScene::new(1024, 768);
    scene.cursor_moved(1024.0, 512.0, 1024);
    assert_relative_eq!(scene.camera().position().x, 1.0);
    assert_relative_eq!(scene.camera().position().y, 0.0);

    // Off-window positions are dropped.
    scene.cursor_moved(-5.0, 10.0, 1024);
    assert_relative_eq!(scene.camera().position().x, 1.0);
}
