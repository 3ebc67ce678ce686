use turntable::prelude::*;

fn main() -> Result<(), TurntableError> {
    env_logger::init();
    turntable::launch(run_showcase(
        "turntable: cube",
        CanvasSetup::default(),
        CubeScene::new,
    ))
}
