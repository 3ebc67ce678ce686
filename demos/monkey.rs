use turntable::prelude::*;

fn main() -> Result<(), TurntableError> {
    env_logger::init();
    let assets = MonkeyAssets::from_env();

    turntable::launch(run_showcase(
        "turntable: monkey",
        CanvasSetup::default(),
        move |width, height| MonkeyScene::new(width, height, &assets),
    ))
}
