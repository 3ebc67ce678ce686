/*!
# turntable

Two small showcase scenes rendered with wgpu, and the compact rendering layer
they are built on.

* **cube**: a green cube spinning over a blue floor, lit by a shadow casting
  directional light.
* **monkey**: a glass monkey head spinning in front of a skybox, with bloom.
  The window appears once the model and the skybox finished loading.

In both, moving the mouse slides the camera on a plane in front of the scene
while it keeps looking at the origin.

```no_run
use turntable::prelude::*;

fn main() -> Result<(), TurntableError> {
    turntable::launch(run_showcase(
        "turntable: cube",
        CanvasSetup::default(),
        CubeScene::new,
    ))
}
```

The same code runs natively and in the browser: on native targets
[`launch`] blocks on the showcase with `pollster`, on the web it hands it to
the browser event loop and frames are paced by `requestAnimationFrame`.

GPU resources (meshes, textures, pipelines, render targets) are created the
first time they are drawn, so scenes can be assembled and inspected without
a device.
*/
#![allow(clippy::module_inception)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]

#[cfg(feature = "serde")]
extern crate serde;

pub use glamx;

pub use crate::app::{launch, run_showcase};
pub use crate::error::{LoadError, TurntableError};

pub mod animation;
pub mod app;
pub mod builtin;
pub mod camera;
pub mod color;
pub mod context;
pub mod controls;
pub mod error;
pub mod event;
pub mod light;
pub mod loader;
pub mod post_processing;
pub mod procedural;
pub mod resource;
pub mod scene;
pub mod scenes;
pub mod window;

pub mod prelude {
    pub use crate::animation::*;
    pub use crate::app::{launch, run_showcase};
    pub use crate::camera::*;
    pub use crate::color::{self, Color};
    pub use crate::controls::*;
    pub use crate::error::{LoadError, TurntableError};
    pub use crate::event::*;
    pub use crate::light::*;
    pub use crate::loader::*;
    pub use crate::post_processing::*;
    pub use crate::resource::{CubeTexture, Material3d, Shading, Side};
    pub use crate::scene::*;
    pub use crate::scenes::*;
    pub use crate::window::*;
    pub use glamx::{Mat4, Quat, Vec2, Vec3};
    pub use std::cell::RefCell;
    pub use std::rc::Rc;
}
