//! Camera trait and the perspective camera the showcases use.

pub use self::camera3d::Camera3d;
pub use self::perspective3d::PerspectiveCamera3d;

mod camera3d;
mod perspective3d;
