//! Frame timing and the rotation of the showcased mesh.

pub use self::clock::FrameClock;
pub use self::render_loop::{Capability, FrameTarget, LoopState, RenderLoop};
pub use self::spin::{check_elapsed, Spin, ANGULAR_SPEED};

mod clock;
mod render_loop;
mod spin;
