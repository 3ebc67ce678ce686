//! Input handlers: cursor-driven camera placement and window resizes.

pub use self::cursor_orbit::CursorOrbit;
pub use self::resize::{ResizeHandler, Resizable};

mod cursor_orbit;
mod resize;
