//! The window, frame pacing and events.

mod canvas;
mod fallback;
mod wgpu_canvas;
mod window;

pub use canvas::{CanvasSetup, Reveal};
pub use fallback::show_fallback_message;
pub use wgpu_canvas::WgpuCanvas;
pub use window::{FrameTick, SurfaceFrame, Window};
