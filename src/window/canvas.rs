use crate::window::Window;

/// Window options.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CanvasSetup {
    /// Initial width, in logical pixels.
    pub width: u32,
    /// Initial height, in logical pixels.
    pub height: u32,
    /// Is vsync enabled?
    pub vsync: bool,
}

impl Default for CanvasSetup {
    fn default() -> Self {
        CanvasSetup {
            width: Window::DEFAULT_WIDTH,
            height: Window::DEFAULT_HEIGHT,
            vsync: true,
        }
    }
}

impl CanvasSetup {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }
}

/// Something initially hidden that is shown once its content is ready.
pub trait Reveal {
    /// Makes it visible. Calling it again has no effect.
    fn reveal(&mut self);

    fn is_revealed(&self) -> bool;
}
