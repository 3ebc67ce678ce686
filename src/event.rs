//! Window events.

/// The state of a key.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Action {
    /// The key was released.
    Release,
    /// The key was pressed.
    Press,
}

/// The keys the showcases react to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Key {
    Escape,
    Unknown,
}

/// An event delivered by the window between two frames.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WindowEvent {
    /// The user asked to close the window.
    Close,
    /// The drawable area changed size, in physical pixels.
    FramebufferSize(u32, u32),
    /// The cursor moved to this position, in physical pixels relative to the
    /// top-left corner of the drawable area.
    CursorPos(f64, f64),
    /// A key changed state.
    Key(Key, Action),
}

impl WindowEvent {
    /// Whether this event asks for the window to close.
    pub fn is_close_request(&self) -> bool {
        matches!(
            self,
            WindowEvent::Close | WindowEvent::Key(Key::Escape, Action::Release)
        )
    }
}
