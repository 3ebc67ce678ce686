//! The window the showcases render into.

use std::sync::mpsc::{self, Receiver};

use web_time::Instant;

use crate::controls::Resizable;
use crate::error::TurntableError;
use crate::event::WindowEvent;
use crate::window::canvas::{CanvasSetup, Reveal};
use crate::window::WgpuCanvas;

/// One display refresh.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTick {
    /// Milliseconds since the window opened. Never decreases.
    pub now_ms: f64,
}

/// A texture of the window surface, acquired for one frame.
pub struct SurfaceFrame {
    texture: wgpu::SurfaceTexture,
    /// The view to render into.
    pub view: wgpu::TextureView,
    /// The format of `view`.
    pub format: wgpu::TextureFormat,
}

/// An on-screen window (a `<canvas>` on the web) with its event queue and
/// frame pacing.
pub struct Window {
    canvas: WgpuCanvas,
    events: Receiver<WindowEvent>,
    start: Instant,
    should_close: bool,
}

impl Window {
    pub const DEFAULT_WIDTH: u32 = 800;
    pub const DEFAULT_HEIGHT: u32 = 600;

    /// Opens a window and sets up rendering.
    ///
    /// A `hidden` window is created invisible and shown by [`show`](Self::show).
    /// Fails with [`TurntableError::RenderingUnavailable`] if the platform
    /// cannot render.
    pub async fn open(title: &str, setup: CanvasSetup, hidden: bool) -> Result<Window, TurntableError> {
        let (event_send, event_receive) = mpsc::channel();
        let canvas = WgpuCanvas::open(title, setup, hidden, event_send).await?;

        Ok(Window {
            canvas,
            events: event_receive,
            start: Instant::now(),
            should_close: false,
        })
    }

    /// Waits for the next display refresh and collects the pending events.
    ///
    /// Returns `None` once the window should close.
    pub async fn next_frame(&mut self) -> Option<FrameTick> {
        #[cfg(target_arch = "wasm32")]
        wait_animation_frame().await;

        self.canvas.poll_events();

        if self.should_close {
            return None;
        }

        Some(FrameTick {
            now_ms: self.start.elapsed().as_secs_f64() * 1000.0,
        })
    }

    /// Drains the events received by the last [`next_frame`](Self::next_frame).
    ///
    /// A close request also marks the window as closing.
    pub fn events(&mut self) -> Vec<WindowEvent> {
        let events: Vec<WindowEvent> = self.events.try_iter().collect();
        if events.iter().any(WindowEvent::is_close_request) {
            self.close();
        }
        events
    }

    /// The surface texture to draw this frame into, or `None` if the frame
    /// must be skipped.
    pub fn acquire_frame(&mut self) -> Option<SurfaceFrame> {
        let texture = self.canvas.acquire_frame()?;
        let view = texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        Some(SurfaceFrame {
            texture,
            view,
            format: self.canvas.surface_format(),
        })
    }

    /// Shows a frame returned by [`acquire_frame`](Self::acquire_frame).
    pub fn present(&self, frame: SurfaceFrame) {
        self.canvas.present(frame.texture);
    }

    #[inline]
    pub fn should_close(&self) -> bool {
        self.should_close
    }

    /// Makes the next [`next_frame`](Self::next_frame) return `None`.
    pub fn close(&mut self) {
        self.should_close = true;
    }

    /// The surface width, in physical pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.canvas.size().0
    }

    /// The surface height, in physical pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.canvas.size().1
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        self.canvas.size()
    }

    #[inline]
    pub fn cursor_pos(&self) -> Option<(f64, f64)> {
        self.canvas.cursor_pos()
    }

    #[inline]
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.canvas.surface_format()
    }

    pub fn show(&mut self) {
        self.canvas.set_visible(true)
    }

    pub fn hide(&mut self) {
        self.canvas.set_visible(false)
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.canvas.is_visible()
    }
}

impl Resizable for Window {
    fn resize(&mut self, width: u32, height: u32) {
        self.canvas.resize_surface(width, height);
    }
}

impl Reveal for Window {
    fn reveal(&mut self) {
        if !self.is_visible() {
            log::info!("showing the canvas");
            self.show();
        }
    }

    fn is_revealed(&self) -> bool {
        self.is_visible()
    }
}

#[cfg(target_arch = "wasm32")]
async fn wait_animation_frame() {
    use wasm_bindgen::JsCast;
    use web_sys::wasm_bindgen::closure::Closure;

    let Some(window) = web_sys::window() else {
        return;
    };

    let (s, r) = oneshot::channel();
    let closure = Closure::once(move || {
        let _ = s.send(());
    });

    if window
        .request_animation_frame(closure.as_ref().unchecked_ref())
        .is_ok()
    {
        let _ = r.await;
    }
}
