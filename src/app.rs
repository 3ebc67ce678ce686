//! The frame driver shared by the showcases.

use std::future::Future;

use crate::animation::{Capability, FrameTarget, LoopState, RenderLoop};
use crate::error::TurntableError;
use crate::event::WindowEvent;
use crate::scenes::Showcase;
use crate::window::{self, CanvasSetup, Window};

/// Renders a showcase in `window` when the render loop asks for a frame.
struct Presenter<'a, S> {
    showcase: &'a mut S,
    window: &'a mut Window,
}

impl<S: Showcase> FrameTarget for Presenter<'_, S> {
    fn time_passed(&mut self, diff_ms: f64) -> Result<(), TurntableError> {
        self.showcase.time_passed(diff_ms)
    }

    fn render_frame(&mut self) {
        let Some(frame) = self.window.acquire_frame() else {
            return;
        };
        self.showcase.render(&frame.view, frame.format);
        self.window.present(frame);
    }
}

/// Opens a window, builds the showcase for its size with `build`, then
/// renders it once per display refresh until the window closes.
///
/// Events are handled between frames: cursor moves, resizes and finished
/// asset loads. When the platform cannot render, a fallback message is shown
/// and `Ok(())` is returned. A negative elapsed time between two frames
/// aborts the loop with [`TurntableError::InvariantViolation`].
pub async fn run_showcase<S, F>(title: &str, setup: CanvasSetup, build: F) -> Result<(), TurntableError>
where
    S: Showcase,
    F: FnOnce(u32, u32) -> S,
{
    let opened = Window::open(title, setup, S::STARTS_HIDDEN).await;

    let mut render_loop = RenderLoop::new();
    if let LoopState::Degraded(reason) = render_loop.start(Capability::from(&opened)) {
        window::show_fallback_message(reason);
        return Ok(());
    }
    let mut window = opened?;

    let (width, height) = window.size();
    let mut showcase = build(width, height);

    while let Some(tick) = window.next_frame().await {
        for event in window.events() {
            match event {
                WindowEvent::CursorPos(x, y) => showcase.cursor_moved(x, y, window.width()),
                WindowEvent::FramebufferSize(w, h) => showcase.resized(w, h, &mut window),
                _ => {}
            }
        }
        if window.should_close() {
            break;
        }

        showcase.poll_assets(&mut window);

        let mut presenter = Presenter {
            showcase: &mut showcase,
            window: &mut window,
        };
        render_loop.frame(tick.now_ms, &mut presenter)?;
    }

    log::info!("window closed after {} frames", render_loop.frames());
    Ok(())
}

/// Runs `future` to completion.
///
/// On native targets this blocks and returns the outcome. On the web the
/// future is handed to the browser event loop, errors are logged, and this
/// returns immediately.
pub fn launch<F>(future: F) -> Result<(), TurntableError>
where
    F: Future<Output = Result<(), TurntableError>> + 'static,
{
    #[cfg(not(target_arch = "wasm32"))]
    {
        pollster::block_on(future)
    }

    #[cfg(target_arch = "wasm32")]
    {
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = future.await {
                log::error!("{e}");
            }
        });
        Ok(())
    }
}
