//! The winit window and the wgpu surface presented into it, on native and web
//! platforms.

use std::cell::RefCell;
use std::sync::mpsc::Sender;
use std::sync::Arc;

use crate::context::Context;
use crate::error::TurntableError;
use crate::event::{Action, Key, WindowEvent};
use crate::window::canvas::CanvasSetup;
#[cfg(not(target_arch = "wasm32"))]
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
#[cfg(not(target_arch = "wasm32"))]
use winit::event::WindowEvent as WinitWindowEvent;
#[cfg(not(target_arch = "wasm32"))]
use winit::event_loop::ActiveEventLoop;
use winit::event_loop::EventLoop;
#[cfg(not(target_arch = "wasm32"))]
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowAttributes};

#[cfg(target_arch = "wasm32")]
use std::rc::Rc;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;

// winit allows a single EventLoop per program and it is neither Send nor Sync.
#[cfg(not(target_arch = "wasm32"))]
thread_local! {
    static EVENT_LOOP: RefCell<Option<EventLoop<()>>> = const { RefCell::new(None) };
    static PENDING_EVENTS: RefCell<Vec<PendingEvent>> = const { RefCell::new(Vec::new()) };
}

/// What the event collector extracted from a winit event.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Clone, Copy)]
enum PendingEvent {
    WindowEvent(WindowEvent),
    Resize { width: u32, height: u32 },
}

/// A window (or a `<canvas>` element on the web) with a configured wgpu
/// surface.
pub struct WgpuCanvas {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    cursor_pos: Option<(f64, f64)>,
    visible: bool,
    out_events: Sender<WindowEvent>,
    #[cfg(target_arch = "wasm32")]
    pending_events: Rc<RefCell<Vec<WindowEvent>>>,
    #[cfg(target_arch = "wasm32")]
    _event_closures: Vec<wasm_bindgen::JsValue>,
}

fn unavailable(what: &str, e: impl std::fmt::Display) -> TurntableError {
    TurntableError::RenderingUnavailable(format!("{what}: {e}"))
}

impl WgpuCanvas {
    /// Opens the window, then sets up the wgpu context if no other window
    /// did.
    ///
    /// Fails with [`TurntableError::RenderingUnavailable`] when no adapter,
    /// device or surface can be obtained.
    pub async fn open(
        title: &str,
        setup: CanvasSetup,
        hidden: bool,
        out_events: Sender<WindowEvent>,
    ) -> Result<Self, TurntableError> {
        let window_attrs = WindowAttributes::default()
            .with_title(title)
            .with_inner_size(LogicalSize::new(setup.width as f64, setup.height as f64))
            .with_visible(!hidden);

        #[cfg(not(target_arch = "wasm32"))]
        let window = EVENT_LOOP.with(|cell| {
            let mut event_loop = cell.borrow_mut();
            if event_loop.is_none() {
                *event_loop =
                    Some(EventLoop::new().map_err(|e| TurntableError::Window(e.to_string()))?);
            }
            let Some(event_loop) = event_loop.as_ref() else {
                return Err(TurntableError::Window("no event loop".to_string()));
            };
            #[allow(deprecated)]
            event_loop
                .create_window(window_attrs)
                .map_err(|e| TurntableError::Window(e.to_string()))
        })?;

        #[cfg(target_arch = "wasm32")]
        let window = {
            use winit::platform::web::{WindowAttributesExtWebSys, WindowExtWebSys};

            let events = EventLoop::new().map_err(|e| TurntableError::Window(e.to_string()))?;
            let canvas = find_or_create_canvas()?;
            let window_attrs = window_attrs.with_canvas(Some(canvas));

            #[allow(deprecated)]
            let window = events
                .create_window(window_attrs)
                .map_err(|e| TurntableError::Window(e.to_string()))?;

            // winit overwrites the styles set before the window exists.
            if let Some(canvas) = window.canvas() {
                let style = canvas.style();
                let _ = style.set_property("display", "block");
                let _ = style.set_property("width", "100%");
                let _ = style.set_property("height", "100%");
                let _ = style.set_property("visibility", if hidden { "hidden" } else { "visible" });
            }

            window
        };

        let window = Arc::new(window);

        let (surface, surface_format) = if Context::is_initialized() {
            let ctxt = Context::get();
            let surface = ctxt
                .instance
                .create_surface(window.clone())
                .map_err(|e| unavailable("failed to create the surface", e))?;
            let format = preferred_format(&surface.get_capabilities(&ctxt.adapter))?;
            (surface, format)
        } else {
            let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
                backends: wgpu::Backends::all(),
                ..Default::default()
            });

            let surface = instance
                .create_surface(window.clone())
                .map_err(|e| unavailable("failed to create the surface", e))?;

            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::default(),
                    compatible_surface: Some(&surface),
                    force_fallback_adapter: false,
                })
                .await
                .map_err(|e| unavailable("no suitable graphics adapter", e))?;
            log::info!("using adapter {:?}", adapter.get_info().name);

            #[cfg(target_arch = "wasm32")]
            let limits = wgpu::Limits::downlevel_webgl2_defaults();
            #[cfg(not(target_arch = "wasm32"))]
            let limits = wgpu::Limits::default();

            let (device, queue) = adapter
                .request_device(&wgpu::DeviceDescriptor {
                    label: Some("turntable device"),
                    required_limits: limits,
                    ..Default::default()
                })
                .await
                .map_err(|e| unavailable("failed to create the device", e))?;

            // Non-sRGB surfaces look the same on native and WebGL2; the
            // output pass encodes the colors itself.
            let format = preferred_format(&surface.get_capabilities(&adapter))?;
            Context::init(instance, device, queue, adapter, format);

            (surface, format)
        };

        let ctxt = Context::get();
        let surface_caps = surface.get_capabilities(&ctxt.adapter);
        let size = window.inner_size();

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: if setup.vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&ctxt.device, &surface_config);
        log::info!(
            "opened a {}x{} {:?} surface",
            surface_config.width,
            surface_config.height,
            surface_format
        );

        #[cfg(target_arch = "wasm32")]
        let (pending_events, _event_closures) = install_web_listeners(&window);

        Ok(WgpuCanvas {
            window,
            surface,
            surface_config,
            cursor_pos: None,
            visible: !hidden,
            out_events,
            #[cfg(target_arch = "wasm32")]
            pending_events,
            #[cfg(target_arch = "wasm32")]
            _event_closures,
        })
    }

    /// Forwards the events received since the last call to the event
    /// channel. The surface follows the window size on its own.
    pub fn poll_events(&mut self) {
        #[cfg(not(target_arch = "wasm32"))]
        {
            use winit::platform::pump_events::EventLoopExtPumpEvents;

            struct EventCollector;

            impl ApplicationHandler for EventCollector {
                fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

                fn window_event(
                    &mut self,
                    _event_loop: &ActiveEventLoop,
                    _window_id: winit::window::WindowId,
                    event: WinitWindowEvent,
                ) {
                    let pending = match event {
                        WinitWindowEvent::CloseRequested => {
                            vec![PendingEvent::WindowEvent(WindowEvent::Close)]
                        }
                        WinitWindowEvent::Resized(size) if size.width > 0 && size.height > 0 => {
                            vec![
                                PendingEvent::Resize {
                                    width: size.width,
                                    height: size.height,
                                },
                                PendingEvent::WindowEvent(WindowEvent::FramebufferSize(
                                    size.width,
                                    size.height,
                                )),
                            ]
                        }
                        WinitWindowEvent::CursorMoved { position, .. } => {
                            vec![PendingEvent::WindowEvent(WindowEvent::CursorPos(
                                position.x, position.y,
                            ))]
                        }
                        WinitWindowEvent::KeyboardInput { event, .. } => {
                            vec![PendingEvent::WindowEvent(WindowEvent::Key(
                                translate_key(event.physical_key),
                                translate_action(event.state),
                            ))]
                        }
                        _ => vec![],
                    };

                    if !pending.is_empty() {
                        PENDING_EVENTS.with(|storage| storage.borrow_mut().extend(pending));
                    }
                }
            }

            let timeout = Some(std::time::Duration::ZERO);
            EVENT_LOOP.with(|cell| {
                if let Some(ref mut event_loop) = *cell.borrow_mut() {
                    let status = event_loop.pump_app_events(timeout, &mut EventCollector);
                    if let Some(event) = pump_status_event(&status) {
                        log::info!("the event loop exited, closing the window");
                        PENDING_EVENTS.with(|storage| storage.borrow_mut().push(event));
                    }
                }
            });

            let events = PENDING_EVENTS.with(|storage| std::mem::take(&mut *storage.borrow_mut()));
            for event in events {
                match event {
                    PendingEvent::WindowEvent(event) => self.forward(event),
                    PendingEvent::Resize { width, height } => {
                        self.resize_surface(width, height);
                    }
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            // The browser has no resize event for the canvas itself.
            let size = self.window.inner_size();
            if size.width > 0 && size.height > 0 && self.resize_surface(size.width, size.height) {
                self.forward(WindowEvent::FramebufferSize(size.width, size.height));
            }

            let events: Vec<WindowEvent> = self.pending_events.borrow_mut().drain(..).collect();
            for event in events {
                self.forward(event);
            }
        }
    }

    fn forward(&mut self, event: WindowEvent) {
        if let WindowEvent::CursorPos(x, y) = event {
            self.cursor_pos = Some((x, y));
        }
        let _ = self.out_events.send(event);
    }

    /// Reconfigures the surface for a new size.
    ///
    /// Returns `false`, doing nothing, when the surface already has that size.
    pub fn resize_surface(&mut self, width: u32, height: u32) -> bool {
        let (width, height) = (width.max(1), height.max(1));
        if (width, height) == (self.surface_config.width, self.surface_config.height) {
            return false;
        }

        log::debug!("resizing the surface to {width}x{height}");
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface
            .configure(&Context::get().device, &self.surface_config);
        true
    }

    /// The next texture to draw into, or `None` if this frame must be
    /// skipped.
    pub fn acquire_frame(&mut self) -> Option<wgpu::SurfaceTexture> {
        match self.surface.get_current_texture() {
            Ok(frame) => Some(frame),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost or outdated, reconfiguring");
                self.surface
                    .configure(&Context::get().device, &self.surface_config);
                None
            }
            Err(e) => {
                log::warn!("failed to acquire the surface texture: {e}");
                None
            }
        }
    }

    /// Presents a texture returned by [`acquire_frame`](Self::acquire_frame).
    pub fn present(&self, frame: wgpu::SurfaceTexture) {
        self.window.pre_present_notify();
        frame.present();
    }

    #[inline]
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_config.format
    }

    /// The size of the surface, in physical pixels.
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    /// The last known cursor position, if the cursor ever moved over the
    /// window.
    #[inline]
    pub fn cursor_pos(&self) -> Option<(f64, f64)> {
        self.cursor_pos
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        if self.visible == visible {
            return;
        }
        self.visible = visible;

        #[cfg(not(target_arch = "wasm32"))]
        self.window.set_visible(visible);

        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::WindowExtWebSys;
            if let Some(canvas) = self.window.canvas() {
                let _ = canvas
                    .style()
                    .set_property("visibility", if visible { "visible" } else { "hidden" });
            }
        }
    }
}

fn preferred_format(caps: &wgpu::SurfaceCapabilities) -> Result<wgpu::TextureFormat, TurntableError> {
    caps.formats
        .iter()
        .find(|f| !f.is_srgb())
        .or_else(|| caps.formats.first())
        .copied()
        .ok_or_else(|| {
            TurntableError::RenderingUnavailable("the surface supports no format".to_string())
        })
}

/// The event a finished event loop turns into: once it exited, the window
/// is gone.
#[cfg(not(target_arch = "wasm32"))]
fn pump_status_event(
    status: &winit::platform::pump_events::PumpStatus,
) -> Option<PendingEvent> {
    match status {
        winit::platform::pump_events::PumpStatus::Exit(_) => {
            Some(PendingEvent::WindowEvent(WindowEvent::Close))
        }
        winit::platform::pump_events::PumpStatus::Continue => None,
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn translate_action(action: winit::event::ElementState) -> Action {
    match action {
        winit::event::ElementState::Pressed => Action::Press,
        winit::event::ElementState::Released => Action::Release,
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn translate_key(physical_key: PhysicalKey) -> Key {
    match physical_key {
        PhysicalKey::Code(KeyCode::Escape) => Key::Escape,
        _ => Key::Unknown,
    }
}

#[cfg(target_arch = "wasm32")]
fn translate_web_key(code: &str) -> Key {
    match code {
        "Escape" => Key::Escape,
        _ => Key::Unknown,
    }
}

/// The `<canvas id="canvas">` of the page, created and appended to the body
/// when missing. The page is styled to let it fill the viewport.
#[cfg(target_arch = "wasm32")]
fn find_or_create_canvas() -> Result<web_sys::HtmlCanvasElement, TurntableError> {
    let no_document = || TurntableError::Window("no browser document".to_string());
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(no_document)?;

    let canvas = match document
        .get_element_by_id("canvas")
        .and_then(|elem| elem.dyn_into::<web_sys::HtmlCanvasElement>().ok())
    {
        Some(canvas) => canvas,
        None => {
            let canvas = document
                .create_element("canvas")
                .ok()
                .and_then(|elem| elem.dyn_into::<web_sys::HtmlCanvasElement>().ok())
                .ok_or_else(|| TurntableError::Window("failed to create a canvas".to_string()))?;
            canvas.set_id("canvas");
            if let Some(body) = document.body() {
                let _ = body.append_child(&canvas);
            }
            canvas
        }
    };

    let fill = |style: web_sys::CssStyleDeclaration| {
        let _ = style.set_property("margin", "0");
        let _ = style.set_property("padding", "0");
        let _ = style.set_property("width", "100%");
        let _ = style.set_property("height", "100%");
        let _ = style.set_property("overflow", "hidden");
    };
    if let Some(html) = document
        .document_element()
        .and_then(|e| e.dyn_into::<web_sys::HtmlElement>().ok())
    {
        fill(html.style());
    }
    if let Some(body) = document.body() {
        fill(body.style());
    }

    Ok(canvas)
}

/// Pointer moves on the canvas and Escape on the page.
#[cfg(target_arch = "wasm32")]
fn install_web_listeners(
    window: &Window,
) -> (Rc<RefCell<Vec<WindowEvent>>>, Vec<wasm_bindgen::JsValue>) {
    use winit::platform::web::WindowExtWebSys;

    let pending_events = Rc::new(RefCell::new(Vec::new()));
    let mut closures = Vec::new();

    if let Some(canvas) = window.canvas() {
        let pending = pending_events.clone();
        let target = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::PointerEvent| {
            // Client coordinates to canvas pixels, through the CSS scaling.
            let rect = target.get_bounding_client_rect();
            let scale_x = target.width() as f64 / rect.width();
            let scale_y = target.height() as f64 / rect.height();
            let x = (event.client_x() as f64 - rect.left()) * scale_x;
            let y = (event.client_y() as f64 - rect.top()) * scale_y;
            pending.borrow_mut().push(WindowEvent::CursorPos(x, y));
        });
        let _ = canvas
            .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
        closures.push(closure.into_js_value());
    }

    if let Some(web_window) = web_sys::window() {
        let pending = pending_events.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            pending
                .borrow_mut()
                .push(WindowEvent::Key(translate_web_key(&event.code()), Action::Release));
        });
        let _ =
            web_window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
        closures.push(closure.into_js_value());
    }

    (pending_events, closures)
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use winit::platform::pump_events::PumpStatus;

    #[test]
    fn an_exited_event_loop_closes_the_window() {
        assert!(matches!(
            pump_status_event(&PumpStatus::Exit(0)),
            Some(PendingEvent::WindowEvent(WindowEvent::Close))
        ));
        assert!(pump_status_event(&PumpStatus::Continue).is_none());
    }

    #[test]
    fn escape_is_the_only_known_key() {
        assert_eq!(translate_key(PhysicalKey::Code(KeyCode::Escape)), Key::Escape);
        assert_eq!(translate_key(PhysicalKey::Code(KeyCode::KeyA)), Key::Unknown);
    }
}
