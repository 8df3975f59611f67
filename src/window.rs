//! winit + softbuffer implementation of [`Backend`].
//!
//! The event loop runs in pump mode: each frame pumps pending OS events once
//! with a zero timeout, so the viewer keeps control of pacing and drawing.

use std::collections::VecDeque;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};

use softbuffer::{Context as SoftContext, Surface};
use tracing::{debug, error, info};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowId};

use crate::backend::Backend;
use crate::compositor::Frame;
use crate::error::{Error, Result};
use crate::geometry::{Size, shrink_to_fit};
use crate::input::{InputEvent, KeySymbol, WheelDirection};

type WindowHandle = Arc<Window>;

/// Pumps allowed for the platform to deliver `resumed` at startup.
const STARTUP_PUMPS: usize = 16;

pub struct WinitBackend {
    // Fields drop in declaration order: the surface and window go before the event loop.
    app: ViewerWindow,
    event_loop: EventLoop<()>,
    pumped: bool,
}

impl WinitBackend {
    /// Creates the window sized to `image_size` (shrunk to the monitor, or to
    /// `fallback` when no monitor is reported) and its pixel surface.
    ///
    /// A creation failure is logged here; callers only need to exit.
    pub fn open(title: &str, image_size: Size, fallback: Size) -> Result<Self> {
        let mut event_loop = EventLoop::new()?;
        let mut app = ViewerWindow::new(title, image_size, fallback);

        for _ in 0..STARTUP_PUMPS {
            let status = event_loop.pump_app_events(Some(Duration::ZERO), &mut app);
            if app.window.is_some() || app.failure.is_some() {
                break;
            }
            if let PumpStatus::Exit(code) = status {
                app.failure = Some(format!("event loop exited during startup with code {code}"));
                break;
            }
        }

        if let Some(reason) = app.failure.take() {
            error!(%reason, "failed to create viewer window");
            return Err(Error::Window(reason));
        }
        if app.window.is_none() {
            let reason = "windowing system never resumed the application".to_string();
            error!(%reason, "failed to create viewer window");
            return Err(Error::Window(reason));
        }

        Ok(Self {
            app,
            event_loop,
            pumped: false,
        })
    }

    fn pump(&mut self) {
        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.app);
        if let PumpStatus::Exit(code) = status {
            debug!(code, "event loop exited");
            self.app.pending.push_back(InputEvent::Quit);
        }
    }
}

impl Backend for WinitBackend {
    fn window_size(&self) -> Size {
        self.app
            .window
            .as_ref()
            .map(|window| {
                let size = window.inner_size();
                Size::new(size.width, size.height)
            })
            .unwrap_or(self.app.initial_size)
            .non_empty()
    }

    fn poll_event(&mut self) -> Option<InputEvent> {
        // One OS pump per drain so a flood of motion events cannot stall the frame.
        if self.app.pending.is_empty() && !self.pumped {
            self.pump();
            self.pumped = true;
        }
        let next = self.app.pending.pop_front();
        if next.is_none() {
            self.pumped = false;
        }
        next
    }

    fn present(&mut self, frame: &Frame) -> Result<()> {
        let Some(surface) = self.app.surface.as_mut() else {
            return Ok(());
        };
        let (Some(width), Some(height)) =
            (NonZeroU32::new(frame.width()), NonZeroU32::new(frame.height()))
        else {
            return Ok(());
        };
        surface
            .resize(width, height)
            .map_err(|err| Error::Present(err.to_string()))?;
        let mut buffer = surface
            .buffer_mut()
            .map_err(|err| Error::Present(err.to_string()))?;
        let len = buffer.len().min(frame.pixels().len());
        buffer[..len].copy_from_slice(&frame.pixels()[..len]);
        buffer
            .present()
            .map_err(|err| Error::Present(err.to_string()))
    }

    fn request_resize(&mut self, size: Size) {
        let Some(window) = self.app.window.as_ref() else {
            return;
        };
        // Some platforms apply the size synchronously and may not report it back.
        if let Some(applied) = window.request_inner_size(PhysicalSize::new(size.width, size.height)) {
            self.app
                .pending
                .push_back(InputEvent::Resized(Size::new(applied.width, applied.height)));
        }
    }

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

struct ViewerWindow {
    title: String,
    image_size: Size,
    fallback: Size,
    initial_size: Size,
    surface: Option<Surface<WindowHandle, WindowHandle>>,
    context: Option<SoftContext<WindowHandle>>,
    window: Option<WindowHandle>,
    pending: VecDeque<InputEvent>,
    failure: Option<String>,
}

impl ViewerWindow {
    fn new(title: &str, image_size: Size, fallback: Size) -> Self {
        Self {
            title: title.to_string(),
            image_size,
            fallback,
            initial_size: shrink_to_fit(image_size, fallback),
            surface: None,
            context: None,
            window: None,
            pending: VecDeque::new(),
            failure: None,
        }
    }

    fn ensure_window(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.failure.is_some() {
            return;
        }

        let bounds = event_loop
            .primary_monitor()
            .map(|monitor| {
                let size = monitor.size();
                Size::new(size.width, size.height)
            })
            .filter(|size| size.width > 0 && size.height > 0)
            .unwrap_or(self.fallback);
        self.initial_size = shrink_to_fit(self.image_size, bounds);

        let attrs = Window::default_attributes()
            .with_title(self.title.as_str())
            .with_inner_size(PhysicalSize::new(
                self.initial_size.width,
                self.initial_size.height,
            ))
            .with_resizable(true);
        let window = match event_loop.create_window(attrs) {
            Ok(window) => WindowHandle::new(window),
            Err(err) => {
                self.failure = Some(err.to_string());
                return;
            }
        };
        let context = match SoftContext::new(window.clone()) {
            Ok(context) => context,
            Err(err) => {
                self.failure = Some(format!("softbuffer context: {err}"));
                return;
            }
        };
        let surface = match Surface::new(&context, window.clone()) {
            Ok(surface) => surface,
            Err(err) => {
                self.failure = Some(format!("softbuffer surface: {err}"));
                return;
            }
        };

        info!(
            title = %self.title,
            image = %self.image_size,
            window = %self.initial_size,
            "window opened"
        );
        self.surface = Some(surface);
        self.context = Some(context);
        self.window = Some(window);
    }

    fn push(&mut self, event: InputEvent) {
        self.pending.push_back(event);
    }
}

impl ApplicationHandler for ViewerWindow {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        self.ensure_window(event_loop);
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        if window.id() != window_id {
            return;
        }
        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => self.push(InputEvent::Quit),
            WindowEvent::Resized(size) => {
                self.push(InputEvent::Resized(Size::new(size.width, size.height)))
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let vertical = match delta {
                    MouseScrollDelta::LineDelta(_, y) => f64::from(y),
                    MouseScrollDelta::PixelDelta(position) => position.y,
                };
                if let Some(direction) = WheelDirection::from_delta(vertical) {
                    self.push(InputEvent::Wheel(direction));
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(key) = key_symbol(&event) {
                    self.push(InputEvent::KeyPressed(key));
                }
            }
            WindowEvent::CursorMoved { position, .. } => self.push(InputEvent::PointerMoved {
                x: position.x,
                y: position.y,
            }),
            _ => {}
        }
    }
}

fn key_symbol(event: &KeyEvent) -> Option<KeySymbol> {
    if event.state != ElementState::Pressed {
        return None;
    }
    match &event.logical_key {
        Key::Named(NamedKey::Escape) => Some(KeySymbol::Escape),
        Key::Character(text) => text
            .chars()
            .next()
            .map(|ch| KeySymbol::Char(ch.to_ascii_lowercase())),
        _ => None,
    }
}
