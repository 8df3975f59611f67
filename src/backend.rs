//! Seam between the event loop and the windowing system.

use std::time::{Duration, Instant};

use crate::compositor::Frame;
use crate::error::Result;
use crate::geometry::Size;
use crate::input::InputEvent;

/// Window, input and timing services the event loop runs against.
pub trait Backend {
    /// Current drawable size of the window.
    fn window_size(&self) -> Size;

    /// Next pending event without blocking; `None` once the queue is drained.
    fn poll_event(&mut self) -> Option<InputEvent>;

    /// Blits a frame to the window.
    fn present(&mut self, frame: &Frame) -> Result<()>;

    /// Asks the windowing system for a new drawable size. The change arrives
    /// later as [`InputEvent::Resized`].
    fn request_resize(&mut self, size: Size);

    fn now(&self) -> Instant;

    fn sleep(&mut self, duration: Duration);
}
