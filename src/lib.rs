//! Minimal desktop image viewer: one image, stepped power-of-two zoom around
//! the pointer, panning by pointer motion and cyclic flipping.

pub mod backend;
pub mod compositor;
pub mod config;
pub mod error;
pub mod event_loop;
pub mod geometry;
pub mod image_source;
pub mod input;
pub mod title;
pub mod viewport;
pub mod window;

use std::path::Path;

use tracing::info;

pub use backend::Backend;
pub use compositor::{Compositor, Frame};
pub use config::ViewerConfig;
pub use error::{Error, Result};
pub use geometry::{FlipMode, Rect, Size, ZoomFactor};
pub use image_source::ImageBuffer;
pub use input::{Action, InputEvent, KeySymbol, WheelDirection};
pub use viewport::Viewport;
pub use window::WinitBackend;

/// Loads `path`, opens a window for it and runs until the user quits.
///
/// # Errors
/// Returns an error if the image cannot be decoded or the window cannot be created.
pub fn run(path: &Path, config: &ViewerConfig) -> Result<()> {
    let image = image_source::load(path)?;
    let title = title::window_title(path, config.title_budget);
    let mut backend = WinitBackend::open(&title, image.size(), config.fallback_window)?;
    let mut viewport = Viewport::new(image, backend.window_size());
    let result = event_loop::run(&mut backend, &mut viewport, config);
    info!("viewer closed");
    result
}
