//! Error type shared by the library modules.

use std::path::PathBuf;

use thiserror::Error;

/// Library error type for the viewer.
#[derive(Debug, Error)]
pub enum Error {
    /// The image file could not be opened or sniffed.
    #[error("failed to open image file '{}' ({source})", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The decoder rejected the image file.
    #[error("failed to load image file '{}' ({source})", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The windowing event loop could not be created or pumped.
    #[error(transparent)]
    EventLoop(#[from] winit::error::EventLoopError),

    /// The window or its pixel surface could not be created.
    #[error("failed to create viewer window: {0}")]
    Window(String),

    /// The pixel surface rejected a frame.
    #[error("failed to present frame: {0}")]
    Present(String),

    /// The scaler rejected the crop or destination geometry.
    #[error("image scaling failed: {0}")]
    Resize(#[from] fast_image_resize::ResizeError),

    /// A pixel buffer did not match its declared dimensions.
    #[error("invalid pixel buffer: {0}")]
    ResizeBuffer(#[from] fast_image_resize::ImageBufferError),
}

pub type Result<T> = std::result::Result<T, Error>;
