//! Pan/zoom/flip state of the displayed image.
//!
//! The window always represents the whole image: a pointer position is read
//! as a fraction of the window and mapped into the area that was visible
//! before the update. Zooming is therefore defined one power-of-two step at a
//! time, and [`Viewport::pan`] replays every step from `1x` so that a pointer
//! position always lands on the same part of the image at a given zoom.

use tracing::debug;

use crate::compositor::{Compositor, Frame};
use crate::error::Result;
use crate::geometry::{FlipMode, Rect, Size, ZoomFactor, fit_within};
use crate::image_source::ImageBuffer;

#[derive(Debug)]
pub struct Viewport {
    image: ImageBuffer,
    window: Size,
    zoom: ZoomFactor,
    zoomed_area: Rect,
    flip: FlipMode,
}

impl Viewport {
    /// Takes ownership of the decoded image. Starts unzoomed and unflipped.
    pub fn new(image: ImageBuffer, window: Size) -> Self {
        let zoomed_area = Rect::full(image.size());
        Self {
            image,
            window: window.non_empty(),
            zoom: ZoomFactor::ONE,
            zoomed_area,
            flip: FlipMode::None,
        }
    }

    pub fn image(&self) -> &ImageBuffer {
        &self.image
    }

    pub fn window_size(&self) -> Size {
        self.window
    }

    pub fn zoom(&self) -> ZoomFactor {
        self.zoom
    }

    pub fn zoomed_area(&self) -> Rect {
        self.zoomed_area
    }

    pub fn flip_mode(&self) -> FlipMode {
        self.flip
    }

    /// New drawable size. Zoom geometry is relative to the old size, so it is dropped.
    pub fn set_dimensions(&mut self, size: Size) {
        self.window = size.non_empty();
        self.reset_zoom();
        debug!(window = %self.window, "viewport resized");
    }

    /// One zoom step centred on the pointer at `(focus_x, focus_y)` in window pixels.
    ///
    /// The pointer is interpreted against the area visible *before* this call,
    /// so callers jumping several levels must go through every intermediate
    /// factor (see [`Viewport::pan`]).
    pub fn set_zoomed_area(&mut self, focus_x: f64, focus_y: f64, zoom: ZoomFactor) {
        let image = self.image.size();
        let sub_w = (image.width / zoom.get()).max(1);
        let sub_h = (image.height / zoom.get()).max(1);

        let (rel_x, rel_y) = self.relative_focus(focus_x, focus_y);
        let area = self.zoomed_area;
        let centre_x = f64::from(area.x) + rel_x * f64::from(area.width);
        let centre_y = f64::from(area.y) + rel_y * f64::from(area.height);

        let x = clamp_origin(centre_x - f64::from(sub_w) / 2.0, image.width.saturating_sub(sub_w));
        let y = clamp_origin(centre_y - f64::from(sub_h) / 2.0, image.height.saturating_sub(sub_h));

        self.zoom = zoom;
        self.zoomed_area = Rect::new(x, y, sub_w, sub_h);
        debug!(%zoom, area = %self.zoomed_area, "zoomed area updated");
    }

    /// Rebuilds the zoomed area for a pointer at `(x, y)` by stepping through
    /// every factor from `1x` up to `zoom`.
    pub fn pan(&mut self, x: f64, y: f64, zoom: ZoomFactor) {
        for step in zoom.steps() {
            self.set_zoomed_area(x, y, step);
        }
    }

    /// Flipping changes the frame pointer positions are read in, so zoom is dropped.
    pub fn set_flipping_mode(&mut self, mode: FlipMode) {
        self.flip = mode;
        self.reset_zoom();
        debug!(flip = %mode, "flipping mode changed");
    }

    /// Drops zoom and returns the largest window size with the image's aspect
    /// ratio that fits the current window. The viewport itself keeps the
    /// current window size until the windowing system reports the new one.
    pub fn scale_image(&mut self) -> Size {
        self.reset_zoom();
        let fitted = fit_within(self.image.size(), self.window);
        debug!(window = %self.window, fitted = %fitted, "scale to fit");
        fitted
    }

    /// Renders the current state. Reads state only; the compositor owns all scratch memory.
    pub fn draw_image<'c>(&self, compositor: &'c mut Compositor) -> Result<&'c Frame> {
        compositor.compose(&self.image, self.zoomed_area, self.flip, self.window)
    }

    fn reset_zoom(&mut self) {
        self.zoom = ZoomFactor::ONE;
        self.zoomed_area = Rect::full(self.image.size());
    }

    /// Pointer position as a fraction of the window, in image orientation.
    fn relative_focus(&self, focus_x: f64, focus_y: f64) -> (f64, f64) {
        let mut rel_x = fraction(focus_x, self.window.width);
        let mut rel_y = fraction(focus_y, self.window.height);
        if self.flip.mirrors_x() {
            rel_x = 1.0 - rel_x;
        }
        if self.flip.mirrors_y() {
            rel_y = 1.0 - rel_y;
        }
        (rel_x, rel_y)
    }
}

fn fraction(position: f64, extent: u32) -> f64 {
    if position.is_finite() {
        (position / f64::from(extent.max(1))).clamp(0.0, 1.0)
    } else {
        0.5
    }
}

fn clamp_origin(origin: f64, max: u32) -> u32 {
    origin.floor().clamp(0.0, f64::from(max)) as u32
}
