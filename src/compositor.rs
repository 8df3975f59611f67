//! Turns the visible part of the image into a window-sized frame.

use fast_image_resize as fir;
use tracing::trace;

use crate::error::Result;
use crate::geometry::{FlipMode, Rect, Size};
use crate::image_source::ImageBuffer;

/// Window-sized pixel buffer in softbuffer's `0x00RRGGBB` layout.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    size: Size,
    pixels: Vec<u32>,
}

impl Frame {
    pub fn size(&self) -> Size {
        self.size
    }

    pub fn width(&self) -> u32 {
        self.size.width
    }

    pub fn height(&self) -> u32 {
        self.size.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.size.width as usize + x as usize)
            .copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrameKey {
    area: Rect,
    flip: FlipMode,
    window: Size,
}

/// Scales, flips and packs the zoomed area. Keeps the last frame so unchanged
/// state costs nothing on the next tick.
pub struct Compositor {
    resizer: fir::Resizer,
    frame: Frame,
    key: Option<FrameKey>,
}

impl Compositor {
    pub fn new() -> Self {
        Self {
            resizer: fir::Resizer::new(),
            frame: Frame::default(),
            key: None,
        }
    }

    pub fn compose(
        &mut self,
        image: &ImageBuffer,
        area: Rect,
        flip: FlipMode,
        window: Size,
    ) -> Result<&Frame> {
        let window = window.non_empty();
        let key = FrameKey { area, flip, window };
        if self.key == Some(key) {
            trace!("frame unchanged, reusing");
            return Ok(&self.frame);
        }
        // Invalidate first so a failed resize never leaves a stale key behind.
        self.key = None;

        let source = image.pixels();
        let src_view = fir::images::ImageRef::new(
            source.width(),
            source.height(),
            source.as_raw(),
            fir::PixelType::U8x4,
        )?;
        let mut scaled = fir::images::Image::new(window.width, window.height, fir::PixelType::U8x4);
        let options = fir::ResizeOptions::new()
            .crop(
                f64::from(area.x),
                f64::from(area.y),
                f64::from(area.width),
                f64::from(area.height),
            )
            .resize_alg(scaling_for(area.size(), window));
        self.resizer.resize(&src_view, &mut scaled, Some(&options))?;

        pack_flipped(scaled.buffer(), window, flip, &mut self.frame.pixels);
        self.frame.size = window;
        self.key = Some(key);
        Ok(&self.frame)
    }
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new()
    }
}

/// Magnified pixels stay crisp; minification averages to avoid aliasing.
fn scaling_for(area: Size, window: Size) -> fir::ResizeAlg {
    if area.width <= window.width && area.height <= window.height {
        fir::ResizeAlg::Nearest
    } else {
        fir::ResizeAlg::Convolution(fir::FilterType::Bilinear)
    }
}

fn pack_flipped(rgba: &[u8], size: Size, flip: FlipMode, out: &mut Vec<u32>) {
    let width = size.width as usize;
    let height = size.height as usize;
    out.clear();
    out.reserve(width * height);
    for y in 0..height {
        let src_y = if flip.mirrors_y() { height - 1 - y } else { y };
        let row = &rgba[src_y * width * 4..(src_y + 1) * width * 4];
        if flip.mirrors_x() {
            out.extend(row.chunks_exact(4).rev().map(pack_rgb));
        } else {
            out.extend(row.chunks_exact(4).map(pack_rgb));
        }
    }
}

/// Blends over black and packs to `0x00RRGGBB`.
fn pack_rgb(px: &[u8]) -> u32 {
    let a = u32::from(px[3]);
    let r = u32::from(px[0]) * a / 255;
    let g = u32::from(px[1]) * a / 255;
    let b = u32::from(px[2]) * a / 255;
    (r << 16) | (g << 8) | b
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ColorType, Rgba, RgbaImage};

    const RED: u32 = 0x00ff_0000;
    const GREEN: u32 = 0x0000_ff00;
    const BLUE: u32 = 0x0000_00ff;
    const WHITE: u32 = 0x00ff_ffff;

    /// 2x2 image: red, green on the top row; blue, white on the bottom row.
    fn quad() -> ImageBuffer {
        let mut img = RgbaImage::new(2, 2);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([0, 255, 0, 255]));
        img.put_pixel(0, 1, Rgba([0, 0, 255, 255]));
        img.put_pixel(1, 1, Rgba([255, 255, 255, 255]));
        ImageBuffer::new(img, ColorType::Rgba8)
    }

    fn corners(frame: &Frame) -> [u32; 4] {
        let (w, h) = (frame.width() - 1, frame.height() - 1);
        [
            frame.pixel(0, 0).unwrap(),
            frame.pixel(w, 0).unwrap(),
            frame.pixel(0, h).unwrap(),
            frame.pixel(w, h).unwrap(),
        ]
    }

    #[test]
    fn identity_copy_keeps_pixels() {
        let image = quad();
        let mut compositor = Compositor::new();
        let frame = compositor
            .compose(&image, Rect::new(0, 0, 2, 2), FlipMode::None, Size::new(2, 2))
            .unwrap();
        assert_eq!(frame.pixels(), &[RED, GREEN, BLUE, WHITE]);
    }

    #[test]
    fn flips_mirror_the_output() {
        let image = quad();
        let mut compositor = Compositor::new();
        let area = Rect::new(0, 0, 2, 2);
        let window = Size::new(4, 4);

        let frame = compositor.compose(&image, area, FlipMode::Horizontal, window).unwrap();
        assert_eq!(corners(frame), [GREEN, RED, WHITE, BLUE]);

        let frame = compositor.compose(&image, area, FlipMode::Vertical, window).unwrap();
        assert_eq!(corners(frame), [BLUE, WHITE, RED, GREEN]);

        let frame = compositor.compose(&image, area, FlipMode::Both, window).unwrap();
        assert_eq!(corners(frame), [WHITE, BLUE, GREEN, RED]);
    }

    #[test]
    fn zoomed_area_fills_the_window() {
        let image = quad();
        let mut compositor = Compositor::new();
        let frame = compositor
            .compose(&image, Rect::new(1, 1, 1, 1), FlipMode::None, Size::new(3, 2))
            .unwrap();
        assert_eq!(frame.size(), Size::new(3, 2));
        assert!(frame.pixels().iter().all(|&px| px == WHITE));
    }

    #[test]
    fn transparent_pixels_blend_to_black() {
        assert_eq!(pack_rgb(&[255, 255, 255, 0]), 0);
        assert_eq!(pack_rgb(&[255, 0, 0, 255]), RED);
    }

    #[test]
    fn fresh_compositor_starts_with_an_empty_frame() {
        let frame = Frame::default();
        assert_eq!(frame.size(), Size::new(0, 0));
        assert!(frame.pixels().is_empty());
        assert_eq!(frame.pixel(0, 0), None);
        assert!(Compositor::new().key.is_none());
    }

    #[test]
    fn unchanged_state_reuses_frame() {
        let image = quad();
        let mut compositor = Compositor::new();
        let area = Rect::new(0, 0, 2, 2);
        let first = compositor
            .compose(&image, area, FlipMode::None, Size::new(2, 2))
            .unwrap()
            .pixels()
            .as_ptr();
        let second = compositor
            .compose(&image, area, FlipMode::None, Size::new(2, 2))
            .unwrap()
            .pixels()
            .as_ptr();
        assert_eq!(first, second);
        assert_eq!(compositor.key.map(|key| key.window), Some(Size::new(2, 2)));
    }
}
