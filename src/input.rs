//! Input events and key bindings, independent of the windowing backend.

use crate::geometry::Size;

/// Backend-neutral input, one variant per event the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Window closed or the event source shut down.
    Quit,
    /// The drawable surface changed size.
    Resized(Size),
    Wheel(WheelDirection),
    KeyPressed(KeySymbol),
    /// Pointer position in window pixels.
    PointerMoved { x: f64, y: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelDirection {
    /// Rotated away from the user.
    Up,
    /// Rotated toward the user.
    Down,
}

impl WheelDirection {
    /// Sign of a vertical scroll delta; zero deltas carry no direction.
    pub fn from_delta(delta: f64) -> Option<Self> {
        if delta > 0.0 {
            Some(Self::Up)
        } else if delta < 0.0 {
            Some(Self::Down)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySymbol {
    /// Printable key, lowercased.
    Char(char),
    Escape,
}

/// What a key press asks the viewer to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ToggleFlip,
    ScaleToFit,
    Quit,
}

impl Action {
    pub fn for_key(key: KeySymbol) -> Option<Self> {
        match key {
            KeySymbol::Char('f') => Some(Self::ToggleFlip),
            KeySymbol::Char('s') => Some(Self::ScaleToFit),
            KeySymbol::Char('q') | KeySymbol::Escape => Some(Self::Quit),
            KeySymbol::Char(_) => None,
        }
    }
}

/// Control summary printed after `--help`.
pub const CONTROLS_HELP: &str = "\
Controls:
  Mouse wheel      zoom in / zoom out around the pointer
  Mouse motion     move inside the zoomed image (the window always maps the whole image)
  f                cycle flipping: horizontal, vertical, both, none
  s                resize the window to the image aspect ratio
  q, Escape        quit";
