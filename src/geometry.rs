//! Value types shared by the viewport engine and the event loop.

use std::fmt;

/// Width and height of a window or image, in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Same size with both dimensions raised to at least one pixel.
    pub fn non_empty(self) -> Self {
        Self::new(self.width.max(1), self.height.max(1))
    }

    pub fn area(self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Axis-aligned rectangle in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle covering a whole surface of `size`.
    pub const fn full(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// True when the rectangle lies entirely inside `[0, bounds.width) x [0, bounds.height)`.
    pub fn is_within(&self, bounds: Size) -> bool {
        self.width > 0
            && self.height > 0
            && u64::from(self.x) + u64::from(self.width) <= u64::from(bounds.width)
            && u64::from(self.y) + u64::from(self.height) <= u64::from(bounds.height)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// Power-of-two magnification; `1` shows the whole image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ZoomFactor(u32);

impl ZoomFactor {
    pub const ONE: Self = Self(1);

    /// Returns `None` unless `value` is a power of two.
    pub const fn new(value: u32) -> Option<Self> {
        if value.is_power_of_two() {
            Some(Self(value))
        } else {
            None
        }
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    /// One wheel step in: doubles the factor without passing `max`.
    pub fn zoomed_in(self, max: Self) -> Self {
        if self < max { Self(self.0 * 2) } else { self }
    }

    /// One wheel step out: halves the factor, never below one.
    pub fn zoomed_out(self) -> Self {
        if self.0 > 1 { Self(self.0 / 2) } else { self }
    }

    /// Every factor from one up to and including `self`, in increasing order.
    pub fn steps(self) -> impl Iterator<Item = ZoomFactor> {
        std::iter::successors(Some(Self::ONE), move |step| {
            (step.0 < self.0).then(|| Self(step.0 * 2))
        })
    }
}

impl Default for ZoomFactor {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for ZoomFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.0)
    }
}

impl std::str::FromStr for ZoomFactor {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value: u32 = raw
            .trim()
            .parse()
            .map_err(|err| format!("invalid zoom factor '{raw}': {err}"))?;
        Self::new(value).ok_or_else(|| format!("zoom factor {value} is not a power of two"))
    }
}

/// Mirroring applied to the displayed area. Toggling walks the four modes in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlipMode {
    #[default]
    None,
    Horizontal,
    Vertical,
    Both,
}

impl FlipMode {
    pub const ALL: [Self; 4] = [Self::None, Self::Horizontal, Self::Vertical, Self::Both];

    pub fn next(self) -> Self {
        match self {
            Self::None => Self::Horizontal,
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Both,
            Self::Both => Self::None,
        }
    }

    pub fn mirrors_x(self) -> bool {
        matches!(self, Self::Horizontal | Self::Both)
    }

    pub fn mirrors_y(self) -> bool {
        matches!(self, Self::Vertical | Self::Both)
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
            Self::Both => "both",
        }
    }
}

impl fmt::Display for FlipMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Largest size with the aspect ratio of `content` that fits inside `bounds`.
///
/// Unlike a plain "shrink to fit" this also enlarges small content, so the
/// result always touches `bounds` on at least one axis.
pub fn fit_within(content: Size, bounds: Size) -> Size {
    let cw = content.width.max(1) as f64;
    let ch = content.height.max(1) as f64;
    let bw = bounds.width.max(1) as f64;
    let bh = bounds.height.max(1) as f64;
    let scale = (bw / cw).min(bh / ch);
    let scale = if scale.is_finite() { scale } else { 1.0 };
    let w = (cw * scale).round().clamp(1.0, bw);
    let h = (ch * scale).round().clamp(1.0, bh);
    Size::new(w as u32, h as u32)
}

/// Shrinks `content` to fit `bounds` but never enlarges it.
pub fn shrink_to_fit(content: Size, bounds: Size) -> Size {
    if content.width <= bounds.width && content.height <= bounds.height {
        content.non_empty()
    } else {
        fit_within(content, bounds)
    }
}
