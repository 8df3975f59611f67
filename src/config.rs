//! Runtime options of the viewer.

use std::time::Duration;

use anyhow::{Result, ensure};

use crate::geometry::{Size, ZoomFactor};
use crate::title::TITLE_PREFIX;

/// Runtime knobs of the viewer. Built from command-line flags; nothing is persisted.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Highest zoom factor the wheel can reach.
    pub max_zoom: ZoomFactor,
    /// Target duration of one frame (about 60 Hz by default).
    pub frame_period: Duration,
    /// Maximum window title length in bytes.
    pub title_budget: usize,
    /// Window bound used when the primary monitor size is unknown.
    pub fallback_window: Size,
}

impl ViewerConfig {
    const DEFAULT_MAX_ZOOM: ZoomFactor = match ZoomFactor::new(16) {
        Some(zoom) => zoom,
        None => ZoomFactor::ONE,
    };
    const DEFAULT_FRAME_PERIOD: Duration = Duration::from_millis(16);
    const DEFAULT_TITLE_BUDGET: usize = 255;
    const DEFAULT_FALLBACK_WINDOW: Size = Size::new(800, 600);

    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.frame_period.is_zero(),
            "frame period must be greater than zero"
        );
        ensure!(
            self.frame_period <= Duration::from_secs(1),
            "frame period of {:?} is too long to stay interactive",
            self.frame_period
        );
        ensure!(
            self.title_budget > TITLE_PREFIX.len(),
            "title budget of {} bytes cannot hold the title prefix",
            self.title_budget
        );
        ensure!(
            self.fallback_window.width > 0 && self.fallback_window.height > 0,
            "fallback window size must be non-empty"
        );
        Ok(())
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            max_zoom: Self::DEFAULT_MAX_ZOOM,
            frame_period: Self::DEFAULT_FRAME_PERIOD,
            title_budget: Self::DEFAULT_TITLE_BUDGET,
            fallback_window: Self::DEFAULT_FALLBACK_WINDOW,
        }
    }
}
