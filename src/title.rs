//! Window title formatting.

use std::path::Path;

pub const TITLE_PREFIX: &str = "Image Viewer - ";

/// `"Image Viewer - <path>"`, with the path cut so the title fits in `budget` bytes.
pub fn window_title(path: &Path, budget: usize) -> String {
    let shown = path.display().to_string();
    let room = budget.saturating_sub(TITLE_PREFIX.len());
    let mut cut = shown.len().min(room);
    while !shown.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{TITLE_PREFIX}{}", &shown[..cut])
}
