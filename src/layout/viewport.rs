//! Viewport state management for vertical scrolling.

use super::window::{RowHeights, WindowParams};

/// Viewport state - the visible part of the scrollable grid body
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// Vertical scroll position in body coordinates
    pub scroll_y: f64,
    /// Viewport width in pixels (the width offered to the columns)
    pub width: f64,
    /// Viewport height in pixels (body only, headers excluded)
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    /// Create a new viewport with default values
    pub fn new() -> Self {
        Self {
            scroll_y: 0.0,
            width: 800.0,
            height: 600.0,
        }
    }

    pub fn with_size(width: f64, height: f64) -> Self {
        Self {
            scroll_y: 0.0,
            width,
            height,
        }
    }

    /// Largest scroll offset that still shows content for a body of
    /// `total_height` pixels.
    pub fn max_scroll(&self, total_height: f64) -> f64 {
        (total_height - self.height).max(0.0)
    }

    /// Clamp scroll position to `[0, max_scroll]`.
    pub fn clamp_scroll(&mut self, total_height: f64) {
        if !self.scroll_y.is_finite() {
            self.scroll_y = 0.0;
        }
        self.scroll_y = self.scroll_y.clamp(0.0, self.max_scroll(total_height));
    }

    /// Scroll by a delta
    pub fn scroll_by(&mut self, delta_y: f64, total_height: f64) {
        self.scroll_y += delta_y;
        self.clamp_scroll(total_height);
    }

    /// Set absolute scroll position
    pub fn set_scroll(&mut self, y: f64, total_height: f64) {
        self.scroll_y = y;
        self.clamp_scroll(total_height);
    }

    /// Resize the viewport
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Window inputs for the current scroll state.
    pub fn window_params(
        &self,
        heights: RowHeights,
        buffer_rows: usize,
        active_len: usize,
    ) -> WindowParams {
        WindowParams {
            scroll_offset: self.scroll_y,
            viewport_height: self.height,
            heights,
            buffer_rows,
            active_len,
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_clamps_to_content() {
        let mut viewport = Viewport::with_size(300.0, 100.0);
        viewport.set_scroll(1000.0, 250.0);
        assert_eq!(viewport.scroll_y, 150.0);
        viewport.scroll_by(-500.0, 250.0);
        assert_eq!(viewport.scroll_y, 0.0);
    }

    #[test]
    fn test_short_content_cannot_scroll() {
        let mut viewport = Viewport::with_size(300.0, 100.0);
        viewport.set_scroll(40.0, 60.0);
        assert_eq!(viewport.scroll_y, 0.0);
    }
}
