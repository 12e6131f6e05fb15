//! Virtual row window.
//!
//! Only the rows around the viewport are materialized. Each scroll produces
//! a [`WindowUpdate`] describing how to turn the previously rendered range
//! into the new one with the fewest removals and insertions: rows present in
//! both windows are left alone, rows that scrolled out are dropped from the
//! front or back, and newly exposed rows are created at either end.

use std::ops::RangeInclusive;

use serde::Serialize;

/// Row heights of the body. The first and last rows can differ from the
/// interior rows because of collapsed borders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowHeights {
    pub first: f64,
    pub middle: f64,
    pub last: f64,
}

impl RowHeights {
    pub fn new(first: f64, middle: f64, last: f64) -> Self {
        Self {
            first,
            middle,
            last,
        }
    }

    pub fn uniform(height: f64) -> Self {
        Self::new(height, height, height)
    }

    /// Top offset of a row inside the scrollable body.
    #[allow(clippy::cast_precision_loss)]
    pub fn row_offset(&self, index: usize) -> f64 {
        if index == 0 {
            0.0
        } else {
            self.first + (index - 1) as f64 * self.middle
        }
    }

    /// Height of the scrollable body for `rows` rows, never below one pixel.
    #[allow(clippy::cast_precision_loss)]
    pub fn total_height(&self, rows: usize) -> f64 {
        let mut height = self.middle * rows as f64;
        if rows > 0 {
            height += (self.first - self.middle) + (self.last - self.middle);
        }
        if height.is_nan() || height < 1.0 {
            1.0
        } else {
            height
        }
    }
}

impl Default for RowHeights {
    fn default() -> Self {
        Self::uniform(24.0)
    }
}

/// Inclusive range of active-sequence indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RowWindow {
    pub first: usize,
    pub last: usize,
}

impl RowWindow {
    /// `None` when `first > last`.
    pub fn new(first: usize, last: usize) -> Option<Self> {
        (first <= last).then_some(Self { first, last })
    }

    pub fn len(&self) -> usize {
        self.last - self.first + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.first..=self.last).contains(&index)
    }

    pub fn indices(&self) -> RangeInclusive<usize> {
        self.first..=self.last
    }
}

/// Inputs to one window computation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowParams {
    pub scroll_offset: f64,
    pub viewport_height: f64,
    pub heights: RowHeights,
    pub buffer_rows: usize,
    /// Length of the active (filtered or full) row sequence
    pub active_len: usize,
}

/// How to move from the rendered window to a new one.
///
/// Apply removals first (front, then back), then prepend `add_front` and
/// append `add_back`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowUpdate {
    /// The window that will be rendered once this update is applied
    pub window: Option<RowWindow>,
    /// Rows to drop from the start of the rendered set
    pub remove_front: usize,
    /// Rows to drop from the end of the rendered set
    pub remove_back: usize,
    pub add_front: Option<RowWindow>,
    pub add_back: Option<RowWindow>,
    /// Everything currently rendered is stale and must be discarded first
    pub clear_all: bool,
}

impl WindowUpdate {
    /// True when applying the update changes nothing.
    pub fn is_noop(&self) -> bool {
        !self.clear_all
            && self.remove_front == 0
            && self.remove_back == 0
            && self.add_front.is_none()
            && self.add_back.is_none()
    }

    /// Indices that must be freshly materialized, in display order.
    pub fn added_indices(&self) -> impl Iterator<Item = usize> {
        let front = self.add_front.map(|w| w.indices()).into_iter().flatten();
        let back = self.add_back.map(|w| w.indices()).into_iter().flatten();
        front.chain(back)
    }
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Visible window including buffer rows, or `None` when nothing should be
/// rendered.
pub fn visible_range(params: &WindowParams) -> Option<RowWindow> {
    let WindowParams {
        scroll_offset,
        viewport_height,
        heights,
        buffer_rows,
        active_len,
    } = *params;
    if active_len == 0
        || !heights.middle.is_finite()
        || heights.middle <= 0.0
        || !heights.first.is_finite()
        || !scroll_offset.is_finite()
        || !viewport_height.is_finite()
        || viewport_height <= 0.0
    {
        return None;
    }

    let buffer = to_i64(buffer_rows);
    let top = scroll_offset - heights.first;
    // Both quotients are finite here; `as` saturates on overflow.
    #[allow(clippy::cast_possible_truncation)]
    let first = (top / heights.middle).floor() as i64;
    #[allow(clippy::cast_possible_truncation)]
    let last = ((top + viewport_height) / heights.middle).ceil() as i64;

    let first = first.saturating_add(1).saturating_sub(buffer).max(0);
    let last = last
        .saturating_add(buffer)
        .min(to_i64(active_len).saturating_sub(1));
    if first > last {
        return None;
    }
    let first = usize::try_from(first).ok()?;
    let last = usize::try_from(last).ok()?;
    RowWindow::new(first, last)
}

/// Diff the previously rendered window against the one `params` calls for.
pub fn compute_window(previous: Option<RowWindow>, params: &WindowParams) -> WindowUpdate {
    let target = visible_range(params);
    let mut update = WindowUpdate {
        window: target,
        ..WindowUpdate::default()
    };

    let Some(target) = target else {
        if let Some(previous) = previous {
            update.remove_front = previous.len();
        }
        return update;
    };

    // Trim from the front, never past the old window's end.
    let mut kept = previous;
    if let Some(old) = kept {
        if old.first < target.first {
            let count = (old.last + 1).min(target.first) - old.first;
            update.remove_front = count;
            kept = RowWindow::new(old.first + count, old.last);
        }
    }
    // Trim from the back, never past the kept window's start.
    if let Some(old) = kept {
        if old.last > target.last {
            let count = old.last - old.first.saturating_sub(1).max(target.last);
            update.remove_back = count;
            kept = old
                .last
                .checked_sub(count)
                .and_then(|last| RowWindow::new(old.first, last));
        }
    }

    debug_assert!(target.last < params.active_len);
    match kept {
        Some(kept) => {
            if target.first < kept.first {
                update.add_front = RowWindow::new(target.first, target.last.min(kept.first - 1));
            }
            if target.last > kept.last {
                update.add_back = RowWindow::new((kept.last + 1).max(target.first), target.last);
            }
        }
        None => update.add_back = Some(target),
    }
    update
}

/// Tracks the rendered window across scroll events
#[derive(Debug, Clone, Default)]
pub struct VirtualWindow {
    rendered: Option<RowWindow>,
    stale: bool,
}

impl VirtualWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently rendered window.
    pub fn rendered(&self) -> Option<RowWindow> {
        self.rendered
    }

    /// Forget the rendered rows. The next update starts from scratch and
    /// asks the renderer to discard what it has.
    pub fn invalidate(&mut self) {
        self.rendered = None;
        self.stale = true;
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Compute and record the window for the current scroll state.
    pub fn update(&mut self, params: &WindowParams) -> WindowUpdate {
        let mut update = compute_window(self.rendered, params);
        if std::mem::take(&mut self.stale) {
            update.clear_all = true;
        }
        self.rendered = update.window;
        log::trace!(
            "row window {:?}: -{} front, -{} back",
            update.window,
            update.remove_front,
            update.remove_back
        );
        update
    }

    /// Non-virtual mode: every active row is rendered.
    pub fn update_full(&mut self, active_len: usize) -> WindowUpdate {
        let window = active_len
            .checked_sub(1)
            .and_then(|last| RowWindow::new(0, last));
        let stale = std::mem::take(&mut self.stale);
        if !stale && window == self.rendered {
            return WindowUpdate {
                window,
                ..WindowUpdate::default()
            };
        }
        self.rendered = window;
        WindowUpdate {
            window,
            add_back: window,
            clear_all: true,
            ..WindowUpdate::default()
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

    fn params(scroll: f64, rows: usize) -> WindowParams {
        WindowParams {
            scroll_offset: scroll,
            viewport_height: 100.0,
            heights: RowHeights::uniform(10.0),
            buffer_rows: 2,
            active_len: rows,
        }
    }

    #[test]
    fn test_initial_window_includes_buffer() {
        let w = visible_range(&params(0.0, 1000)).unwrap();
        assert_eq!((w.first, w.last), (0, 11));
        let w = visible_range(&params(200.0, 1000)).unwrap();
        // floor(190/10)+1-2 = 18, ceil(290/10)+2 = 31
        assert_eq!((w.first, w.last), (18, 31));
    }

    #[test]
    fn test_window_clamped_to_rows() {
        let w = visible_range(&params(0.0, 5)).unwrap();
        assert_eq!((w.first, w.last), (0, 4));
        assert!(visible_range(&params(0.0, 0)).is_none());
        assert!(visible_range(&params(10_000.0, 5)).is_none());
    }

    #[test]
    fn test_small_scroll_trims_front_and_appends() {
        let prev = RowWindow::new(18, 31);
        let u = compute_window(prev, &params(250.0, 1000));
        // new window 23..=36
        assert_eq!(u.window, RowWindow::new(23, 36));
        assert_eq!(u.remove_front, 5);
        assert_eq!(u.remove_back, 0);
        assert_eq!(u.add_front, None);
        assert_eq!(u.add_back, RowWindow::new(32, 36));
    }

    #[test]
    fn test_scroll_up_trims_back_and_prepends() {
        let prev = RowWindow::new(23, 36);
        let u = compute_window(prev, &params(200.0, 1000));
        assert_eq!(u.remove_front, 0);
        assert_eq!(u.remove_back, 5);
        assert_eq!(u.add_front, RowWindow::new(18, 22));
        assert_eq!(u.add_back, None);
    }

    #[test]
    fn test_jump_replaces_everything() {
        let prev = RowWindow::new(0, 11);
        let u = compute_window(prev, &params(5000.0, 1000));
        assert_eq!(u.remove_front, 12);
        assert_eq!(u.add_front, None);
        assert_eq!(u.add_back, u.window);
    }

    #[test]
    fn test_jump_back_replaces_everything() {
        let prev = RowWindow::new(488, 511);
        let u = compute_window(prev, &params(0.0, 1000));
        assert_eq!(u.remove_front, 0);
        assert_eq!(u.remove_back, 24);
        assert_eq!(u.add_back, RowWindow::new(0, 11));
    }

    #[test]
    fn test_unchanged_scroll_is_noop() {
        let mut window = VirtualWindow::new();
        window.update(&params(100.0, 1000));
        let u = window.update(&params(100.0, 1000));
        assert!(u.is_noop());
    }

    #[test]
    fn test_invalidate_forces_clear() {
        let mut window = VirtualWindow::new();
        window.update(&params(100.0, 1000));
        window.invalidate();
        let u = window.update(&params(100.0, 1000));
        assert!(u.clear_all);
        assert_eq!(u.add_back, u.window);
        assert!(!window.is_stale());
    }

    #[test]
    fn test_row_offsets_and_height() {
        let heights = RowHeights::new(12.0, 10.0, 11.0);
        assert_eq!(heights.row_offset(0), 0.0);
        assert_eq!(heights.row_offset(1), 12.0);
        assert_eq!(heights.row_offset(3), 32.0);
        assert_eq!(heights.total_height(3), 33.0);
        assert_eq!(heights.total_height(0), 1.0);
    }

    #[test]
    fn test_full_mode_renders_all_once() {
        let mut window = VirtualWindow::new();
        let u = window.update_full(4);
        assert_eq!(u.add_back, RowWindow::new(0, 3));
        assert!(window.update_full(4).is_noop());
        assert!(window.update_full(0).window.is_none());
    }
}
