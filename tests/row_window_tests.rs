//! Virtual row window: visible range, diffs and scroll sweeps.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_precision_loss
)]

use test_case::test_case;
use vgrid::layout::{compute_window, visible_range, RowHeights, VirtualWindow, WindowParams};
use vgrid::RowWindow;

fn params(scroll: f64, active_len: usize) -> WindowParams {
    WindowParams {
        scroll_offset: scroll,
        viewport_height: 100.0,
        heights: RowHeights::uniform(10.0),
        buffer_rows: 2,
        active_len,
    }
}

fn window(first: usize, last: usize) -> RowWindow {
    RowWindow::new(first, last).unwrap()
}

/// Replay an update on a plain list of rendered indices.
fn apply(rendered: &mut Vec<usize>, update: &vgrid::WindowUpdate) {
    if update.clear_all {
        rendered.clear();
    }
    rendered.drain(..update.remove_front.min(rendered.len()));
    let keep = rendered.len().saturating_sub(update.remove_back);
    rendered.truncate(keep);
    if let Some(front) = update.add_front {
        let mut prefix: Vec<usize> = front.indices().collect();
        prefix.append(rendered);
        *rendered = prefix;
    }
    if let Some(back) = update.add_back {
        rendered.extend(back.indices());
    }
}

// ============================================================================
// Visible range
// ============================================================================

#[test_case(0.0, 1000, Some((0, 11)) ; "top")]
#[test_case(500.0, 1000, Some((48, 61)) ; "middle")]
#[test_case(9900.0, 1000, Some((988, 999)) ; "bottom clamps to last row")]
#[test_case(0.0, 5, Some((0, 4)) ; "fewer rows than viewport")]
#[test_case(0.0, 0, None ; "empty sequence")]
fn test_visible_range(scroll: f64, rows: usize, expected: Option<(usize, usize)>) {
    let range = visible_range(&params(scroll, rows)).map(|w| (w.first, w.last));
    assert_eq!(range, expected);
}

#[test_case(f64::NAN ; "nan scroll")]
#[test_case(f64::INFINITY ; "infinite scroll")]
fn test_non_finite_scroll_renders_nothing(scroll: f64) {
    assert_eq!(visible_range(&params(scroll, 100)), None);
}

#[test]
fn test_zero_height_rows_render_nothing() {
    let mut p = params(0.0, 100);
    p.heights = RowHeights::uniform(0.0);
    assert_eq!(visible_range(&p), None);
}

#[test]
fn test_taller_first_row_shifts_window() {
    let mut p = params(30.0, 100);
    p.heights = RowHeights::new(30.0, 10.0, 10.0);
    p.buffer_rows = 0;
    let w = visible_range(&p).unwrap();
    // Row 0 spans 0..30, row 1 starts at 30
    assert_eq!(w.first, 1);
    assert_eq!(w.last, 10);
}

// ============================================================================
// Diffs
// ============================================================================

#[test]
fn test_first_update_adds_whole_window() {
    let update = compute_window(None, &params(0.0, 100));
    assert_eq!(update.window, Some(window(0, 11)));
    assert_eq!(update.add_back, Some(window(0, 11)));
    assert_eq!(update.remove_front + update.remove_back, 0);
}

#[test]
fn test_small_scroll_down_shifts_edges() {
    let update = compute_window(Some(window(0, 11)), &params(50.0, 100));
    let w = update.window.unwrap();
    assert_eq!((w.first, w.last), (3, 16));
    assert_eq!(update.remove_front, 3);
    assert_eq!(update.remove_back, 0);
    assert_eq!(update.add_front, None);
    assert_eq!(update.add_back, Some(window(12, 16)));
}

#[test]
fn test_scroll_up_trims_back_and_adds_front() {
    let update = compute_window(Some(window(48, 61)), &params(450.0, 1000));
    let w = update.window.unwrap();
    assert_eq!((w.first, w.last), (43, 56));
    assert_eq!(update.remove_front, 0);
    assert_eq!(update.remove_back, 5);
    assert_eq!(update.add_front, Some(window(43, 47)));
    assert_eq!(update.add_back, None);
}

#[test]
fn test_jump_replaces_everything() {
    let update = compute_window(Some(window(0, 11)), &params(5000.0, 1000));
    assert_eq!(update.remove_front, 12);
    assert_eq!(update.remove_back, 0);
    assert_eq!(update.add_back, update.window);
}

#[test]
fn test_unchanged_scroll_is_noop() {
    let update = compute_window(Some(window(0, 11)), &params(0.0, 100));
    assert!(update.is_noop());
}

#[test]
fn test_sequence_shrinking_to_empty_removes_all() {
    let update = compute_window(Some(window(0, 11)), &params(0.0, 0));
    assert_eq!(update.window, None);
    assert_eq!(update.remove_front, 12);
}

// ============================================================================
// Sweeps
// ============================================================================

#[test_case(1 ; "single pixel steps")]
#[test_case(7 ; "small steps")]
#[test_case(95 ; "near viewport steps")]
#[test_case(333 ; "jumps")]
fn test_scroll_sweep_is_monotonic_and_consistent(step: usize) {
    let rows = 500;
    let mut tracker = VirtualWindow::new();
    let mut rendered = Vec::new();
    let mut previous: Option<RowWindow> = None;
    let mut offset = 0usize;
    while offset <= 5000 {
        let p = params(offset as f64, rows);
        let update = tracker.update(&p);
        apply(&mut rendered, &update);

        let w = update.window.unwrap();
        assert!(w.last < rows);
        if let Some(prev) = previous {
            assert!(w.first >= prev.first);
            assert!(w.last >= prev.last);
        }
        let expected: Vec<usize> = w.indices().collect();
        assert_eq!(rendered, expected, "offset {offset}");
        previous = Some(w);
        offset += step;
    }
}

#[test]
fn test_invalidate_forces_full_rebuild() {
    let mut tracker = VirtualWindow::new();
    tracker.update(&params(0.0, 100));
    tracker.invalidate();
    let update = tracker.update(&params(0.0, 100));
    assert!(update.clear_all);
    assert_eq!(update.add_back, Some(window(0, 11)));
    assert!(!tracker.is_stale());
}

#[test]
fn test_full_mode_renders_every_row() {
    let mut tracker = VirtualWindow::new();
    let update = tracker.update_full(40);
    assert_eq!(update.window, Some(window(0, 39)));
    assert!(tracker.update_full(40).is_noop());
    assert_eq!(tracker.update_full(0).window, None);
}
