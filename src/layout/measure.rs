//! Header text measurement used by auto-width columns.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

/// Natural pixel width of a piece of text in the header font
pub trait TextMeasurer {
    fn text_width(&self, text: &str) -> f64;
}

impl<F> TextMeasurer for F
where
    F: Fn(&str) -> f64,
{
    fn text_width(&self, text: &str) -> f64 {
        self(text)
    }
}

/// Fixed advance per character. Used by the CLI and in tests where no
/// font metrics are available.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharWidthMeasurer {
    pub char_width: f64,
}

impl CharWidthMeasurer {
    pub fn new(char_width: f64) -> Self {
        Self { char_width }
    }
}

impl Default for CharWidthMeasurer {
    fn default() -> Self {
        Self::new(7.0)
    }
}

impl TextMeasurer for CharWidthMeasurer {
    fn text_width(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.char_width
    }
}

struct MeasureCache {
    entries: HashMap<Rc<str>, f64>,
    order: VecDeque<Rc<str>>,
    max_entries: usize,
}

impl MeasureCache {
    fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            max_entries,
        }
    }

    fn get(&self, text: &str) -> Option<f64> {
        if self.max_entries == 0 {
            return None;
        }
        self.entries.get(text).copied()
    }

    fn insert(&mut self, text: &str, width: f64) {
        if self.max_entries == 0 || self.entries.contains_key(text) {
            return;
        }
        let key: Rc<str> = text.into();
        self.entries.insert(Rc::clone(&key), width);
        self.order.push_back(key);
        while self.entries.len() > self.max_entries {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            } else {
                break;
            }
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

/// Memoizing wrapper around a slower measurer (a canvas call in the browser).
/// Oldest entries are evicted first once `max_entries` is exceeded.
pub struct CachedMeasurer<M> {
    inner: M,
    cache: RefCell<MeasureCache>,
}

impl<M: TextMeasurer> CachedMeasurer<M> {
    pub fn new(inner: M, max_entries: usize) -> Self {
        Self {
            inner,
            cache: RefCell::new(MeasureCache::new(max_entries)),
        }
    }

    /// Drop all cached widths, e.g. after a font change.
    pub fn clear(&self) {
        self.cache.borrow_mut().clear();
    }

    pub fn cached_len(&self) -> usize {
        self.cache.borrow().entries.len()
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }
}

impl<M: TextMeasurer> TextMeasurer for CachedMeasurer<M> {
    fn text_width(&self, text: &str) -> f64 {
        if let Some(width) = self.cache.borrow().get(text) {
            return width;
        }
        let width = self.inner.text_width(text);
        self.cache.borrow_mut().insert(text, width);
        width
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
    use std::cell::Cell;

    #[test]
    fn test_char_width_counts_chars_not_bytes() {
        let m = CharWidthMeasurer::new(10.0);
        assert_eq!(m.text_width("abc"), 30.0);
        assert_eq!(m.text_width("äö"), 20.0);
    }

    #[test]
    fn test_cache_hits_skip_inner() {
        let calls = Cell::new(0);
        let inner = |text: &str| {
            calls.set(calls.get() + 1);
            text.len() as f64
        };
        let cached = CachedMeasurer::new(inner, 4);
        assert_eq!(cached.text_width("name"), 4.0);
        assert_eq!(cached.text_width("name"), 4.0);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_cache_evicts_oldest() {
        let cached = CachedMeasurer::new(CharWidthMeasurer::new(1.0), 2);
        cached.text_width("a");
        cached.text_width("bb");
        cached.text_width("ccc");
        assert_eq!(cached.cached_len(), 2);
        cached.clear();
        assert_eq!(cached.cached_len(), 0);
    }
}
