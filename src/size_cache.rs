//! Bounded per-font text measurement caches.
//!
//! Each font kind gets its own [`SizeCache`]: a lookup table from exact text
//! to pixel width, plus a line height computed once per font. Entries are
//! evicted in strict insertion order (FIFO) once the cache is full — lookups
//! never reorder the queue. That is deliberate: downstream layout was tuned
//! against FIFO eviction, so this must not be "upgraded" to LRU.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::font::FontKind;
use crate::geom::Size;

/// Text measurement primitive. Production code implements this over the
/// cosmic-text font system; tests inject a counting fake.
pub trait MeasureText {
    /// Advance width of `text` in `font`, in pixels.
    fn width(&self, font: FontKind, text: &str) -> u32;

    /// Line height of `font`, in pixels. Independent of the text.
    fn line_height(&self, font: FontKind) -> u32;
}

#[derive(Debug, Clone, Copy)]
pub struct SizeCacheConfig {
    /// Maximum number of distinct texts cached per font.
    pub capacity: usize,
}

impl Default for SizeCacheConfig {
    fn default() -> Self {
        Self { capacity: 2048 }
    }
}

#[derive(Default)]
struct CacheInner {
    widths: HashMap<String, u32>,
    /// Keys in insertion order. Front is the eviction candidate.
    queue: VecDeque<String>,
    line_height: Option<u32>,
}

/// FIFO-bounded width cache for one font kind.
///
/// The map and queue are updated together under one mutex so they can never
/// disagree about which keys are held; a miss measures under the lock, so a
/// stored width is always a complete, valid measurement.
pub struct SizeCache {
    font: FontKind,
    config: SizeCacheConfig,
    inner: Mutex<CacheInner>,
}

impl SizeCache {
    pub fn new(font: FontKind, config: SizeCacheConfig) -> Self {
        Self { font, config, inner: Mutex::new(CacheInner::default()) }
    }

    /// Measure `text`, consulting the cache first.
    pub fn measure(&self, measurer: &dyn MeasureText, text: &str) -> Size {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());

        let height = *inner
            .line_height
            .get_or_insert_with(|| measurer.line_height(self.font));

        if let Some(&width) = inner.widths.get(text) {
            return Size::new(width, height);
        }

        let width = measurer.width(self.font, text);
        inner.widths.insert(text.to_string(), width);
        inner.queue.push_back(text.to_string());
        if inner.queue.len() > self.config.capacity {
            // Evict the oldest insertion, not the least recently read.
            if let Some(oldest) = inner.queue.pop_front() {
                inner.widths.remove(&oldest);
            }
        }

        Size::new(width, height)
    }

    /// Number of texts currently held.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `text` is currently cached (without measuring).
    pub fn contains(&self, text: &str) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .widths
            .contains_key(text)
    }

    /// Drop every entry, including the cached line height.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.widths.clear();
        inner.queue.clear();
        inner.line_height = None;
    }
}

/// One [`SizeCache`] per font kind, cleared together on font-config change.
pub struct SizeCaches {
    caches: Vec<SizeCache>,
}

impl SizeCaches {
    pub fn new(config: SizeCacheConfig) -> Self {
        Self {
            caches: FontKind::ALL
                .iter()
                .map(|&font| SizeCache::new(font, config))
                .collect(),
        }
    }

    fn cache(&self, font: FontKind) -> &SizeCache {
        let idx = FontKind::ALL.iter().position(|&f| f == font).unwrap_or(0);
        &self.caches[idx]
    }

    pub fn measure(&self, measurer: &dyn MeasureText, font: FontKind, text: &str) -> Size {
        self.cache(font).measure(measurer, text)
    }

    /// Invalidate all per-font caches. Called whenever the global font
    /// configuration changes.
    pub fn clear_all(&self) {
        for cache in &self.caches {
            cache.clear();
        }
        tracing::debug!("size caches cleared");
    }
}

impl Default for SizeCaches {
    fn default() -> Self {
        Self::new(SizeCacheConfig::default())
    }
}
