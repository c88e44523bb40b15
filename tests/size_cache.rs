//! Size cache behavior: FIFO eviction, capacity bounds, hit semantics, and
//! invalidation.

mod common;

use chat_render::font::FontKind;
use chat_render::geom::Size;
use chat_render::size_cache::{SizeCache, SizeCacheConfig, SizeCaches};
use common::FakeMeasurer;

use std::sync::atomic::Ordering;

fn cache_with_capacity(capacity: usize) -> SizeCache {
    SizeCache::new(FontKind::Medium, SizeCacheConfig { capacity })
}

// ============================================================================
// FIFO eviction
// ============================================================================

/// Capacity 2, insert a/b/c: "a" (the oldest insertion) is evicted and a
/// later lookup of "a" is a fresh miss.
#[test]
fn capacity_two_evicts_first_inserted() {
    let cache = cache_with_capacity(2);
    let m = FakeMeasurer::default();

    cache.measure(&m, "a");
    cache.measure(&m, "b");
    cache.measure(&m, "c");

    assert_eq!(cache.len(), 2);
    assert!(!cache.contains("a"), "\"a\" should have been evicted");
    assert!(cache.contains("b"));
    assert!(cache.contains("c"));

    let misses_before = m.width_calls.load(Ordering::SeqCst);
    cache.measure(&m, "a");
    assert_eq!(m.width_calls.load(Ordering::SeqCst), misses_before + 1);
}

/// Re-reading an entry does not protect it: eviction is insertion order,
/// not recency of access.
#[test]
fn lookups_do_not_reorder_the_queue() {
    let cache = cache_with_capacity(2);
    let m = FakeMeasurer::default();

    cache.measure(&m, "a");
    cache.measure(&m, "b");
    cache.measure(&m, "a"); // hit; must not refresh "a"
    cache.measure(&m, "c"); // evicts "a" regardless of the recent hit

    assert!(!cache.contains("a"));
    assert!(cache.contains("b"));
}

/// The cache never exceeds its configured capacity.
#[test]
fn capacity_is_never_exceeded() {
    let cache = cache_with_capacity(3);
    let m = FakeMeasurer::default();

    for i in 0..50 {
        cache.measure(&m, &format!("text-{i}"));
        assert!(cache.len() <= 3, "len {} after insert {i}", cache.len());
    }
}

// ============================================================================
// Hits
// ============================================================================

/// A cached pair returns the identical size without measuring again or
/// growing the cache.
#[test]
fn hit_returns_cached_size_without_growth() {
    let cache = cache_with_capacity(16);
    let m = FakeMeasurer::default();

    let first = cache.measure(&m, "hello");
    assert_eq!(first, Size::new(35, 16));
    let width_calls = m.width_calls.load(Ordering::SeqCst);
    let len = cache.len();

    let second = cache.measure(&m, "hello");
    assert_eq!(second, first);
    assert_eq!(m.width_calls.load(Ordering::SeqCst), width_calls);
    assert_eq!(cache.len(), len);
}

/// Line height is computed once per font, not once per text.
#[test]
fn line_height_is_computed_once() {
    let cache = cache_with_capacity(16);
    let m = FakeMeasurer::default();

    cache.measure(&m, "one");
    cache.measure(&m, "two");
    cache.measure(&m, "three");
    assert_eq!(m.height_calls.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Per-font instances and invalidation
// ============================================================================

#[test]
fn fonts_have_independent_caches() {
    let caches = SizeCaches::new(SizeCacheConfig { capacity: 2 });
    let m = FakeMeasurer::default();

    caches.measure(&m, FontKind::Small, "a");
    caches.measure(&m, FontKind::Small, "b");
    caches.measure(&m, FontKind::Small, "c");
    // Filling the Small cache past capacity must not evict Medium entries.
    caches.measure(&m, FontKind::Medium, "a");
    let calls = m.width_calls.load(Ordering::SeqCst);
    caches.measure(&m, FontKind::Medium, "a");
    assert_eq!(m.width_calls.load(Ordering::SeqCst), calls);
}

/// Clearing (the font-config-change path) forgets widths and line heights.
#[test]
fn clear_all_forces_remeasure() {
    let caches = SizeCaches::new(SizeCacheConfig::default());
    let m = FakeMeasurer::default();

    caches.measure(&m, FontKind::Medium, "hello");
    caches.clear_all();

    let width_calls = m.width_calls.load(Ordering::SeqCst);
    let height_calls = m.height_calls.load(Ordering::SeqCst);
    caches.measure(&m, FontKind::Medium, "hello");
    assert_eq!(m.width_calls.load(Ordering::SeqCst), width_calls + 1);
    assert_eq!(m.height_calls.load(Ordering::SeqCst), height_calls + 1);
}

// ============================================================================
// Concurrency
// ============================================================================

/// Concurrent misses on the same key may each measure, but the stored value
/// stays consistent and within capacity.
#[test]
fn concurrent_misses_stay_consistent() {
    use std::sync::Arc;

    let cache = Arc::new(cache_with_capacity(64));
    let m = Arc::new(FakeMeasurer::default());

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let cache = cache.clone();
            let m = m.clone();
            std::thread::spawn(move || {
                for i in 0..200 {
                    let text = format!("text-{}", (i + t) % 100);
                    let size = cache.measure(&*m, &text);
                    assert_eq!(size.width, text.len() as u32 * 7);
                    assert_eq!(size.height, 16);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert!(cache.len() <= 64);
}
