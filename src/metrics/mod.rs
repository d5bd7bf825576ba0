//! Operation Metrics Module
//!
//! Per-map counters describing how a map is being used: how many lookups hit or
//! missed, how many values were stored and how many entries were removed.
//! Counters are relaxed atomics, so a snapshot taken while other threads are
//! mutating the map is approximate in the same way [`size`] is.
//!
//! [`size`]: crate::map::SafeMap::size

use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Point-in-time view of a map's operation counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MapMetrics {
    /// Lookups performed (`get`, `get_or_zero`, `get_and_delete`, `get_or_set`)
    pub loads: u64,
    /// Lookups that found an entry
    pub hits: u64,
    /// Lookups that found nothing
    pub misses: u64,
    /// Unconditional stores (`set`)
    pub stores: u64,
    /// Entries created by `get_or_set`
    pub inserts: u64,
    /// Entries actually removed (`delete` of a present key, `get_and_delete`)
    pub removals: u64,
}

impl MapMetrics {
    /// Percentage of lookups that found an entry
    pub fn hit_rate(&self) -> f64 {
        if self.loads == 0 {
            0.0
        } else {
            (self.hits as f64 / self.loads as f64) * 100.0
        }
    }

    /// Percentage of lookups that found nothing
    pub fn miss_rate(&self) -> f64 {
        if self.loads == 0 {
            0.0
        } else {
            (self.misses as f64 / self.loads as f64) * 100.0
        }
    }
}

/// Internal atomic metrics collection
#[derive(Debug)]
pub struct AtomicMetrics {
    enabled: AtomicBool,
    loads: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    stores: AtomicU64,
    inserts: AtomicU64,
    removals: AtomicU64,
}

impl Default for AtomicMetrics {
    fn default() -> Self {
        Self {
            enabled: AtomicBool::new(true),
            loads: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            stores: AtomicU64::new(0),
            inserts: AtomicU64::new(0),
            removals: AtomicU64::new(0),
        }
    }
}

impl AtomicMetrics {
    #[inline]
    fn bump(&self, counter: &AtomicU64) {
        if self.enabled.load(Ordering::Relaxed) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a lookup and whether it found an entry
    #[inline]
    pub fn record_load(&self, hit: bool) {
        if !self.enabled.load(Ordering::Relaxed) {
            return;
        }
        self.loads.fetch_add(1, Ordering::Relaxed);
        if hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record an unconditional store
    #[inline]
    pub fn record_store(&self) {
        self.bump(&self.stores);
    }

    /// Record an entry created by a conditional insert
    #[inline]
    pub fn record_insert(&self) {
        self.bump(&self.inserts);
    }

    /// Record an entry that was actually removed
    #[inline]
    pub fn record_removal(&self) {
        self.bump(&self.removals);
    }

    /// Enable or disable collection; counters keep their values either way
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Whether collection is currently enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MapMetrics {
        MapMetrics {
            loads: self.loads.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            stores: self.stores.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            removals: self.removals.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        self.loads.store(0, Ordering::Relaxed);
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.stores.store(0, Ordering::Relaxed);
        self.inserts.store(0, Ordering::Relaxed);
        self.removals.store(0, Ordering::Relaxed);
    }
}

/// Trait for data structures that support operation metrics
pub trait MetricsCollector {
    /// Get current operation metrics
    fn metrics(&self) -> MapMetrics;

    /// Reset all metrics
    fn reset_metrics(&self);

    /// Enable or disable metrics collection
    fn set_metrics_enabled(&self, enabled: bool);

    /// Check if metrics collection is enabled
    fn is_metrics_enabled(&self) -> bool;
}
