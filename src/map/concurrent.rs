//! Concurrent Map Implementation
//!
//! This module implements [`SafeMap`] as a lock-striped hash map paired with an
//! approximate size counter.
//!
//! ## Design
//!
//! The map uses:
//! - A power-of-2 number of stripes, each an `FxHashMap` behind its own `RwLock`
//! - The high 32 bits of the key's Fx hash to pick a stripe, leaving the low bits
//!   to the stripe's own table
//! - Cache-line padding around every stripe and around the counter
//! - A relaxed `AtomicIsize` counter adjusted after the stripe lock is released
//!
//! ## Consistency
//!
//! - Every single-key operation runs under one stripe lock, so it is
//!   linearizable with respect to that key
//! - `get_or_set` and `get_and_delete` check and act under the same write lock
//! - The counter is a separate step. Under concurrent mutation `size` may
//!   briefly disagree with every real state of the store, and overwrites and
//!   deletes of absent keys make it drift permanently
//!
//! ## Performance Characteristics
//!
//! - **Get**: O(1) average case, shared lock on one stripe
//! - **Set / Delete / GetOrSet / GetAndDelete**: O(1) average case, exclusive lock
//!   on one stripe
//! - **Size**: O(1), a single atomic load
//! - **Range / count_entries**: O(n), one stripe locked at a time
//!
//! ## Example
//!
//! ```rust
//! use safemap::{ConcurrentMap, SafeMap};
//! use std::sync::Arc;
//! use std::thread;
//!
//! let map = Arc::new(ConcurrentMap::new());
//!
//! // Writer thread
//! let writer = thread::spawn({
//!     let map = Arc::clone(&map);
//!     move || {
//!         for i in 0..1000 {
//!             map.set(i, i * 2);
//!         }
//!     }
//! });
//! writer.join().unwrap();
//!
//! // Reader thread
//! let reader = thread::spawn({
//!     let map = Arc::clone(&map);
//!     move || (0..1000).filter_map(|i| map.get(&i)).sum::<i32>()
//! });
//!
//! assert_eq!(reader.join().unwrap(), 999000); // Sum of 0, 2, 4, ..., 1998
//! assert_eq!(map.size(), 1000);
//! ```

use crate::map::SafeMap;
use crate::metrics::{AtomicMetrics, MapMetrics, MetricsCollector};
use crate::sync::{AtomicIsize, Ordering, RwLock};
use crate::util::CachePadded;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{Hash, Hasher};
use fxhash::{FxHashMap, FxHasher64};
use std::collections::hash_map::Entry;

/// Default initial capacity for the map
const DEFAULT_CAPACITY: usize = 16;
/// Default number of stripes (must be power of 2)
const DEFAULT_STRIPES: usize = 16;

type Stripe<K, V> = CachePadded<RwLock<FxHashMap<K, V>>>;

/// A concurrency-safe map with an approximate size counter
///
/// # Type Parameters
///
/// * `K` - The key type, must implement `Hash + Eq + Clone`
/// * `V` - The value type, must implement `Clone`; lookups hand out clones, so
///   wrap large values in `Arc`
///
/// # Safety
///
/// This map is safe to use from multiple threads simultaneously (share it with
/// `Arc`). No operation holds more than one stripe lock at a time, and no lock
/// is held while user callbacks run.
///
/// # Examples
///
/// ```rust
/// use safemap::{ConcurrentMap, SafeMap};
///
/// let map: ConcurrentMap<i32, String> = ConcurrentMap::new();
/// map.set(1, "hello".to_string());
/// assert_eq!(map.get(&1), Some("hello".to_string()));
/// assert_eq!(map.size(), 1);
/// ```
pub struct ConcurrentMap<K, V> {
    // Independently locked slices of the key space
    stripes: Box<[Stripe<K, V>]>,

    // stripes.len() - 1
    mask: usize,

    // Approximate number of entries, see `SafeMap::size`
    length: CachePadded<AtomicIsize>,

    metrics: AtomicMetrics,
}

impl<K, V> ConcurrentMap<K, V> {
    /// Create an empty map with default capacity and stripe count
    ///
    /// # Examples
    ///
    /// ```rust
    /// use safemap::ConcurrentMap;
    ///
    /// let map: ConcurrentMap<i32, String> = ConcurrentMap::new();
    /// assert!(map.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::build(DEFAULT_CAPACITY, DEFAULT_STRIPES)
    }

    /// Create an empty map able to hold `capacity` entries without reallocating
    ///
    /// The capacity is split evenly across the default number of stripes.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use safemap::ConcurrentMap;
    ///
    /// let map: ConcurrentMap<i32, String> = ConcurrentMap::with_capacity(100);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::build(capacity, DEFAULT_STRIPES)
    }

    /// Create an empty map with `stripes` independently locked stripes
    ///
    /// The count is rounded up to the next power of 2, with a minimum of 1.
    /// A single stripe gives a map guarded by one lock.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use safemap::ConcurrentMap;
    ///
    /// let map: ConcurrentMap<i32, String> = ConcurrentMap::with_stripes(5);
    /// assert_eq!(map.stripes(), 8);
    /// ```
    pub fn with_stripes(stripes: usize) -> Self {
        Self::build(DEFAULT_CAPACITY, stripes)
    }

    /// Number of independently locked stripes
    pub fn stripes(&self) -> usize {
        self.stripes.len()
    }

    fn build(capacity: usize, stripes: usize) -> Self {
        let stripes = stripes.max(1).next_power_of_two();
        let per_stripe = capacity.div_ceil(stripes);

        log::trace!(
            "creating concurrent map with {} stripes of capacity {}",
            stripes,
            per_stripe
        );

        let stripes: Box<[Stripe<K, V>]> = (0..stripes)
            .map(|_| {
                CachePadded::new(RwLock::new(FxHashMap::with_capacity_and_hasher(
                    per_stripe,
                    Default::default(),
                )))
            })
            .collect();

        Self {
            mask: stripes.len() - 1,
            stripes,
            length: CachePadded::new(AtomicIsize::new(0)),
            metrics: AtomicMetrics::default(),
        }
    }

    fn stripe_for<Q>(&self, key: &Q) -> &RwLock<FxHashMap<K, V>>
    where
        Q: Hash + ?Sized,
    {
        let mut hasher = FxHasher64::default();
        key.hash(&mut hasher);
        let index = ((hasher.finish() >> 32) as usize) & self.mask;
        &self.stripes[index]
    }
}

impl<K, V> ConcurrentMap<K, V>
where
    K: Hash + Eq,
{
    /// Count live entries by visiting every stripe
    ///
    /// Unlike [`size`](SafeMap::size) this reflects the store itself, at the
    /// cost of taking each stripe's read lock in turn. Entries mutated while the
    /// count is running may or may not be included.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use safemap::{ConcurrentMap, SafeMap};
    ///
    /// let map: ConcurrentMap<i32, i32> = ConcurrentMap::new();
    /// map.set(1, 1);
    /// map.set(1, 2);
    /// assert_eq!(map.size(), 2);
    /// assert_eq!(map.count_entries(), 1);
    /// ```
    pub fn count_entries(&self) -> usize {
        let entries: usize = self.stripes.iter().map(|stripe| stripe.read().len()).sum();
        let counter = self.length.load(Ordering::Relaxed);
        if counter != entries as isize {
            log::debug!(
                "size counter drift: counter={} entries={}",
                counter,
                entries
            );
        }
        entries
    }

    /// Check whether the store holds no entries
    ///
    /// This inspects the stripes rather than the size counter, so it stays
    /// accurate after the counter has drifted.
    pub fn is_empty(&self) -> bool {
        self.stripes.iter().all(|stripe| stripe.read().is_empty())
    }

    /// Remove all entries and reset the size counter to zero
    ///
    /// Stripes are cleared one at a time; entries inserted concurrently into an
    /// already-cleared stripe survive, while the counter is still reset.
    pub fn clear(&self) {
        for stripe in self.stripes.iter() {
            let drained = core::mem::take(&mut *stripe.write());
            drop(drained);
        }
        self.length.store(0, Ordering::Relaxed);
        log::trace!("cleared concurrent map");
    }
}

impl<K, V> SafeMap<K, V> for ConcurrentMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn set(&self, key: K, value: V) {
        let _previous = self.stripe_for(&key).write().insert(key, value);
        self.metrics.record_store();
        self.length.fetch_add(1, Ordering::Relaxed);
    }

    fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let value = self.stripe_for(key).read().get(key).cloned();
        self.metrics.record_load(value.is_some());
        value
    }

    fn delete<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let removed = self.stripe_for(key).write().remove(key);
        if removed.is_some() {
            self.metrics.record_removal();
        }
        self.length.fetch_sub(1, Ordering::Relaxed);
    }

    fn get_and_delete<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let removed = self.stripe_for(key).write().remove(key);
        self.metrics.record_load(removed.is_some());
        if removed.is_some() {
            self.metrics.record_removal();
            self.length.fetch_sub(1, Ordering::Relaxed);
        }
        removed
    }

    fn get_or_set(&self, key: K, value: V) -> (V, bool) {
        let (stored, loaded) = match self.stripe_for(&key).write().entry(key) {
            Entry::Occupied(entry) => (entry.get().clone(), true),
            Entry::Vacant(entry) => (entry.insert(value).clone(), false),
        };

        self.metrics.record_load(loaded);
        if !loaded {
            self.metrics.record_insert();
            self.length.fetch_add(1, Ordering::Relaxed);
        }
        (stored, loaded)
    }

    fn range<F>(&self, mut visit: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        for stripe in self.stripes.iter() {
            // Copy out so `visit` runs without the lock and may re-enter the map
            let snapshot: Vec<(K, V)> = stripe
                .read()
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();

            for (key, value) in &snapshot {
                if !visit(key, value) {
                    return;
                }
            }
        }
    }

    fn size(&self) -> isize {
        self.length.load(Ordering::Relaxed)
    }
}

impl<K, V> MetricsCollector for ConcurrentMap<K, V> {
    fn metrics(&self) -> MapMetrics {
        self.metrics.snapshot()
    }

    fn reset_metrics(&self) {
        self.metrics.reset();
    }

    fn set_metrics_enabled(&self, enabled: bool) {
        self.metrics.set_enabled(enabled);
    }

    fn is_metrics_enabled(&self) -> bool {
        self.metrics.is_enabled()
    }
}

impl<K, V> Default for ConcurrentMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for ConcurrentMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentMap")
            .field("size", &self.length.load(Ordering::Relaxed))
            .field("stripes", &self.stripes.len())
            .finish_non_exhaustive()
    }
}

impl<K, V> Extend<(K, V)> for ConcurrentMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for ConcurrentMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}
