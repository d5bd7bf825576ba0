//! # safemap
//!
//! A generic concurrency-safe key-value map for sharing state (caches,
//! registries, counters) between threads without external locking.
//!
//! ## Features
//!
//! - **[`SafeMap`]**: the map contract, every operation through `&self`
//! - **[`ConcurrentMap`]**: lock-striped implementation with an approximate size counter
//! - **Metrics**: per-map hit/miss/store/removal counters via [`MetricsCollector`]
//!
//! ## Quick Start
//!
//! ```rust
//! use safemap::{ConcurrentMap, SafeMap};
//!
//! let map: ConcurrentMap<&str, u64> = ConcurrentMap::new();
//! map.set("requests", 1);
//! assert_eq!(map.get("requests"), Some(1));
//! assert_eq!(map.get_or_set("errors", 0), (0, false));
//! assert_eq!(map.size(), 2);
//!
//! let mut seen = 0;
//! map.range(|_, _| {
//!     seen += 1;
//!     true
//! });
//! assert_eq!(seen, 2);
//! ```
//!
//! ## Thread Safety
//!
//! `ConcurrentMap` is `Send + Sync` whenever its keys and values are, and is
//! shared between threads with `Arc`. Single-key operations are atomic with
//! respect to that key. Nothing is atomic across keys.
//!
//! ## Size Is Approximate
//!
//! [`SafeMap::size`] is a counter maintained beside the store, not a recount.
//! Overwriting `set`s push it up and `delete`s of absent keys push it down, so
//! it can drift from the real entry count. See the [`map`] module docs for the
//! exact arithmetic and [`ConcurrentMap::count_entries`] for an exact count.

#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

pub mod map;
pub mod metrics;
mod sync;

pub use crate::map::{ConcurrentMap, SafeMap};
pub use crate::metrics::{MapMetrics, MetricsCollector};

/// Common utilities and helper types
pub mod util {
    use core::ops::{Deref, DerefMut};

    /// Cache line size for alignment purposes
    pub const CACHE_LINE_SIZE: usize = 64;

    /// Pad a value to cache line size so neighbouring values never share a line
    #[repr(align(64))]
    #[derive(Default)]
    pub struct CachePadded<T> {
        value: T,
    }

    impl<T> CachePadded<T> {
        /// Create a new cache-padded value
        #[inline]
        pub const fn new(value: T) -> Self {
            Self { value }
        }

        /// Get the inner value
        #[inline]
        pub fn into_inner(self) -> T {
            self.value
        }
    }

    impl<T> Deref for CachePadded<T> {
        type Target = T;

        #[inline]
        fn deref(&self) -> &T {
            &self.value
        }
    }

    impl<T> DerefMut for CachePadded<T> {
        #[inline]
        fn deref_mut(&mut self) -> &mut T {
            &mut self.value
        }
    }

    impl<T: core::fmt::Debug> core::fmt::Debug for CachePadded<T> {
        fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            core::fmt::Debug::fmt(&self.value, f)
        }
    }
}
