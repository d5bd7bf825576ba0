//! Map implementations
//!
//! This module provides the [`SafeMap`] contract and its lock-striped
//! implementation.
//!
//! ## Available Maps
//!
//! - [`ConcurrentMap`]: lock-striped store with an approximate size counter
//!
//! ## Size Accounting
//!
//! [`SafeMap::size`] reports a counter, not a recount of the store. The counter
//! moves by exactly one step per counting operation:
//!
//! | Operation | Counter |
//! |-----------|---------|
//! | `set` | +1, even when overwriting |
//! | `get_or_set` | +1 only when it created the entry |
//! | `delete` | -1, even when the key was absent |
//! | `get_and_delete` | -1 only when it removed an entry |
//!
//! Overwrites therefore inflate the counter and deleting absent keys deflates
//! it, possibly below zero. Use [`ConcurrentMap::count_entries`] when the exact
//! number of live entries matters.

use core::borrow::Borrow;
use core::hash::Hash;

pub mod concurrent;

pub use self::concurrent::ConcurrentMap;

/// A key-value map that any number of threads may use through a shared reference
///
/// Every method takes `&self`. Single-key operations are atomic with respect to
/// that key; nothing is atomic across keys, and the size counter is adjusted in
/// a separate step from the store mutation.
///
/// Lookups accept any borrowed form of the key, so a map keyed by `String` can
/// be queried with `&str`.
///
/// # Examples
///
/// ```rust
/// use safemap::{ConcurrentMap, SafeMap};
///
/// let map: ConcurrentMap<String, u32> = ConcurrentMap::new();
/// map.set("a".to_string(), 1);
/// assert_eq!(map.get("a"), Some(1));
/// assert_eq!(map.get_or_set("a".to_string(), 2), (1, true));
/// assert_eq!(map.get_and_delete("a"), Some(1));
/// assert_eq!(map.get_or_zero("a"), 0);
/// ```
pub trait SafeMap<K, V> {
    /// Insert `value` for `key`, replacing any existing value
    ///
    /// Always increments the size counter, including when an existing value is
    /// overwritten.
    fn set(&self, key: K, value: V);

    /// Current value for `key`, or `None` if absent
    fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized;

    /// Current value for `key`, or `V::default()` if absent
    fn get_or_zero<Q>(&self, key: &Q) -> V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Default,
    {
        self.get(key).unwrap_or_default()
    }

    /// Remove the entry for `key` if present
    ///
    /// Always decrements the size counter, including when `key` was absent.
    fn delete<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized;

    /// Remove the entry for `key` and return its value in one atomic step
    ///
    /// The size counter is decremented only when an entry was removed.
    fn get_and_delete<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized;

    /// Insert `value` only if `key` is absent, in one atomic step
    ///
    /// Returns the value now stored for `key` and `true` if it was already
    /// present (in which case `value` is dropped). The size counter is
    /// incremented only when a new entry was created.
    fn get_or_set(&self, key: K, value: V) -> (V, bool);

    /// Call `visit` for each entry until it returns `false`
    ///
    /// Order is unspecified. Entries inserted or removed concurrently may or
    /// may not be observed. `visit` may call back into the map.
    fn range<F>(&self, visit: F)
    where
        F: FnMut(&K, &V) -> bool;

    /// The size counter
    ///
    /// This is not a recount of the store; see the [module docs](crate::map) for
    /// how each operation moves it.
    fn size(&self) -> isize;
}


#[cfg(all(test, not(loom)))]
mod proptests;
