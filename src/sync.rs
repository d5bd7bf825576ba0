//! Synchronization primitives used by the map.
//!
//! Normal builds use `parking_lot` locks and `core` atomics. Building with
//! `RUSTFLAGS="--cfg loom"` swaps in the `loom` equivalents so the map itself
//! can be model-checked.

#[cfg(not(loom))]
pub(crate) use core::sync::atomic::{AtomicIsize, Ordering};
#[cfg(not(loom))]
pub(crate) use parking_lot::RwLock;

#[cfg(loom)]
pub(crate) use loom::sync::atomic::{AtomicIsize, Ordering};

#[cfg(loom)]
pub(crate) use self::loom_rwlock::RwLock;

#[cfg(loom)]
mod loom_rwlock {
    use loom::sync::{RwLockReadGuard, RwLockWriteGuard};

    /// `loom::sync::RwLock` behind the non-poisoning `parking_lot` signature
    #[derive(Debug)]
    pub(crate) struct RwLock<T>(loom::sync::RwLock<T>);

    impl<T> RwLock<T> {
        pub(crate) fn new(value: T) -> Self {
            Self(loom::sync::RwLock::new(value))
        }

        pub(crate) fn read(&self) -> RwLockReadGuard<'_, T> {
            self.0.read().expect("loom rwlock poisoned")
        }

        pub(crate) fn write(&self) -> RwLockWriteGuard<'_, T> {
            self.0.write().expect("loom rwlock poisoned")
        }
    }
}
