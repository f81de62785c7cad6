//! Typed object pools.
//!
//! A `parking_lot::Mutex<Vec<T>>` guarding a free list, generic over any
//! `Resettable` type, with a `clear`-before-store contract that never drops
//! allocated capacity, a minimum-capacity cutoff for slice-backed types,
//! and an outstanding-count diagnostic for leak detection in tests.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Anything that can be reset to an empty-but-still-allocated state before
/// being returned to a [`Pool`].
pub trait Resettable {
    /// Clear contents while preserving backing capacity.
    fn reset(&mut self);
    /// Current backing capacity, used by [`Pool::put_back`] to discard
    /// entries that shrank below the pool's minimum.
    fn capacity(&self) -> usize {
        0
    }
}

impl Resettable for String {
    fn reset(&mut self) {
        self.clear();
    }
    fn capacity(&self) -> usize {
        String::capacity(self)
    }
}

impl<T> Resettable for Vec<T> {
    fn reset(&mut self) {
        self.clear();
    }
    fn capacity(&self) -> usize {
        Vec::capacity(self)
    }
}

/// A thread-safe free list of pre-allocated `T`s.
///
/// `get_or_new` never blocks on I/O and never allocates beyond what
/// `factory` does on a miss. `put_back` resets the value and returns it to
/// the free list unless it has fewer than `min_capacity` bytes/elements of
/// backing storage, in which case it is simply dropped. A pool of
/// undersized buffers is worse than no pool.
pub struct Pool<T> {
    free: Mutex<Vec<T>>,
    factory: Box<dyn Fn() -> T + Send + Sync>,
    max_free: usize,
    min_capacity: usize,
    outstanding: AtomicUsize,
}

impl<T: Resettable> Pool<T> {
    pub fn new(max_free: usize, factory: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Pool {
            free: Mutex::new(Vec::with_capacity(max_free)),
            factory: Box::new(factory),
            max_free,
            min_capacity: 0,
            outstanding: AtomicUsize::new(0),
        }
    }

    /// Discard returned items whose capacity falls below `min_capacity`
    /// instead of pooling them.
    pub fn with_min_capacity(mut self, min_capacity: usize) -> Self {
        self.min_capacity = min_capacity;
        self
    }

    /// Take an item from the free list, or construct a fresh one.
    pub fn get_or_new(&self) -> T {
        self.outstanding.fetch_add(1, Ordering::Relaxed);
        let mut free = self.free.lock();
        free.pop().unwrap_or_else(|| (self.factory)())
    }

    /// Reset `item` and return it to the free list, subject to
    /// `max_free`/`min_capacity`.
    pub fn put_back(&self, mut item: T) {
        self.outstanding.fetch_sub(1, Ordering::Relaxed);
        item.reset();
        if item.capacity() < self.min_capacity {
            return;
        }
        let mut free = self.free.lock();
        if free.len() < self.max_free {
            free.push(item);
        }
    }

    /// Number of items currently checked out (test/diagnostic use only).
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Relaxed)
    }

    /// Number of items currently sitting in the free list.
    pub fn free_count(&self) -> usize {
        self.free.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reuses_returned_items_instead_of_allocating() {
        let pool: Pool<String> = Pool::new(4, || String::with_capacity(64));
        let mut s = pool.get_or_new();
        s.push_str("hello");
        let cap_before = s.capacity();
        pool.put_back(s);

        assert_eq!(pool.free_count(), 1);
        let s2 = pool.get_or_new();
        assert!(s2.is_empty());
        assert_eq!(s2.capacity(), cap_before, "capacity must survive recycling");
    }

    #[test]
    fn outstanding_count_tracks_checkouts() {
        let pool: Pool<Vec<u8>> = Pool::new(4, Vec::new);
        let a = pool.get_or_new();
        let b = pool.get_or_new();
        assert_eq!(pool.outstanding(), 2);
        pool.put_back(a);
        assert_eq!(pool.outstanding(), 1);
        pool.put_back(b);
        assert_eq!(pool.outstanding(), 0);
    }

    #[test]
    fn undersized_items_are_dropped_not_pooled() {
        let pool: Pool<Vec<u8>> = Pool::new(4, || Vec::with_capacity(16)).with_min_capacity(8);
        pool.put_back(Vec::with_capacity(2));
        assert_eq!(pool.free_count(), 0);
    }

    #[test]
    fn respects_max_free() {
        let pool: Pool<String> = Pool::new(1, String::new);
        pool.put_back(String::new());
        pool.put_back(String::new());
        assert_eq!(pool.free_count(), 1);
    }
}
