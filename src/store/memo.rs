//! Memoized derived values with stable identity.
//!
//! A [`Memo`] caches the last value computed for a key. Reading with the same
//! key hands back the same `Rc`. Reading with a new key recomputes, but if the
//! fresh value is content-equal to the cached one the cached `Rc` is kept, so
//! callers comparing with `Rc::ptr_eq` only see a change when content changed.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub struct Memo<K, V: ?Sized> {
    slot: RefCell<Option<(K, Rc<V>)>>,
    computations: Cell<u64>,
}

impl<K, V: ?Sized> Default for Memo<K, V> {
    fn default() -> Self {
        Self {
            slot: RefCell::new(None),
            computations: Cell::new(0),
        }
    }
}

impl<K: PartialEq, V: ?Sized + PartialEq> Memo<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, computing it on a miss.
    pub fn get_or_compute(&self, key: K, compute: impl FnOnce() -> Rc<V>) -> Rc<V> {
        let mut slot = self.slot.borrow_mut();
        if let Some((cached_key, cached)) = slot.as_ref() {
            if *cached_key == key {
                return Rc::clone(cached);
            }
        }

        self.computations.set(self.computations.get() + 1);
        let fresh = compute();
        let value = match slot.take() {
            Some((_, cached)) if cached == fresh => cached,
            _ => fresh,
        };
        *slot = Some((key, Rc::clone(&value)));
        value
    }

    /// Number of times the compute closure has run.
    pub fn computations(&self) -> u64 {
        self.computations.get()
    }
}
