// Shallow reactive reference

use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// A value that is replaced wholesale, never mutated in place.
///
/// Each replacement bumps a version counter, which is what a renderer
/// compares to decide whether to redraw. Clones share the same slot.
#[derive(Debug)]
pub struct ShallowRef<T> {
    inner: Arc<Slot<T>>,
}

#[derive(Debug)]
struct Slot<T> {
    value: RwLock<T>,
    version: AtomicU64,
}

impl<T: Clone> ShallowRef<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Slot {
                value: RwLock::new(value),
                version: AtomicU64::new(0),
            }),
        }
    }

    /// Copy of the current value
    pub fn value(&self) -> T {
        self.inner.value.read().clone()
    }

    /// Borrow the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.read())
    }

    /// Number of replacements so far
    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::SeqCst)
    }

    pub(crate) fn replace(&self, value: T) {
        *self.inner.value.write() = value;
        self.inner.version.fetch_add(1, Ordering::SeqCst);
    }
}

impl<T> Clone for ShallowRef<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}
