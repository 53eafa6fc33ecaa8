//! A small free-list of [`AttemptExecution`] slots, recycled across
//! invocations to avoid an allocation per attempt under steady load.

use crate::attempt::AttemptExecution;
use crate::context::{AttemptKind, ResilienceContext};
use std::sync::Mutex;

/// Pool of reusable attempt slots.
///
/// Slots are only returned to the free list once their attempt has
/// completed and its outcome was not the one accepted as the invocation's
/// result — an in-flight or winning attempt's bookkeeping must not be
/// silently discarded, so [`put`](Self::put) rejects anything else and
/// drops it instead.
pub struct AttemptPool<T, E> {
    free: Mutex<Vec<AttemptExecution<T, E>>>,
}

impl<T, E> AttemptPool<T, E> {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            free: Mutex::new(Vec::new()),
        }
    }

    /// Hands out a slot for a new attempt, reusing a recycled one if the
    /// free list is non-empty.
    pub(crate) fn get(&self, kind: AttemptKind, index: usize, context: ResilienceContext) -> AttemptExecution<T, E> {
        let recycled = self.free.lock().expect("attempt pool mutex poisoned").pop();
        match recycled {
            Some(mut slot) => {
                slot.reinitialize(kind, index, context);
                slot
            }
            None => AttemptExecution::initialize(kind, index, context),
        }
    }

    /// Returns a slot to the pool once its attempt is finished, provided
    /// it wasn't the accepted outcome. Slots that are still in flight, or
    /// that hold the winning outcome, are defensively rejected rather than
    /// recycled.
    pub(crate) fn put(&self, slot: AttemptExecution<T, E>) {
        if !slot.is_completed() || slot.is_accepted() {
            return;
        }
        self.free.lock().expect("attempt pool mutex poisoned").push(slot);
    }

    /// Number of slots currently sitting in the free list. Exposed for
    /// tests; not part of the pool's operational contract.
    #[cfg(test)]
    pub(crate) fn free_len(&self) -> usize {
        self.free.lock().expect("attempt pool mutex poisoned").len()
    }
}

impl<T, E> Default for AttemptPool<T, E> {
    fn default() -> Self {
        Self::new()
    }
}
