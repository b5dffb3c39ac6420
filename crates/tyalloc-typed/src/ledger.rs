//! Live-allocation ledger for tracked release.
//!
//! Maps each live address to the element count it was allocated with.
//! A tracked allocator consults the ledger before returning storage to
//! its primitive, so foreign handles, double releases and count
//! mismatches become [`ReleaseFault`]s instead of undefined behaviour.
//! Zero-byte sentinels are never recorded.

use std::sync::{Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;
use tyalloc_core::ReleaseFault;

/// Address → element count map, shared by clones of a tracked allocator.
///
/// Read-only outside this crate: only the owning allocator records and
/// releases entries.
///
/// ```compile_fail
/// use tyalloc_core::AllocConfig;
/// use tyalloc_typed::{SystemAlloc, TypedAllocator};
///
/// let alloc = TypedAllocator::<u32>::with_config(SystemAlloc, AllocConfig::tracked()).unwrap();
/// let handle = alloc.allocate(4).unwrap();
/// let _ = alloc.ledger().unwrap().release(handle.address(), 4, false);
/// ```
///
/// ```compile_fail
/// use tyalloc_core::AllocConfig;
/// use tyalloc_typed::{SystemAlloc, TypedAllocator};
///
/// let alloc = TypedAllocator::<u32>::with_config(SystemAlloc, AllocConfig::tracked()).unwrap();
/// alloc.ledger().unwrap().record(0x1000, 4);
/// ```
#[derive(Debug, Default)]
pub struct ReleaseLedger {
    live: Mutex<IndexMap<usize, usize>>,
}

impl ReleaseLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    // Every operation leaves the map consistent, so a poisoned lock is safe to reuse.
    fn lock(&self) -> MutexGuard<'_, IndexMap<usize, usize>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a fresh allocation.
    pub(crate) fn record(&self, address: usize, count: usize) {
        let previous = self.lock().insert(address, count);
        debug_assert!(
            previous.is_none(),
            "primitive returned live address {address:#x} twice"
        );
    }

    /// Validate and remove an allocation about to be released.
    ///
    /// `empty` marks a zero-byte release, which is accepted for any
    /// address that is not a recorded live allocation. On a
    /// [`CountMismatch`](ReleaseFault::CountMismatch) the entry stays
    /// recorded so a corrected release can still succeed.
    pub(crate) fn release(&self, address: usize, count: usize, empty: bool) -> Result<(), ReleaseFault> {
        let mut live = self.lock();
        match live.get(&address).copied() {
            Some(allocated) if allocated == count => {
                live.swap_remove(&address);
                Ok(())
            }
            Some(allocated) => {
                log::warn!(
                    "rejected release of {address:#x}: allocated {allocated} elements, released {count}"
                );
                Err(ReleaseFault::CountMismatch {
                    address,
                    allocated,
                    released: count,
                })
            }
            None if empty => Ok(()),
            None => {
                log::warn!("rejected release of {address:#x}: not a live allocation");
                Err(ReleaseFault::UnknownHandle { address })
            }
        }
    }

    /// Number of live recorded allocations.
    pub fn live_count(&self) -> usize {
        self.lock().len()
    }

    /// Element count recorded for `address`, if live.
    pub fn count_of(&self, address: usize) -> Option<usize> {
        self.lock().get(&address).copied()
    }

    /// Snapshot of live `(address, count)` pairs.
    ///
    /// Allocation order, except that each release moves the most recent
    /// entry into the released slot.
    pub fn outstanding(&self) -> Vec<(usize, usize)> {
        self.lock().iter().map(|(&a, &c)| (a, c)).collect()
    }
}
