//! Test utilities and fake allocation primitives for tyalloc development.
//!
//! Provides [`BoundedAlloc`], a budgeted primitive that simulates
//! exhaustion deterministically and counts every call, and
//! [`FailingAlloc`], which never succeeds.

#![deny(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::alloc::Layout;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};

use tyalloc_core::RawAlloc;

/// Primitive backed by the global allocator with a hard byte budget.
///
/// Requests that would push live bytes above the budget fail as if the
/// system were exhausted. Every call is counted, including failed ones,
/// so tests can assert that a code path never reached the primitive.
///
/// Two `BoundedAlloc`s compare equal only if they are the same instance.
pub struct BoundedAlloc {
    budget: usize,
    live_bytes: AtomicUsize,
    live_allocations: AtomicUsize,
    allocate_calls: AtomicUsize,
    deallocate_calls: AtomicUsize,
}

impl BoundedAlloc {
    pub fn new(budget: usize) -> Self {
        Self {
            budget,
            live_bytes: AtomicUsize::new(0),
            live_allocations: AtomicUsize::new(0),
            allocate_calls: AtomicUsize::new(0),
            deallocate_calls: AtomicUsize::new(0),
        }
    }

    /// A primitive whose budget is never the limiting factor.
    pub fn unbounded() -> Self {
        Self::new(usize::MAX)
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Bytes handed out and not yet returned.
    pub fn live_bytes(&self) -> usize {
        self.live_bytes.load(Ordering::Acquire)
    }

    /// Allocations handed out and not yet returned.
    pub fn live_allocations(&self) -> usize {
        self.live_allocations.load(Ordering::Acquire)
    }

    /// Total `raw_allocate` calls, successful or not.
    pub fn allocate_calls(&self) -> usize {
        self.allocate_calls.load(Ordering::Acquire)
    }

    /// Total `raw_deallocate` calls.
    pub fn deallocate_calls(&self) -> usize {
        self.deallocate_calls.load(Ordering::Acquire)
    }

    fn reserve(&self, bytes: usize) -> bool {
        self.live_bytes
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |live| {
                live.checked_add(bytes).filter(|&total| total <= self.budget)
            })
            .is_ok()
    }
}

impl Default for BoundedAlloc {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl PartialEq for BoundedAlloc {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for BoundedAlloc {}

impl std::fmt::Debug for BoundedAlloc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedAlloc")
            .field("budget", &self.budget)
            .field("live_bytes", &self.live_bytes())
            .field("live_allocations", &self.live_allocations())
            .finish()
    }
}

// SAFETY: storage comes from the global allocator, which returns
// disjoint, correctly aligned blocks; the budget only ever refuses.
#[allow(unsafe_code)]
unsafe impl RawAlloc for BoundedAlloc {
    fn raw_allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        self.allocate_calls.fetch_add(1, Ordering::AcqRel);
        if layout.size() == 0 || !self.reserve(layout.size()) {
            return None;
        }
        // SAFETY: layout has non-zero size.
        let ptr = unsafe { std::alloc::alloc(layout) };
        match NonNull::new(ptr) {
            Some(ptr) => {
                self.live_allocations.fetch_add(1, Ordering::AcqRel);
                Some(ptr)
            }
            None => {
                self.live_bytes.fetch_sub(layout.size(), Ordering::AcqRel);
                None
            }
        }
    }

    unsafe fn raw_deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.deallocate_calls.fetch_add(1, Ordering::AcqRel);
        // SAFETY: caller guarantees `ptr` came from `raw_allocate` with `layout`.
        unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) };
        self.live_bytes.fetch_sub(layout.size(), Ordering::AcqRel);
        self.live_allocations.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Primitive that is permanently exhausted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FailingAlloc;

// SAFETY: never hands out storage.
#[allow(unsafe_code)]
unsafe impl RawAlloc for FailingAlloc {
    fn raw_allocate(&self, _layout: Layout) -> Option<NonNull<u8>> {
        None
    }

    unsafe fn raw_deallocate(&self, _ptr: NonNull<u8>, _layout: Layout) {
        panic!("FailingAlloc never hands out storage, nothing can be released");
    }
}
