//! The raw allocation primitive a typed allocator is built on.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::ptr::NonNull;
use std::sync::Arc;

/// Byte-level allocation facility injected into a typed allocator.
///
/// Typed allocators never call a primitive with a zero-size layout.
///
/// # Safety
///
/// Implementors must return, from [`raw_allocate`](Self::raw_allocate),
/// storage that is valid for `layout.size()` bytes, aligned to
/// `layout.align()`, and disjoint from every other live allocation made
/// through the same primitive (or any primitive that compares equal to
/// it). Storage must stay valid until passed to
/// [`raw_deallocate`](Self::raw_deallocate).
pub unsafe trait RawAlloc {
    /// Obtain uninitialised storage for `layout`, or `None` on exhaustion.
    fn raw_allocate(&self, layout: Layout) -> Option<NonNull<u8>>;

    /// Return storage obtained from [`raw_allocate`](Self::raw_allocate).
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `raw_allocate` on this primitive
    /// (or one that compares equal) with exactly `layout`, and must not
    /// have been released since.
    unsafe fn raw_deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

// SAFETY: forwards to `P`, which upholds the contract.
unsafe impl<P: RawAlloc + ?Sized> RawAlloc for &P {
    fn raw_allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        (**self).raw_allocate(layout)
    }

    unsafe fn raw_deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: caller upholds the contract for `P`.
        unsafe { (**self).raw_deallocate(ptr, layout) }
    }
}

// SAFETY: forwards to `P`, which upholds the contract.
unsafe impl<P: RawAlloc + ?Sized> RawAlloc for Arc<P> {
    fn raw_allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        (**self).raw_allocate(layout)
    }

    unsafe fn raw_deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: caller upholds the contract for `P`.
        unsafe { (**self).raw_deallocate(ptr, layout) }
    }
}
