//! The process-wide allocation primitive.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::ptr::NonNull;

use tyalloc_core::RawAlloc;

/// Primitive that forwards to the global allocator.
///
/// Stateless: every instance is interchangeable with every other.
/// Zero-size layouts are refused rather than forwarded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SystemAlloc;

// SAFETY: the global allocator returns disjoint blocks valid for the
// requested layout until they are passed to `dealloc`.
unsafe impl RawAlloc for SystemAlloc {
    fn raw_allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        if layout.size() == 0 {
            return None;
        }
        // SAFETY: layout has non-zero size.
        NonNull::new(unsafe { std::alloc::alloc(layout) })
    }

    unsafe fn raw_deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() == 0 {
            return;
        }
        // SAFETY: caller guarantees `ptr` came from `raw_allocate` with `layout`.
        unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) }
    }
}
