//! Opaque handles to raw typed storage.

#![allow(unsafe_code)]

use std::error::Error;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ptr::NonNull;

use tyalloc_core::AllocError;

/// Handle to uninitialised storage for some number of `T`.
///
/// Carries no element count: the caller must remember the `n` it
/// allocated with and pass the same value back to
/// [`TypedAllocator::deallocate`](crate::TypedAllocator::deallocate).
///
/// Move-only. A successful `deallocate` consumes the handle, so releasing
/// it twice from safe code does not compile; a refused one hands it back
/// in a [`RejectedRelease`]. Zero-byte allocations yield a
/// dangling, aligned sentinel that must not be dereferenced.
#[must_use = "dropping a StorageHandle leaks its storage"]
pub struct StorageHandle<T> {
    ptr: NonNull<T>,
}

impl<T> StorageHandle<T> {
    pub(crate) fn new(ptr: NonNull<T>) -> Self {
        Self { ptr }
    }

    /// Sentinel for zero-byte requests. Aligned for `T`, never dereferenced.
    pub(crate) fn dangling() -> Self {
        Self {
            ptr: NonNull::dangling(),
        }
    }

    /// Raw pointer to the first element slot.
    pub fn as_ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Non-null pointer to the first element slot.
    pub fn as_non_null(&self) -> NonNull<T> {
        self.ptr
    }

    /// Numeric address of the storage.
    pub fn address(&self) -> usize {
        self.ptr.as_ptr() as usize
    }

    /// Give up the handle, keeping only the pointer.
    pub fn into_raw(self) -> NonNull<T> {
        self.ptr
    }

    /// Rebuild a handle from a pointer produced by [`into_raw`](Self::into_raw)
    /// or [`as_non_null`](Self::as_non_null).
    ///
    /// # Safety
    ///
    /// `ptr` must designate storage returned by a typed allocator for `T`
    /// that has not been released, and at most one handle may exist for it
    /// when it is released.
    pub unsafe fn from_raw(ptr: NonNull<T>) -> Self {
        Self { ptr }
    }
}

impl<T> fmt::Debug for StorageHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StorageHandle").field(&self.ptr).finish()
    }
}

impl<T> PartialEq for StorageHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr == other.ptr
    }
}

impl<T> Eq for StorageHandle<T> {}

impl<T> Hash for StorageHandle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ptr.hash(state);
    }
}

// SAFETY: the handle owns its storage exclusively, like `Box<[T]>`.
unsafe impl<T: Send> Send for StorageHandle<T> {}
// SAFETY: shared access only exposes the pointer value.
unsafe impl<T: Sync> Sync for StorageHandle<T> {}

/// Result of [`TypedAllocator::allocate_at_least`](crate::TypedAllocator::allocate_at_least).
#[must_use = "dropping an Allocation leaks its storage"]
#[derive(Debug)]
pub struct Allocation<T> {
    /// The storage.
    pub handle: StorageHandle<T>,
    /// Element count the storage can hold; pass it to `deallocate`.
    pub count: usize,
}

/// A release that was refused, handing the storage back to the caller.
///
/// Returned by [`TypedAllocator::deallocate`](crate::TypedAllocator::deallocate)
/// instead of consuming the handle, so the storage can still be released
/// correctly afterwards.
#[must_use = "dropping a RejectedRelease leaks its storage"]
pub struct RejectedRelease<T> {
    /// The handle passed to `deallocate`, untouched.
    pub handle: StorageHandle<T>,
    /// Why the release was refused.
    pub error: AllocError,
}

impl<T> fmt::Debug for RejectedRelease<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RejectedRelease")
            .field("handle", &self.handle)
            .field("error", &self.error)
            .finish()
    }
}

impl<T> fmt::Display for RejectedRelease<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "release of {:#x} refused: {}", self.handle.address(), self.error)
    }
}

impl<T> Error for RejectedRelease<T> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.error)
    }
}

impl<T> From<RejectedRelease<T>> for AllocError {
    fn from(rejected: RejectedRelease<T>) -> Self {
        rejected.error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dangling_is_aligned_for_t() {
        let h = StorageHandle::<u64>::dangling();
        assert_eq!(h.address() % std::mem::align_of::<u64>(), 0);
        assert_ne!(h.address(), 0);
    }

    #[test]
    fn raw_round_trip_preserves_address() {
        let mut slot = 7u32;
        let h = StorageHandle::new(NonNull::from(&mut slot));
        let addr = h.address();
        let raw = h.into_raw();
        let h = unsafe { StorageHandle::from_raw(raw) };
        assert_eq!(h.address(), addr);
        assert_eq!(unsafe { *h.as_ptr() }, 7);
    }

    // Neither PartialEq nor Hash.
    #[allow(dead_code)]
    struct Opaque;

    #[test]
    fn equality_and_hash_ignore_element_type() {
        use std::collections::HashSet;

        let mut a = [0u8; 2];
        let first = StorageHandle::new(NonNull::from(&mut a[0]).cast::<Opaque>());
        let again = unsafe { StorageHandle::from_raw(first.as_non_null()) };
        let second = StorageHandle::new(NonNull::from(&mut a[1]).cast::<Opaque>());
        assert_eq!(first, again);
        assert_ne!(first, second);

        let set: HashSet<_> = [first, again, second].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn rejected_release_displays_address_and_cause() {
        let mut slot = 0u64;
        let rejected = RejectedRelease {
            handle: StorageHandle::new(NonNull::from(&mut slot)),
            error: AllocError::OutOfMemory { bytes: 8, align: 8 },
        };
        let address = rejected.handle.address();
        assert_eq!(
            rejected.to_string(),
            format!("release of {address:#x} refused: out of memory: 8 bytes at align 8")
        );
        assert!(rejected.source().is_some());
        let error: AllocError = rejected.into();
        assert!(error.is_retryable());
    }
}
