//! tyalloc: exact-size typed memory allocation.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the tyalloc sub-crates. For most users, adding `tyalloc` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use tyalloc::prelude::*;
//!
//! let alloc = TypedAllocator::<i32>::new();
//! let handle = alloc.allocate(4).unwrap();
//! unsafe {
//!     for i in 0..4 {
//!         handle.as_ptr().add(i).write(i as i32);
//!     }
//!     assert_eq!(handle.as_ptr().add(3).read(), 3);
//!     alloc.deallocate(handle, 4).unwrap();
//! }
//!
//! let bytes = TypedAllocator::<u8>::new();
//! assert!(matches!(
//!     bytes.allocate(usize::MAX),
//!     Err(AllocError::AllocationTooLarge { .. })
//! ));
//! ```
//!
//! # Tracked release
//!
//! ```rust
//! use tyalloc::prelude::*;
//!
//! let alloc = TypedAllocator::<u64, _>::with_config(SystemAlloc, AllocConfig::tracked()).unwrap();
//! let handle = alloc.allocate(8).unwrap();
//! let rejected = unsafe { alloc.deallocate(handle, 7) }.unwrap_err();
//! assert!(matches!(rejected.error, AllocError::InvalidRelease { .. }));
//! unsafe { alloc.deallocate(rejected.handle, 8).unwrap() };
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Core types (`tyalloc-core`).
///
/// The [`types::ElementLayout`] descriptor, the [`types::RawAlloc`]
/// primitive trait, configuration, and error types.
pub use tyalloc_core as types;

/// The typed allocator and its collaborators (`tyalloc-typed`).
///
/// [`typed::TypedAllocator`], [`typed::StorageHandle`], the
/// [`typed::SystemAlloc`] primitive, the [`typed::ReleaseLedger`] and the
/// [`typed::Instrumented`] wrapper.
pub use tyalloc_typed as typed;

/// Common imports for typical tyalloc usage.
///
/// ```rust
/// use tyalloc::prelude::*;
/// ```
pub mod prelude {
    pub use tyalloc_core::{
        AllocConfig, AllocError, ElementLayout, RawAlloc, ReleaseFault, ReleasePolicy,
    };
    pub use tyalloc_typed::{
        AllocStats, Allocation, Instrumented, RejectedRelease, StorageHandle, SystemAlloc,
        TypedAllocator,
    };
}
