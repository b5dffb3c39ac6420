//! Benchmark profiles for the tyalloc typed allocator.
//!
//! - [`MIXED_COUNTS`]: element counts cycled through by churn benchmarks
//! - [`tracked`]: a system-backed allocator with tracked release
//! - [`churn`]: allocate a batch, then release it in reverse order

#![deny(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use tyalloc_core::{AllocConfig, AllocError, RawAlloc};
use tyalloc_typed::{StorageHandle, SystemAlloc, TypedAllocator};

/// Element counts used by churn benchmarks: small, medium and page-sized.
pub const MIXED_COUNTS: &[usize] = &[1, 4, 16, 64, 256, 1024];

/// System-backed allocator with tracked release.
pub fn tracked<T>() -> TypedAllocator<T, SystemAlloc> {
    TypedAllocator::with_config(SystemAlloc, AllocConfig::tracked())
        .expect("default tracked config is valid")
}

/// Allocate one block per entry of `counts`, then release them all,
/// last first. Returns the number of blocks cycled.
#[allow(unsafe_code)]
pub fn churn<T, P: RawAlloc>(
    alloc: &TypedAllocator<T, P>,
    counts: &[usize],
) -> Result<usize, AllocError> {
    let mut live: Vec<(StorageHandle<T>, usize)> = Vec::with_capacity(counts.len());
    for &n in counts {
        live.push((alloc.allocate(n)?, n));
    }
    let cycled = live.len();
    while let Some((handle, n)) = live.pop() {
        // SAFETY: `handle` was just allocated by `alloc` with `n` and no
        // element lifetime was begun in it.
        unsafe { alloc.deallocate(handle, n)? };
    }
    Ok(cycled)
}
