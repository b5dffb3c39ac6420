//! Optional call accounting and logging around a primitive.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};

use tyalloc_core::RawAlloc;

/// Point-in-time counters from an [`Instrumented`] primitive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AllocStats {
    /// Successful `raw_allocate` calls.
    pub allocations: usize,
    /// `raw_deallocate` calls.
    pub releases: usize,
    /// `raw_allocate` calls the inner primitive refused.
    pub failures: usize,
    /// Bytes currently outstanding.
    pub live_bytes: usize,
    /// Highest value `live_bytes` has reached.
    pub peak_bytes: usize,
}

impl AllocStats {
    /// Allocations not yet released.
    pub fn live_allocations(&self) -> usize {
        self.allocations.saturating_sub(self.releases)
    }
}

/// Wraps a primitive, counting calls and logging each one at `trace`.
///
/// Forwards every request unchanged, so it can sit under any typed
/// allocator without affecting results. Share one instance between
/// allocators through `&Instrumented<P>` or `Arc<Instrumented<P>>`.
#[derive(Debug, Default)]
pub struct Instrumented<P> {
    inner: P,
    allocations: AtomicUsize,
    releases: AtomicUsize,
    failures: AtomicUsize,
    live_bytes: AtomicUsize,
    peak_bytes: AtomicUsize,
}

impl<P> Instrumented<P> {
    /// Wrap `inner` with zeroed counters.
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            allocations: AtomicUsize::new(0),
            releases: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
            live_bytes: AtomicUsize::new(0),
            peak_bytes: AtomicUsize::new(0),
        }
    }

    /// The wrapped primitive.
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Current counters.
    ///
    /// Not an atomic snapshot. `releases` is read before `allocations`, so
    /// under concurrent use `allocations >= releases` still holds.
    pub fn stats(&self) -> AllocStats {
        let releases = self.releases.load(Ordering::Acquire);
        AllocStats {
            allocations: self.allocations.load(Ordering::Acquire),
            releases,
            failures: self.failures.load(Ordering::Acquire),
            live_bytes: self.live_bytes.load(Ordering::Acquire),
            peak_bytes: self.peak_bytes.load(Ordering::Acquire),
        }
    }
}

// SAFETY: forwards to `P` unchanged.
unsafe impl<P: RawAlloc> RawAlloc for Instrumented<P> {
    fn raw_allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        match self.inner.raw_allocate(layout) {
            Some(ptr) => {
                self.allocations.fetch_add(1, Ordering::AcqRel);
                let live = self.live_bytes.fetch_add(layout.size(), Ordering::AcqRel) + layout.size();
                self.peak_bytes.fetch_max(live, Ordering::AcqRel);
                log::trace!(
                    "allocate {} bytes (align {}) at {:p}, live {live}",
                    layout.size(),
                    layout.align(),
                    ptr
                );
                Some(ptr)
            }
            None => {
                self.failures.fetch_add(1, Ordering::AcqRel);
                log::debug!(
                    "primitive refused {} bytes (align {})",
                    layout.size(),
                    layout.align()
                );
                None
            }
        }
    }

    unsafe fn raw_deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: caller upholds the contract for `P`.
        unsafe { self.inner.raw_deallocate(ptr, layout) };
        self.releases.fetch_add(1, Ordering::AcqRel);
        let live = self.live_bytes.fetch_sub(layout.size(), Ordering::AcqRel) - layout.size();
        log::trace!(
            "release {} bytes (align {}) at {:p}, live {live}",
            layout.size(),
            layout.align(),
            ptr
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SystemAlloc;
    use tyalloc_test_utils::FailingAlloc;

    #[test]
    fn counts_balanced_cycle() {
        let p = Instrumented::new(SystemAlloc);
        let small = Layout::from_size_align(16, 8).unwrap();
        let big = Layout::from_size_align(64, 8).unwrap();

        let a = p.raw_allocate(small).unwrap();
        let b = p.raw_allocate(big).unwrap();
        assert_eq!(p.stats().live_bytes, 80);
        unsafe { p.raw_deallocate(b, big) };
        unsafe { p.raw_deallocate(a, small) };

        let stats = p.stats();
        assert_eq!(stats.allocations, 2);
        assert_eq!(stats.releases, 2);
        assert_eq!(stats.live_allocations(), 0);
        assert_eq!(stats.live_bytes, 0);
        assert_eq!(stats.peak_bytes, 80);
        assert_eq!(stats.failures, 0);
    }

    #[test]
    fn counts_failures() {
        let p = Instrumented::new(FailingAlloc);
        assert!(p.raw_allocate(Layout::new::<u32>()).is_none());
        assert_eq!(
            p.stats(),
            AllocStats {
                failures: 1,
                ..AllocStats::default()
            }
        );
    }

    #[test]
    fn live_allocations_saturates() {
        let stats = AllocStats {
            allocations: 1,
            releases: 2,
            ..AllocStats::default()
        };
        assert_eq!(stats.live_allocations(), 0);
    }

    #[test]
    fn stats_during_concurrent_churn_never_show_excess_releases() {
        use std::sync::atomic::AtomicBool;
        use std::sync::Arc;
        use std::thread;

        let p = Arc::new(Instrumented::new(SystemAlloc));
        let done = Arc::new(AtomicBool::new(false));
        let layout = Layout::new::<u64>();

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let p = Arc::clone(&p);
                thread::spawn(move || {
                    for _ in 0..2_000 {
                        let ptr = p.raw_allocate(layout).unwrap();
                        unsafe { p.raw_deallocate(ptr, layout) };
                    }
                })
            })
            .collect();

        let reader = {
            let p = Arc::clone(&p);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                while !done.load(Ordering::Acquire) {
                    let stats = p.stats();
                    assert!(stats.allocations >= stats.releases, "{stats:?}");
                }
            })
        };

        for worker in workers {
            worker.join().unwrap();
        }
        done.store(true, Ordering::Release);
        reader.join().unwrap();

        let stats = p.stats();
        assert_eq!(stats.allocations, 8_000);
        assert_eq!(stats.live_allocations(), 0);
    }
}
