//! The exact-size typed allocator.

#![allow(unsafe_code)]

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tyalloc_core::{AllocConfig, AllocError, ConfigError, ElementLayout, RawAlloc, ReleasePolicy};

use crate::handle::{Allocation, RejectedRelease, StorageHandle};
use crate::ledger::ReleaseLedger;
use crate::system::SystemAlloc;

/// Allocates and releases raw storage for exactly `n` contiguous `T`.
///
/// Byte size is always `n * size_of::<T>()` and alignment always
/// `align_of::<T>()`. Nothing about a request is stored: `deallocate`
/// recomputes the layout from the count the caller passes back.
///
/// Clones are interchangeable: storage allocated through one may be
/// released through another. Allocators compare equal when they are
/// interchangeable (same primitive, same config and, under tracked
/// release, the same ledger).
///
/// # Zero-byte requests
///
/// `allocate(0)`, and any request for a zero-sized `T`, returns a
/// dangling sentinel handle without calling the primitive. Releasing it
/// with the same count is a no-op.
pub struct TypedAllocator<T, P = SystemAlloc> {
    primitive: P,
    config: AllocConfig,
    ledger: Option<Arc<ReleaseLedger>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypedAllocator<T, SystemAlloc> {
    /// Allocator over the global allocator with the default config.
    pub const fn new() -> Self {
        Self {
            primitive: SystemAlloc,
            config: AllocConfig::new(),
            ledger: None,
            _marker: PhantomData,
        }
    }
}

impl<T> Default for TypedAllocator<T, SystemAlloc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P: RawAlloc> TypedAllocator<T, P> {
    /// Descriptor of `T`.
    pub const LAYOUT: ElementLayout = ElementLayout::of::<T>();

    /// Allocator over `primitive` with the default config.
    pub fn with_primitive(primitive: P) -> Self {
        Self {
            primitive,
            config: AllocConfig::new(),
            ledger: None,
            _marker: PhantomData,
        }
    }

    /// Allocator over `primitive` with a validated `config`.
    pub fn with_config(primitive: P, config: AllocConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let ledger = match config.release {
            ReleasePolicy::Trusted => None,
            ReleasePolicy::Tracked => Some(Arc::new(ReleaseLedger::new())),
        };
        Ok(Self {
            primitive,
            config,
            ledger,
            _marker: PhantomData,
        })
    }

    /// Size and alignment of `T`.
    pub fn layout(&self) -> ElementLayout {
        Self::LAYOUT
    }

    /// Active configuration.
    pub fn config(&self) -> &AllocConfig {
        &self.config
    }

    /// The injected primitive.
    pub fn primitive(&self) -> &P {
        &self.primitive
    }

    /// Ledger of live allocations, present only under tracked release.
    pub fn ledger(&self) -> Option<&ReleaseLedger> {
        self.ledger.as_deref()
    }

    /// Largest count [`allocate`](Self::allocate) accepts.
    pub fn max_count(&self) -> usize {
        Self::LAYOUT.max_count(self.config.max_bytes)
    }

    /// Obtain uninitialised storage for `n` contiguous `T`.
    ///
    /// Fails with [`AllocError::AllocationTooLarge`] before touching the
    /// primitive if `n * size_of::<T>()` would exceed the size domain,
    /// and with [`AllocError::OutOfMemory`] if the primitive refuses.
    pub fn allocate(&self, n: usize) -> Result<StorageHandle<T>, AllocError> {
        let layout = Self::LAYOUT.array(n, self.config.max_bytes)?;
        if layout.size() == 0 {
            return Ok(StorageHandle::dangling());
        }
        let ptr = self
            .primitive
            .raw_allocate(layout)
            .ok_or(AllocError::OutOfMemory {
                bytes: layout.size(),
                align: layout.align(),
            })?;
        let handle = StorageHandle::new(ptr.cast::<T>());
        if let Some(ledger) = &self.ledger {
            ledger.record(handle.address(), n);
        }
        Ok(handle)
    }

    /// Like [`allocate`](Self::allocate), also reporting the granted count.
    ///
    /// Storage is exact-size, so the count is always `n`.
    pub fn allocate_at_least(&self, n: usize) -> Result<Allocation<T>, AllocError> {
        let handle = self.allocate(n)?;
        Ok(Allocation { handle, count: n })
    }

    /// Return storage obtained from [`allocate`](Self::allocate).
    ///
    /// The layout is recomputed from `n` and `T`. Under tracked release
    /// the handle and count are checked against the ledger first and a
    /// mismatch is reported as [`AllocError::InvalidRelease`] without
    /// touching the primitive. Every refusal returns the handle inside
    /// [`RejectedRelease`], so the storage can be released again with the
    /// right count.
    ///
    /// # Safety
    ///
    /// Any element lifetimes begun in the storage must have ended. Under
    /// [`ReleasePolicy::Trusted`], `handle` must also come from an
    /// allocator interchangeable with `self`, with exactly this `n`.
    pub unsafe fn deallocate(
        &self,
        handle: StorageHandle<T>,
        n: usize,
    ) -> Result<(), RejectedRelease<T>> {
        let layout = Self::LAYOUT.array(n, self.config.max_bytes);
        if let Some(ledger) = &self.ledger {
            let empty = layout.as_ref().map_or(false, |l| l.size() == 0);
            if let Err(fault) = ledger.release(handle.address(), n, empty) {
                return Err(RejectedRelease {
                    handle,
                    error: AllocError::InvalidRelease { fault },
                });
            }
        }
        let layout = match layout {
            Ok(layout) => layout,
            Err(error) => return Err(RejectedRelease { handle, error }),
        };
        let ptr = handle.into_raw();
        if layout.size() == 0 {
            return Ok(());
        }
        // SAFETY: the caller (or the ledger) guarantees `ptr` came from this
        // primitive with the layout recomputed here.
        unsafe { self.primitive.raw_deallocate(ptr.cast::<u8>(), layout) };
        Ok(())
    }
}

impl<T, P: Clone> Clone for TypedAllocator<T, P> {
    fn clone(&self) -> Self {
        Self {
            primitive: self.primitive.clone(),
            config: self.config,
            ledger: self.ledger.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T, P: PartialEq> PartialEq for TypedAllocator<T, P> {
    fn eq(&self, other: &Self) -> bool {
        let same_ledger = match (&self.ledger, &other.ledger) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        self.primitive == other.primitive && self.config == other.config && same_ledger
    }
}

impl<T, P: Eq> Eq for TypedAllocator<T, P> {}

impl<T, P: fmt::Debug> fmt::Debug for TypedAllocator<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedAllocator")
            .field("element", &std::any::type_name::<T>())
            .field("layout", &ElementLayout::of::<T>())
            .field("primitive", &self.primitive)
            .field("config", &self.config)
            .field("live", &self.ledger.as_ref().map(|l| l.live_count()))
            .finish()
    }
}
