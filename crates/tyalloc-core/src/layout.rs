//! Element type descriptor and array sizing.

use std::alloc::Layout;
use std::fmt;

use crate::error::AllocError;

/// Size and alignment of a fixed element type.
///
/// Built once per allocator from `T` via [`ElementLayout::of`] and never
/// changed afterwards. All byte sizes handed to a primitive are derived
/// from this descriptor and an element count, never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ElementLayout {
    size: usize,
    align: usize,
}

impl ElementLayout {
    /// Descriptor for `T`.
    pub const fn of<T>() -> Self {
        Self {
            size: std::mem::size_of::<T>(),
            align: std::mem::align_of::<T>(),
        }
    }

    /// `size_of::<T>()` in bytes.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// `align_of::<T>()` in bytes. Always a power of two.
    pub const fn align(&self) -> usize {
        self.align
    }

    /// Whether `T` is zero-sized.
    pub const fn is_zero_sized(&self) -> bool {
        self.size == 0
    }

    /// Largest element count whose byte size fits in `max_bytes`.
    ///
    /// Zero-sized elements never consume bytes, so every count fits.
    pub const fn max_count(&self, max_bytes: usize) -> usize {
        if self.size == 0 {
            usize::MAX
        } else {
            max_bytes / self.size
        }
    }

    /// Layout of `count` contiguous elements, bounded by `max_bytes`.
    ///
    /// The bound is checked by comparing `count` against
    /// [`max_count`](Self::max_count), so `count * size` is only
    /// computed once it is known not to wrap. The returned layout may
    /// have size zero (for `count == 0` or zero-sized elements).
    pub fn array(&self, count: usize, max_bytes: usize) -> Result<Layout, AllocError> {
        let max_count = self.max_count(max_bytes);
        if count > max_count {
            return Err(AllocError::AllocationTooLarge {
                requested: count,
                max_count,
            });
        }
        Layout::from_size_align(count * self.size, self.align).map_err(|_| {
            AllocError::AllocationTooLarge {
                requested: count,
                max_count,
            }
        })
    }
}

impl fmt::Display for ElementLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bytes, align {}", self.size, self.align)
    }
}
