//! Error types for typed allocation and configuration.

use std::error::Error;
use std::fmt;

/// Errors returned by typed allocation and release.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// `requested * size_of::<T>()` exceeds the configured size domain.
    ///
    /// Permanent: retrying the same request can never succeed.
    AllocationTooLarge {
        /// Element count that was requested.
        requested: usize,
        /// Largest element count the allocator accepts.
        max_count: usize,
    },
    /// The underlying primitive could not satisfy the request.
    OutOfMemory {
        /// Number of bytes requested from the primitive.
        bytes: usize,
        /// Alignment requested from the primitive.
        align: usize,
    },
    /// A release was rejected by a tracked allocator.
    ///
    /// Only produced under [`ReleasePolicy::Tracked`](crate::ReleasePolicy).
    /// The storage is not returned to the primitive.
    InvalidRelease {
        /// Why the release was rejected.
        fault: ReleaseFault,
    },
}

impl AllocError {
    /// Whether the same request may succeed if attempted again later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::OutOfMemory { .. })
    }
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocationTooLarge {
                requested,
                max_count,
            } => {
                write!(
                    f,
                    "allocation too large: requested {requested} elements, maximum {max_count}"
                )
            }
            Self::OutOfMemory { bytes, align } => {
                write!(f, "out of memory: {bytes} bytes at align {align}")
            }
            Self::InvalidRelease { fault } => write!(f, "invalid release: {fault}"),
        }
    }
}

impl Error for AllocError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidRelease { fault } => Some(fault),
            _ => None,
        }
    }
}

/// Reasons a tracked allocator refuses a release.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReleaseFault {
    /// The address is not a live allocation of this allocator.
    ///
    /// Covers foreign handles and handles that were already released.
    UnknownHandle {
        /// Address passed to `deallocate`.
        address: usize,
    },
    /// The element count differs from the one used to allocate.
    CountMismatch {
        /// Address passed to `deallocate`.
        address: usize,
        /// Count the storage was allocated with.
        allocated: usize,
        /// Count passed to `deallocate`.
        released: usize,
    },
}

impl fmt::Display for ReleaseFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownHandle { address } => {
                write!(f, "{address:#x} is not a live allocation")
            }
            Self::CountMismatch {
                address,
                allocated,
                released,
            } => {
                write!(
                    f,
                    "{address:#x} was allocated with {allocated} elements, released with {released}"
                )
            }
        }
    }
}

impl Error for ReleaseFault {}

/// Errors detected by [`AllocConfig::validate`](crate::AllocConfig::validate).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `max_bytes` is zero, so no non-empty allocation could ever succeed.
    ZeroMaxBytes,
    /// `max_bytes` is above the largest size a Rust allocation may have.
    MaxBytesExceedsPlatform {
        /// The configured value.
        max_bytes: usize,
        /// The platform limit (`isize::MAX`).
        limit: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroMaxBytes => write!(f, "max_bytes must be at least 1"),
            Self::MaxBytesExceedsPlatform { max_bytes, limit } => {
                write!(f, "max_bytes {max_bytes} exceeds platform limit {limit}")
            }
        }
    }
}

impl Error for ConfigError {}
