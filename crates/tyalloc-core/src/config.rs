//! Allocator configuration parameters.

use crate::error::ConfigError;

/// How an allocator treats the handle and count passed to `deallocate`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ReleasePolicy {
    /// Trust the caller. A mismatched count, a foreign handle or a double
    /// release is an unchecked contract violation. No bookkeeping.
    #[default]
    Trusted,
    /// Record every live allocation's count and reject releases that do
    /// not match one with [`AllocError::InvalidRelease`](crate::AllocError).
    Tracked,
}

/// Configuration for a typed allocator.
///
/// Validated at construction; immutable afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AllocConfig {
    /// Upper bound on the byte size of a single allocation.
    ///
    /// Default: [`PLATFORM_MAX_BYTES`](Self::PLATFORM_MAX_BYTES). Lower it
    /// to emulate a narrower size domain. Must be in
    /// `1..=PLATFORM_MAX_BYTES`.
    pub max_bytes: usize,

    /// Release checking. Default: [`ReleasePolicy::Trusted`].
    pub release: ReleasePolicy,
}

impl AllocConfig {
    /// Largest size a single Rust allocation may have (`isize::MAX`).
    pub const PLATFORM_MAX_BYTES: usize = isize::MAX as usize;

    /// Default config: full platform size domain, trusted release.
    pub const fn new() -> Self {
        Self {
            max_bytes: Self::PLATFORM_MAX_BYTES,
            release: ReleasePolicy::Trusted,
        }
    }

    /// Default config with [`ReleasePolicy::Tracked`].
    pub const fn tracked() -> Self {
        Self {
            max_bytes: Self::PLATFORM_MAX_BYTES,
            release: ReleasePolicy::Tracked,
        }
    }

    /// Replace the byte bound.
    pub const fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_bytes == 0 {
            return Err(ConfigError::ZeroMaxBytes);
        }
        if self.max_bytes > Self::PLATFORM_MAX_BYTES {
            return Err(ConfigError::MaxBytesExceedsPlatform {
                max_bytes: self.max_bytes,
                limit: Self::PLATFORM_MAX_BYTES,
            });
        }
        Ok(())
    }
}

impl Default for AllocConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid_and_trusted() {
        let config = AllocConfig::default();
        assert_eq!(config.max_bytes, isize::MAX as usize);
        assert_eq!(config.release, ReleasePolicy::Trusted);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn tracked_keeps_platform_bound() {
        let config = AllocConfig::tracked();
        assert_eq!(config.release, ReleasePolicy::Tracked);
        assert_eq!(config.max_bytes, AllocConfig::PLATFORM_MAX_BYTES);
    }

    #[test]
    fn zero_max_bytes_rejected() {
        let config = AllocConfig::new().with_max_bytes(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroMaxBytes));
    }

    #[test]
    fn max_bytes_above_platform_rejected() {
        let config = AllocConfig::new().with_max_bytes(usize::MAX);
        assert_eq!(
            config.validate(),
            Err(ConfigError::MaxBytesExceedsPlatform {
                max_bytes: usize::MAX,
                limit: AllocConfig::PLATFORM_MAX_BYTES,
            })
        );
    }

    #[test]
    fn narrow_domain_is_valid() {
        let config = AllocConfig::tracked().with_max_bytes(u32::MAX as usize);
        assert!(config.validate().is_ok());
        assert_eq!(config.release, ReleasePolicy::Tracked);
    }
}
