//! Storage configuration parameters.

use crate::error::SoaError;

/// Configuration for heap-backed column storage.
///
/// Validated at container construction; immutable afterwards. Inline
/// (fixed-capacity) containers always use natural alignment and ignore
/// this type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageConfig {
    /// Minimum alignment, in bytes, of every column's first element.
    ///
    /// Default: 1 (each column is aligned only as its field type requires).
    /// Must be a power of two and at most [`StorageConfig::MAX_COLUMN_ALIGN`].
    pub column_align: usize,
}

impl StorageConfig {
    /// Natural alignment: no padding beyond what field types require.
    pub const DEFAULT_COLUMN_ALIGN: usize = 1;

    /// Typical cache line size, used by [`StorageConfig::cache_aligned`].
    pub const CACHE_LINE: usize = 64;

    /// Largest accepted `column_align` (one 4KiB page).
    pub const MAX_COLUMN_ALIGN: usize = 4096;

    /// Create a config with natural column alignment.
    pub fn new() -> Self {
        Self {
            column_align: Self::DEFAULT_COLUMN_ALIGN,
        }
    }

    /// Create a config that starts every column on a cache line.
    pub fn cache_aligned() -> Self {
        Self {
            column_align: Self::CACHE_LINE,
        }
    }

    /// Check that all values are in range.
    pub fn validate(&self) -> Result<(), SoaError> {
        if !self.column_align.is_power_of_two() {
            return Err(SoaError::InvalidConfig {
                reason: format!(
                    "column_align ({}) must be a power of two",
                    self.column_align
                ),
            });
        }
        if self.column_align > Self::MAX_COLUMN_ALIGN {
            return Err(SoaError::InvalidConfig {
                reason: format!(
                    "column_align ({}) exceeds maximum of {}",
                    self.column_align,
                    Self::MAX_COLUMN_ALIGN
                ),
            });
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new()
    }
}
