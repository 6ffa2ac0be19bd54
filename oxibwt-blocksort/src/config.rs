//! Block sorter configuration.

use crate::primary;

/// Blocks shorter than this go straight to the fallback sorter.
pub const SMALL_BLOCK_THRESHOLD: usize = 10_000;

/// Default work factor: the primary sorter may spend this many work units
/// per block byte before it gives up.
pub const WORK_FACTOR: u32 = 30;

/// Largest accepted work factor.
pub const MAX_WORK_FACTOR: u32 = 250;

/// Default maximum block length (900k).
pub const MAX_BLOCK_SIZE: usize = 900_000;

/// Block sorter tuning.
///
/// The thresholds only trade speed against worst-case cost; every setting
/// produces a correctly sorted permutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockSortConfig {
    /// Blocks shorter than this are sorted by the fallback sorter only.
    pub small_block_threshold: usize,
    /// Primary sorter work budget per block byte (1-250, 0 means default).
    pub work_factor: u32,
    /// Longest block accepted, in data bytes.
    pub max_block_size: usize,
    /// Check that the result is a permutation before returning it.
    pub verify: bool,
}

impl BlockSortConfig {
    /// Default configuration.
    pub const DEFAULT: Self = Self {
        small_block_threshold: SMALL_BLOCK_THRESHOLD,
        work_factor: WORK_FACTOR,
        max_block_size: MAX_BLOCK_SIZE,
        verify: true,
    };

    /// Create the default configuration.
    pub fn new() -> Self {
        Self::DEFAULT
    }

    /// Configuration that never tries the primary sorter.
    pub fn fallback_only() -> Self {
        Self {
            small_block_threshold: usize::MAX,
            ..Self::DEFAULT
        }
    }

    /// Configuration that tries the primary sorter on every block it can handle.
    pub fn primary_first() -> Self {
        Self {
            small_block_threshold: 0,
            ..Self::DEFAULT
        }
    }

    /// Set the work factor (clamped to 1-250, 0 selects the default).
    pub fn with_work_factor(mut self, work_factor: u32) -> Self {
        self.work_factor = match work_factor {
            0 => WORK_FACTOR,
            f => f.min(MAX_WORK_FACTOR),
        };
        self
    }

    /// Set the small block threshold.
    pub fn with_small_block_threshold(mut self, threshold: usize) -> Self {
        self.small_block_threshold = threshold;
        self
    }

    /// Set the maximum block size (capped at `u32::MAX`).
    pub fn with_max_block_size(mut self, max: usize) -> Self {
        self.max_block_size = max.min(u32::MAX as usize);
        self
    }

    /// Enable or disable the permutation check.
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Threshold actually applied; never below what the primary sorter needs.
    pub fn effective_small_block_threshold(&self) -> usize {
        self.small_block_threshold.max(primary::MIN_BLOCK)
    }

    /// Maximum block size actually applied.
    pub fn effective_max_block_size(&self) -> usize {
        self.max_block_size.min(u32::MAX as usize)
    }

    /// Primary sorter work limit for a block of `n` bytes.
    pub fn work_limit(&self, n: usize) -> u64 {
        let factor = match self.work_factor {
            0 => WORK_FACTOR,
            f => f.min(MAX_WORK_FACTOR),
        };
        u64::from(factor) * n as u64
    }
}

impl Default for BlockSortConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BlockSortConfig::default();
        assert_eq!(config.small_block_threshold, 10_000);
        assert_eq!(config.work_factor, 30);
        assert_eq!(config.max_block_size, 900_000);
        assert!(config.verify);
        assert_eq!(config.work_limit(1000), 30_000);
    }

    #[test]
    fn test_work_factor_clamp() {
        assert_eq!(BlockSortConfig::new().with_work_factor(0).work_factor, 30);
        assert_eq!(BlockSortConfig::new().with_work_factor(1000).work_factor, 250);
        assert_eq!(BlockSortConfig::new().with_work_factor(7).work_factor, 7);

        let raw = BlockSortConfig {
            work_factor: 9999,
            ..BlockSortConfig::DEFAULT
        };
        assert_eq!(raw.work_limit(10), 2500);
    }

    #[test]
    fn test_threshold_floor() {
        let config = BlockSortConfig::primary_first();
        assert_eq!(config.effective_small_block_threshold(), primary::MIN_BLOCK);
        assert_eq!(
            BlockSortConfig::fallback_only().effective_small_block_threshold(),
            usize::MAX
        );
    }
}
