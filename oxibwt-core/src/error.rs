//! Error types for OxiBWT operations.
//!
//! The block sorter has two kinds of failure: rejected input (an empty block,
//! a block whose wraparound byte does not match, or a block that is too large)
//! and internal invariant violations. The latter mean the sort itself is
//! broken and the block must not be encoded.

use thiserror::Error;

/// The main error type for OxiBWT operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OxiBwtError {
    /// The block has no data bytes.
    #[error("Empty block: at least one data byte is required")]
    EmptyBlock,

    /// The trailing wraparound byte is not a copy of the first data byte.
    #[error("Wraparound byte mismatch: expected {expected:#04x}, found {found:#04x}")]
    WrapMismatch {
        /// The first data byte.
        expected: u8,
        /// The byte found in the wraparound position.
        found: u8,
    },

    /// The block exceeds the configured maximum length.
    #[error("Block too large: {size} bytes exceeds maximum {max}")]
    BlockTooLarge {
        /// Number of data bytes in the block.
        size: usize,
        /// Maximum allowed number of data bytes.
        max: usize,
    },

    /// An explicit sort stack grew past its bound.
    #[error("Sort stack overflow: depth {depth} exceeds limit {limit}")]
    StackOverflow {
        /// Depth that was requested.
        depth: usize,
        /// Maximum depth allowed.
        limit: usize,
    },

    /// The sorted permutation is not a bijection onto `0..n`.
    #[error("Invalid permutation: offset {offset} at rank {rank} is out of range or repeated")]
    InvalidPermutation {
        /// Rank at which the problem was detected.
        rank: usize,
        /// Offending offset.
        offset: u32,
    },

    /// No rank in the permutation holds offset 0.
    #[error("Origin pointer not found in sorted permutation")]
    OriginNotFound,

    /// An origin pointer handed to the inverse transform is outside the block.
    #[error("Origin pointer {origin} out of range for block of {len} bytes")]
    OriginOutOfRange {
        /// The origin pointer.
        origin: u32,
        /// Block length.
        len: usize,
    },
}

/// Result type alias for OxiBWT operations.
pub type Result<T> = std::result::Result<T, OxiBwtError>;

impl OxiBwtError {
    /// Create an empty block error.
    pub fn empty_block() -> Self {
        Self::EmptyBlock
    }

    /// Create a wraparound byte mismatch error.
    pub fn wrap_mismatch(expected: u8, found: u8) -> Self {
        Self::WrapMismatch { expected, found }
    }

    /// Create a block too large error.
    pub fn block_too_large(size: usize, max: usize) -> Self {
        Self::BlockTooLarge { size, max }
    }

    /// Create a stack overflow error.
    pub fn stack_overflow(depth: usize, limit: usize) -> Self {
        Self::StackOverflow { depth, limit }
    }

    /// Create an invalid permutation error.
    pub fn invalid_permutation(rank: usize, offset: u32) -> Self {
        Self::InvalidPermutation { rank, offset }
    }

    /// Create an origin out of range error.
    pub fn origin_out_of_range(origin: u32, len: usize) -> Self {
        Self::OriginOutOfRange { origin, len }
    }

    /// Whether this error reports a defect in the sorter rather than bad input.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Self::StackOverflow { .. } | Self::InvalidPermutation { .. } | Self::OriginNotFound
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OxiBwtError::wrap_mismatch(0x62, 0x61);
        assert!(err.to_string().contains("0x62"));
        assert!(err.to_string().contains("0x61"));

        let err = OxiBwtError::block_too_large(1_000_000, 900_000);
        assert!(err.to_string().contains("900000"));

        let err = OxiBwtError::stack_overflow(101, 100);
        assert!(err.to_string().contains("stack overflow"));
    }

    #[test]
    fn test_invariant_classification() {
        assert!(!OxiBwtError::empty_block().is_invariant_violation());
        assert!(!OxiBwtError::wrap_mismatch(1, 2).is_invariant_violation());
        assert!(OxiBwtError::OriginNotFound.is_invariant_violation());
        assert!(OxiBwtError::invalid_permutation(3, 7).is_invariant_violation());
    }
}
