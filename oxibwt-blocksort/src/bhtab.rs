//! Bucket boundary bits for the fallback sorter.
//!
//! One bit per rank; a set bit marks the first rank of a bucket. Bits are
//! only ever set while sorting, so buckets split but never merge. Past the
//! end of the block an alternating `1010...` pattern of sentinel bits makes
//! every scan stop without a bounds check on the block length.

/// Number of sentinel bits written past the end of the block.
pub(crate) const SENTINEL_BITS: usize = 64;

/// Bit set marking bucket starts.
#[derive(Debug, Clone, Default)]
pub(crate) struct BucketBits {
    words: Vec<u32>,
}

impl BucketBits {
    /// Create an empty bit set.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Clear all bits and size the set for a block of `n` ranks plus sentinels.
    pub(crate) fn reset(&mut self, n: usize) {
        let words = (n + SENTINEL_BITS) / 32 + 2;
        self.words.clear();
        self.words.resize(words, 0);
    }

    #[inline]
    pub(crate) fn set(&mut self, i: usize) {
        self.words[i >> 5] |= 1 << (i & 31);
    }

    #[inline]
    pub(crate) fn clear(&mut self, i: usize) {
        self.words[i >> 5] &= !(1 << (i & 31));
    }

    #[inline]
    pub(crate) fn is_set(&self, i: usize) -> bool {
        self.words[i >> 5] & (1 << (i & 31)) != 0
    }

    #[inline]
    fn word(&self, i: usize) -> u32 {
        self.words[i >> 5]
    }

    /// Write the alternating sentinel pattern starting at rank `n`.
    pub(crate) fn set_sentinels(&mut self, n: usize) {
        for i in 0..SENTINEL_BITS / 2 {
            self.set(n + 2 * i);
            self.clear(n + 2 * i + 1);
        }
    }

    /// First rank at or after `k` whose bit is clear.
    pub(crate) fn next_clear(&self, mut k: usize) -> usize {
        while self.is_set(k) && k & 31 != 0 {
            k += 1;
        }
        if self.is_set(k) {
            while self.word(k) == u32::MAX {
                k += 32;
            }
            while self.is_set(k) {
                k += 1;
            }
        }
        k
    }

    /// First rank at or after `k` whose bit is set.
    pub(crate) fn next_set(&self, mut k: usize) -> usize {
        while !self.is_set(k) && k & 31 != 0 {
            k += 1;
        }
        if !self.is_set(k) {
            while self.word(k) == 0 {
                k += 32;
            }
            while !self.is_set(k) {
                k += 1;
            }
        }
        k
    }
}
