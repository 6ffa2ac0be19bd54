//! Block sort orchestration.
//!
//! [`BlockSorter`] owns every buffer the two sorting algorithms need and
//! reuses them from block to block. For each block it picks an algorithm,
//! falls back when the primary sorter runs out of budget, checks the result
//! and locates the origin pointer.
//!
//! The buffers are kept apart rather than aliased: the quadrant array belongs
//! to the primary sorter and the equivalence classes to the fallback sorter,
//! even though the two are never live at the same time.

use crate::bhtab::BucketBits;
use crate::config::BlockSortConfig;
use crate::fallback;
use crate::primary::{self, OVERSHOOT};
use log::debug;
use oxibwt_core::Block;
use oxibwt_core::error::{OxiBwtError, Result};

/// Which algorithm produced a permutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SortStrategy {
    /// Small block, fallback sorter only.
    Fallback,
    /// Primary sorter finished within its budget.
    Primary,
    /// Primary sorter ran out of budget; the block was re-sorted by the fallback sorter.
    PrimaryThenFallback,
}

/// A sorted block, borrowed from the [`BlockSorter`] that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortedBlock<'a> {
    permutation: &'a [u32],
    origin: u32,
    strategy: SortStrategy,
    work_done: u64,
}

impl<'a> SortedBlock<'a> {
    /// `permutation()[rank]` is the start offset of the rotation of that rank.
    pub fn permutation(&self) -> &'a [u32] {
        self.permutation
    }

    /// Rank of the unrotated block.
    pub fn origin(&self) -> u32 {
        self.origin
    }

    /// Algorithm that produced the permutation.
    pub fn strategy(&self) -> SortStrategy {
        self.strategy
    }

    /// Work units charged by the primary sorter (0 if it did not run).
    pub fn work_done(&self) -> u64 {
        self.work_done
    }

    /// Number of ranks.
    pub fn len(&self) -> usize {
        self.permutation.len()
    }

    /// True only for a zero-length permutation, which `sort` never returns.
    pub fn is_empty(&self) -> bool {
        self.permutation.is_empty()
    }

    /// Copy the permutation out together with the origin pointer.
    pub fn into_parts(self) -> (Vec<u32>, u32) {
        (self.permutation.to_vec(), self.origin)
    }
}

/// Reusable block sorter.
///
/// Not shared between threads; sort blocks in parallel by giving each
/// thread its own sorter.
///
/// # Example
///
/// ```rust
/// use oxibwt_blocksort::{BlockSorter, BlockSortConfig};
/// use oxibwt_core::Block;
///
/// let mut sorter = BlockSorter::new(BlockSortConfig::default());
/// let block = Block::from_data(b"banana").unwrap();
/// let sorted = sorter.sort(&block).unwrap();
///
/// assert_eq!(sorted.permutation(), &[5, 3, 1, 0, 4, 2]);
/// assert_eq!(sorted.origin(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct BlockSorter {
    config: BlockSortConfig,
    /// Block data followed by `OVERSHOOT` bytes copied from its start.
    work: Vec<u8>,
    /// Permutation store.
    fmap: Vec<u32>,
    /// Equivalence classes, fallback sorter only.
    eclass: Vec<u32>,
    /// Quadrant ranks, primary sorter only.
    quadrant: Vec<u16>,
    /// Two-byte radix table, primary sorter only.
    ftab: Vec<u32>,
    /// Bucket boundaries, fallback sorter only.
    bhtab: BucketBits,
}

impl BlockSorter {
    /// Create a sorter with the given configuration.
    pub fn new(config: BlockSortConfig) -> Self {
        Self {
            config,
            work: Vec::new(),
            fmap: Vec::new(),
            eclass: Vec::new(),
            quadrant: Vec::new(),
            ftab: Vec::new(),
            bhtab: BucketBits::new(),
        }
    }

    /// Create a sorter with buffers preallocated for blocks of up to `capacity` bytes.
    pub fn with_capacity(config: BlockSortConfig, capacity: usize) -> Self {
        let mut sorter = Self::new(config);
        sorter.work.reserve(capacity + OVERSHOOT);
        sorter.fmap.reserve(capacity);
        sorter.eclass.reserve(capacity);
        sorter.quadrant.reserve(capacity + OVERSHOOT);
        sorter.ftab.reserve(primary::FTAB_LEN);
        sorter
    }

    /// Current configuration.
    pub fn config(&self) -> &BlockSortConfig {
        &self.config
    }

    /// Sort all rotations of `block`.
    ///
    /// # Errors
    ///
    /// Fails with [`OxiBwtError::BlockTooLarge`] for blocks over the
    /// configured maximum. Any other error is an internal invariant
    /// violation and the block must not be encoded.
    pub fn sort(&mut self, block: &Block<'_>) -> Result<SortedBlock<'_>> {
        let n = block.len();
        let max = self.config.effective_max_block_size();
        if n > max {
            return Err(OxiBwtError::block_too_large(n, max));
        }

        self.prepare(block.data());

        let mut work_done = 0;
        let strategy = if n < self.config.effective_small_block_threshold() {
            self.run_fallback(n)?;
            SortStrategy::Fallback
        } else {
            let report = primary::sort(
                &self.work,
                &mut self.fmap,
                &mut self.quadrant,
                &mut self.ftab,
                self.config.work_limit(n),
            )?;
            work_done = report.work_done;
            if report.completed {
                SortStrategy::Primary
            } else {
                debug!(
                    "primary sort gave up on {}-byte block after {} of {} work units, using fallback",
                    n, report.work_done, report.work_limit
                );
                self.run_fallback(n)?;
                SortStrategy::PrimaryThenFallback
            }
        };

        if self.config.verify {
            verify_permutation(&self.fmap)?;
        }
        let origin = find_origin(&self.fmap)?;

        debug!(
            "sorted {}-byte block: {:?}, origin {}, work {}",
            n, strategy, origin, work_done
        );

        Ok(SortedBlock {
            permutation: &self.fmap,
            origin,
            strategy,
            work_done,
        })
    }

    /// Size every buffer for a block of `data.len()` bytes and build the
    /// working copy with its cyclic overshoot.
    ///
    /// This is the one place where the caller's `n + 1` layout is mapped onto
    /// the 0-based working block both sorters share.
    fn prepare(&mut self, data: &[u8]) {
        let n = data.len();

        self.work.clear();
        self.work.extend_from_slice(data);
        self.work.extend((0..OVERSHOOT).map(|i| data[i % n]));

        self.fmap.clear();
        self.fmap.resize(n, 0);
        self.eclass.clear();
        self.eclass.resize(n, 0);
        self.quadrant.clear();
        self.quadrant.resize(n + OVERSHOOT, 0);
        self.ftab.clear();
        self.ftab.resize(primary::FTAB_LEN, 0);
    }

    fn run_fallback(&mut self, n: usize) -> Result<()> {
        let stats = fallback::sort(
            &self.work[..n],
            &mut self.fmap,
            &mut self.eclass,
            &mut self.bhtab,
        )?;
        debug!("fallback sort of {}-byte block took {} rounds", n, stats.rounds);
        Ok(())
    }
}

impl Default for BlockSorter {
    fn default() -> Self {
        Self::new(BlockSortConfig::default())
    }
}

/// Check that `fmap` is a permutation of `0..fmap.len()`.
pub(crate) fn verify_permutation(fmap: &[u32]) -> Result<()> {
    let mut seen = vec![false; fmap.len()];
    for (rank, &offset) in fmap.iter().enumerate() {
        match seen.get_mut(offset as usize) {
            Some(slot) if !*slot => *slot = true,
            _ => return Err(OxiBwtError::invalid_permutation(rank, offset)),
        }
    }
    Ok(())
}

/// Rank holding offset 0.
pub(crate) fn find_origin(fmap: &[u32]) -> Result<u32> {
    fmap.iter()
        .position(|&offset| offset == 0)
        .map(|rank| rank as u32)
        .ok_or(OxiBwtError::OriginNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lcg_bytes(n: usize, seed: u32) -> Vec<u8> {
        let mut seed = seed;
        (0..n)
            .map(|_| {
                seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
                (seed >> 16) as u8
            })
            .collect()
    }

    #[test]
    fn test_sort_banana() {
        let mut sorter = BlockSorter::default();
        let block = Block::new(b"bananab").unwrap();
        let sorted = sorter.sort(&block).unwrap();
        assert_eq!(sorted.permutation(), &[5, 3, 1, 0, 4, 2]);
        assert_eq!(sorted.origin(), 3);
        assert_eq!(sorted.strategy(), SortStrategy::Fallback);
        assert_eq!(sorted.work_done(), 0);
    }

    #[test]
    fn test_sort_single_byte() {
        let mut sorter = BlockSorter::default();
        let block = Block::from_data(b"q").unwrap();
        let sorted = sorter.sort(&block).unwrap();
        assert_eq!(sorted.permutation(), &[0]);
        assert_eq!(sorted.origin(), 0);
    }

    #[test]
    fn test_strategy_selection() {
        let data = lcg_bytes(20_000, 3);
        let block = Block::from_data(&data).unwrap();

        let mut sorter = BlockSorter::default();
        assert_eq!(sorter.sort(&block).unwrap().strategy(), SortStrategy::Primary);

        let mut sorter = BlockSorter::new(BlockSortConfig::fallback_only());
        assert_eq!(sorter.sort(&block).unwrap().strategy(), SortStrategy::Fallback);
    }

    #[test]
    fn test_budget_exhaustion_falls_back() {
        let data: Vec<u8> = b"abc".iter().copied().cycle().take(30_000).collect();
        let block = Block::from_data(&data).unwrap();
        let mut sorter = BlockSorter::default();
        let sorted = sorter.sort(&block).unwrap();
        assert_eq!(sorted.strategy(), SortStrategy::PrimaryThenFallback);
        assert!(sorted.work_done() > 30 * 30_000);
        assert_eq!(sorted.permutation()[sorted.origin() as usize], 0);
    }

    #[test]
    fn test_sorter_reuse_across_sizes() {
        let mut sorter = BlockSorter::new(BlockSortConfig::primary_first());
        let big = lcg_bytes(5000, 11);
        let small = b"mississippi";

        let first = sorter.sort(&Block::from_data(&big).unwrap()).unwrap().into_parts();
        let _ = sorter.sort(&Block::from_data(small).unwrap()).unwrap();
        let again = sorter.sort(&Block::from_data(&big).unwrap()).unwrap().into_parts();
        assert_eq!(first, again);

        let sorted = sorter.sort(&Block::from_data(small).unwrap()).unwrap();
        assert_eq!(sorted.permutation(), &[10, 7, 4, 1, 0, 9, 8, 6, 3, 5, 2]);
    }

    #[test]
    fn test_block_too_large() {
        let mut sorter = BlockSorter::new(BlockSortConfig::new().with_max_block_size(100));
        let block = Block::from_data(&[7u8; 101]).unwrap();
        assert_eq!(
            sorter.sort(&block).unwrap_err(),
            OxiBwtError::block_too_large(101, 100)
        );
    }

    #[test]
    fn test_verify_permutation() {
        assert!(verify_permutation(&[2, 0, 1]).is_ok());
        assert_eq!(
            verify_permutation(&[2, 2, 1]),
            Err(OxiBwtError::invalid_permutation(1, 2))
        );
        assert_eq!(
            verify_permutation(&[0, 3, 1]),
            Err(OxiBwtError::invalid_permutation(1, 3))
        );
    }

    #[test]
    fn test_find_origin() {
        assert_eq!(find_origin(&[4, 1, 0, 2, 3]), Ok(2));
        assert_eq!(find_origin(&[1, 2]), Err(OxiBwtError::OriginNotFound));
    }
}
