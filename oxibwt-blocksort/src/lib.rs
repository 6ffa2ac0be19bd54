//! Burrows-Wheeler block sorting for OxiBWT.
//!
//! This crate computes the BWT permutation of a byte block: the order of all
//! cyclic rotations of the block, plus the rank of the unrotated block (the
//! origin pointer). It is the block-sorting stage of a bzip2-style
//! compressor; move-to-front, run-length and entropy coding live elsewhere.
//!
//! Two algorithms share one set of buffers:
//!
//! 1. **Primary sorter** - radix bucketing, multi-key quicksort and a shell
//!    sort with quadrant tie-breaks. Fast on typical data, and watched by a
//!    work budget proportional to the block length.
//! 2. **Fallback sorter** - prefix doubling with a three-way quicksort on
//!    bucket ranks. `O(n log² n)` on any input.
//!
//! Small blocks go straight to the fallback sorter. Larger blocks try the
//! primary sorter first and are re-sorted from scratch by the fallback sorter
//! if the budget runs out.
//!
//! ## Example
//!
//! ```rust
//! use oxibwt_blocksort::{sort_block, bwt};
//!
//! let (permutation, origin) = sort_block(b"banana").unwrap();
//! assert_eq!(permutation, vec![5, 3, 1, 0, 4, 2]);
//! assert_eq!(permutation[origin as usize], 0);
//!
//! let (last, origin) = bwt::transform(b"banana").unwrap();
//! assert_eq!(last, b"nnbaaa");
//! assert_eq!(bwt::inverse_transform(&last, origin).unwrap(), b"banana");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod bhtab;
/// Burrows-Wheeler Transform built on the block sorter.
pub mod bwt;
mod config;
mod fallback;
mod primary;
mod qsort;
mod sorter;

pub use config::{
    BlockSortConfig, MAX_BLOCK_SIZE, MAX_WORK_FACTOR, SMALL_BLOCK_THRESHOLD, WORK_FACTOR,
};
pub use primary::{MIN_BLOCK as MIN_PRIMARY_BLOCK, OVERSHOOT};
pub use sorter::{BlockSorter, SortStrategy, SortedBlock};

use oxibwt_core::{Block, Result};

/// Sort the rotations of `data` with the default configuration.
///
/// Returns the permutation and the origin pointer. `data` is the raw block;
/// the wraparound byte is added internally.
pub fn sort_block(data: &[u8]) -> Result<(Vec<u32>, u32)> {
    let block = Block::from_data(data)?;
    let mut sorter = BlockSorter::default();
    let sorted = sorter.sort(&block)?;
    Ok(sorted.into_parts())
}
