//! Fallback block sorter.
//!
//! Prefix doubling in the style of Manber and Myers: rotations are first
//! bucketed by their leading byte, then each round compares rotations by
//! twice as many bytes as the previous one by sorting every unfinished
//! bucket on the bucket rank of the rotation `H` bytes further on.
//!
//! The work is `O(n log² n)` whatever the input looks like, which is why this
//! sorter backs up the primary sorter on repetitive blocks. Small blocks use
//! it directly.

use crate::bhtab::BucketBits;
use crate::qsort;
use log::trace;
use oxibwt_core::error::Result;

/// Summary of one fallback sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct FallbackStats {
    /// Number of doubling rounds run.
    pub rounds: u32,
}

/// Sort all rotations of `block` into `fmap`.
///
/// `fmap` and `eclass` must each hold exactly `block.len()` entries. On
/// return `fmap[r]` is the start offset of the rotation of rank `r`.
pub(crate) fn sort(
    block: &[u8],
    fmap: &mut [u32],
    eclass: &mut [u32],
    bhtab: &mut BucketBits,
) -> Result<FallbackStats> {
    let n = block.len();
    debug_assert_eq!(fmap.len(), n);
    debug_assert_eq!(eclass.len(), n);

    // Radix sort on the first byte. Filling each bucket from its end leaves
    // offsets in descending order inside a bucket; later rounds fix that.
    let mut ftab = [0u32; 256];
    for &b in block {
        ftab[b as usize] += 1;
    }
    for i in 1..256 {
        ftab[i] += ftab[i - 1];
    }
    for (i, &b) in block.iter().enumerate() {
        let j = b as usize;
        ftab[j] -= 1;
        fmap[ftab[j] as usize] = i as u32;
    }

    bhtab.reset(n);
    for &start in &ftab {
        bhtab.set(start as usize);
    }
    bhtab.set_sentinels(n);

    let mut stats = FallbackStats::default();
    let mut h = 1usize;
    loop {
        // eclass[k] = bucket of the rotation H bytes after k.
        let mut j = 0u32;
        for i in 0..n {
            if bhtab.is_set(i) {
                j = i as u32;
            }
            let mut k = fmap[i] as isize - h as isize;
            if k < 0 {
                k += n as isize;
            }
            eclass[k as usize] = j;
        }

        let mut not_done = 0usize;
        let mut next = 0usize;
        loop {
            // Find the next bucket [lo, hi] with more than one member.
            let k = bhtab.next_clear(next);
            let lo = k - 1;
            if lo >= n {
                break;
            }
            let hi = bhtab.next_set(k) - 1;
            if hi >= n {
                break;
            }
            next = hi + 1;

            if hi > lo {
                not_done += hi - lo + 1;
                qsort::sort_by_class(fmap, eclass, lo, hi)?;

                let mut prev = None;
                for i in lo..=hi {
                    let class = eclass[fmap[i] as usize];
                    if prev != Some(class) {
                        bhtab.set(i);
                        prev = Some(class);
                    }
                }
            }
        }

        stats.rounds += 1;
        trace!(
            "fallback round {}: depth {} bytes, {} ranks not done",
            stats.rounds,
            2 * h,
            not_done
        );

        h *= 2;
        if h > n || not_done == 0 {
            break;
        }
    }

    Ok(stats)
}
