//! Three-way quicksort of a permutation range keyed by equivalence class.
//!
//! Used by the fallback sorter to split buckets. Ranks in `lo..=hi` are
//! reordered so that `eclass[fmap[i]]` is non-decreasing. Elements are only
//! swapped, so `fmap` stays a permutation at every step.

use oxibwt_core::error::{OxiBwtError, Result};
use std::cmp::Ordering;

/// Ranges with fewer elements than this go to insertion sort.
pub(crate) const SMALL_THRESH: isize = 10;

/// Maximum depth of the explicit range stack.
///
/// The smaller partition is always processed first, so the depth never
/// exceeds `log2(n) + 1`; this bound leaves ample room for any `u32` block.
pub(crate) const STACK_LIMIT: usize = 1000;

/// Deterministic pivot chooser.
///
/// A small linear congruential sequence picks the low, middle or high
/// element. It restarts from the same seed on every call so identical
/// inputs always produce identical permutations.
#[derive(Debug, Clone, Copy)]
struct PivotSeq(u32);

impl PivotSeq {
    fn new() -> Self {
        Self(0)
    }

    fn next(&mut self) -> u32 {
        self.0 = (self.0.wrapping_mul(7621).wrapping_add(1)) % 32768;
        self.0 % 3
    }
}

/// Sort `fmap[lo..=hi]` by `eclass[fmap[i]]`.
pub(crate) fn sort_by_class(fmap: &mut [u32], eclass: &[u32], lo: usize, hi: usize) -> Result<()> {
    let key = |fmap: &[u32], i: isize| eclass[fmap[i as usize] as usize];

    let mut pivots = PivotSeq::new();
    let mut stack: Vec<(isize, isize)> = Vec::with_capacity(64);
    stack.push((lo as isize, hi as isize));

    while let Some((lo, hi)) = stack.pop() {
        if hi <= lo {
            continue;
        }
        if hi - lo < SMALL_THRESH {
            insertion_sort(fmap, eclass, lo as usize, hi as usize);
            continue;
        }

        let med = match pivots.next() {
            0 => key(fmap, lo),
            1 => key(fmap, (lo + hi) >> 1),
            _ => key(fmap, hi),
        };

        // Equal keys are parked at both ends while scanning.
        let (mut un_lo, mut lt_lo) = (lo, lo);
        let (mut un_hi, mut gt_hi) = (hi, hi);
        loop {
            while un_lo <= un_hi {
                match key(fmap, un_lo).cmp(&med) {
                    Ordering::Equal => {
                        fmap.swap(un_lo as usize, lt_lo as usize);
                        lt_lo += 1;
                        un_lo += 1;
                    }
                    Ordering::Greater => break,
                    Ordering::Less => un_lo += 1,
                }
            }
            while un_lo <= un_hi {
                match key(fmap, un_hi).cmp(&med) {
                    Ordering::Equal => {
                        fmap.swap(un_hi as usize, gt_hi as usize);
                        gt_hi -= 1;
                        un_hi -= 1;
                    }
                    Ordering::Less => break,
                    Ordering::Greater => un_hi -= 1,
                }
            }
            if un_lo > un_hi {
                break;
            }
            fmap.swap(un_lo as usize, un_hi as usize);
            un_lo += 1;
            un_hi -= 1;
        }

        // Whole range equal to the pivot.
        if gt_hi < lt_lo {
            continue;
        }

        let n = (lt_lo - lo).min(un_lo - lt_lo);
        swap_run(fmap, lo, un_lo - n, n);
        let m = (hi - gt_hi).min(gt_hi - un_hi);
        swap_run(fmap, un_lo, hi - m + 1, m);

        let n = lo + un_lo - lt_lo - 1;
        let m = hi - (gt_hi - un_hi) + 1;

        // Push the larger side first so the smaller one is popped next.
        if n - lo > hi - m {
            push(&mut stack, (lo, n))?;
            push(&mut stack, (m, hi))?;
        } else {
            push(&mut stack, (m, hi))?;
            push(&mut stack, (lo, n))?;
        }
    }

    Ok(())
}

fn push(stack: &mut Vec<(isize, isize)>, range: (isize, isize)) -> Result<()> {
    if stack.len() >= STACK_LIMIT {
        return Err(OxiBwtError::stack_overflow(stack.len() + 1, STACK_LIMIT));
    }
    stack.push(range);
    Ok(())
}

/// Swap `len` elements starting at `a` with `len` elements starting at `b`.
#[inline]
pub(crate) fn swap_run(fmap: &mut [u32], a: isize, b: isize, len: isize) {
    for i in 0..len {
        fmap.swap((a + i) as usize, (b + i) as usize);
    }
}

fn insertion_sort(fmap: &mut [u32], eclass: &[u32], lo: usize, hi: usize) {
    for i in lo + 1..=hi {
        let tmp = fmap[i];
        let key = eclass[tmp as usize];
        let mut j = i;
        while j > lo && eclass[fmap[j - 1] as usize] > key {
            fmap[j] = fmap[j - 1];
            j -= 1;
        }
        fmap[j] = tmp;
    }
}
