//! Primary block sorter.
//!
//! Fast on ordinary data, but gives up on highly repetitive blocks:
//!
//! 1. Rotations are bucketed by their first two bytes (65,536 radix buckets).
//! 2. Big buckets (same first byte) are processed smallest first. Inside a big
//!    bucket each two-byte sub-bucket is refined by a multi-key quicksort on
//!    successive bytes, which hands small or deep ranges to a shell sort.
//! 3. Once a big bucket is sorted, a single scan over it derives the order of
//!    every sub-bucket `(c, ss)` for big buckets `c` not yet done, so those are
//!    never compared at all.
//! 4. The rank of each rotation inside its finished big bucket is stored in
//!    the quadrant array. The shell sort comparator checks quadrant values
//!    alongside bytes, which cuts long equal runs short.
//!
//! Comparisons that run past the fixed lookahead are charged to a work
//! budget. When the budget is exceeded the whole attempt is abandoned and the
//! caller re-sorts the block with the fallback sorter.
//!
//! The working block must carry [`OVERSHOOT`] bytes past its end, copied
//! cyclically from its start, so comparisons can run ahead without wrapping
//! every index.

use crate::qsort::swap_run;
use log::trace;
use oxibwt_core::error::{OxiBwtError, Result};
use std::cmp::{Ordering, Reverse};

/// Bytes resolved by the radix pass.
pub const N_RADIX: usize = 2;

/// Byte depth covered by the multi-key quicksort.
pub const N_QSORT: usize = 12;

/// Slack needed by the shell sort comparator.
pub const N_SHELL: usize = 18;

/// Bytes mirrored past the end of the working block.
pub const OVERSHOOT: usize = N_RADIX + N_QSORT + N_SHELL + 2;

/// Smallest block the primary sorter accepts.
///
/// The comparator wraps an index at most once per 8-byte step, which is only
/// enough when the block is longer than the overshoot.
pub const MIN_BLOCK: usize = 2 * OVERSHOOT;

/// Entries in the two-byte radix table.
pub(crate) const FTAB_LEN: usize = 65537;

/// Bytes compared before any work is charged.
const LOOKAHEAD: usize = 12;

/// Bytes compared per charged unit of work.
const UNROLL: usize = 8;

const QSORT_SMALL_THRESH: isize = 20;
const QSORT_DEPTH_THRESH: usize = N_RADIX + N_QSORT;
const QSORT_STACK_LIMIT: usize = 100;

/// Shell sort gaps, `h = 3h + 1`.
const INCS: [usize; 14] = [
    1, 4, 13, 40, 121, 364, 1093, 3280, 9841, 29524, 88573, 265720, 797161, 2391484,
];

/// Comparison work accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WorkBudget {
    done: u64,
    limit: u64,
}

impl WorkBudget {
    pub(crate) fn new(limit: u64) -> Self {
        Self { done: 0, limit }
    }

    #[inline]
    fn charge(&mut self) {
        self.done += 1;
    }

    #[inline]
    pub(crate) fn exhausted(&self) -> bool {
        self.done > self.limit
    }

    pub(crate) fn done(&self) -> u64 {
        self.done
    }
}

/// Outcome of one primary sort attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PrimaryReport {
    /// False when the work budget ran out; `fmap` is then unusable.
    pub completed: bool,
    /// Work units charged.
    pub work_done: u64,
    /// Work units allowed.
    pub work_limit: u64,
}

/// Sort all rotations of the first `fmap.len()` bytes of `block`.
///
/// `block` and `quadrant` hold `n + OVERSHOOT` entries, `ftab` holds
/// [`FTAB_LEN`] entries. Budget exhaustion is reported through
/// [`PrimaryReport::completed`], not as an error.
pub(crate) fn sort(
    block: &[u8],
    fmap: &mut [u32],
    quadrant: &mut [u16],
    ftab: &mut [u32],
    work_limit: u64,
) -> Result<PrimaryReport> {
    let n = fmap.len();
    debug_assert!(n >= MIN_BLOCK);
    debug_assert_eq!(block.len(), n + OVERSHOOT);
    debug_assert_eq!(quadrant.len(), n + OVERSHOOT);
    debug_assert_eq!(ftab.len(), FTAB_LEN);

    let mut main = MainSort {
        block,
        quadrant,
        fmap,
        n,
        budget: WorkBudget::new(work_limit),
    };
    let completed = main.run(ftab)?;

    Ok(PrimaryReport {
        completed,
        work_done: main.budget.done(),
        work_limit,
    })
}

struct MainSort<'a> {
    block: &'a [u8],
    quadrant: &'a mut [u16],
    fmap: &'a mut [u32],
    n: usize,
    budget: WorkBudget,
}

impl MainSort<'_> {
    fn run(&mut self, ftab: &mut [u32]) -> Result<bool> {
        let n = self.n;
        let block = self.block;

        self.quadrant.fill(0);

        // `key` is the two bytes starting at i, read cyclically.
        ftab.fill(0);
        let mut key = usize::from(block[0]) << 8;
        for i in (0..n).rev() {
            key = (key >> 8) | (usize::from(block[i]) << 8);
            ftab[key] += 1;
        }
        for i in 1..FTAB_LEN {
            ftab[i] += ftab[i - 1];
        }
        let mut key = usize::from(block[0]) << 8;
        for i in (0..n).rev() {
            key = (key >> 8) | (usize::from(block[i]) << 8);
            ftab[key] -= 1;
            self.fmap[ftab[key] as usize] = i as u32;
        }

        let mut running_order: [usize; 256] = std::array::from_fn(|i| i);
        running_order.sort_by_key(|&b| ftab[(b + 1) << 8] - ftab[b << 8]);

        let prev = |x: u32| if x == 0 { n - 1 } else { x as usize - 1 };

        let mut sub_done = vec![false; FTAB_LEN - 1];
        let mut big_done = [false; 256];
        let mut copy_start = [0isize; 256];
        let mut copy_end = [0isize; 256];
        let mut num_qsorted = 0usize;

        for (i, &ss) in running_order.iter().enumerate() {
            for j in (0..256).filter(|&j| j != ss) {
                let sb = (ss << 8) + j;
                if sub_done[sb] {
                    continue;
                }
                let lo = ftab[sb] as isize;
                let hi = ftab[sb + 1] as isize - 1;
                if hi > lo {
                    self.multikey_qsort(lo, hi, N_RADIX)?;
                    num_qsorted += (hi - lo + 1) as usize;
                    if self.budget.exhausted() {
                        return Ok(false);
                    }
                }
                sub_done[sb] = true;
            }

            // All of ss except (ss, ss) is sorted. Stepping back one byte from
            // each rotation in order yields (c, ss) in order for every c.
            for j in 0..256 {
                copy_start[j] = ftab[(j << 8) + ss] as isize;
                copy_end[j] = ftab[(j << 8) + ss + 1] as isize - 1;
            }
            let mut j = ftab[ss << 8] as isize;
            while j < copy_start[ss] {
                let k = prev(self.fmap[j as usize]);
                let c1 = usize::from(block[k]);
                if !big_done[c1] {
                    self.fmap[copy_start[c1] as usize] = k as u32;
                    copy_start[c1] += 1;
                }
                j += 1;
            }
            let mut j = ftab[(ss + 1) << 8] as isize - 1;
            while j > copy_end[ss] {
                let k = prev(self.fmap[j as usize]);
                let c1 = usize::from(block[k]);
                if !big_done[c1] {
                    self.fmap[copy_end[c1] as usize] = k as u32;
                    copy_end[c1] -= 1;
                }
                j -= 1;
            }
            debug_assert!(
                copy_start[ss] - 1 == copy_end[ss]
                    || (copy_start[ss] == 0 && copy_end[ss] == n as isize - 1),
                "self bucket {ss:#04x} not filled by predecessor scan"
            );
            for j in 0..256 {
                sub_done[(j << 8) + ss] = true;
            }

            big_done[ss] = true;
            if i < 255 {
                let bb_start = ftab[ss << 8] as usize;
                let bb_size = ftab[(ss + 1) << 8] as usize - bb_start;
                let mut shifts = 0;
                while (bb_size >> shifts) > 65534 {
                    shifts += 1;
                }
                for j in (0..bb_size).rev() {
                    let pos = self.fmap[bb_start + j] as usize;
                    let q = (j >> shifts) as u16;
                    self.quadrant[pos] = q;
                    if pos < OVERSHOOT {
                        self.quadrant[pos + n] = q;
                    }
                }
            }

            trace!(
                "primary bucket {:#04x} done ({} of 256), {} sorted by quicksort, work {}",
                ss,
                i + 1,
                num_qsorted,
                self.budget.done()
            );
        }

        Ok(true)
    }

    /// Multi-key ternary quicksort of `fmap[lo..=hi]` starting at byte depth `d`.
    fn multikey_qsort(&mut self, lo: isize, hi: isize, d: usize) -> Result<()> {
        let block = self.block;
        let mut stack: Vec<(isize, isize, usize)> = Vec::with_capacity(QSORT_STACK_LIMIT);
        stack.push((lo, hi, d));

        while let Some((lo, hi, d)) = stack.pop() {
            if hi - lo < QSORT_SMALL_THRESH || d > QSORT_DEPTH_THRESH {
                self.shell_sort(lo, hi, d);
                if self.budget.exhausted() {
                    return Ok(());
                }
                continue;
            }

            let fmap = &mut *self.fmap;
            let byte = |fmap: &[u32], i: isize| block[fmap[i as usize] as usize + d];
            let med = med3(byte(fmap, lo), byte(fmap, hi), byte(fmap, (lo + hi) >> 1));

            let (mut un_lo, mut lt_lo) = (lo, lo);
            let (mut un_hi, mut gt_hi) = (hi, hi);
            loop {
                while un_lo <= un_hi {
                    match byte(fmap, un_lo).cmp(&med) {
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
                    match byte(fmap, un_hi).cmp(&med) {
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

            // Every byte at depth d matched; look one byte deeper.
            if gt_hi < lt_lo {
                push(&mut stack, (lo, hi, d + 1))?;
                continue;
            }

            let n = (lt_lo - lo).min(un_lo - lt_lo);
            swap_run(fmap, lo, un_lo - n, n);
            let m = (hi - gt_hi).min(gt_hi - un_hi);
            swap_run(fmap, un_lo, hi - m + 1, m);

            let n = lo + un_lo - lt_lo - 1;
            let m = hi - (gt_hi - un_hi) + 1;

            // Largest pushed first, smallest popped next.
            let mut next = [(lo, n, d), (m, hi, d), (n + 1, m - 1, d + 1)];
            next.sort_by_key(|&(lo, hi, _)| Reverse(hi - lo));
            for range in next {
                push(&mut stack, range)?;
            }
        }

        Ok(())
    }

    /// Shell sort of `fmap[lo..=hi]` comparing rotations from byte depth `d`.
    fn shell_sort(&mut self, lo: isize, hi: isize, d: usize) {
        if hi - lo < 1 {
            return;
        }
        let (lo, hi) = (lo as usize, hi as usize);
        let big_n = hi - lo + 1;

        let gaps = INCS.iter().position(|&h| h >= big_n).unwrap_or(INCS.len());
        for &h in INCS[..gaps].iter().rev() {
            for i in lo + h..=hi {
                let v = self.fmap[i];
                let mut j = i;
                loop {
                    let above = self.fmap[j - h];
                    if !self.greater(above as usize + d, v as usize + d) {
                        break;
                    }
                    self.fmap[j] = above;
                    j -= h;
                    if j < lo + h {
                        break;
                    }
                }
                self.fmap[j] = v;
                if self.budget.exhausted() {
                    return;
                }
            }
        }
    }

    /// Whether the rotation at `i1` sorts after the rotation at `i2`.
    ///
    /// The first [`LOOKAHEAD`] bytes are compared without cost. After that
    /// bytes and quadrant ranks are compared [`UNROLL`] at a time, each batch
    /// charged one unit of work, until a difference is found or slightly more
    /// than a full block length has been compared, in which case the
    /// rotations are equal.
    #[inline]
    fn greater(&mut self, mut i1: usize, mut i2: usize) -> bool {
        let block = self.block;
        let n = self.n;

        for _ in 0..LOOKAHEAD {
            let (c1, c2) = (block[i1], block[i2]);
            if c1 != c2 {
                return c1 > c2;
            }
            i1 += 1;
            i2 += 1;
        }

        let mut k = (n + UNROLL) as isize;
        while k >= 0 {
            for _ in 0..UNROLL {
                let (c1, c2) = (block[i1], block[i2]);
                if c1 != c2 {
                    return c1 > c2;
                }
                let (s1, s2) = (self.quadrant[i1], self.quadrant[i2]);
                if s1 != s2 {
                    return s1 > s2;
                }
                i1 += 1;
                i2 += 1;
            }
            if i1 >= n {
                i1 -= n;
            }
            if i2 >= n {
                i2 -= n;
            }
            k -= UNROLL as isize;
            self.budget.charge();
        }

        false
    }
}

fn push(stack: &mut Vec<(isize, isize, usize)>, range: (isize, isize, usize)) -> Result<()> {
    if stack.len() >= QSORT_STACK_LIMIT {
        return Err(OxiBwtError::stack_overflow(
            stack.len() + 1,
            QSORT_STACK_LIMIT,
        ));
    }
    stack.push(range);
    Ok(())
}

/// Median of three bytes.
#[inline]
fn med3(mut a: u8, mut b: u8, c: u8) -> u8 {
    if a > b {
        std::mem::swap(&mut a, &mut b);
    }
    if b > c {
        b = c;
        if a > b {
            b = a;
        }
    }
    b
}
