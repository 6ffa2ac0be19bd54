//! Burrows-Wheeler Transform on top of the block sorter.
//!
//! The transform emits the last byte of every sorted rotation plus the
//! origin pointer; the inverse rebuilds the block from those two.

use crate::sorter::BlockSorter;
use oxibwt_core::Block;
use oxibwt_core::error::{OxiBwtError, Result};

/// Perform the Burrows-Wheeler Transform with a default sorter.
/// Returns the transformed data and the index of the original string.
pub fn transform(data: &[u8]) -> Result<(Vec<u8>, u32)> {
    if data.is_empty() {
        return Ok((Vec::new(), 0));
    }
    let block = Block::from_data(data)?;
    transform_with(&mut BlockSorter::default(), &block)
}

/// Perform the Burrows-Wheeler Transform with a caller-owned sorter.
pub fn transform_with(sorter: &mut BlockSorter, block: &Block<'_>) -> Result<(Vec<u8>, u32)> {
    let n = block.len();
    let data = block.data();
    let sorted = sorter.sort(block)?;

    // Last column: the byte just before each rotation's start.
    let last = sorted
        .permutation()
        .iter()
        .map(|&start| data[(start as usize + n - 1) % n])
        .collect();

    Ok((last, sorted.origin()))
}

/// Perform the inverse Burrows-Wheeler Transform.
///
/// # Errors
///
/// Returns [`OxiBwtError::OriginOutOfRange`] when `origin` does not index
/// into `last`.
pub fn inverse_transform(last: &[u8], origin: u32) -> Result<Vec<u8>> {
    if last.is_empty() {
        return Ok(Vec::new());
    }
    let n = last.len();
    if origin as usize >= n {
        return Err(OxiBwtError::origin_out_of_range(origin, n));
    }

    // Start of each byte's run in the sorted first column.
    let mut starts = [0usize; 256];
    for &byte in last {
        starts[byte as usize] += 1;
    }
    let mut total = 0;
    for slot in starts.iter_mut() {
        let count = *slot;
        *slot = total;
        total += count;
    }

    // next[r] = rank of the rotation starting one byte after rotation r.
    let mut next = vec![0u32; n];
    for (rank, &byte) in last.iter().enumerate() {
        next[starts[byte as usize]] = rank as u32;
        starts[byte as usize] += 1;
    }

    let mut result = Vec::with_capacity(n);
    let mut rank = next[origin as usize] as usize;
    for _ in 0..n {
        result.push(last[rank]);
        rank = next[rank] as usize;
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bwt_empty() {
        let (transformed, ptr) = transform(b"").unwrap();
        assert!(transformed.is_empty());
        assert_eq!(ptr, 0);
        assert!(inverse_transform(b"", 0).unwrap().is_empty());
    }

    #[test]
    fn test_bwt_single() {
        let (transformed, ptr) = transform(b"a").unwrap();
        assert_eq!(transformed, b"a");
        assert_eq!(ptr, 0);
    }

    #[test]
    fn test_bwt_banana() {
        let (transformed, ptr) = transform(b"banana").unwrap();
        assert_eq!(transformed, b"nnbaaa");
        assert_eq!(ptr, 3);
        assert_eq!(inverse_transform(&transformed, ptr).unwrap(), b"banana");
    }

    #[test]
    fn test_bwt_roundtrip() {
        let test_cases = [
            b"hello world".as_slice(),
            b"abracadabra",
            b"mississippi",
            b"aaaaa",
            b"abababab",
            b"the quick brown fox jumps over the lazy dog",
        ];

        for data in test_cases {
            let (transformed, ptr) = transform(data).unwrap();
            let recovered = inverse_transform(&transformed, ptr).unwrap();
            assert_eq!(recovered, data, "Failed for: {:?}", data);
        }
    }

    #[test]
    fn test_inverse_rejects_bad_origin() {
        assert_eq!(
            inverse_transform(b"nnbaaa", 6),
            Err(OxiBwtError::origin_out_of_range(6, 6))
        );
    }
}
