//! Block input layout.
//!
//! A block handed to the sorter holds `n` data bytes followed by one
//! wraparound byte, a copy of the first data byte, so that the byte after
//! the last position can be read without index arithmetic:
//!
//! ```text
//! index:  0   1   2   ...  n-1 | n
//! byte:   b0  b1  b2  ...  bn-1| b0
//! ```
//!
//! [`Block`] validates this layout once; the sorting code then works only on
//! the `n` data bytes and treats offsets as 0-based.

use crate::error::{OxiBwtError, Result};
use std::borrow::Cow;

/// A validated byte block with a trailing wraparound byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block<'a> {
    /// Data bytes followed by the wraparound byte.
    bytes: Cow<'a, [u8]>,
}

impl<'a> Block<'a> {
    /// Wrap a caller-owned buffer of `n + 1` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`OxiBwtError::EmptyBlock`] when the buffer holds fewer than
    /// two bytes, and [`OxiBwtError::WrapMismatch`] when the last byte is not
    /// a copy of the first.
    pub fn new(bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() < 2 {
            return Err(OxiBwtError::empty_block());
        }
        let first = bytes[0];
        let wrap = bytes[bytes.len() - 1];
        if first != wrap {
            return Err(OxiBwtError::wrap_mismatch(first, wrap));
        }
        Ok(Self {
            bytes: Cow::Borrowed(bytes),
        })
    }

    /// Build a block from raw data, appending the wraparound byte.
    pub fn from_data(data: &[u8]) -> Result<Block<'static>> {
        let Some(&first) = data.first() else {
            return Err(OxiBwtError::empty_block());
        };
        let mut bytes = Vec::with_capacity(data.len() + 1);
        bytes.extend_from_slice(data);
        bytes.push(first);
        Ok(Block {
            bytes: Cow::Owned(bytes),
        })
    }

    /// Number of data bytes (`n`), excluding the wraparound byte.
    pub fn len(&self) -> usize {
        self.bytes.len() - 1
    }

    /// Always false: a validated block holds at least one data byte.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The `n` data bytes.
    pub fn data(&self) -> &[u8] {
        &self.bytes[..self.len()]
    }

    /// The full `n + 1` byte layout, wraparound byte included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Byte at cyclic position `i`.
    pub fn cyclic(&self, i: usize) -> u8 {
        self.bytes[i % self.len()]
    }
}
