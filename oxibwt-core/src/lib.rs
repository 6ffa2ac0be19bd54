//! # OxiBWT Core
//!
//! Core components shared by the OxiBWT block-sorting crates.
//!
//! - [`block`]: the validated `n + 1` byte input layout
//! - [`error`]: error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Enclosing compressor (MTF, RLE, entropy coding, framing)│
//! ├─────────────────────────────────────────────────────────┤
//! │ Block sort engine (oxibwt-blocksort)                    │
//! │     Orchestrator, primary sorter, fallback sorter       │
//! ├─────────────────────────────────────────────────────────┤
//! │ Core (this crate)                                       │
//! │     Block layout, errors                                │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxibwt_core::Block;
//!
//! let block = Block::from_data(b"banana").unwrap();
//! assert_eq!(block.len(), 6);
//! assert_eq!(block.as_bytes(), b"bananab");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod block;
pub mod error;

pub use block::Block;
pub use error::{OxiBwtError, Result};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::block::Block;
    pub use crate::error::{OxiBwtError, Result};
}
