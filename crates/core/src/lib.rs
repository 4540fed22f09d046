//! # RatHash Core Algorithm
//!
//! A keyed, extendable-output hash function that spreads its input over all
//! CPU cores while keeping a strictly sequential block chain.
//!
//! ## Construction
//!
//! - Input is cut into 8 KiB blocks with contiguous indexes from 0
//! - `chain[i] = XChaCha8(key = chain[i-1], nonce = B[..24]) ⊕ B`
//!   where `B = BLAKE3(i || block_i)` and `chain[-1]` is a fixed constant
//! - Output: XChaCha8 keystream of the requested length, keyed by the last
//!   chain value, with the caller's 24-byte key as nonce
//!
//! Blocks are hashed by a pool of interchangeable workers. A worker holding
//! block `i` waits until `chain[i-1]` is published, so the digest is the same
//! for any number of workers.
//!
//! ## Example
//!
//! ```rust
//! use rathash_core::{Hasher, hash, KEY_SIZE};
//!
//! // Single-shot hashing, 64 output bytes, default key
//! let digest = hash(b"input data", &[], 64).unwrap();
//! assert_eq!(digest.len(), 64);
//!
//! // Streaming, keyed
//! let mut hasher = Hasher::new(32).unwrap();
//! hasher.write(b"input ");
//! hasher.write(b"data");
//! let mac = hasher.finalize(&[7u8; KEY_SIZE]).unwrap();
//! assert_ne!(&mac[..], &digest[..32]);
//! ```
//!
//! ## Features
//!
//! - `parallel` (default): worker pool on rayon threads. Without it blocks
//!   are chained on the writing thread; digests do not change.

mod chain;
mod config;
mod error;
mod hasher;
mod params;
mod pool;
mod primitives;
mod segment;

mod ffi;

pub mod reference;

pub use config::Config;
pub use error::{Error, Result};
pub use hasher::{Hasher, hash};
pub use params::*;

/// Required finalization key length in bytes
pub fn key_size() -> usize {
    KEY_SIZE
}

/// Segmentation unit in bytes
pub fn block_size() -> usize {
    BLOCK_SIZE
}
