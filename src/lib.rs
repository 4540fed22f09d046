//! RatHash Library
//!
//! File and stream hashing on top of the RatHash engine.
//!
//! # Overview
//!
//! RatHash is a keyed, extendable-output hash. Input is split into fixed-size
//! blocks that a pool of worker threads chains in strict index order, so the
//! digest is identical no matter how many cores did the work.
//!
//! # Example
//!
//! ```rust
//! use std::io::Cursor;
//! use rathash::{input::hash_reader, Hasher};
//!
//! let mut hasher = Hasher::new(32).unwrap();
//! let bytes = hash_reader(&mut hasher, Cursor::new(b"some file contents")).unwrap();
//! assert_eq!(bytes, 18);
//!
//! let digest = hasher.finalize(&[]).unwrap();
//! assert_eq!(digest, rathash::hash(b"some file contents", &[], 32).unwrap());
//! ```

// Re-export the core algorithm
pub use rathash_core as algorithm;

pub mod error;
pub mod input;
pub mod report;

// Convenience re-exports
pub use algorithm::{hash, Config, Hasher, BLOCK_SIZE, KEY_SIZE};
pub use error::{Error, Result};
