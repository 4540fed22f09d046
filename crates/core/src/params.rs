//! RatHash Algorithm Parameters
//!
//! Sizes are in bytes. Changing any of these changes every digest.

/// Segmentation unit: input is cut into blocks of this size
pub const BLOCK_SIZE: usize = 8 * 1024;

/// Required length of a caller-supplied finalization key (XChaCha nonce length)
pub const KEY_SIZE: usize = 24;

/// Size of one chain value (XChaCha key length)
pub const CHAIN_SIZE: usize = 32;

/// ChaCha rounds used by both the chain step and finalization
pub const ROUNDS: usize = 8;

/// Key used when `finalize` is called with an empty key.
///
/// An empty key and an explicit all-zero key therefore produce the same output.
pub const DEFAULT_KEY: [u8; KEY_SIZE] = [0u8; KEY_SIZE];

/// Derivation context for the predecessor value of block 0
pub const CHAIN_IV_CONTEXT: &str = "rathash 2022-04 chain iv";

/// Dispatch queue slots per worker
pub const QUEUE_SLOTS_PER_WORKER: usize = 2;

/// Algorithm version
pub const VERSION: u8 = 3;
