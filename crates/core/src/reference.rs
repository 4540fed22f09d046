//! Serial reference implementation
//!
//! Chains the blocks one after another on the calling thread. Every
//! [`Hasher`](crate::Hasher), whatever its pool size, must agree with it.

use zeroize::Zeroizing;

use crate::error::{Error, Result};
use crate::hasher::resolve_key;
use crate::params::BLOCK_SIZE;
use crate::primitives::{chain_iv, chain_step, expand_output};

/// Hash `input` without any worker pool
pub fn hash_serial(input: &[u8], key: &[u8], output_len: usize) -> Result<Vec<u8>> {
    if output_len == 0 {
        return Err(Error::InvalidOutputLength);
    }
    let key = resolve_key(key)?;

    let mut value = Zeroizing::new(chain_iv());
    if input.is_empty() {
        *value = chain_step(&value, 0, &[]);
    }
    for (index, block) in input.chunks(BLOCK_SIZE).enumerate() {
        *value = chain_step(&value, index as u64, block);
    }

    Ok(expand_output(&value, &key, output_len))
}
