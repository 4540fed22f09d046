//! Stream primitive and chain step for RatHash
//!
//! The keyed stream primitive is XChaCha8. The 32-byte chain value always sits
//! in the cipher key slot and the 24-byte nonce slot carries either a block
//! digest (chain step) or the caller's finalization key (output stream).

use chacha20::{Key, XChaCha8, XNonce};
use cipher::{KeyIvInit, StreamCipher};

use crate::params::{CHAIN_IV_CONTEXT, CHAIN_SIZE, KEY_SIZE, ROUNDS};

const _: () = assert!(ROUNDS == 8, "XChaCha8 is hard-wired to 8 rounds");

/// Chained digest of one block
pub type ChainValue = [u8; CHAIN_SIZE];

/// XOR the XChaCha8 keystream for (`key`, `nonce`) into `buf`
#[inline]
pub fn stream_xor(key: &ChainValue, nonce: &[u8; KEY_SIZE], buf: &mut [u8]) {
    let mut cipher = XChaCha8::new(Key::from_slice(key), XNonce::from_slice(nonce));
    cipher.apply_keystream(buf);
}

/// Predecessor value used for block 0
#[inline]
pub fn chain_iv() -> ChainValue {
    blake3::derive_key(CHAIN_IV_CONTEXT, &[])
}

/// Compute `chain[index]` from the block bytes and `chain[index - 1]`
///
/// The block (prefixed with its little-endian index) is absorbed by BLAKE3.
/// The first 24 digest bytes become the XChaCha8 nonce, the predecessor is
/// the key, and the keystream is folded back into the digest.
pub fn chain_step(prev: &ChainValue, index: u64, block: &[u8]) -> ChainValue {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&index.to_le_bytes());
    hasher.update(block);
    let mut value: ChainValue = hasher.finalize().into();

    let mut nonce = [0u8; KEY_SIZE];
    nonce.copy_from_slice(&value[..KEY_SIZE]);
    stream_xor(prev, &nonce, &mut value);
    value
}

/// Derive `len` output bytes from the final chain value and a finalization key
pub fn expand_output(last: &ChainValue, key: &[u8; KEY_SIZE], len: usize) -> Vec<u8> {
    let mut output = vec![0u8; len];
    stream_xor(last, key, &mut output);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_xor_is_involution() {
        let key = [7u8; CHAIN_SIZE];
        let nonce = [3u8; KEY_SIZE];
        let plain = b"the quick brown fox jumps over the lazy dog".to_vec();

        let mut buf = plain.clone();
        stream_xor(&key, &nonce, &mut buf);
        assert_ne!(buf, plain);

        stream_xor(&key, &nonce, &mut buf);
        assert_eq!(buf, plain);
    }

    #[test]
    fn test_expand_output_prefix() {
        let last = [0x42u8; CHAIN_SIZE];
        let key = [0x11u8; KEY_SIZE];

        let short = expand_output(&last, &key, 40);
        let long = expand_output(&last, &key, 200);
        assert_eq!(short.len(), 40);
        assert_eq!(&long[..40], &short[..]);
    }

    #[test]
    fn test_chain_step_inputs_matter() {
        let iv = chain_iv();
        let base = chain_step(&iv, 0, b"block");

        assert_eq!(base, chain_step(&iv, 0, b"block"));
        assert_ne!(base, chain_step(&iv, 1, b"block"));
        assert_ne!(base, chain_step(&iv, 0, b"blocK"));
        assert_ne!(base, chain_step(&[0u8; CHAIN_SIZE], 0, b"block"));
    }

    #[test]
    fn test_empty_block_is_well_defined() {
        let iv = chain_iv();
        assert_eq!(chain_step(&iv, 0, &[]), chain_step(&iv, 0, &[]));
        assert_ne!(chain_step(&iv, 0, &[]), chain_step(&iv, 0, &[0]));
    }

    #[test]
    fn test_chain_iv_is_fixed_and_nonzero() {
        assert_eq!(chain_iv(), chain_iv());
        assert_ne!(chain_iv(), [0u8; CHAIN_SIZE]);
        assert_eq!(
            hex::encode(chain_iv()),
            "5f3d3acf8652ff54c7df45351d910455ccd81d8156193fa7920e16def51ffac7"
        );
    }
}
