//! C FFI bindings for mobile and embedding hosts

use crate::{Error, Hasher, params};
use core::slice;

/// Success
pub const RATHASH_OK: i32 = 0;
/// A pointer argument was null
pub const RATHASH_ERR_NULL: i32 = -1;
/// Key was neither empty nor `rathash_key_size()` bytes
pub const RATHASH_ERR_KEY_SIZE: i32 = -2;
/// The computation failed; reset or free the hasher
pub const RATHASH_ERR_INTERNAL: i32 = -3;

/// Opaque hasher handle for FFI
pub struct RatHasher {
    inner: Hasher,
}

fn status(err: &Error) -> i32 {
    match err {
        Error::InvalidKeySize { .. } => RATHASH_ERR_KEY_SIZE,
        _ => RATHASH_ERR_INTERNAL,
    }
}

/// Create a new hasher producing `output_len` bytes
/// Returns null if `output_len` is zero or no worker pool could be started
/// (caller must free with rathash_free)
#[unsafe(no_mangle)]
pub extern "C" fn rathash_new(output_len: usize) -> *mut RatHasher {
    match Hasher::new(output_len) {
        Ok(inner) => Box::into_raw(Box::new(RatHasher { inner })),
        Err(_) => core::ptr::null_mut(),
    }
}

/// Free a hasher instance
#[unsafe(no_mangle)]
pub extern "C" fn rathash_free(hasher: *mut RatHasher) {
    if !hasher.is_null() {
        unsafe {
            let _ = Box::from_raw(hasher);
        }
    }
}

/// Absorb `input_len` bytes; returns the number of bytes accepted
#[unsafe(no_mangle)]
pub extern "C" fn rathash_write(hasher: *mut RatHasher, input: *const u8, input_len: usize) -> usize {
    if hasher.is_null() || input.is_null() || input_len == 0 {
        return 0;
    }

    unsafe {
        let hasher = &mut *hasher;
        hasher.inner.write(slice::from_raw_parts(input, input_len))
    }
}

/// Write the digest into `output`
/// - key: null/0 for the default key, otherwise `rathash_key_size()` bytes
/// - output: buffer of at least the `output_len` given to rathash_new
#[unsafe(no_mangle)]
pub extern "C" fn rathash_finalize(
    hasher: *mut RatHasher,
    key: *const u8,
    key_len: usize,
    output: *mut u8,
) -> i32 {
    if hasher.is_null() || output.is_null() || (key.is_null() && key_len > 0) {
        return RATHASH_ERR_NULL;
    }

    unsafe {
        let hasher = &mut *hasher;
        let key: &[u8] = if key_len == 0 {
            &[]
        } else {
            slice::from_raw_parts(key, key_len)
        };

        match hasher.inner.finalize(key) {
            Ok(digest) => {
                slice::from_raw_parts_mut(output, digest.len()).copy_from_slice(&digest);
                RATHASH_OK
            }
            Err(err) => status(&err),
        }
    }
}

/// Start a new computation on an existing hasher
#[unsafe(no_mangle)]
pub extern "C" fn rathash_reset(hasher: *mut RatHasher) -> i32 {
    if hasher.is_null() {
        return RATHASH_ERR_NULL;
    }
    unsafe {
        match (*hasher).inner.reset() {
            Ok(()) => RATHASH_OK,
            Err(err) => status(&err),
        }
    }
}

/// Required finalization key length in bytes
#[unsafe(no_mangle)]
pub extern "C" fn rathash_key_size() -> usize {
    params::KEY_SIZE
}

/// Segmentation block size in bytes
#[unsafe(no_mangle)]
pub extern "C" fn rathash_block_size() -> usize {
    params::BLOCK_SIZE
}
