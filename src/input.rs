//! Feeding readers, files and stdin into a hasher

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::algorithm::{Error as HashError, Hasher, KEY_SIZE};
use crate::error::{Error, Result};

/// Path naming standard input
pub const STDIN: &str = "-";

/// Stream everything from `reader` into `hasher`; returns the byte count
pub fn hash_reader<R: Read>(hasher: &mut Hasher, mut reader: R) -> io::Result<u64> {
    io::copy(&mut reader, hasher)
}

/// Stream a file (or stdin for `-`) into `hasher`
pub fn hash_path(hasher: &mut Hasher, path: &Path) -> Result<u64> {
    let source_name = path.display().to_string();
    let result = if path.as_os_str() == STDIN {
        hash_reader(hasher, io::stdin().lock())
    } else {
        File::open(path).and_then(|file| hash_reader(hasher, file))
    };

    let bytes = result.map_err(|source| Error::Io {
        source_name,
        source,
    })?;
    log::debug!("hashed {} bytes from {}", bytes, path.display());
    Ok(bytes)
}

/// Decode a hex finalization key; empty input means the default key
pub fn parse_key(hex_key: &str) -> Result<Vec<u8>> {
    let key = hex::decode(hex_key.trim())?;
    if !key.is_empty() && key.len() != KEY_SIZE {
        return Err(HashError::InvalidKeySize { got: key.len() }.into());
    }
    Ok(key)
}
