//! Streaming RatHash hasher
//!
//! Owns the segmenter, the shared chain table and the current worker pool.
//! Every mutating method takes `&mut self`, so writes, finalization and resets
//! of one hasher can never interleave.

use std::io;
use std::sync::Arc;

use zeroize::Zeroizing;

use crate::chain::ChainTable;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::params::{BLOCK_SIZE, DEFAULT_KEY, KEY_SIZE};
use crate::pool::WorkerPool;
use crate::primitives::expand_output;
use crate::segment::Segmenter;

/// Keyed, extendable-output hasher with a parallel block chain
///
/// The output length is fixed at construction. `finalize` acts as a
/// checkpoint: more input may be written afterwards and finalized again.
pub struct Hasher {
    output_len: usize,
    config: Config,
    segmenter: Segmenter,
    chain: Arc<ChainTable>,
    pool: WorkerPool,
    /// Sticky synchronization failure, cleared only by `reset`
    failure: Option<Error>,
}

impl Hasher {
    /// Create a hasher producing `output_len` bytes, one worker per CPU
    pub fn new(output_len: usize) -> Result<Self> {
        Self::with_config(output_len, Config::default())
    }

    /// Create a hasher with an explicit pool configuration
    pub fn with_config(output_len: usize, config: Config) -> Result<Self> {
        if output_len == 0 {
            return Err(Error::InvalidOutputLength);
        }
        let chain = Arc::new(ChainTable::new());
        let pool = WorkerPool::arm(&config, Arc::clone(&chain))?;

        Ok(Self {
            output_len,
            config,
            segmenter: Segmenter::new(),
            chain,
            pool,
            failure: None,
        })
    }

    /// Number of bytes `finalize` returns
    pub fn output_size(&self) -> usize {
        self.output_len
    }

    pub fn block_size(&self) -> usize {
        BLOCK_SIZE
    }

    pub fn key_size(&self) -> usize {
        KEY_SIZE
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Absorb `data`; returns the number of bytes accepted (always all of them)
    ///
    /// Blocks while the dispatch queue is full.
    pub fn write(&mut self, data: &[u8]) -> usize {
        let pool = &mut self.pool;
        self.segmenter.push(data, |block| pool.dispatch(block))
    }

    /// Produce the digest of everything written since creation or `reset`
    ///
    /// `key` must be empty (the all-zero default key) or exactly
    /// [`KEY_SIZE`] bytes. A wrong key size leaves the hasher untouched.
    pub fn finalize(&mut self, key: &[u8]) -> Result<Vec<u8>> {
        let key = resolve_key(key)?;
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }

        // Trailing bytes (or an empty input) are flushed as one extra block
        // that is rolled back afterwards.
        let synthetic = self.segmenter.final_block();
        let last = match &synthetic {
            Some(block) => block.index,
            None => self.segmenter.next_index().saturating_sub(1),
        };
        let rollback = synthetic.is_some();
        if let Some(block) = synthetic {
            self.pool.dispatch(block);
        }

        let result = self.finish(last, &key, rollback);
        if let Err(err) = &result {
            self.failure = Some(err.clone());
        }
        result
    }

    fn finish(&mut self, last: u64, key: &[u8; KEY_SIZE], rollback: bool) -> Result<Vec<u8>> {
        self.pool.drain()?;

        let value = self
            .chain
            .get(last)?
            .ok_or_else(|| Error::sync(format!("final chain entry {last} missing")))?;
        let output = expand_output(&value, key, self.output_len);

        if rollback {
            self.chain.remove(last)?;
        }
        self.pool = WorkerPool::arm(&self.config, Arc::clone(&self.chain))?;

        log::debug!(
            "finalized {} blocks into {} bytes",
            last + 1,
            self.output_len
        );
        Ok(output)
    }

    /// Discard all input and intermediate state and start a new computation
    ///
    /// Chain values and buffered input are zeroized, not just dropped.
    pub fn reset(&mut self) -> Result<()> {
        // The outcome of the abandoned computation no longer matters.
        let _ = self.pool.drain();
        self.chain.clear();
        self.segmenter.reset();
        self.failure = None;

        match WorkerPool::arm(&self.config, Arc::clone(&self.chain)) {
            Ok(pool) => self.pool = pool,
            Err(err) => {
                self.failure = Some(err.clone());
                return Err(err);
            }
        }
        log::debug!("hasher reset");
        Ok(())
    }
}

impl Drop for Hasher {
    fn drop(&mut self) {
        let _ = self.pool.drain();
        self.chain.clear();
    }
}

impl io::Write for Hasher {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(Hasher::write(self, buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Map an empty key to [`DEFAULT_KEY`] and reject any other wrong length
pub(crate) fn resolve_key(key: &[u8]) -> Result<Zeroizing<[u8; KEY_SIZE]>> {
    match key.len() {
        0 => Ok(Zeroizing::new(DEFAULT_KEY)),
        KEY_SIZE => {
            let mut resolved = Zeroizing::new([0u8; KEY_SIZE]);
            resolved.copy_from_slice(key);
            Ok(resolved)
        }
        got => Err(Error::InvalidKeySize { got }),
    }
}

/// Convenience function for single-shot hashing
///
/// For many inputs prefer one `Hasher` and `reset` between them.
pub fn hash(input: &[u8], key: &[u8], output_len: usize) -> Result<Vec<u8>> {
    let mut hasher = Hasher::new(output_len)?;
    hasher.write(input);
    hasher.finalize(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::Block;

    #[test]
    fn test_failure_is_sticky_until_reset() {
        let mut hasher = Hasher::with_config(32, Config::with_workers(2)).unwrap();
        hasher.pool.dispatch(Block::new(0, b"first"));
        hasher.pool.dispatch(Block::new(0, b"again"));

        assert!(matches!(
            hasher.finalize(&[]),
            Err(Error::Synchronization(_))
        ));
        hasher.write(b"more input");
        assert!(matches!(
            hasher.finalize(&[]),
            Err(Error::Synchronization(_))
        ));

        hasher.reset().unwrap();
        assert_eq!(hasher.finalize(&[]).unwrap(), hash(b"", &[], 32).unwrap());
    }

    #[test]
    fn test_invalid_key_is_reported_before_failure() {
        let mut hasher = Hasher::with_config(16, Config::with_workers(1)).unwrap();
        hasher.pool.dispatch(Block::new(0, b"x"));
        hasher.pool.dispatch(Block::new(0, b"x"));

        assert_eq!(
            hasher.finalize(&[0u8; 3]),
            Err(Error::InvalidKeySize { got: 3 })
        );
        assert!(matches!(
            hasher.finalize(&[]),
            Err(Error::Synchronization(_))
        ));
    }
}
