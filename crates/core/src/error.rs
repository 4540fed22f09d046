//! Error types for the hash engine

use crate::params::KEY_SIZE;

/// Errors reported by [`Hasher`](crate::Hasher)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A non-empty finalization key of the wrong length was supplied
    #[error("key size of {got} invalid, must be {KEY_SIZE}")]
    InvalidKeySize {
        /// Length of the rejected key
        got: usize,
    },

    /// Requested output length was zero
    #[error("output length must be at least one byte")]
    InvalidOutputLength,

    /// The chain table or worker pool reached an inconsistent state.
    ///
    /// The current computation is lost; the hasher must be reset or dropped.
    #[error("internal synchronization failure: {0}")]
    Synchronization(String),

    /// The worker pool could not be started
    #[error("failed to start worker pool: {0}")]
    Spawn(String),
}

/// Result type for hashing operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn sync(msg: impl Into<String>) -> Self {
        Error::Synchronization(msg.into())
    }
}
