//! Errors for file and stream hashing

/// Error type for the `rathash` library
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading an input failed
    #[error("I/O error on {source_name}: {source}")]
    Io {
        /// Path or `-` for stdin
        source_name: String,
        #[source]
        source: std::io::Error,
    },

    /// Key was not valid hex
    #[error("invalid key encoding: {0}")]
    KeyEncoding(#[from] hex::FromHexError),

    /// Engine error
    #[error(transparent)]
    Hash(#[from] rathash_core::Error),

    /// Report serialization failed
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for the `rathash` library
pub type Result<T> = std::result::Result<T, Error>;
