//! Rendering digests for output

use serde::Serialize;

use crate::error::Result;

/// Output format for digests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Format {
    /// `<hex digest>  <source>`, one line per input
    #[default]
    Hex,
    /// One JSON object per input
    Json,
}

/// Digest of one input
#[derive(Debug, Clone, Serialize)]
pub struct Digest {
    /// Path or `-` for stdin
    pub source: String,
    /// Number of input bytes hashed
    pub bytes: u64,
    /// Whether a non-default key was used
    pub keyed: bool,
    /// Hex-encoded output
    pub digest: String,
}

impl Digest {
    pub fn new(source: impl Into<String>, bytes: u64, keyed: bool, output: &[u8]) -> Self {
        Self {
            source: source.into(),
            bytes,
            keyed,
            digest: hex::encode(output),
        }
    }

    pub fn render(&self, format: Format) -> Result<String> {
        Ok(match format {
            Format::Hex => format!("{}  {}", self.digest, self.source),
            Format::Json => serde_json::to_string(self)?,
        })
    }
}
