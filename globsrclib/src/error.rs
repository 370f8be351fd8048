//! Error types for globsrclib

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while resolving patterns or loading files
#[derive(Error, Debug)]
pub enum GlobsrcError {
    /// Invalid glob pattern
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    /// Pattern set has nothing to resolve
    #[error("pattern set is empty or contains only negations")]
    EmptyPattern,

    /// Failed to open or read a resolved file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Lazy-stream contents requested while the streaming feature is off
    #[error("streaming contents are disabled, cannot stream '{path}'")]
    StreamingDisabled { path: PathBuf },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GlobsrcError {
    /// The file this error is about, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            GlobsrcError::FileRead { path, .. } | GlobsrcError::StreamingDisabled { path } => {
                Some(path)
            }
            _ => None,
        }
    }

    /// True for errors raised before any file could be emitted.
    pub fn is_pattern_error(&self) -> bool {
        matches!(
            self,
            GlobsrcError::InvalidGlob { .. } | GlobsrcError::EmptyPattern
        )
    }
}
