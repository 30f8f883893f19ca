//! Error types for the line codec.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while encoding, decoding, reading or appending collection records.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A line is not valid JSON or does not parse to a JSON object.
    #[error("malformed record at line {line}: {source}")]
    MalformedRecord {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// The record cannot be represented as JSON.
    #[error("failed to encode record: {0}")]
    EncodeFailure(#[source] serde_json::Error),

    /// The value is valid JSON but not an object, so it cannot be a record.
    #[error("record is not a JSON object")]
    NotAnObject,

    /// The collection file does not exist.
    #[error("collection file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The underlying storage failed to read or write.
    #[error("collection I/O failure: {0}")]
    IoFailure(#[from] std::io::Error),
}

impl CodecError {
    /// Maps an error from opening `path`, singling out a missing file.
    pub(crate) fn on_open(err: std::io::Error, path: &std::path::Path) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            CodecError::FileNotFound(path.to_path_buf())
        } else {
            CodecError::IoFailure(err)
        }
    }
}
