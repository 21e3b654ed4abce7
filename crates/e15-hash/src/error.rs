//! Error types for e15-hash.
//!
//! Hashing itself never fails: every byte sequence is valid input. Errors only
//! come from the byte sources and sinks a core is fed through, and from
//! parsing digests or manifests supplied as text.

use std::path::PathBuf;

use thiserror::Error;

/// Common error type for e15-hash operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A file could not be opened for hashing.
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source ended before the requested number of bytes was read.
    #[error("short read: expected {expected} bytes but only {actual} available")]
    ReadShort { expected: usize, actual: usize },

    /// The sink stopped accepting bytes before everything was written.
    #[error("short write: expected {expected} bytes but only {actual} written")]
    WriteShort { expected: usize, actual: usize },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Hex digest had the wrong number of characters.
    #[error("invalid digest length: expected {expected} hex characters, got {actual}")]
    InvalidHexLength { expected: usize, actual: usize },

    /// Hex digest contained a non-hex character.
    #[error("invalid hex digit {found:?} at position {position}")]
    InvalidHexDigit { position: usize, found: char },

    /// Algorithm name was not recognized.
    #[error("unknown hash algorithm: {0}")]
    UnknownAlgorithm(String),

    /// A checksum manifest line could not be parsed.
    #[error("malformed manifest line {line}: {reason}")]
    MalformedManifestLine { line: usize, reason: String },
}

/// The I/O failure categories a byte-stream collaborator can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IoFailure {
    /// The source could not be opened.
    Open,
    /// Fewer bytes could be read than requested.
    ReadShort,
    /// Fewer bytes could be written than requested.
    WriteShort,
}

impl Error {
    /// Classify this error as one of the stream failure kinds, if it is one.
    pub fn io_failure(&self) -> Option<IoFailure> {
        match self {
            Error::Open { .. } => Some(IoFailure::Open),
            Error::ReadShort { .. } => Some(IoFailure::ReadShort),
            Error::WriteShort { .. } => Some(IoFailure::WriteShort),
            _ => None,
        }
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_failure_kinds() {
        let open = Error::Open {
            path: PathBuf::from("missing.bin"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(open.io_failure(), Some(IoFailure::Open));
        assert!(open.to_string().contains("missing.bin"));

        let short = Error::ReadShort { expected: 8, actual: 3 };
        assert_eq!(short.io_failure(), Some(IoFailure::ReadShort));

        let short = Error::WriteShort { expected: 8, actual: 0 };
        assert_eq!(short.io_failure(), Some(IoFailure::WriteShort));

        assert_eq!(Error::UnknownAlgorithm("md5".into()).io_failure(), None);
    }
}
