//! Error types for gamearc-common.

use thiserror::Error;

/// Common error type for gamearc operations.
#[derive(Debug, Error)]
pub enum Error {
    /// End of buffer reached while reading.
    #[error("unexpected end of buffer: needed {needed} bytes but only {available} available")]
    UnexpectedEof { needed: usize, available: usize },

    /// Invalid magic bytes encountered.
    #[error("invalid magic: expected {expected:?}, got {actual:?}")]
    InvalidMagic {
        expected: Vec<u8>,
        actual: Vec<u8>,
    },

    /// A seek target lies past the end of the buffer.
    #[error("offset {offset:#x} is outside a buffer of {len:#x} bytes")]
    OffsetOutOfRange { offset: u64, len: usize },

    /// A file's data range does not fit inside its backing stream.
    #[error("file {path:?} spans {offset:#x}+{length:#x}, past the end of its stream ({stream_len:#x} bytes)")]
    LocatorOutOfBounds {
        path: String,
        offset: u64,
        length: u64,
        stream_len: u64,
    },

    /// A file references a content volume the archive does not own.
    #[error("file {path:?} references volume {volume}, but only {available} are open")]
    UnknownVolume {
        path: String,
        volume: u16,
        available: usize,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing null terminator in string.
    #[error("string missing null terminator")]
    MissingNullTerminator,
}

impl Error {
    /// Whether this error came from the underlying stream rather than from the data layout.
    pub fn is_io(&self) -> bool {
        matches!(self, Error::Io(_))
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
