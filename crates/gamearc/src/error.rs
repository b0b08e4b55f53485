//! Unified error type.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from opening any supported archive.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("FSGIMG: {0}")]
    FsgImg(#[from] gamearc_fsgimg::Error),

    #[error("Seven45: {0}")]
    Seven45(#[from] gamearc_seven45::Error),

    /// No registered format recognizes the file.
    #[error("unrecognized archive format: {}", .0.display())]
    UnknownFormat(PathBuf),
}

impl Error {
    /// Whether the failure came from the file system rather than from a
    /// malformed or unsupported archive.
    pub fn is_io(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::FsgImg(err) => err.is_io(),
            Error::Seven45(err) => err.is_io(),
            Error::UnknownFormat(_) => false,
        }
    }
}

/// Result type for gamearc operations.
pub type Result<T> = std::result::Result<T, Error>;
