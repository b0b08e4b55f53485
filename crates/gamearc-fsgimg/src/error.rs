//! Error types for the FSGIMG crate.

use thiserror::Error;

/// Errors that can occur when reading FSG-FILE-SYSTEM images.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error (truncated tables, bad strings, bounds).
    #[error("{0}")]
    Common(#[from] gamearc_common::Error),

    /// The image does not start with the FSG-FILE-SYSTEM magic.
    #[error("FSG-FILE-SYSTEM header not found")]
    InvalidMagic,

    /// A listing entry started with something other than `D` or `F`.
    #[error("invalid entry prefix {tag:?} in listing of {directory:?}")]
    InvalidEntryTag { tag: char, directory: String },

    /// A listing names a path that has no descriptor.
    #[error("no descriptor for {path:?} (hash {hash})")]
    MissingDescriptor {
        path: String,
        hash: gamearc_common::PathHash,
    },

    /// Directory listings nest deeper than any real image does.
    #[error("directory nesting exceeds {max} levels at {path:?}")]
    ListingTooDeep { path: String, max: usize },
}

impl Error {
    /// Whether this error came from the underlying stream rather than from the data layout.
    pub fn is_io(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::Common(err) => err.is_io(),
            _ => false,
        }
    }
}

/// Result type for FSGIMG operations.
pub type Result<T> = std::result::Result<T, Error>;
