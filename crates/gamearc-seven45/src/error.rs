//! Error types for the Seven45 crate.

use thiserror::Error;

/// Errors that can occur when reading Seven45 packages.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error, including a missing content volume.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error (truncated tables, bad strings, bounds).
    #[error("{0}")]
    Common(#[from] gamearc_common::Error),

    /// No key configuration decrypts the header to the expected magic.
    #[error("header does not decrypt under any known key configuration")]
    NoMatchingKey,

    /// Decrypted header has the wrong magic.
    #[error("invalid Seven45 magic: expected {expected:#x}, got {actual:#x}")]
    InvalidMagic { expected: u32, actual: u32 },

    /// A directory's parent does not precede it.
    #[error("directory {index} has invalid parent {parent}")]
    InvalidParent { index: usize, parent: i32 },

    /// A directory's name index is past the end of the string table.
    #[error("directory {index} names string {string_num}, but the table has {strings} strings")]
    DirectoryNameOutOfRange {
        index: usize,
        string_num: u32,
        strings: usize,
    },

    /// A file entry's directory index is out of range.
    #[error("file {index} is in directory {dir_num}, but there are {dirs} directories")]
    DirectoryIndexOutOfRange {
        index: usize,
        dir_num: u16,
        dirs: usize,
    },

    /// A file entry's offset index is out of range.
    #[error("file {index} uses offset entry {offset_num}, but there are {offsets} offset entries")]
    OffsetIndexOutOfRange {
        index: usize,
        offset_num: u32,
        offsets: usize,
    },

    /// Fewer content volumes were supplied than the offset table references.
    #[error("offset table references {expected} volumes, but {found} were supplied")]
    MissingVolumes { expected: usize, found: usize },
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

/// Result type for Seven45 operations.
pub type Result<T> = std::result::Result<T, Error>;
