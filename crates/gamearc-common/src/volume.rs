//! Backing streams for archive contents.

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::Mmap;

use crate::Result;

/// One backing stream of an archive.
///
/// Reads are always positional slices of the whole stream, so any number of
/// callers may read different ranges at once without sharing a cursor.
pub enum Volume {
    /// A memory-mapped file on disk.
    Mapped { path: PathBuf, mmap: Mmap },
    /// An in-memory buffer, e.g. a decrypted header.
    Owned { name: String, data: Vec<u8> },
}

impl Volume {
    /// Memory-map a file.
    ///
    /// Missing or unreadable files surface as [`crate::Error::Io`].
    pub fn map<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;

        // Zero-length files cannot be mapped on every platform.
        if file.metadata()?.len() == 0 {
            return Ok(Self::from_vec(path.display().to_string(), Vec::new()));
        }

        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self::Mapped {
            path: path.to_path_buf(),
            mmap,
        })
    }

    /// Wrap an owned buffer.
    pub fn from_vec(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self::Owned {
            name: name.into(),
            data,
        }
    }

    /// The full contents of the stream.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Mapped { mmap, .. } => &mmap[..],
            Self::Owned { data, .. } => data.as_slice(),
        }
    }

    /// Stream length in bytes.
    #[inline]
    pub fn len(&self) -> u64 {
        self.as_bytes().len() as u64
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// A display name: the file path for mapped volumes.
    pub fn name(&self) -> String {
        match self {
            Self::Mapped { path, .. } => path.display().to_string(),
            Self::Owned { name, .. } => name.clone(),
        }
    }

    /// The bytes in `[offset, offset + length)`, if the range is in bounds.
    pub fn slice(&self, offset: u64, length: u64) -> Option<&[u8]> {
        let start = usize::try_from(offset).ok()?;
        let len = usize::try_from(length).ok()?;
        self.as_bytes().get(start..start.checked_add(len)?)
    }
}

impl fmt::Debug for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Volume")
            .field("name", &self.name())
            .field("len", &self.len())
            .finish()
    }
}
