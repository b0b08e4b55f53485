//! Format detection and dispatch.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use gamearc_common::Archive;
use gamearc_fsgimg::{FsgImage, FSG_MAGIC};
use gamearc_seven45::Seven45Package;
use tracing::debug;

use crate::{Error, Result};

/// A supported container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    FsgImg,
    Seven45,
}

impl Format {
    /// Every format, in probe order.
    pub const ALL: [Format; 2] = [Format::Seven45, Format::FsgImg];

    pub fn name(self) -> &'static str {
        match self {
            Format::FsgImg => gamearc_fsgimg::FORMAT_NAME,
            Format::Seven45 => gamearc_seven45::FORMAT_NAME,
        }
    }

    /// Whether the file at `path` looks like this format.
    pub fn probe(self, path: &Path) -> bool {
        match self {
            Format::Seven45 => gamearc_seven45::probe_file(path),
            Format::FsgImg => {
                let mut magic = [0u8; FSG_MAGIC.len()];
                File::open(path)
                    .and_then(|mut file| file.read_exact(&mut magic))
                    .is_ok_and(|()| gamearc_fsgimg::probe(&magic))
            }
        }
    }

    /// Open `path` as this format.
    pub fn open(self, path: &Path) -> Result<Archive> {
        let archive = match self {
            Format::FsgImg => FsgImage::open(path)?.into_archive(),
            Format::Seven45 => Seven45Package::open(path)?.into_archive(),
        };
        Ok(archive)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identify the format of the file at `path`.
///
/// Seven45 is recognized by its header suffix and a matching key; FSGIMG by
/// its magic. Unreadable files match nothing.
pub fn probe_format<P: AsRef<Path>>(path: P) -> Option<Format> {
    let path = path.as_ref();
    let format = Format::ALL.into_iter().find(|format| format.probe(path));
    debug!(path = %path.display(), ?format, "probed archive format");
    format
}

/// Detect the format of `path` and open it.
pub fn open_archive<P: AsRef<Path>>(path: P) -> Result<Archive> {
    let path = path.as_ref();
    std::fs::metadata(path)?;

    let format = probe_format(path).ok_or_else(|| Error::UnknownFormat(path.to_path_buf()))?;
    format.open(path)
}
